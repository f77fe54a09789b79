use crate::error::ErrorCode;
use crate::http::{Body, TransportError};
use crate::model::{MemberId, ScheduleId};
use chrono::NaiveDate;

/// Why [`get_schedule`](super::ScheduleStore::get_schedule) produced no schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GetScheduleError {
    /// The server answered 404.
    #[error("schedule {0} not found")]
    ScheduleNotFound(ScheduleId),

    /// Any other non-success status.
    #[error("server error {status} while fetching schedule: {body}")]
    ServerError { status: u16, body: Body },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success response whose body is not a schedule.
    #[error("unexpected schedule payload: {0}")]
    Decode(String),
}

impl GetScheduleError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ScheduleNotFound(_) => ErrorCode::ScheduleNotFound,
            Self::ServerError { .. } => ErrorCode::ServerError,
            Self::Transport(err) => err.code(),
            Self::Decode(_) => ErrorCode::ResponseDecodeFailed,
        }
    }
}

/// Errors from store operations other than schedule loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The schedule has not been loaded through `get_schedule`.
    #[error("schedule {0} is not loaded")]
    UnknownSchedule(ScheduleId),

    /// A member id that is not in the registry.
    #[error("member {0} is not registered")]
    UnknownMember(MemberId),

    /// A closed range fetch spanning more days than the store will lay out.
    #[error("date range {min}..={max} spans {days} days, limit is {limit}")]
    RangeTooWide {
        min: NaiveDate,
        max: NaiveDate,
        days: i64,
        limit: i64,
    },

    /// The server answered with a non-success status.
    #[error("server rejected request with status {status}: {body}")]
    Rejected { status: u16, body: Body },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownSchedule(_) => ErrorCode::UnknownSchedule,
            Self::UnknownMember(_) => ErrorCode::UnknownMember,
            Self::RangeTooWide { .. } => ErrorCode::RangeTooWide,
            Self::Rejected { .. } => ErrorCode::RequestRejected,
            Self::Transport(err) => err.code(),
            Self::Decode(_) => ErrorCode::ResponseDecodeFailed,
        }
    }
}
