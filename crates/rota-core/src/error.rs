use std::fmt;

/// Machine-readable error codes shared by the store and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ScheduleNotFound,
    UnknownSchedule,
    UnknownMember,
    RangeTooWide,
    ServerError,
    RequestRejected,
    TransportFailed,
    ResponseDecodeFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ScheduleNotFound => "E2001",
            Self::UnknownSchedule => "E2002",
            Self::UnknownMember => "E2003",
            Self::RangeTooWide => "E2004",
            Self::ServerError => "E3001",
            Self::RequestRejected => "E3002",
            Self::TransportFailed => "E4001",
            Self::ResponseDecodeFailed => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ScheduleNotFound => "Schedule not found",
            Self::UnknownSchedule => "Schedule not loaded",
            Self::UnknownMember => "Unknown member",
            Self::RangeTooWide => "Date range too wide",
            Self::ServerError => "Server error",
            Self::RequestRejected => "Request rejected by server",
            Self::TransportFailed => "Network request failed",
            Self::ResponseDecodeFailed => "Unexpected response payload",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => {
                Some("Fix the syntax of .rota/config.toml or the user config file and retry.")
            }
            Self::ScheduleNotFound => Some("Check the schedule id."),
            Self::UnknownSchedule => Some("Load the schedule with get_schedule first."),
            Self::UnknownMember => {
                Some("Load the schedule that lists this member before using it.")
            }
            Self::RangeTooWide => Some("Split the range into spans of at most a year."),
            Self::ServerError | Self::RequestRejected => None,
            Self::TransportFailed => {
                Some("Check that the server is reachable (see `base_url` in config).")
            }
            Self::ResponseDecodeFailed => Some("Client and server versions may disagree."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
