//! rota-core: client-side schedule store.
//!
//! The [`store::ScheduleStore`] keeps, per schedule, the shift assignments
//! last confirmed by the server and the user's pending edits as two
//! separate views, fetches shift data incrementally by date, and talks to
//! the server through the [`http::Transport`] seam.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module; `anyhow::Result` only
//!   for configuration loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod model;
pub mod registry;
pub mod store;
pub mod testing;
pub mod tracker;

pub use events::StoreEvent;
pub use model::{Member, MemberId, NewMember, Schedule, ScheduleId, ShiftAction, ShiftTypeId, SlotKey};
pub use store::{GetScheduleError, ScheduleStore, StoreError};
