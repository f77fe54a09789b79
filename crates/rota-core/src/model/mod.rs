//! Schedule data model: identities, slot keys, and the original/edited
//! assignment maps.

pub mod member;
pub mod schedule;
pub mod slot;

pub use member::{Member, MemberId, NewMember, ShiftType, ShiftTypeId};
pub use schedule::{Schedule, SchedulePayload, ScheduleId, ShiftAction};
pub use slot::{ShiftRow, SlotKey};
