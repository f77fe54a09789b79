//! Identity registries for members and shift types.
//!
//! The registry is the single owner of every [`Member`] and [`ShiftType`]
//! instance. Schedules and assignment sets hold ids and resolve through here,
//! so an in-place update (such as a rename) is visible everywhere at once.

use std::collections::HashMap;

use crate::model::{Member, MemberId, ShiftType, ShiftTypeId};

#[derive(Debug, Default, Clone)]
pub struct Registry {
    members: HashMap<MemberId, Member>,
    shift_types: HashMap<ShiftTypeId, ShiftType>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a member by id.
    pub fn register_member(&mut self, member: Member) {
        self.members.insert(member.id, member);
    }

    /// Insert or overwrite a shift type by id.
    pub fn register_shift_type(&mut self, shift_type: ShiftType) {
        self.shift_types.insert(shift_type.id, shift_type);
    }

    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    #[must_use]
    pub fn shift_type(&self, id: ShiftTypeId) -> Option<&ShiftType> {
        self.shift_types.get(&id)
    }

    #[must_use]
    pub fn contains_member(&self, id: MemberId) -> bool {
        self.members.contains_key(&id)
    }

    /// Rename a member in place. Returns the previous name, or `None` when
    /// the id is not registered.
    pub fn rename_member(&mut self, id: MemberId, name: impl Into<String>) -> Option<String> {
        self.members
            .get_mut(&id)
            .map(|member| std::mem::replace(&mut member.name, name.into()))
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn shift_type_count(&self) -> usize {
        self.shift_types.len()
    }
}
