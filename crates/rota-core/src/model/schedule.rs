//! The schedule aggregate and its two assignment views.
//!
//! `original_shifts` holds only what the server has confirmed; a missing key
//! means "not fetched yet", while a present empty set means "fetched, nobody
//! assigned". `edited_shifts` is sparse: it has an entry for a slot exactly
//! when the user's pending assignment for that slot differs from the
//! original (a missing original counts as empty).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::member::{Member, MemberId, ShiftType, ShiftTypeId};
use super::slot::SlotKey;

/// Numeric schedule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub u64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Assigned members of one slot.
pub type Assignment = BTreeSet<MemberId>;

/// Local edit applied to a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftAction {
    Add,
    Remove,
}

/// Body of `GET /schedules/:id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub id: ScheduleId,
    #[serde(default)]
    pub name: Option<String>,
    pub members: Vec<Member>,
    pub shift_types: Vec<ShiftType>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl SchedulePayload {
    /// Split the payload into the schedule (which keeps ids only) and the
    /// entities that belong in the registry.
    #[must_use]
    pub fn into_parts(self) -> (Schedule, Vec<Member>, Vec<ShiftType>) {
        let schedule = Schedule {
            id: self.id,
            name: self.name,
            attributes: self.attributes,
            members: self.members.iter().map(|m| m.id).collect(),
            shift_types: self.shift_types.iter().map(|t| t.id).collect(),
            original_shifts: BTreeMap::new(),
            edited_shifts: BTreeMap::new(),
        };
        (schedule, self.members, self.shift_types)
    }
}

/// One dirty slot as sent in `PUT /schedules/:id/shifts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEdit {
    pub date: NaiveDate,
    pub shift_type_id: ShiftTypeId,
    pub member_ids: Vec<MemberId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    id: ScheduleId,
    name: Option<String>,
    attributes: BTreeMap<String, Value>,
    members: Vec<MemberId>,
    shift_types: Vec<ShiftTypeId>,
    original_shifts: BTreeMap<SlotKey, Assignment>,
    edited_shifts: BTreeMap<SlotKey, Assignment>,
}

impl Schedule {
    #[must_use]
    pub const fn id(&self) -> ScheduleId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Schedule fields the store does not interpret.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Member ids in schedule order.
    #[must_use]
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Shift type ids in schedule order.
    #[must_use]
    pub fn shift_types(&self) -> &[ShiftTypeId] {
        &self.shift_types
    }

    #[must_use]
    pub const fn original_shifts(&self) -> &BTreeMap<SlotKey, Assignment> {
        &self.original_shifts
    }

    #[must_use]
    pub const fn edited_shifts(&self) -> &BTreeMap<SlotKey, Assignment> {
        &self.edited_shifts
    }

    /// True when the slot has been fetched from the server.
    #[must_use]
    pub fn is_fetched(&self, slot: &SlotKey) -> bool {
        self.original_shifts.contains_key(slot)
    }

    /// True when the slot has a pending edit.
    #[must_use]
    pub fn is_dirty(&self, slot: &SlotKey) -> bool {
        self.edited_shifts.contains_key(slot)
    }

    pub fn dirty_slots(&self) -> impl Iterator<Item = &SlotKey> {
        self.edited_shifts.keys()
    }

    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edited_shifts.is_empty()
    }

    /// The assignment the user currently sees: the pending edit if the slot
    /// is dirty, otherwise the server state. `None` for unfetched, clean slots.
    #[must_use]
    pub fn assigned(&self, slot: &SlotKey) -> Option<&Assignment> {
        self.edited_shifts
            .get(slot)
            .or_else(|| self.original_shifts.get(slot))
    }

    pub(crate) fn push_member(&mut self, member: MemberId) {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }

    /// Mark a slot as fetched without assigning anyone.
    pub(crate) fn ensure_fetched(&mut self, slot: SlotKey) {
        self.original_shifts.entry(slot).or_default();
    }

    /// Record a server-confirmed assignment. Additive; never clears.
    pub(crate) fn merge_original(&mut self, slot: SlotKey, member: MemberId) {
        self.original_shifts.entry(slot).or_default().insert(member);
    }

    /// Drop the pending edit of a slot once it matches the original again.
    /// Returns whether the slot is still dirty.
    pub(crate) fn settle_edit(&mut self, slot: &SlotKey) -> bool {
        let Some(edited) = self.edited_shifts.get(slot) else {
            return false;
        };
        let unchanged = self
            .original_shifts
            .get(slot)
            .map_or_else(|| edited.is_empty(), |orig| orig == edited);
        if unchanged {
            self.edited_shifts.remove(slot);
        }
        !unchanged
    }

    /// Apply a local edit and report whether the slot is dirty afterwards.
    ///
    /// The first edit of a slot seeds the edited set with a copy of the
    /// original, so `original_shifts` is never mutated here. When the edit
    /// brings the slot back to its original assignment the entry is dropped.
    pub(crate) fn modify_shift(
        &mut self,
        slot: SlotKey,
        action: ShiftAction,
        member: MemberId,
    ) -> bool {
        let original = self.original_shifts.get(&slot);
        let edited = self
            .edited_shifts
            .entry(slot)
            .or_insert_with(|| original.cloned().unwrap_or_default());

        match action {
            ShiftAction::Add => {
                edited.insert(member);
            }
            ShiftAction::Remove => {
                edited.remove(&member);
            }
        }

        let unchanged = original.map_or_else(|| edited.is_empty(), |orig| orig == edited);
        if unchanged {
            self.edited_shifts.remove(&slot);
        }
        !unchanged
    }

    /// Drop every pending edit, returning the slots that were dirty.
    pub(crate) fn discard_edits(&mut self) -> Vec<SlotKey> {
        std::mem::take(&mut self.edited_shifts).into_keys().collect()
    }

    pub(crate) fn edit_payload(&self) -> Vec<SlotEdit> {
        self.edited_shifts
            .iter()
            .map(|(slot, members)| SlotEdit {
                date: slot.date,
                shift_type_id: slot.shift_type_id,
                member_ids: members.iter().copied().collect(),
            })
            .collect()
    }

    /// Promote the given dirty slots to server state.
    pub(crate) fn commit_edits(&mut self, slots: &[SlotKey]) {
        for slot in slots {
            if let Some(members) = self.edited_shifts.remove(slot) {
                self.original_shifts.insert(*slot, members);
            }
        }
    }
}
