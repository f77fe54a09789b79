//! The schedule store.
//!
//! [`ScheduleStore`] owns every loaded [`Schedule`], the identity
//! [`Registry`], and the [`FetchTracker`], and is the only place that talks
//! to the server. Reads return references into the store; every mutation
//! notifies subscribed observers once the state change is complete.
//!
//! # Caching
//!
//! A schedule is fetched once and then served from memory for the life of
//! the store; it is never refreshed. Shift rows are merged into the
//! schedule's original view incrementally as date ranges are requested.
//!
//! # Failures
//!
//! Network and HTTP failures come back as typed errors and never leave
//! partial state behind. A shift row naming a member that is not registered
//! is an invariant violation: it is logged at `error` and the whole merge
//! is abandoned.

mod error;

pub use error::{GetScheduleError, StoreError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::events::{Observers, StoreEvent, SubscriptionId};
use crate::http::{HttpClient, MAX_RANGE_DAYS, Response, ShiftQuery, Transport, UreqTransport};
use crate::model::schedule::{Assignment, SlotEdit};
use crate::model::{
    Member, MemberId, NewMember, Schedule, SchedulePayload, ScheduleId, ShiftAction, ShiftRow,
    ShiftType, SlotKey,
};
use crate::registry::Registry;
use crate::tracker::FetchTracker;

/// Body of a successful `POST /schedules/:id/members`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedMember {
    member_id: MemberId,
}

/// Body of `PUT /schedules/:id/shifts`.
#[derive(Debug, Serialize)]
struct SubmitShifts<'a> {
    shifts: &'a [SlotEdit],
}

#[derive(Debug)]
pub struct ScheduleStore<T> {
    client: HttpClient<T>,
    schedules: HashMap<ScheduleId, Schedule>,
    registry: Registry,
    tracker: FetchTracker,
    observers: Observers,
}

impl ScheduleStore<UreqTransport> {
    /// Store talking to the configured server over HTTP.
    #[must_use]
    pub fn from_config(server: &ServerConfig) -> Self {
        let client = HttpClient::new(UreqTransport::new(), server.base_url.clone())
            .with_api_prefix(server.api_prefix.clone());
        Self::new(client)
    }
}

impl<T: Transport> ScheduleStore<T> {
    #[must_use]
    pub fn new(client: HttpClient<T>) -> Self {
        Self {
            client,
            schedules: HashMap::new(),
            registry: Registry::new(),
            tracker: FetchTracker::new(),
            observers: Observers::new(),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn tracker(&self) -> &FetchTracker {
        &self.tracker
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// A loaded schedule, without touching the network.
    #[must_use]
    pub fn schedule(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.get(&id)
    }

    #[must_use]
    pub fn is_cached(&self, id: ScheduleId) -> bool {
        self.schedules.contains_key(&id)
    }

    /// Return the schedule, fetching it on first use.
    ///
    /// Repeated calls for the same id return the same cached value and
    /// never hit the network again. Nothing is cached when an error is
    /// returned.
    pub fn get_schedule(&mut self, id: ScheduleId) -> Result<&Schedule, GetScheduleError> {
        if !self.schedules.contains_key(&id) {
            let schedule = self.load_schedule(id)?;
            self.schedules.insert(id, schedule);
            self.observers
                .notify(&StoreEvent::ScheduleLoaded { schedule: id });
        }
        self.schedules
            .get(&id)
            .ok_or(GetScheduleError::ScheduleNotFound(id))
    }

    fn load_schedule(&mut self, id: ScheduleId) -> Result<Schedule, GetScheduleError> {
        let data = match self.client.get(&format!("/schedules/{id}"))? {
            Response::Ok { data, .. } => data,
            Response::Err {
                status_code: 404, ..
            } => {
                debug!(schedule = %id, "schedule not found");
                return Err(GetScheduleError::ScheduleNotFound(id));
            }
            Response::Err { status_code, error } => {
                warn!(schedule = %id, status_code, "schedule fetch failed");
                return Err(GetScheduleError::ServerError {
                    status: status_code,
                    body: error,
                });
            }
        };

        let payload: SchedulePayload = data.into_json().map_err(GetScheduleError::Decode)?;
        if payload.id != id {
            return Err(GetScheduleError::Decode(format!(
                "requested schedule {id} but server returned schedule {}",
                payload.id
            )));
        }

        let (schedule, members, shift_types) = payload.into_parts();
        let (member_count, shift_type_count) = (members.len(), shift_types.len());
        for member in members {
            self.registry.register_member(member);
        }
        for shift_type in shift_types {
            self.registry.register_shift_type(shift_type);
        }
        self.tracker.track(id);

        info!(
            schedule = %id,
            members = member_count,
            shift_types = shift_type_count,
            "schedule loaded"
        );
        Ok(schedule)
    }

    /// Fetch the shifts on the given dates and merge them into the
    /// schedule's original view.
    ///
    /// Merging is additive. After a successful call every `(date, shift
    /// type)` slot of the requested dates is present in `original_shifts`,
    /// empty if nobody works it. An empty date list is a no-op.
    pub fn fetch_shifts(
        &mut self,
        schedule: ScheduleId,
        dates: &[NaiveDate],
    ) -> Result<(), StoreError> {
        self.ensure_loaded(schedule)?;
        if dates.is_empty() {
            return Ok(());
        }
        self.fetch_query(schedule, &ShiftQuery::Dates(dates.to_vec()))
    }

    /// Like [`fetch_shifts`](Self::fetch_shifts), but dates requested
    /// through this method before are skipped. Dates are marked before the
    /// request goes out and stay marked even if it fails.
    pub fn fetch_shifts_cached(
        &mut self,
        schedule: ScheduleId,
        dates: &[NaiveDate],
    ) -> Result<(), StoreError> {
        self.ensure_loaded(schedule)?;
        let claimed = self.tracker.claim_unfetched(schedule, dates);
        if claimed.is_empty() {
            debug!(schedule = %schedule, requested = dates.len(), "all dates already fetched");
            return Ok(());
        }
        self.fetch_shifts(schedule, &claimed)
    }

    /// Fetch shifts with the server's inclusive `minDate`/`maxDate` filter.
    /// Does not consult or update the fetch tracker. Closed ranges wider
    /// than [`MAX_RANGE_DAYS`] are refused before any request is sent.
    pub fn fetch_shifts_between(
        &mut self,
        schedule: ScheduleId,
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        self.ensure_loaded(schedule)?;
        let query = ShiftQuery::Range { min, max };
        match (min, max, query.span_days()) {
            (Some(min), Some(max), Some(days)) if days > MAX_RANGE_DAYS => {
                return Err(StoreError::RangeTooWide {
                    min,
                    max,
                    days,
                    limit: MAX_RANGE_DAYS,
                });
            }
            _ => {}
        }
        self.fetch_query(schedule, &query)
    }

    fn fetch_query(&mut self, schedule: ScheduleId, query: &ShiftQuery) -> Result<(), StoreError> {
        let rows = match self.request_shifts(schedule, query) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(schedule = %schedule, error = %err, "fetching shifts failed");
                self.observers.notify(&StoreEvent::ShiftFetchFailed {
                    schedule,
                    query: query.clone(),
                    error: err.to_string(),
                });
                return Err(err);
            }
        };
        self.merge_rows(schedule, query, &rows)
    }

    fn request_shifts(
        &self,
        schedule: ScheduleId,
        query: &ShiftQuery,
    ) -> Result<Vec<ShiftRow>, StoreError> {
        match self.client.get(&query.path_for(schedule))? {
            Response::Ok { data, .. } => data.into_json().map_err(StoreError::Decode),
            Response::Err { status_code, error } => Err(StoreError::Rejected {
                status: status_code,
                body: error,
            }),
        }
    }

    fn merge_rows(
        &mut self,
        schedule: ScheduleId,
        query: &ShiftQuery,
        rows: &[ShiftRow],
    ) -> Result<(), StoreError> {
        if let Some(row) = rows
            .iter()
            .find(|row| !self.registry.contains_member(row.member_id))
        {
            error!(
                schedule = %schedule,
                member = %row.member_id,
                slot = %row.slot(),
                "shift row references a member that was never registered"
            );
            return Err(StoreError::UnknownMember(row.member_id));
        }

        let target = self
            .schedules
            .get_mut(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;

        let mut merged = BTreeSet::new();
        let shift_types = target.shift_types().to_vec();
        for date in query.covered_dates() {
            for shift_type in &shift_types {
                let slot = SlotKey::new(date, *shift_type);
                target.ensure_fetched(slot);
                merged.insert(slot);
            }
        }

        let mut foreign = 0_usize;
        for row in rows {
            if row.schedule_id != schedule {
                foreign += 1;
                continue;
            }
            target.merge_original(row.slot(), row.member_id);
            merged.insert(row.slot());
        }
        if foreign > 0 {
            warn!(schedule = %schedule, foreign, "ignored shift rows for another schedule");
        }

        let mut settled = 0_usize;
        for slot in &merged {
            if target.is_dirty(slot) && !target.settle_edit(slot) {
                settled += 1;
            }
        }
        if settled > 0 {
            debug!(schedule = %schedule, settled, "pending edits now match server state");
        }

        debug!(schedule = %schedule, rows = rows.len(), slots = merged.len(), "merged shifts");
        self.observers.notify(&StoreEvent::ShiftsMerged {
            schedule,
            slots: merged.into_iter().collect(),
        });
        Ok(())
    }

    /// Create a member on the server and add it to the schedule.
    ///
    /// Local state is only touched once the server has accepted the member.
    pub fn add_member(
        &mut self,
        schedule: ScheduleId,
        info: &NewMember,
    ) -> Result<MemberId, StoreError> {
        self.ensure_loaded(schedule)?;

        let data = match self
            .client
            .post(&format!("/schedules/{schedule}/members"), info)?
        {
            Response::Ok { data, .. } => data,
            Response::Err { status_code, error } => {
                warn!(schedule = %schedule, status_code, "adding member rejected");
                return Err(StoreError::Rejected {
                    status: status_code,
                    body: error,
                });
            }
        };
        let created: CreatedMember = data.into_json().map_err(StoreError::Decode)?;
        let id = created.member_id;

        self.registry.register_member(Member {
            id,
            name: info.name.clone(),
        });
        if let Some(target) = self.schedules.get_mut(&schedule) {
            target.push_member(id);
        }

        info!(schedule = %schedule, member = %id, "member added");
        self.observers.notify(&StoreEvent::MemberAdded {
            schedule,
            member: id,
        });
        Ok(id)
    }

    /// Apply a local edit to one slot and return whether it is dirty
    /// afterwards. Never touches the network or the original view.
    pub fn modify_shift(
        &mut self,
        schedule: ScheduleId,
        slot: SlotKey,
        action: ShiftAction,
        member: MemberId,
    ) -> Result<bool, StoreError> {
        let target = self
            .schedules
            .get_mut(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        if !self.registry.contains_member(member) {
            return Err(StoreError::UnknownMember(member));
        }

        let dirty = target.modify_shift(slot, action, member);
        debug!(schedule = %schedule, slot = %slot, ?action, member = %member, dirty, "slot edited");
        self.observers.notify(&StoreEvent::SlotEdited {
            schedule,
            slot,
            dirty,
        });
        Ok(dirty)
    }

    /// Send every dirty slot to the server. On success the submitted
    /// assignments become the original view and the schedule is clean.
    /// Returns the number of slots submitted.
    pub fn submit_edits(&mut self, schedule: ScheduleId) -> Result<usize, StoreError> {
        let target = self
            .schedules
            .get(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        let edits = target.edit_payload();
        if edits.is_empty() {
            return Ok(0);
        }
        let slots: Vec<SlotKey> = target.dirty_slots().copied().collect();

        let body = SubmitShifts { shifts: &edits };
        if let Response::Err { status_code, error } = self
            .client
            .put(&format!("/schedules/{schedule}/shifts"), &body)?
        {
            warn!(schedule = %schedule, status_code, "submitting edits rejected");
            return Err(StoreError::Rejected {
                status: status_code,
                body: error,
            });
        }

        let target = self
            .schedules
            .get_mut(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        target.commit_edits(&slots);

        info!(schedule = %schedule, slots = slots.len(), "edits submitted");
        let count = slots.len();
        self.observers
            .notify(&StoreEvent::EditsSubmitted { schedule, slots });
        Ok(count)
    }

    /// Throw away every pending edit. Returns the number of slots reset.
    pub fn discard_edits(&mut self, schedule: ScheduleId) -> Result<usize, StoreError> {
        let target = self
            .schedules
            .get_mut(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        let slots = target.discard_edits();
        let count = slots.len();
        if count > 0 {
            self.observers
                .notify(&StoreEvent::EditsDiscarded { schedule, slots });
        }
        Ok(count)
    }

    /// Rename a member locally. Every schedule listing the member sees the
    /// new name. Returns the previous name.
    pub fn rename_member(
        &mut self,
        member: MemberId,
        name: impl Into<String>,
    ) -> Result<String, StoreError> {
        let previous = self
            .registry
            .rename_member(member, name)
            .ok_or(StoreError::UnknownMember(member))?;
        self.observers
            .notify(&StoreEvent::MemberRenamed { member });
        Ok(previous)
    }

    /// Members of a schedule in schedule order, resolved through the registry.
    pub fn members_of(&self, schedule: ScheduleId) -> Result<Vec<&Member>, StoreError> {
        let target = self
            .schedules
            .get(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        Ok(target
            .members()
            .iter()
            .filter_map(|id| self.registry.member(*id))
            .collect())
    }

    pub fn shift_types_of(&self, schedule: ScheduleId) -> Result<Vec<&ShiftType>, StoreError> {
        let target = self
            .schedules
            .get(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        Ok(target
            .shift_types()
            .iter()
            .filter_map(|id| self.registry.shift_type(*id))
            .collect())
    }

    /// The members the user currently sees on a slot (pending edit if
    /// dirty, otherwise server state).
    pub fn assigned_members(
        &self,
        schedule: ScheduleId,
        slot: &SlotKey,
    ) -> Result<Vec<&Member>, StoreError> {
        let target = self
            .schedules
            .get(&schedule)
            .ok_or(StoreError::UnknownSchedule(schedule))?;
        let empty = Assignment::new();
        Ok(target
            .assigned(slot)
            .unwrap_or(&empty)
            .iter()
            .filter_map(|id| self.registry.member(*id))
            .collect())
    }

    fn ensure_loaded(&self, schedule: ScheduleId) -> Result<(), StoreError> {
        if self.schedules.contains_key(&schedule) {
            Ok(())
        } else {
            Err(StoreError::UnknownSchedule(schedule))
        }
    }
}
