//! Per-schedule record of which dates have already been requested.
//!
//! Dates are claimed before the network call is issued, so overlapping
//! requests never fetch the same date twice. The record only grows.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::model::ScheduleId;

#[derive(Debug, Default, Clone)]
pub struct FetchTracker {
    fetched: HashMap<ScheduleId, BTreeSet<NaiveDate>>,
}

impl FetchTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a schedule with an empty date set. A schedule that is
    /// already tracked keeps its dates.
    pub fn track(&mut self, schedule: ScheduleId) {
        self.fetched.entry(schedule).or_default();
    }

    #[must_use]
    pub fn is_tracked(&self, schedule: ScheduleId) -> bool {
        self.fetched.contains_key(&schedule)
    }

    #[must_use]
    pub fn has_fetched(&self, schedule: ScheduleId, date: NaiveDate) -> bool {
        self.fetched
            .get(&schedule)
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Returns `true` if the date was not marked before.
    pub fn mark_fetched(&mut self, schedule: ScheduleId, date: NaiveDate) -> bool {
        self.fetched.entry(schedule).or_default().insert(date)
    }

    /// Filter `dates` down to those never requested for this schedule and
    /// mark them as requested. Duplicates within `dates` are claimed once.
    /// Input order is preserved.
    pub fn claim_unfetched(&mut self, schedule: ScheduleId, dates: &[NaiveDate]) -> Vec<NaiveDate> {
        let fetched = self.fetched.entry(schedule).or_default();
        dates
            .iter()
            .copied()
            .filter(|date| fetched.insert(*date))
            .collect()
    }

    /// Number of dates requested for this schedule so far.
    #[must_use]
    pub fn fetched_count(&self, schedule: ScheduleId) -> usize {
        self.fetched.get(&schedule).map_or(0, BTreeSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date")
    }

    #[test]
    fn claim_filters_already_fetched_dates() {
        let mut tracker = FetchTracker::new();
        let schedule = ScheduleId(1);
        tracker.track(schedule);

        assert_eq!(
            tracker.claim_unfetched(schedule, &[date(1), date(2)]),
            vec![date(1), date(2)]
        );
        assert_eq!(
            tracker.claim_unfetched(schedule, &[date(2), date(3), date(1)]),
            vec![date(3)]
        );
        assert!(tracker.claim_unfetched(schedule, &[date(3)]).is_empty());
        assert_eq!(tracker.fetched_count(schedule), 3);
    }

    #[test]
    fn duplicate_input_dates_are_claimed_once() {
        let mut tracker = FetchTracker::new();
        let claimed = tracker.claim_unfetched(ScheduleId(1), &[date(4), date(4), date(5)]);
        assert_eq!(claimed, vec![date(4), date(5)]);
    }

    #[test]
    fn schedules_are_tracked_independently() {
        let mut tracker = FetchTracker::new();
        assert!(tracker.mark_fetched(ScheduleId(1), date(1)));
        assert!(!tracker.mark_fetched(ScheduleId(1), date(1)));

        assert!(tracker.has_fetched(ScheduleId(1), date(1)));
        assert!(!tracker.has_fetched(ScheduleId(2), date(1)));
        assert!(!tracker.is_tracked(ScheduleId(2)));
    }

    #[test]
    fn track_keeps_existing_dates() {
        let mut tracker = FetchTracker::new();
        tracker.mark_fetched(ScheduleId(1), date(1));
        tracker.track(ScheduleId(1));
        assert!(tracker.has_fetched(ScheduleId(1), date(1)));
    }
}
