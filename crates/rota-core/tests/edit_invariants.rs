//! Property tests for the original/edited reconciliation.
//!
//! After any sequence of edits, a slot is dirty exactly when its edited
//! assignment differs from the server's, and the server view never moves.

use chrono::NaiveDate;
use proptest::prelude::*;
use rota_core::http::HttpClient;
use rota_core::testing::ScriptedTransport;
use rota_core::{MemberId, ScheduleId, ScheduleStore, ShiftAction, ShiftTypeId, SlotKey};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

const SCHEDULE: ScheduleId = ScheduleId(1);
const MEMBERS: u64 = 4;
const SHIFT_TYPES: u64 = 2;
const DAYS: u32 = 3;

fn slot(day: u32, shift_type: u64) -> SlotKey {
    SlotKey::new(
        NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date"),
        ShiftTypeId(shift_type),
    )
}

fn schedule_json() -> serde_json::Value {
    let members: Vec<_> = (0..MEMBERS)
        .map(|id| json!({"id": id, "name": format!("m{id}")}))
        .collect();
    let shift_types: Vec<_> = (0..SHIFT_TYPES).map(|id| json!({"id": id})).collect();
    json!({"id": 1, "members": members, "shiftTypes": shift_types})
}

/// Server rows for the assignments that fall on the first `fetched_days` days.
fn rows_json(assignments: &[(u32, u64, u64)], fetched_days: u32) -> serde_json::Value {
    let rows: Vec<_> = assignments
        .iter()
        .filter(|(day, _, _)| *day <= fetched_days)
        .map(|(day, shift_type, member)| {
            json!({
                "scheduleId": 1,
                "shiftTypeId": shift_type,
                "memberId": member,
                "date": format!("2024-03-{day:02}"),
            })
        })
        .collect();
    json!(rows)
}

fn first_days(count: u32) -> Vec<NaiveDate> {
    (1..=count)
        .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date"))
        .collect()
}

/// Store with one schedule whose first `fetched_days` days were fetched
/// with the given server assignments.
fn store_with(
    assignments: &[(u32, u64, u64)],
    fetched_days: u32,
) -> ScheduleStore<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    transport.push_json(200, schedule_json());
    transport.push_json(200, rows_json(assignments, fetched_days));

    let mut store = ScheduleStore::new(HttpClient::new(transport, "http://rota.test"));
    store.get_schedule(SCHEDULE).expect("load");
    store
        .fetch_shifts(SCHEDULE, &first_days(fetched_days))
        .expect("fetch");
    store
}

fn arb_assignment() -> impl Strategy<Value = (u32, u64, u64)> {
    (1..=DAYS, 0..SHIFT_TYPES, 0..MEMBERS)
}

fn arb_edit() -> impl Strategy<Value = (u32, u64, bool, u64)> {
    (1..=DAYS, 0..SHIFT_TYPES, any::<bool>(), 0..MEMBERS)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn dirty_iff_edited_differs_from_original(
        assignments in prop::collection::vec(arb_assignment(), 0..12),
        fetched_days in 0..=DAYS,
        edits in prop::collection::vec(arb_edit(), 1..40),
    ) {
        let mut store = store_with(&assignments, fetched_days);
        let original_before = store
            .schedule(SCHEDULE)
            .expect("cached")
            .original_shifts()
            .clone();

        // Model: the assignment the user should currently see per slot.
        let mut model: BTreeMap<SlotKey, BTreeSet<MemberId>> = BTreeMap::new();

        for (day, shift_type, add, member) in edits {
            let key = slot(day, shift_type);
            let member = MemberId(member);
            let action = if add { ShiftAction::Add } else { ShiftAction::Remove };

            let expected = model
                .entry(key)
                .or_insert_with(|| original_before.get(&key).cloned().unwrap_or_default());
            if add {
                expected.insert(member);
            } else {
                expected.remove(&member);
            }
            let original = original_before.get(&key).cloned().unwrap_or_default();
            let should_be_dirty = *expected != original;

            let dirty = store
                .modify_shift(SCHEDULE, key, action, member)
                .expect("edit");
            prop_assert_eq!(dirty, should_be_dirty);

            let schedule = store.schedule(SCHEDULE).expect("cached");
            prop_assert_eq!(schedule.is_dirty(&key), should_be_dirty);
            if should_be_dirty {
                prop_assert_eq!(schedule.edited_shifts().get(&key), Some(&*expected));
            }
        }

        let schedule = store.schedule(SCHEDULE).expect("cached");
        prop_assert_eq!(schedule.original_shifts(), &original_before);
        for (key, edited) in schedule.edited_shifts() {
            let original = original_before.get(key).cloned().unwrap_or_default();
            prop_assert_ne!(edited, &original);
        }
    }

    #[test]
    fn fetching_after_editing_keeps_only_real_differences(
        assignments in prop::collection::vec(arb_assignment(), 0..12),
        edits in prop::collection::vec(arb_edit(), 1..30),
    ) {
        let transport = ScriptedTransport::new();
        transport.push_json(200, schedule_json());
        let mut store = ScheduleStore::new(HttpClient::new(transport.clone(), "http://rota.test"));
        store.get_schedule(SCHEDULE).expect("load");

        for (day, shift_type, add, member) in edits {
            let action = if add { ShiftAction::Add } else { ShiftAction::Remove };
            store
                .modify_shift(SCHEDULE, slot(day, shift_type), action, MemberId(member))
                .expect("edit");
        }
        let pending = store
            .schedule(SCHEDULE)
            .expect("cached")
            .edited_shifts()
            .clone();

        transport.push_json(200, rows_json(&assignments, DAYS));
        store.fetch_shifts(SCHEDULE, &first_days(DAYS)).expect("fetch");

        let schedule = store.schedule(SCHEDULE).expect("cached");
        for day in 1..=DAYS {
            for shift_type in 0..SHIFT_TYPES {
                let key = slot(day, shift_type);
                let original = schedule.original_shifts().get(&key).expect("fetched");
                let visible = pending.get(&key).unwrap_or(original);
                prop_assert_eq!(schedule.is_dirty(&key), visible != original);
                prop_assert_eq!(schedule.assigned(&key), Some(visible));
            }
        }
    }

    #[test]
    fn fetched_days_have_every_slot_present(
        assignments in prop::collection::vec(arb_assignment(), 0..12),
        fetched_days in 0..=DAYS,
    ) {
        let store = store_with(&assignments, fetched_days);
        let schedule = store.schedule(SCHEDULE).expect("cached");
        for day in 1..=DAYS {
            for shift_type in 0..SHIFT_TYPES {
                prop_assert_eq!(
                    schedule.is_fetched(&slot(day, shift_type)),
                    day <= fetched_days
                );
            }
        }
    }
}
