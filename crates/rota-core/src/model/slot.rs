//! Slot keys and shift rows.
//!
//! A slot is one assignable shift instance: a calendar date paired with a
//! shift type. Slot keys order by date first, so a `BTreeMap<SlotKey, _>`
//! iterates a schedule chronologically.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::member::{MemberId, ShiftTypeId};
use super::schedule::ScheduleId;

/// Canonical `(date, shift type)` key addressing "who works this shift".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub date: NaiveDate,
    pub shift_type_id: ShiftTypeId,
}

impl SlotKey {
    #[must_use]
    pub const fn new(date: NaiveDate, shift_type_id: ShiftTypeId) -> Self {
        Self {
            date,
            shift_type_id,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.date.format("%Y-%m-%d"), self.shift_type_id)
    }
}

/// Error parsing a `YYYY-MM-DD#<shift type id>` slot key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot key {input:?}: expected YYYY-MM-DD#<shift type id>")]
pub struct ParseSlotKeyError {
    pub input: String,
}

impl FromStr for SlotKey {
    type Err = ParseSlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSlotKeyError {
            input: s.to_string(),
        };
        let (date, shift_type) = s.split_once('#').ok_or_else(err)?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| err())?;
        let shift_type = shift_type.parse::<u64>().map_err(|_| err())?;
        Ok(Self::new(date, ShiftTypeId(shift_type)))
    }
}

/// One assignment row from `GET /schedules/:id/shifts`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRow {
    pub schedule_id: ScheduleId,
    pub shift_type_id: ShiftTypeId,
    pub member_id: MemberId,
    #[serde(deserialize_with = "deserialize_shift_date")]
    pub date: NaiveDate,
}

impl ShiftRow {
    #[must_use]
    pub const fn slot(&self) -> SlotKey {
        SlotKey::new(self.date, self.shift_type_id)
    }
}

/// Parse a shift date that is either a plain ISO date or a full RFC 3339
/// timestamp. Timestamps keep the calendar date of their own offset.
#[must_use]
pub fn parse_shift_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.date_naive())
        })
}

fn deserialize_shift_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_shift_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid shift date: {raw:?}")))
}

/// Every calendar date from `min` through `max`, inclusive. Empty when
/// `min > max`.
#[must_use]
pub fn dates_between(min: NaiveDate, max: NaiveDate) -> Vec<NaiveDate> {
    min.iter_days().take_while(|d| *d <= max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn slot_keys_order_by_date_then_shift_type() {
        let a = SlotKey::new(date(2024, 1, 1), ShiftTypeId(9));
        let b = SlotKey::new(date(2024, 1, 2), ShiftTypeId(1));
        let c = SlotKey::new(date(2024, 1, 2), ShiftTypeId(3));
        let mut keys = vec![c, a, b];
        keys.sort();
        assert_eq!(keys, vec![a, b, c]);
    }

    #[test]
    fn slot_key_display_parses_back() {
        let key = SlotKey::new(date(2024, 1, 1), ShiftTypeId(5));
        assert_eq!(key.to_string(), "2024-01-01#5");
        assert_eq!("2024-01-01#5".parse::<SlotKey>(), Ok(key));
    }

    #[test]
    fn malformed_slot_keys_are_rejected() {
        for raw in ["2024-01-01", "2024-13-01#5", "2024-01-01#x", "#5", ""] {
            assert!(raw.parse::<SlotKey>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn shift_row_accepts_plain_dates() {
        let row: ShiftRow = serde_json::from_value(json!({
            "scheduleId": 1, "shiftTypeId": 5, "memberId": 10, "date": "2024-01-01"
        }))
        .expect("decode");
        assert_eq!(row.slot(), SlotKey::new(date(2024, 1, 1), ShiftTypeId(5)));
        assert_eq!(row.member_id, MemberId(10));
    }

    #[test]
    fn shift_row_timestamps_keep_their_local_date() {
        let row: ShiftRow = serde_json::from_value(json!({
            "scheduleId": 1, "shiftTypeId": 5, "memberId": 10,
            "date": "2024-01-01T23:30:00.000-05:00"
        }))
        .expect("decode");
        assert_eq!(row.date, date(2024, 1, 1));
    }

    #[test]
    fn shift_row_rejects_garbage_dates() {
        let result: Result<ShiftRow, _> = serde_json::from_value(json!({
            "scheduleId": 1, "shiftTypeId": 5, "memberId": 10, "date": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn dates_between_is_inclusive() {
        let days = dates_between(date(2024, 2, 27), date(2024, 3, 1));
        assert_eq!(
            days,
            vec![date(2024, 2, 27), date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
        assert!(dates_between(date(2024, 3, 2), date(2024, 3, 1)).is_empty());
        assert_eq!(dates_between(date(2024, 3, 1), date(2024, 3, 1)).len(), 1);
    }
}
