use chrono::NaiveDate;

/// Widest closed range, in days, that a range fetch may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// The two ways the shift listing endpoint can be filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftQuery {
    /// Explicit dates, sent as repeated `dates[]` parameters.
    Dates(Vec<NaiveDate>),
    /// Inclusive bounds, sent as `minDate` / `maxDate`. Either may be open.
    Range {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
}

impl ShiftQuery {
    /// Encode as a query string without the leading `?`. Brackets are
    /// percent-encoded the way browsers encode form parameters.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<(&str, NaiveDate)> = match self {
            Self::Dates(dates) => dates.iter().map(|d| ("dates%5B%5D", *d)).collect(),
            Self::Range { min, max } => min
                .map(|d| ("minDate", d))
                .into_iter()
                .chain(max.map(|d| ("maxDate", d)))
                .collect(),
        };

        pairs
            .iter()
            .map(|(key, date)| format!("{key}={}", date.format("%Y-%m-%d")))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Dates whose every slot is known once this query has been answered.
    /// Open-ended ranges cover nothing.
    #[must_use]
    pub fn covered_dates(&self) -> Vec<NaiveDate> {
        match self {
            Self::Dates(dates) => dates.clone(),
            Self::Range {
                min: Some(min),
                max: Some(max),
            } => crate::model::slot::dates_between(*min, *max),
            Self::Range { .. } => Vec::new(),
        }
    }

    /// Number of days a closed range spans, inclusive. `None` when either
    /// bound is open or for explicit date lists.
    #[must_use]
    pub fn span_days(&self) -> Option<i64> {
        match self {
            Self::Range {
                min: Some(min),
                max: Some(max),
            } => Some((*max - *min).num_days() + 1),
            _ => None,
        }
    }

    /// Path for the shift listing of a schedule with this query applied.
    #[must_use]
    pub fn path_for(&self, schedule: impl std::fmt::Display) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            format!("/schedules/{schedule}/shifts")
        } else {
            format!("/schedules/{schedule}/shifts?{query}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date")
    }

    #[test]
    fn dates_repeat_the_bracketed_key() {
        let query = ShiftQuery::Dates(vec![date(1), date(2)]);
        assert_eq!(
            query.to_query_string(),
            "dates%5B%5D=2024-01-01&dates%5B%5D=2024-01-02"
        );
    }

    #[test]
    fn span_counts_both_ends() {
        let week = ShiftQuery::Range {
            min: Some(date(1)),
            max: Some(date(7)),
        };
        assert_eq!(week.span_days(), Some(7));
        let open = ShiftQuery::Range {
            min: Some(date(1)),
            max: None,
        };
        assert_eq!(open.span_days(), None);
        assert_eq!(ShiftQuery::Dates(vec![date(1)]).span_days(), None);
    }

    #[test]
    fn range_bounds_are_optional() {
        let both = ShiftQuery::Range {
            min: Some(date(1)),
            max: Some(date(7)),
        };
        assert_eq!(both.to_query_string(), "minDate=2024-01-01&maxDate=2024-01-07");

        let open_start = ShiftQuery::Range {
            min: None,
            max: Some(date(7)),
        };
        assert_eq!(open_start.to_query_string(), "maxDate=2024-01-07");
    }

    #[test]
    fn covered_dates_need_closed_ranges() {
        let closed = ShiftQuery::Range {
            min: Some(date(1)),
            max: Some(date(3)),
        };
        assert_eq!(closed.covered_dates(), vec![date(1), date(2), date(3)]);

        let open = ShiftQuery::Range {
            min: Some(date(1)),
            max: None,
        };
        assert!(open.covered_dates().is_empty());
    }

    #[test]
    fn empty_query_has_no_question_mark() {
        let query = ShiftQuery::Range {
            min: None,
            max: None,
        };
        assert_eq!(query.path_for(3), "/schedules/3/shifts");
        assert_eq!(
            ShiftQuery::Dates(vec![date(1)]).path_for(3),
            "/schedules/3/shifts?dates%5B%5D=2024-01-01"
        );
    }
}
