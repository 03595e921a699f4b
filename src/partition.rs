//! Calendar-day partitioning of the normalized series.
//!
//! Dates are local to the deployment, expressed as a fixed UTC offset so
//! that grouping does not depend on the host's time zone.

use std::collections::BTreeSet;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::models::NormalizedReading;
use crate::series::Series;

// ---

/// Maps timestamps to local calendar dates.
#[derive(Debug, Clone, Copy)]
pub struct DayPartitioner {
    offset: FixedOffset,
}

impl DayPartitioner {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Partitioner for an offset in minutes east of UTC (negative = west).
    /// Out-of-range offsets fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        // ---
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("UTC offset of {} minutes is out of range, using UTC", minutes);
                Utc.fix()
            });
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn local_date(&self, reading: &NormalizedReading) -> NaiveDate {
        reading.timestamp.with_timezone(&self.offset).date_naive()
    }

    /// Distinct local dates present in the series.
    pub fn available_dates(&self, series: &Series) -> BTreeSet<NaiveDate> {
        series.descending().iter().map(|r| self.local_date(r)).collect()
    }

    /// Local date of the most recent reading.
    pub fn latest_date(&self, series: &Series) -> Option<NaiveDate> {
        series.latest().map(|r| self.local_date(r))
    }

    /// Readings on `date`, oldest first.
    pub fn readings_on<'a>(&self, series: &'a Series, date: NaiveDate) -> Vec<&'a NormalizedReading> {
        // ---
        series
            .ascending()
            .skip_while(|r| self.local_date(r) < date)
            .take_while(|r| self.local_date(r) == date)
            .collect()
    }
}

/// Rejected date selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no readings on {0}")]
    UnknownDate(NaiveDate),
}

/// The user's selected day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSelection {
    selected: Option<NaiveDate>,
}

impl DateSelection {
    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Apply the default-selection rule after a new series arrives.
    ///
    /// The first non-empty series selects its latest date. Later fetches
    /// keep the current selection unless that date has disappeared.
    pub fn reconcile(&mut self, available: &BTreeSet<NaiveDate>, latest: Option<NaiveDate>) {
        // ---
        match self.selected {
            Some(current) if available.contains(&current) => {}
            _ => {
                if self.selected != latest {
                    tracing::debug!("Date selection {:?} -> {:?}", self.selected, latest);
                }
                self.selected = latest;
            }
        }
    }

    /// Select `date` if the series has readings on it.
    pub fn select(
        &mut self,
        date: NaiveDate,
        available: &BTreeSet<NaiveDate>,
    ) -> Result<(), SelectionError> {
        // ---
        if !available.contains(&date) {
            return Err(SelectionError::UnknownDate(date));
        }
        self.selected = Some(date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::series::build_series;
    use serde_json::{json, Value};

    fn series(times: &[&str]) -> Series {
        // ---
        let records: Vec<_> = times
            .iter()
            .filter_map(|t| match json!({"created_at": t, "temp": 20}) {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        build_series(&records)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_available_dates_and_default() {
        // ---
        let s = series(&["2024-01-01T10:00:00Z", "2024-01-01T15:00:00Z", "2024-01-02T12:00:00Z"]);
        let p = DayPartitioner::from_offset_minutes(0);

        let dates = p.available_dates(&s);
        assert_eq!(dates, BTreeSet::from([date("2024-01-01"), date("2024-01-02")]));

        let mut selection = DateSelection::default();
        selection.reconcile(&dates, p.latest_date(&s));
        assert_eq!(selection.selected(), Some(date("2024-01-02")));
    }

    #[test]
    fn test_local_offset_moves_day_boundary() {
        // ---
        // 01:30Z on Jan 2 is still Jan 1 at UTC-3.
        let s = series(&["2024-01-02T01:30:00Z"]);
        let p = DayPartitioner::from_offset_minutes(-180);
        assert_eq!(p.latest_date(&s), Some(date("2024-01-01")));
    }

    #[test]
    fn test_readings_on_is_ascending_and_scoped() {
        // ---
        let s = series(&[
            "2024-01-02T12:00:00Z",
            "2024-01-01T15:00:00Z",
            "2024-01-01T10:00:00Z",
            "2023-12-31T22:00:00Z",
        ]);
        let p = DayPartitioner::from_offset_minutes(0);

        let day = p.readings_on(&s, date("2024-01-01"));
        assert_eq!(day.len(), 2);
        assert!(day[0].timestamp < day[1].timestamp);

        assert!(p.readings_on(&s, date("2024-01-05")).is_empty());
    }

    #[test]
    fn test_selection_survives_new_fetch() {
        // ---
        let p = DayPartitioner::from_offset_minutes(0);
        let first = series(&["2024-01-01T10:00:00Z", "2024-01-02T12:00:00Z"]);
        let mut selection = DateSelection::default();
        selection.reconcile(&p.available_dates(&first), p.latest_date(&first));
        selection.select(date("2024-01-01"), &p.available_dates(&first)).unwrap();

        // A newer day arrives; the user's choice still exists and is kept.
        let second = series(&["2024-01-01T10:00:00Z", "2024-01-02T12:00:00Z", "2024-01-03T08:00:00Z"]);
        selection.reconcile(&p.available_dates(&second), p.latest_date(&second));
        assert_eq!(selection.selected(), Some(date("2024-01-01")));

        // The selected day rolls out of the window; fall back to the latest.
        let third = series(&["2024-01-02T12:00:00Z", "2024-01-03T08:00:00Z"]);
        selection.reconcile(&p.available_dates(&third), p.latest_date(&third));
        assert_eq!(selection.selected(), Some(date("2024-01-03")));
    }

    #[test]
    fn test_unknown_date_is_rejected() {
        // ---
        let p = DayPartitioner::from_offset_minutes(0);
        let s = series(&["2024-01-01T10:00:00Z"]);
        let mut selection = DateSelection::default();
        let err = selection.select(date("2024-02-01"), &p.available_dates(&s));
        assert_eq!(err, Err(SelectionError::UnknownDate(date("2024-02-01"))));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_empty_series_clears_selection() {
        // ---
        let p = DayPartitioner::from_offset_minutes(0);
        let s = series(&["2024-01-01T10:00:00Z"]);
        let mut selection = DateSelection::default();
        selection.reconcile(&p.available_dates(&s), p.latest_date(&s));

        let empty = Series::default();
        selection.reconcile(&p.available_dates(&empty), p.latest_date(&empty));
        assert_eq!(selection.selected(), None);
    }
}
