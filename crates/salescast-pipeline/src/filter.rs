//! Partition filtering and whole-dataset aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use salescast_core::{EventTable, PartitionKey, PipelineError, SalesTable, SeriesPoint};
use serde::Serialize;

/// Which series to extract from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeriesSelection {
    Partition { store: u32, dept: u32 },
    /// Sum every row per date.
    Aggregate,
}

impl SeriesSelection {
    #[must_use]
    pub fn partition(key: PartitionKey) -> Self {
        Self::Partition {
            store: key.store,
            dept: key.dept,
        }
    }
}

/// One value per date, ascending, plus the dates flagged as events.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSeries {
    pub points: Vec<SeriesPoint>,
    pub events: EventTable,
}

/// Narrow `table` to `selection`, summing rows that share a date.
///
/// A date counts as an event when any contributing row is flagged.
///
/// # Errors
///
/// - [`PipelineError::PartitionNotFound`] when no row matches the partition.
/// - [`PipelineError::InvalidRequest`] when a partition is requested from a
///   table without partition columns.
/// - [`PipelineError::DataUnavailable`] when aggregating an empty table.
pub fn select_series(
    table: &SalesTable,
    selection: SeriesSelection,
) -> Result<FilteredSeries, PipelineError> {
    let by_date = match selection {
        SeriesSelection::Partition { store, dept } => {
            if !table.has_partitions() {
                return Err(PipelineError::InvalidRequest(
                    "this dataset has no store/department columns".to_string(),
                ));
            }
            let key = PartitionKey::new(store, dept);
            let grouped = group_by_date(
                table
                    .records()
                    .iter()
                    .filter(|r| r.partition == Some(key))
                    .map(|r| (r.date, r.value, r.is_event)),
            );
            if grouped.is_empty() {
                return Err(PipelineError::PartitionNotFound { store, dept });
            }
            grouped
        }
        SeriesSelection::Aggregate => {
            let grouped = group_by_date(
                table
                    .records()
                    .iter()
                    .map(|r| (r.date, r.value, r.is_event)),
            );
            if grouped.is_empty() {
                return Err(PipelineError::DataUnavailable(
                    "sales table is empty".to_string(),
                ));
            }
            grouped
        }
    };

    let mut points = Vec::with_capacity(by_date.len());
    let mut event_dates = Vec::new();
    for (date, (total, is_event)) in by_date {
        let value = total.to_f64().ok_or_else(|| {
            PipelineError::DataUnavailable(format!("sales total on {date} is out of range"))
        })?;
        points.push(SeriesPoint::new(date, value));
        if is_event && table.has_events() {
            event_dates.push(date);
        }
    }

    Ok(FilteredSeries {
        points,
        events: EventTable::from_dates(event_dates),
    })
}

fn group_by_date(
    rows: impl Iterator<Item = (NaiveDate, Decimal, bool)>,
) -> BTreeMap<NaiveDate, (Decimal, bool)> {
    let mut grouped: BTreeMap<NaiveDate, (Decimal, bool)> = BTreeMap::new();
    for (date, value, is_event) in rows {
        let entry = grouped.entry(date).or_insert((Decimal::ZERO, false));
        entry.0 += value;
        entry.1 |= is_event;
    }
    grouped
}

#[cfg(test)]
mod tests {
    use salescast_core::HistoricalRecord;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(key: Option<(u32, u32)>, day: u32, cents: i64, is_event: bool) -> HistoricalRecord {
        HistoricalRecord {
            partition: key.map(|(s, d)| PartitionKey::new(s, d)),
            date: date(day),
            value: Decimal::new(cents, 2),
            is_event,
        }
    }

    fn partitioned_table() -> SalesTable {
        SalesTable::new(
            vec![
                row(Some((1, 1)), 8, 20_000, false),
                row(Some((1, 1)), 1, 10_000, true),
                row(Some((1, 2)), 1, 5_000, false),
                row(Some((2, 1)), 8, 7_500, true),
            ],
            true,
            true,
        )
    }

    #[test]
    fn partition_selects_matching_rows_in_date_order() {
        let filtered =
            select_series(&partitioned_table(), SeriesSelection::Partition { store: 1, dept: 1 })
                .unwrap();
        assert_eq!(
            filtered.points,
            vec![SeriesPoint::new(date(1), 100.0), SeriesPoint::new(date(8), 200.0)]
        );
        assert_eq!(filtered.events.dates(), &[date(1)]);
    }

    #[test]
    fn absent_partition_is_not_found() {
        let err = select_series(
            &partitioned_table(),
            SeriesSelection::Partition { store: 9, dept: 9 },
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::PartitionNotFound { store: 9, dept: 9 });
    }

    #[test]
    fn partition_on_unpartitioned_table_is_invalid() {
        let table = SalesTable::new(vec![row(None, 1, 100, false)], false, false);
        let err =
            select_series(&table, SeriesSelection::Partition { store: 1, dept: 1 }).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }

    #[test]
    fn aggregate_sums_per_date_and_merges_events() {
        let filtered = select_series(&partitioned_table(), SeriesSelection::Aggregate).unwrap();
        assert_eq!(
            filtered.points,
            vec![SeriesPoint::new(date(1), 150.0), SeriesPoint::new(date(8), 275.0)]
        );
        assert_eq!(filtered.events.dates(), &[date(1), date(8)]);
    }

    #[test]
    fn duplicate_partition_dates_are_summed() {
        let table = SalesTable::new(
            vec![
                row(Some((1, 1)), 1, 1_000, false),
                row(Some((1, 1)), 1, 2_500, false),
            ],
            true,
            false,
        );
        let filtered =
            select_series(&table, SeriesSelection::Partition { store: 1, dept: 1 }).unwrap();
        assert_eq!(filtered.points, vec![SeriesPoint::new(date(1), 35.0)]);
    }

    #[test]
    fn aggregate_daily_scenario() {
        let table = SalesTable::new(
            vec![
                row(None, 1, 10_000, false),
                row(None, 2, 20_000, false),
                row(None, 3, 15_000, false),
                row(None, 4, 30_000, false),
            ],
            false,
            false,
        );
        let filtered = select_series(&table, SeriesSelection::Aggregate).unwrap();
        let values: Vec<f64> = filtered.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 200.0, 150.0, 300.0]);
        assert!(filtered.events.is_empty());
    }

    #[test]
    fn aggregate_of_empty_table_is_data_unavailable() {
        let err = select_series(&SalesTable::default(), SeriesSelection::Aggregate).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(_)));
    }
}
