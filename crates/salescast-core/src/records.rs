use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies one independent series inside a partitioned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey {
    pub store: u32,
    pub dept: u32,
}

impl PartitionKey {
    #[must_use]
    pub fn new(store: u32, dept: u32) -> Self {
        Self { store, dept }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store {} / dept {}", self.store, self.dept)
    }
}

/// One row of the source sales file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// `None` for datasets without store/department columns.
    pub partition: Option<PartitionKey>,
    pub date: NaiveDate,
    /// Observed sales, kept exact until the series is handed to a model.
    pub value: Decimal,
    /// Special-event (holiday) flag; `false` when the dataset has no such column.
    pub is_event: bool,
}

/// The full loaded sales table. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    records: Vec<HistoricalRecord>,
    has_partitions: bool,
    has_events: bool,
}

impl SalesTable {
    #[must_use]
    pub fn new(records: Vec<HistoricalRecord>, has_partitions: bool, has_events: bool) -> Self {
        Self {
            records,
            has_partitions,
            has_events,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source carried store/department columns.
    #[must_use]
    pub fn has_partitions(&self) -> bool {
        self.has_partitions
    }

    /// Whether the source carried a special-event column.
    #[must_use]
    pub fn has_events(&self) -> bool {
        self.has_events
    }

    /// Distinct partitions in ascending order.
    #[must_use]
    pub fn partitions(&self) -> Vec<PartitionKey> {
        let mut keys: Vec<PartitionKey> =
            self.records.iter().filter_map(|r| r.partition).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Earliest and latest dates in the table.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}
