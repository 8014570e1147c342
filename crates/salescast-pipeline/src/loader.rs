//! CSV sales-table loader.
//!
//! Columns are located by the names in a [`DatasetProfile`]. Header matching
//! ignores case and treats spaces, dashes and underscores alike, so
//! `Order Date` satisfies a profile asking for `Order_Date`.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use salescast_core::{DatasetProfile, HistoricalRecord, PartitionKey, PipelineError, SalesTable};

/// Load the sales table at `path` using `profile`'s column mapping.
///
/// # Errors
///
/// Returns [`PipelineError::DataUnavailable`] if the file cannot be opened,
/// lacks a required column, contains an unparsable cell, or has no rows.
pub fn load_sales_table(path: &Path, profile: &DatasetProfile) -> Result<SalesTable, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| {
        PipelineError::DataUnavailable(format!("failed to open '{}': {e}", path.display()))
    })?;
    let table = read_sales_table(file, profile)?;
    tracing::info!(
        path = %path.display(),
        dataset = %profile.name,
        rows = table.len(),
        "sales table loaded"
    );
    Ok(table)
}

/// Parse a sales table from any CSV reader.
///
/// # Errors
///
/// See [`load_sales_table`].
pub fn read_sales_table<R: Read>(
    reader: R,
    profile: &DatasetProfile,
) -> Result<SalesTable, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| PipelineError::DataUnavailable(format!("failed to read header row: {e}")))?
        .clone();
    let columns = ColumnMap::resolve(&headers, profile)?;

    let mut records = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let line = idx + 2;
        let row = result.map_err(|e| {
            PipelineError::DataUnavailable(format!("CSV parse error at line {line}: {e}"))
        })?;
        records.push(columns.parse_row(&row, line, profile)?);
    }

    if records.is_empty() {
        return Err(PipelineError::DataUnavailable(
            "sales file contains no data rows".to_string(),
        ));
    }

    Ok(SalesTable::new(
        records,
        columns.partition.is_some(),
        columns.event.is_some(),
    ))
}

/// Header positions of the columns a profile needs.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    value: usize,
    partition: Option<(usize, usize)>,
    event: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord, profile: &DatasetProfile) -> Result<Self, PipelineError> {
        let require = |name: &str| {
            find_column(headers, name).ok_or_else(|| {
                PipelineError::DataUnavailable(format!("missing required column '{name}'"))
            })
        };

        let date = require(&profile.date_column)?;
        let value = require(&profile.value_column)?;
        let partition = match (&profile.store_column, &profile.dept_column) {
            (Some(store), Some(dept)) => Some((require(store)?, require(dept)?)),
            _ => None,
        };
        // An event column named by the profile but absent from the file just
        // means no events.
        let event = profile
            .event_column
            .as_deref()
            .and_then(|name| find_column(headers, name));

        Ok(Self {
            date,
            value,
            partition,
            event,
        })
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        line: usize,
        profile: &DatasetProfile,
    ) -> Result<HistoricalRecord, PipelineError> {
        let cell = |idx: usize, column: &str| {
            row.get(idx).ok_or_else(|| {
                PipelineError::DataUnavailable(format!(
                    "line {line}: missing value for column '{column}'"
                ))
            })
        };

        let raw_date = cell(self.date, &profile.date_column)?;
        let date = parse_date(raw_date, &profile.date_formats).ok_or_else(|| {
            PipelineError::DataUnavailable(format!(
                "line {line}: unparsable date '{raw_date}' in column '{}'",
                profile.date_column
            ))
        })?;

        let raw_value = cell(self.value, &profile.value_column)?;
        let value = parse_decimal(raw_value).ok_or_else(|| {
            PipelineError::DataUnavailable(format!(
                "line {line}: unparsable number '{raw_value}' in column '{}'",
                profile.value_column
            ))
        })?;

        let partition = match (self.partition, &profile.store_column, &profile.dept_column) {
            (Some((store_idx, dept_idx)), Some(store_col), Some(dept_col)) => {
                let store = parse_key(cell(store_idx, store_col)?, store_col, line)?;
                let dept = parse_key(cell(dept_idx, dept_col)?, dept_col, line)?;
                Some(PartitionKey::new(store, dept))
            }
            _ => None,
        };

        let is_event = match (self.event, &profile.event_column) {
            (Some(idx), Some(column)) => {
                let raw = cell(idx, column)?;
                parse_flag(raw).ok_or_else(|| {
                    PipelineError::DataUnavailable(format!(
                        "line {line}: unparsable flag '{raw}' in column '{column}'"
                    ))
                })?
            }
            _ => false,
        };

        Ok(HistoricalRecord {
            partition,
            date,
            value,
            is_event,
        })
    }
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name).or_else(|| {
        let wanted = normalize_header(name);
        headers.iter().position(|h| normalize_header(h) == wanted)
    })
}

/// Try each format in order against the whole cell. Anything left after the
/// date must be a time component introduced by `T` or a space.
fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|fmt| {
        let (date, rest) = NaiveDate::parse_and_remainder(raw, fmt).ok()?;
        (rest.is_empty() || rest.starts_with(['T', ' '])).then_some(date)
    })
}

/// Accepts plain or scientific notation, with optional `$` and `,` grouping.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn parse_key(raw: &str, column: &str, line: usize) -> Result<u32, PipelineError> {
    raw.parse::<u32>().map_err(|_| {
        PipelineError::DataUnavailable(format!(
            "line {line}: '{raw}' in column '{column}' is not a non-negative integer"
        ))
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
