use std::io::Write;

use super::*;

const WALMART_CSV: &str = "\
Store,Dept,Date,Weekly_Sales,IsHoliday
1,1,2010-02-05,24924.50,FALSE
1,1,2010-02-12,46039.49,TRUE
1,2,2010-02-05,50605.27,FALSE
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn reads_partitioned_rows_with_holiday_flag() {
    let table = read_sales_table(WALMART_CSV.as_bytes(), &DatasetProfile::walmart()).unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.has_partitions());
    assert!(table.has_events());

    let second = &table.records()[1];
    assert_eq!(second.partition, Some(PartitionKey::new(1, 1)));
    assert_eq!(second.date, date(2010, 2, 12));
    assert_eq!(second.value, Decimal::from_str("46039.49").unwrap());
    assert!(second.is_event);
}

#[test]
fn reads_aggregate_rows_with_spaced_headers() {
    let csv = "\
Row ID,Order Date,Sales,Region
1,08/11/2017,261.96,South
2,08/11/2017,731.94,South
3,12/06/2017,14.62,West
";
    let table = read_sales_table(csv.as_bytes(), &DatasetProfile::superstore()).unwrap();
    assert_eq!(table.len(), 3);
    assert!(!table.has_partitions());
    assert!(!table.has_events());
    assert_eq!(table.records()[0].date, date(2017, 11, 8));
    assert_eq!(table.records()[2].date, date(2017, 6, 12));
    assert!(table.records().iter().all(|r| r.partition.is_none()));
}

#[test]
fn missing_event_column_means_no_events() {
    let csv = "Store,Dept,Date,Weekly_Sales\n1,1,2010-02-05,10\n";
    let table = read_sales_table(csv.as_bytes(), &DatasetProfile::walmart()).unwrap();
    assert!(!table.has_events());
    assert!(!table.records()[0].is_event);
}

#[test]
fn missing_value_column_is_data_unavailable() {
    let csv = "Store,Dept,Date\n1,1,2010-02-05\n";
    let err = read_sales_table(csv.as_bytes(), &DatasetProfile::walmart()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::DataUnavailable("missing required column 'Weekly_Sales'".to_string())
    );
}

#[test]
fn unparsable_date_names_line_and_column() {
    let csv = "Store,Dept,Date,Weekly_Sales,IsHoliday\n1,1,2010-02-05,1,FALSE\n1,1,someday,2,FALSE\n";
    let err = read_sales_table(csv.as_bytes(), &DatasetProfile::walmart()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 3"), "{message}");
    assert!(message.contains("someday"), "{message}");
}

#[test]
fn unparsable_flag_is_rejected() {
    let csv = "Store,Dept,Date,Weekly_Sales,IsHoliday\n1,1,2010-02-05,1,maybe\n";
    let err = read_sales_table(csv.as_bytes(), &DatasetProfile::walmart()).unwrap_err();
    assert!(matches!(err, PipelineError::DataUnavailable(ref m) if m.contains("maybe")));
}

#[test]
fn header_only_file_is_data_unavailable() {
    let csv = "Store,Dept,Date,Weekly_Sales,IsHoliday\n";
    let err = read_sales_table(csv.as_bytes(), &DatasetProfile::walmart()).unwrap_err();
    assert!(matches!(err, PipelineError::DataUnavailable(_)));
}

#[test]
fn missing_file_is_data_unavailable() {
    let err = load_sales_table(
        Path::new("/nonexistent/train.csv"),
        &DatasetProfile::walmart(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::DataUnavailable(ref m) if m.contains("failed to open")));
}

#[test]
fn load_sales_table_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(WALMART_CSV.as_bytes()).unwrap();
    let table = load_sales_table(file.path(), &DatasetProfile::walmart()).unwrap();
    assert_eq!(table.partitions().len(), 2);
}

#[test]
fn parse_date_ignores_time_component() {
    let formats = vec!["%Y-%m-%d".to_string()];
    assert_eq!(
        parse_date("2012-10-26 00:00:00", &formats),
        Some(date(2012, 10, 26))
    );
    assert_eq!(
        parse_date("2012-10-26T08:30:00", &formats),
        Some(date(2012, 10, 26))
    );
}

#[test]
fn parse_date_accepts_formats_with_spaces() {
    let formats = vec!["%d %b %Y".to_string(), "%b %d, %Y".to_string()];
    assert_eq!(parse_date("05 Feb 2010", &formats), Some(date(2010, 2, 5)));
    assert_eq!(parse_date("Feb 12, 2010", &formats), Some(date(2010, 2, 12)));
    assert_eq!(
        parse_date("05 Feb 2010 13:45", &formats),
        Some(date(2010, 2, 5))
    );
}

#[test]
fn parse_date_rejects_trailing_garbage() {
    let formats = vec!["%Y-%m-%d".to_string()];
    assert_eq!(parse_date("2012-10-26x", &formats), None);
    assert_eq!(parse_date("2012-10-2612", &formats), None);
}

#[test]
fn spaced_date_format_loads_from_profile() {
    let profile = DatasetProfile {
        date_formats: vec!["%d %b %Y".to_string()],
        ..DatasetProfile::superstore()
    };
    let csv = "Order_Date,Sales\n05 Feb 2010,10\n06 Feb 2010,12\n";
    let table = read_sales_table(csv.as_bytes(), &profile).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].date, date(2010, 2, 5));
    assert_eq!(table.records()[1].date, date(2010, 2, 6));
}

#[test]
fn parse_decimal_accepts_grouping_and_scientific() {
    assert_eq!(parse_decimal("$1,234.50"), Decimal::from_str("1234.50").ok());
    assert_eq!(parse_decimal("-498.00"), Decimal::from_str("-498.00").ok());
    assert_eq!(parse_decimal("1.5e3"), Decimal::from_str("1500").ok());
    assert_eq!(parse_decimal(""), None);
    assert_eq!(parse_decimal("n/a"), None);
}

#[test]
fn parse_flag_variants() {
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("Yes"), Some(true));
    assert_eq!(parse_flag(""), None);
}

#[test]
fn normalize_header_treats_separators_alike() {
    assert_eq!(normalize_header("Order Date"), "order_date");
    assert_eq!(normalize_header("order-date"), "order_date");
    assert_eq!(normalize_header("Order_Date"), "order_date");
}
