use crate::data::connectors::{CsvConnector, DataValidator};
use crate::error::{Result, TradelabelError};
use crate::ml::labeling::{ExitReason, Label, LabeledRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use polars::prelude::*;
use std::path::Path;

/// Date-only for midnight timestamps, RFC 3339 otherwise
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or plain dates (as UTC midnight)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// The labeled record table: records <-> DataFrame <-> CSV
pub struct LabeledTable;

impl LabeledTable {
    pub const COLUMNS: [&'static str; 8] = [
        "timestamp",
        "reference_price",
        "label",
        "exit_timestamp",
        "exit_reason",
        "exit_price",
        "return_pct",
        "holding_periods",
    ];

    pub fn to_frame(records: &[LabeledRecord]) -> Result<DataFrame> {
        let timestamps: Vec<String> =
            records.iter().map(|r| format_timestamp(&r.timestamp)).collect();
        let reference: Vec<f64> = records.iter().map(|r| r.reference_price).collect();
        let labels: Vec<i64> = records.iter().map(|r| r.label.as_i8() as i64).collect();
        let exits: Vec<String> =
            records.iter().map(|r| format_timestamp(&r.exit_timestamp)).collect();
        let reasons: Vec<&str> = records.iter().map(|r| r.exit_reason.as_str()).collect();
        let exit_prices: Vec<f64> = records.iter().map(|r| r.exit_price).collect();
        let returns: Vec<f64> = records.iter().map(|r| r.return_pct).collect();
        let holding: Vec<i64> = records.iter().map(|r| r.holding_periods as i64).collect();

        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), timestamps),
            Column::new("reference_price".into(), reference),
            Column::new("label".into(), labels),
            Column::new("exit_timestamp".into(), exits),
            Column::new("exit_reason".into(), reasons),
            Column::new("exit_price".into(), exit_prices),
            Column::new("return_pct".into(), returns),
            Column::new("holding_periods".into(), holding),
        ])?;

        Ok(df)
    }

    pub fn from_frame(df: &DataFrame) -> Result<Vec<LabeledRecord>> {
        let names = df.get_column_names();
        for required in Self::COLUMNS {
            if !names.iter().any(|c| c.as_str() == required) {
                return Err(TradelabelError::Data(format!(
                    "Labeled table is missing column '{}'",
                    required
                )));
            }
        }

        if df.height() == 0 {
            return Ok(Vec::new());
        }

        let timestamps = DataValidator::extract_timestamps(df, "timestamp")?;
        let exit_timestamps = DataValidator::extract_timestamps(df, "exit_timestamp")?;

        let reference = df.column("reference_price")?.cast(&DataType::Float64)?;
        let labels = df.column("label")?.cast(&DataType::Int64)?;
        let exit_prices = df.column("exit_price")?.cast(&DataType::Float64)?;
        let returns = df.column("return_pct")?.cast(&DataType::Float64)?;
        let holding = df.column("holding_periods")?.cast(&DataType::Int64)?;
        let reasons = df.column("exit_reason")?;

        let reference = reference.f64()?;
        let labels = labels.i64()?;
        let exit_prices = exit_prices.f64()?;
        let returns = returns.f64()?;
        let holding = holding.i64()?;
        let reasons = reasons.str()?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let raw_label = labels
                .get(row)
                .ok_or_else(|| TradelabelError::data_at(row, "label", "is null"))?;
            let label = Label::from_i64(raw_label).ok_or_else(|| {
                TradelabelError::data_at(
                    row,
                    "label",
                    format!("must be -1, 0 or 1, got {}", raw_label),
                )
            })?;

            let raw_reason = reasons
                .get(row)
                .ok_or_else(|| TradelabelError::data_at(row, "exit_reason", "is null"))?;
            let exit_reason = ExitReason::parse(raw_reason).ok_or_else(|| {
                TradelabelError::data_at(
                    row,
                    "exit_reason",
                    format!("is unknown ('{}')", raw_reason),
                )
            })?;

            let holding_periods = holding
                .get(row)
                .filter(|h| *h >= 0)
                .ok_or_else(|| {
                    TradelabelError::data_at(row, "holding_periods", "is null or negative")
                })?;

            records.push(LabeledRecord {
                timestamp: timestamps[row],
                reference_price: reference
                    .get(row)
                    .ok_or_else(|| TradelabelError::data_at(row, "reference_price", "is null"))?,
                label,
                exit_timestamp: exit_timestamps[row],
                exit_reason,
                exit_price: exit_prices
                    .get(row)
                    .ok_or_else(|| TradelabelError::data_at(row, "exit_price", "is null"))?,
                return_pct: returns
                    .get(row)
                    .ok_or_else(|| TradelabelError::data_at(row, "return_pct", "is null"))?,
                holding_periods: holding_periods as usize,
            });
        }

        Ok(records)
    }

    pub fn write_csv<P: AsRef<Path>>(records: &[LabeledRecord], path: P) -> Result<()> {
        let mut df = Self::to_frame(records)?;
        CsvConnector::write(&mut df, path)
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledRecord>> {
        let df = CsvConnector::load(path)?;
        Self::from_frame(&df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(day: u32, label: Label, reason: ExitReason) -> LabeledRecord {
        LabeledRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap(),
            reference_price: 187.5,
            label,
            exit_timestamp: Utc.with_ymd_and_hms(2024, 2, day + 2, 0, 0, 0).unwrap(),
            exit_reason: reason,
            exit_price: 193.25,
            return_pct: 0.25,
            holding_periods: 2,
        }
    }

    #[test]
    fn test_timestamp_formatting() {
        let midnight = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let intraday = Utc.with_ymd_and_hms(2024, 2, 1, 14, 30, 0).unwrap();

        assert_eq!(format_timestamp(&midnight), "2024-02-01");
        assert_eq!(format_timestamp(&intraday), "2024-02-01T14:30:00Z");
        assert_eq!(parse_timestamp("2024-02-01"), Some(midnight));
        assert_eq!(parse_timestamp("2024-02-01T14:30:00Z"), Some(intraday));
        assert_eq!(parse_timestamp("2024-02-01 14:30:00"), Some(intraday));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labeled.csv");
        let records = vec![
            record(1, Label::Up, ExitReason::Upper),
            record(2, Label::Down, ExitReason::Lower),
            record(5, Label::Neutral, ExitReason::Time),
        ];

        LabeledTable::write_csv(&records, &path).unwrap();
        let loaded = LabeledTable::read_csv(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_frame_requires_columns() {
        let df = polars::df! { "timestamp" => &["2024-01-01"] }.unwrap();
        assert!(LabeledTable::from_frame(&df).is_err());
    }

    #[test]
    fn test_bad_label_value() {
        let mut df = LabeledTable::to_frame(&[record(1, Label::Up, ExitReason::Upper)]).unwrap();
        df.with_column(Column::new("label".into(), vec![7i64])).unwrap();

        let err = LabeledTable::from_frame(&df).unwrap_err();
        assert!(err.to_string().contains("label"));
    }
}
