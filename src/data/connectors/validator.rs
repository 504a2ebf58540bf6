use super::types::TIMESTAMP_ALIASES;
use crate::data::table::parse_timestamp;
use crate::error::{Result, TradelabelError};
use chrono::{DateTime, Duration, Utc};
use polars::prelude::*;

pub struct DataValidator;

impl DataValidator {
    /// Resolve the timestamp column, preferring an explicitly configured name
    pub fn find_timestamp_column(df: &DataFrame, explicit: Option<&str>) -> Result<String> {
        let columns = df.get_column_names();

        if let Some(name) = explicit {
            return if columns.iter().any(|col| col.as_str() == name) {
                Ok(name.to_string())
            } else {
                Err(TradelabelError::Data(format!(
                    "Missing timestamp column '{}' (columns: {:?})",
                    name, columns
                )))
            };
        }

        TIMESTAMP_ALIASES
            .iter()
            .find(|&&alias| columns.iter().any(|col| col.as_str() == alias))
            .map(|alias| alias.to_string())
            .ok_or_else(|| {
                TradelabelError::Data(format!(
                    "No timestamp column found (tried aliases: {:?})",
                    TIMESTAMP_ALIASES
                ))
            })
    }

    /// Convert a Date, Datetime or string column to UTC timestamps
    pub fn extract_timestamps(df: &DataFrame, name: &str) -> Result<Vec<DateTime<Utc>>> {
        let column = df.column(name)?;

        let timestamps = match column.dtype() {
            DataType::Date => {
                let days = column.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, v)| {
                        let days = v.ok_or_else(|| TradelabelError::data_at(row, name, "is null"))?;
                        Ok(DateTime::<Utc>::UNIX_EPOCH + Duration::days(days as i64))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            DataType::Datetime(unit, _) => {
                let unit = *unit;
                let raw = column.cast(&DataType::Int64)?;
                raw.i64()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, v)| {
                        let v = v.ok_or_else(|| TradelabelError::data_at(row, name, "is null"))?;
                        let ts = match unit {
                            TimeUnit::Nanoseconds => Some(DateTime::<Utc>::from_timestamp_nanos(v)),
                            TimeUnit::Microseconds => DateTime::<Utc>::from_timestamp_micros(v),
                            TimeUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(v),
                        };
                        ts.ok_or_else(|| {
                            TradelabelError::data_at(row, name, format!("is out of range ({})", v))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            DataType::String => column
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let text = v.ok_or_else(|| TradelabelError::data_at(row, name, "is null"))?;
                    parse_timestamp(text).ok_or_else(|| {
                        TradelabelError::data_at(
                            row,
                            name,
                            format!("is not a timestamp ('{}')", text),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(TradelabelError::Data(format!(
                    "Timestamp column '{}' has unsupported type {:?}",
                    name, other
                )))
            }
        };

        Ok(timestamps)
    }

    /// Numeric columns other than `exclude`, in frame order
    pub fn numeric_columns(df: &DataFrame, exclude: &str) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| col.name().as_str() != exclude)
            .filter(|col| Self::is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::Int16
                | DataType::Int8
                | DataType::UInt64
                | DataType::UInt32
                | DataType::UInt16
                | DataType::UInt8
        )
    }

    /// Check for null values in every column
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for column in df.get_columns() {
            let null_count = column.null_count();
            if null_count > 0 {
                null_report.push((column.name().to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use polars::df;

    #[test]
    fn test_timestamp_alias_detection() {
        let df = df! {
            "Date" => &["2024-01-02", "2024-01-03"],
            "Close" => &[100.0, 101.0],
        }
        .unwrap();

        assert_eq!(DataValidator::find_timestamp_column(&df, None).unwrap(), "Date");
        assert!(DataValidator::find_timestamp_column(&df, Some("ts")).is_err());
    }

    #[test]
    fn test_string_timestamps() {
        let df = df! {
            "Date" => &["2024-01-02", "2024-01-03T15:30:00Z"],
        }
        .unwrap();

        let ts = DataValidator::extract_timestamps(&df, "Date").unwrap();
        assert_eq!(ts[0], Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(ts[1], Utc.with_ymd_and_hms(2024, 1, 3, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_date_typed_timestamps() {
        // 2024-01-02 and 2024-01-03 as days since the epoch
        let dates = Series::new("Date".into(), &[19724i32, 19725])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();

        let ts = DataValidator::extract_timestamps(&df, "Date").unwrap();
        assert_eq!(ts[1], Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unparseable_timestamp() {
        let df = df! { "Date" => &["2024-01-02", "yesterday"] }.unwrap();
        let err = DataValidator::extract_timestamps(&df, "Date").unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_numeric_columns_and_nulls() {
        let df = df! {
            "Date" => &["2024-01-02", "2024-01-03"],
            "Ticker" => &["TSLA", "TSLA"],
            "Close" => &[Some(100.0), None],
            "Volume" => &[1000i64, 1200],
        }
        .unwrap();

        assert_eq!(DataValidator::numeric_columns(&df, "Date"), vec!["Close", "Volume"]);
        assert_eq!(DataValidator::check_nulls(&df).unwrap(), vec![("Close".to_string(), 1)]);
    }
}
