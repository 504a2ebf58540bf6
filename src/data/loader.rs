use crate::data::connectors::{
    CsvConnector, DataValidator, DatasetFormat, DatasetMetadata, ParquetConnector,
};
use crate::data::PriceSeries;
use crate::error::{Result, TradelabelError};
use polars::prelude::*;
use std::path::Path;

pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a Parquet or CSV file, chosen by extension
    pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<(DataFrame, DatasetFormat)> {
        let path = path.as_ref();
        let format = DatasetFormat::from_path(path).ok_or_else(|| {
            TradelabelError::Configuration(format!(
                "Unsupported input format: {} (expected .parquet or .csv)",
                path.display()
            ))
        })?;

        let df = match format {
            DatasetFormat::Parquet => ParquetConnector::load(path)?,
            DatasetFormat::Csv => CsvConnector::load(path)?,
        };

        Ok((df, format))
    }

    pub fn load<P: AsRef<Path>>(path: P, date_column: Option<&str>) -> Result<PriceSeries> {
        Self::load_with_metadata(path, date_column).map(|(series, _)| series)
    }

    pub fn load_with_metadata<P: AsRef<Path>>(
        path: P,
        date_column: Option<&str>,
    ) -> Result<(PriceSeries, DatasetMetadata)> {
        let path = path.as_ref();
        let (df, format) = Self::load_frame(path)?;

        // Warn about nulls but don't fail; the labeler rejects the ones it reads
        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected in {}: {:?}", path.display(), null_report);
        }

        let timestamp_column = DataValidator::find_timestamp_column(&df, date_column)?;
        let series = Self::from_frame(&df, Some(&timestamp_column))?;

        let metadata = DatasetMetadata {
            file_path: path.to_string_lossy().to_string(),
            format,
            num_rows: df.height(),
            columns: df.get_column_names().iter().map(|s| s.to_string()).collect(),
            timestamp_column,
            date_range: series.date_range(),
            null_report,
        };

        log::info!(
            "Loaded {} rows from {} ({} to {})",
            metadata.num_rows,
            metadata.file_path,
            metadata.date_range.0.format("%Y-%m-%d"),
            metadata.date_range.1.format("%Y-%m-%d")
        );

        Ok((series, metadata))
    }

    /// Build a series from every numeric column, sorted by timestamp
    pub fn from_frame(df: &DataFrame, date_column: Option<&str>) -> Result<PriceSeries> {
        let timestamp_column = DataValidator::find_timestamp_column(df, date_column)?;
        let timestamps = DataValidator::extract_timestamps(df, &timestamp_column)?;

        let mut order: Vec<usize> = (0..timestamps.len()).collect();
        order.sort_by_key(|&i| timestamps[i]);

        let mut series = PriceSeries::new(order.iter().map(|&i| timestamps[i]).collect())?;

        for name in DataValidator::numeric_columns(df, &timestamp_column) {
            let values = df.column(&name)?.cast(&DataType::Float64)?;
            let values = values.f64()?;
            let sorted = order.iter().map(|&i| values.get(i)).collect();
            series = series.with_field(&name, sorted)?;
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_from_frame_sorts_rows() {
        let df = df! {
            "Date" => &["2024-01-03", "2024-01-02", "2024-01-04"],
            "Close" => &[102.0, 101.0, 103.0],
            "Ticker" => &["X", "X", "X"],
        }
        .unwrap();

        let series = SeriesLoader::from_frame(&df, None).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.field("Close").unwrap(), &[Some(101.0), Some(102.0), Some(103.0)]);
        assert!(!series.has_field("Ticker"));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let df = df! {
            "Date" => &["2024-01-02", "2024-01-02"],
            "Close" => &[101.0, 102.0],
        }
        .unwrap();

        let err = SeriesLoader::from_frame(&df, None).unwrap_err();
        assert!(matches!(err, TradelabelError::Configuration(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SeriesLoader::load("prices.xlsx", None).unwrap_err();
        assert!(matches!(err, TradelabelError::Configuration(_)));
    }

    #[test]
    fn test_load_csv_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AAPL.csv");
        std::fs::write(
            &path,
            "Date,Open,Close\n2024-01-02,185.0,185.6\n2024-01-03,184.2,184.3\n",
        )
        .unwrap();

        let (series, metadata) = SeriesLoader::load_with_metadata(&path, None).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(metadata.timestamp_column, "Date");
        assert_eq!(metadata.format, DatasetFormat::Csv);
        assert_eq!(series.field_names(), vec!["Close", "Open"]);
    }
}
