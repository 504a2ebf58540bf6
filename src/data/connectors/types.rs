use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Columnar file formats the connectors read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetFormat {
    Parquet,
    Csv,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "parquet" | "pq" => Some(Self::Parquet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Common names for the timestamp column
pub const TIMESTAMP_ALIASES: [&str; 10] = [
    "timestamp",
    "Timestamp",
    "date",
    "Date",
    "DATE",
    "datetime",
    "Datetime",
    "DateTime",
    "time",
    "Time",
];

/// Metadata about a loaded price file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub format: DatasetFormat,
    pub num_rows: usize,
    pub columns: Vec<String>,
    pub timestamp_column: String,
    pub date_range: (DateTime<Utc>, DateTime<Utc>),
    pub null_report: Vec<(String, usize)>,
}
