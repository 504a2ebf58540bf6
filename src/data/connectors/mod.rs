mod csv;
mod parquet;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use parquet::ParquetConnector;
pub use types::{DatasetFormat, DatasetMetadata, TIMESTAMP_ALIASES};
pub use validator::DataValidator;
