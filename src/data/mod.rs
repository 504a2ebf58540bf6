pub mod connectors;
pub mod loader;
pub mod series;
pub mod table;

pub use connectors::{CsvConnector, DataValidator, DatasetFormat, DatasetMetadata, ParquetConnector};
pub use loader::SeriesLoader;
pub use series::PriceSeries;
pub use table::{format_timestamp, parse_timestamp, LabeledTable};
