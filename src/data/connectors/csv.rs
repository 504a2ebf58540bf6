use crate::error::{Result, TradelabelError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| {
                TradelabelError::Data(format!(
                    "Failed to read CSV {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        Ok(df)
    }

    /// Write DataFrame as CSV with a header row, creating parent directories
    pub fn write<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("prices.csv");

        let mut df = df! {
            "Date" => &["2024-01-02", "2024-01-03"],
            "Close" => &[100.5, 102.0],
        }
        .unwrap();

        CsvConnector::write(&mut df, &path).unwrap();
        let loaded = CsvConnector::load(&path).unwrap();

        assert_eq!(loaded.height(), 2);
        assert_eq!(loaded.width(), 2);
        let close = loaded.column("Close").unwrap().f64().unwrap();
        assert_eq!(close.get(1), Some(102.0));
    }

    #[test]
    fn test_missing_file() {
        assert!(CsvConnector::load("does/not/exist.csv").is_err());
    }
}
