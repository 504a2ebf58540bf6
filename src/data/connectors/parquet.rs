use crate::error::{Result, TradelabelError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub struct ParquetConnector;

impl ParquetConnector {
    /// Load Parquet file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let file = File::open(path.as_ref()).map_err(|e| {
            TradelabelError::Data(format!("Failed to open {}: {}", path.as_ref().display(), e))
        })?;

        let df = ParquetReader::new(file).finish().map_err(|e| {
            TradelabelError::Data(format!(
                "Failed to read Parquet {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(df)
    }

    pub fn write<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path.as_ref())?;
        ParquetWriter::new(file).finish(df)?;
        Ok(())
    }
}
