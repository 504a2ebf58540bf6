use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradelabelError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Insufficient data: {available} records, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl TradelabelError {
    /// Missing or malformed value at a specific record.
    pub fn data_at(row: usize, field: &str, detail: impl std::fmt::Display) -> Self {
        Self::Data(format!("record {}: field '{}' {}", row, field, detail))
    }

    /// True for the recoverable "too short for one fold" case.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, TradelabelError>;
