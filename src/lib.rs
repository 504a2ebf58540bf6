pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod ml;

pub use config::{BarrierConfig, ConfigManager, CpcvConfig, ExperimentConfig, SplitConfig};
pub use data::PriceSeries;
pub use engines::{run_batch, ExperimentOrchestrator};
pub use error::{Result, TradelabelError};
pub use ml::labeling::{ExitReason, Label, LabeledRecord, TripleBarrierLabeler};
pub use ml::splitters::{CpcvSplitter, DataSplitter, Fold, RollingHorizonSplitter};
