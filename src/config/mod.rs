pub mod traits;
pub mod labeling;
pub mod split;
pub mod manager;
pub mod universe;

pub use manager::{ConfigManager, ExperimentConfig};
pub use labeling::BarrierConfig;
pub use split::{Anchor, CpcvConfig, SplitConfig};
pub use traits::ConfigSection;
pub use universe::{generate_ticker_configs, UniverseConfig};
