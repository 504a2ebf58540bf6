pub mod classification;
pub mod fold_stats;
pub mod risk;

pub use classification::ClassificationMetrics;
pub use fold_stats::{ColumnStats, FoldReport, FoldStats, LabelCounts};
pub use risk::{RiskMetrics, RiskReport, TRADING_DAYS};
