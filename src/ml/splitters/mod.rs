pub mod base;
pub mod cpcv;
pub mod rolling;
pub mod types;

pub use base::DataSplitter;
pub use cpcv::CpcvSplitter;
pub use rolling::RollingHorizonSplitter;
pub use types::{Fold, FoldSummary, FoldWindow, SplitSummary};
