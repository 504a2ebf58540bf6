use super::types::Fold;
use crate::error::Result;
use crate::ml::labeling::LabeledRecord;

pub trait DataSplitter: Send + Sync {
    /// Split labeled records into folds, fold 0 first
    fn split(&self, records: &[LabeledRecord]) -> Result<Vec<Fold>>;

    /// Short name used in summaries and output directories
    fn name(&self) -> &'static str;
}
