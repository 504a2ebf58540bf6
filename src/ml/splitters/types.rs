use crate::data::table::format_timestamp;
use crate::ml::labeling::LabeledRecord;
use serde::Serialize;
use std::ops::Range;

/// One (train, test) pair
#[derive(Debug, Clone)]
pub struct Fold {
    pub index: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub train_records: Vec<LabeledRecord>,
    pub test_records: Vec<LabeledRecord>,
}

impl Fold {
    /// Materialize a fold from positions into `records`
    pub fn from_indices(
        index: usize,
        train_indices: Vec<usize>,
        test_indices: Vec<usize>,
        records: &[LabeledRecord],
    ) -> Self {
        let train_records = train_indices.iter().map(|&i| records[i].clone()).collect();
        let test_records = test_indices.iter().map(|&i| records[i].clone()).collect();
        Self {
            index,
            train_indices,
            test_indices,
            train_records,
            test_records,
        }
    }

    pub fn summary(&self) -> FoldSummary {
        let span = |records: &[LabeledRecord]| {
            (
                records.first().map(|r| format_timestamp(&r.timestamp)),
                records.last().map(|r| format_timestamp(&r.timestamp)),
            )
        };
        let (train_start, train_end) = span(&self.train_records);
        let (test_start, test_end) = span(&self.test_records);

        FoldSummary {
            index: self.index,
            train_count: self.train_records.len(),
            test_count: self.test_records.len(),
            train_start,
            train_end,
            test_start,
            test_end,
        }
    }
}

/// Contiguous train/test window for rolling splits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldWindow {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldSummary {
    pub index: usize,
    pub train_count: usize,
    pub test_count: usize,
    pub train_start: Option<String>,
    pub train_end: Option<String>,
    pub test_start: Option<String>,
    pub test_end: Option<String>,
}

/// Written as `summary.json` next to the fold directories
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub ticker: String,
    pub splitter: String,
    pub record_count: usize,
    pub fold_count: usize,
    pub folds: Vec<FoldSummary>,
}

impl SplitSummary {
    pub fn new(ticker: &str, splitter: &str, record_count: usize, folds: &[Fold]) -> Self {
        Self {
            ticker: ticker.to_string(),
            splitter: splitter.to_string(),
            record_count,
            fold_count: folds.len(),
            folds: folds.iter().map(Fold::summary).collect(),
        }
    }
}
