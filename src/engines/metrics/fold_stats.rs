use super::classification::ClassificationMetrics;
use super::risk::{RiskMetrics, RiskReport};
use crate::data::table::format_timestamp;
use crate::ml::labeling::{Label, LabeledRecord};
use crate::ml::splitters::Fold;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        Some(Self {
            mean: RiskMetrics::mean(values),
            std: RiskMetrics::sample_std(values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub down: usize,
    pub neutral: usize,
    pub up: usize,
}

impl LabelCounts {
    pub fn from_records(records: &[LabeledRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.label {
                Label::Down => counts.down += 1,
                Label::Neutral => counts.neutral += 1,
                Label::Up => counts.up += 1,
            }
        }
        counts
    }

    /// Most frequent label; ties resolve in -1, 0, 1 order
    pub fn majority(&self) -> Option<Label> {
        let mut best: Option<(Label, usize)> = None;
        for label in Label::ALL {
            let count = self.get(label);
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Down => self.down,
            Label::Neutral => self.neutral,
            Label::Up => self.up,
        }
    }
}

/// Summary of one side (train or test) of a fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldStats {
    pub n_samples: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Per configured column; absent when this side has no records
    pub columns: BTreeMap<String, ColumnStats>,
    pub label_counts: LabelCounts,
    /// Annualised mean/std of the per-period reference-price returns
    pub sharpe_like: Option<f64>,
    pub risk: RiskReport,
}

impl FoldStats {
    /// Summarise `records`; unknown entries in `stats_columns` are skipped
    pub fn compute(records: &[LabeledRecord], stats_columns: &[String]) -> Self {
        let prices: Vec<f64> = records.iter().map(|r| r.reference_price).collect();
        let columns = stats_columns
            .iter()
            .filter_map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.numeric_value(name))
                    .collect::<Option<Vec<f64>>>()?;
                ColumnStats::from_values(&values).map(|stats| (name.clone(), stats))
            })
            .collect();
        let risk = RiskMetrics::calculate(&RiskMetrics::period_returns(&prices));

        Self {
            n_samples: records.len(),
            start_date: records.first().map(|r| format_timestamp(&r.timestamp)),
            end_date: records.last().map(|r| format_timestamp(&r.timestamp)),
            columns,
            label_counts: LabelCounts::from_records(records),
            sharpe_like: risk.sharpe_ratio,
            risk,
        }
    }
}

/// Contents of a fold's `stats.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldReport {
    pub fold: usize,
    pub train: FoldStats,
    pub test: FoldStats,
    /// Majority train label predicted for every test record
    pub baseline: Option<ClassificationMetrics>,
}

impl FoldReport {
    pub fn new(fold: &Fold, stats_columns: &[String]) -> Self {
        let train = FoldStats::compute(&fold.train_records, stats_columns);
        let test = FoldStats::compute(&fold.test_records, stats_columns);

        let baseline = train.label_counts.majority().and_then(|majority| {
            let y_true: Vec<Label> = fold.test_records.iter().map(|r| r.label).collect();
            let y_pred = vec![majority; y_true.len()];
            ClassificationMetrics::calculate(&y_true, &y_pred).ok()
        });

        Self {
            fold: fold.index,
            train,
            test,
            baseline,
        }
    }
}
