use super::traits::{invalid, ConfigSection};
use crate::error::TradelabelError;
use crate::ml::labeling::LabeledRecord;
use serde::{Deserialize, Serialize};

/// Which end of the record sequence the rolling window starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Latest,   // Walk backward from the most recent record
    Earliest, // Walk forward from the first record
}

impl Anchor {
    pub fn from_latest_first(latest_first: bool) -> Self {
        if latest_first {
            Self::Latest
        } else {
            Self::Earliest
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplitDocument")]
pub struct SplitConfig {
    pub train_size: usize,
    pub test_size: usize,
    pub anchor: Anchor,
    /// Records the window moves per fold; defaults to train_size + test_size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride: Option<usize>,
    pub input_data: String,
    pub save_dir: String,
    /// Labeled-record columns summarised in each fold's stats.json
    pub stats_columns: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_size: 200,
            test_size: 5,
            anchor: Anchor::Latest,
            stride: None,
            input_data: "data/processed/{ticker}_labeled.csv".to_string(),
            save_dir: "data/splits/{ticker}".to_string(),
            stats_columns: vec!["reference_price".to_string(), "return_pct".to_string()],
        }
    }
}

/// On-disk shape of the `split` section, including the older key names
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SplitDocument {
    #[serde(alias = "batch_unit")]
    train_size: usize,
    #[serde(alias = "horizon")]
    test_size: usize,
    anchor: Option<Anchor>,
    latest_first: Option<bool>,
    stride: Option<usize>,
    input_data: String,
    save_dir: String,
    stats_columns: Vec<String>,
    /// Labeled tables are always keyed by `timestamp`; accepted and ignored
    date_column: Option<String>,
}

impl Default for SplitDocument {
    fn default() -> Self {
        let config = SplitConfig::default();
        Self {
            train_size: config.train_size,
            test_size: config.test_size,
            anchor: None,
            latest_first: None,
            stride: config.stride,
            input_data: config.input_data,
            save_dir: config.save_dir,
            stats_columns: config.stats_columns,
            date_column: None,
        }
    }
}

impl TryFrom<SplitDocument> for SplitConfig {
    type Error = String;

    fn try_from(doc: SplitDocument) -> Result<Self, Self::Error> {
        let anchor = match (doc.anchor, doc.latest_first.map(Anchor::from_latest_first)) {
            (Some(anchor), Some(legacy)) if anchor != legacy => {
                return Err(format!(
                    "anchor ({:?}) contradicts latest_first ({:?})",
                    anchor,
                    doc.latest_first
                ));
            }
            (Some(anchor), _) | (None, Some(anchor)) => anchor,
            (None, None) => Anchor::Latest,
        };

        if let Some(column) = &doc.date_column {
            log::debug!("Ignoring split.date_column '{}'", column);
        }

        Ok(Self {
            train_size: doc.train_size,
            test_size: doc.test_size,
            anchor,
            stride: doc.stride,
            input_data: doc.input_data,
            save_dir: doc.save_dir,
            stats_columns: doc.stats_columns.iter().map(|c| legacy_stats_column(c)).collect(),
        })
    }
}

/// Price-table column names used by older configs
fn legacy_stats_column(column: &str) -> String {
    match column {
        "Close" => "reference_price".to_string(),
        "Returns" => "return_pct".to_string(),
        other => other.to_string(),
    }
}

impl SplitConfig {
    pub fn new(train_size: usize, test_size: usize, anchor: Anchor) -> Self {
        Self {
            train_size,
            test_size,
            anchor,
            ..Self::default()
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_stats_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stats_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Records one fold spans; saturates instead of overflowing
    pub fn window_size(&self) -> usize {
        self.train_size.saturating_add(self.test_size)
    }

    pub fn effective_stride(&self) -> usize {
        self.stride.unwrap_or_else(|| self.window_size())
    }
}

impl ConfigSection for SplitConfig {
    fn section_name() -> &'static str {
        "split"
    }

    fn validate(&self) -> Result<(), TradelabelError> {
        let section = Self::section_name();
        if self.train_size == 0 {
            return Err(invalid(section, "train_size must be at least 1"));
        }
        if self.test_size == 0 {
            return Err(invalid(section, "test_size must be at least 1"));
        }
        if self.stride == Some(0) {
            return Err(invalid(section, "stride must be at least 1"));
        }
        if let Some(unknown) = self
            .stats_columns
            .iter()
            .find(|c| !LabeledRecord::NUMERIC_COLUMNS.contains(&c.as_str()))
        {
            return Err(invalid(
                section,
                format!(
                    "unknown stats column '{}' (expected one of {:?})",
                    unknown,
                    LabeledRecord::NUMERIC_COLUMNS
                ),
            ));
        }
        Ok(())
    }
}

/// Combinatorial purged cross-validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpcvConfig {
    pub n_blocks: usize,
    pub n_test_blocks: usize,
    pub purge_window: usize,   // records dropped before each test run
    pub embargo_window: usize, // records dropped after each test run
    /// Purge on overlapping label horizons instead of a fixed window
    pub use_barrier_times: bool,
}

impl Default for CpcvConfig {
    fn default() -> Self {
        Self {
            n_blocks: 10,
            n_test_blocks: 2,
            purge_window: 5,
            embargo_window: 3,
            use_barrier_times: true,
        }
    }
}

impl ConfigSection for CpcvConfig {
    fn section_name() -> &'static str {
        "cpcv"
    }

    fn validate(&self) -> Result<(), TradelabelError> {
        let section = Self::section_name();
        if self.n_blocks < 2 {
            return Err(invalid(section, "n_blocks must be at least 2"));
        }
        if self.n_test_blocks == 0 || self.n_test_blocks >= self.n_blocks {
            return Err(invalid(
                section,
                format!(
                    "n_test_blocks ({}) must be between 1 and n_blocks - 1 ({})",
                    self.n_test_blocks,
                    self.n_blocks - 1
                ),
            ));
        }
        Ok(())
    }
}
