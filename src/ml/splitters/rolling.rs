use super::base::DataSplitter;
use super::types::{Fold, FoldWindow};
use crate::config::{Anchor, ConfigSection, SplitConfig};
use crate::error::{Result, TradelabelError};
use crate::ml::labeling::LabeledRecord;

/// Fixed-size train/test windows walked from one end of the data.
///
/// With the default stride every fold consumes `train_size + test_size`
/// records and folds never overlap. Records left over once a full window no
/// longer fits are discarded.
pub struct RollingHorizonSplitter {
    config: SplitConfig,
}

impl RollingHorizonSplitter {
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Window positions for `total_rows` records, fold 0 first
    pub fn windows(&self, total_rows: usize) -> Result<Vec<FoldWindow>> {
        let window_size = self.config.window_size();
        if total_rows < window_size {
            return Err(TradelabelError::InsufficientData {
                available: total_rows,
                required: window_size,
            });
        }

        match self.config.anchor {
            Anchor::Latest => Ok(self.windows_latest(total_rows)),
            Anchor::Earliest => Ok(self.windows_earliest(total_rows)),
        }
    }

    /// Walk backward: fold 0 ends at the most recent record
    fn windows_latest(&self, total_rows: usize) -> Vec<FoldWindow> {
        let window_size = self.config.window_size();
        let stride = self.config.effective_stride();
        let mut windows = Vec::new();
        let mut end = total_rows;

        while end >= window_size {
            let test_start = end - self.config.test_size;
            windows.push(FoldWindow {
                train: (end - window_size)..test_start,
                test: test_start..end,
            });

            end = match end.checked_sub(stride) {
                Some(next) => next,
                None => break,
            };
        }

        windows
    }

    /// Walk forward: fold 0 starts at the first record
    fn windows_earliest(&self, total_rows: usize) -> Vec<FoldWindow> {
        let window_size = self.config.window_size();
        let stride = self.config.effective_stride();
        let mut windows = Vec::new();
        let mut start: usize = 0;

        while let Some(end) = start.checked_add(window_size).filter(|&end| end <= total_rows) {
            let train_end = start + self.config.train_size;
            windows.push(FoldWindow {
                train: start..train_end,
                test: train_end..end,
            });

            start = match start.checked_add(stride) {
                Some(next) => next,
                None => break,
            };
        }

        windows
    }
}

impl DataSplitter for RollingHorizonSplitter {
    fn split(&self, records: &[LabeledRecord]) -> Result<Vec<Fold>> {
        let windows = self.windows(records.len())?;

        let folds = windows
            .into_iter()
            .enumerate()
            .map(|(index, window)| {
                Fold::from_indices(index, window.train.collect(), window.test.collect(), records)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Rolling split ({:?}, train {}, test {}): {} folds from {} records",
            self.config.anchor,
            self.config.train_size,
            self.config.test_size,
            folds.len(),
            records.len()
        );

        Ok(folds)
    }

    fn name(&self) -> &'static str {
        "rolling_horizon"
    }
}
