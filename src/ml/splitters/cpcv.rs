use super::base::DataSplitter;
use super::types::Fold;
use crate::config::{ConfigSection, CpcvConfig};
use crate::error::{Result, TradelabelError};
use crate::ml::labeling::LabeledRecord;
use std::ops::Range;

/// Combinatorial purged cross-validation.
///
/// Records are cut into `n_blocks` contiguous blocks and every combination of
/// `n_test_blocks` blocks becomes one fold's test set. Train records that
/// could leak information into a test run are purged (before the run) and
/// embargoed (after it).
pub struct CpcvSplitter {
    config: CpcvConfig,
}

impl CpcvSplitter {
    pub fn new(config: CpcvConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CpcvConfig {
        &self.config
    }

    /// Block boundaries; the last block absorbs the remainder
    pub fn blocks(&self, total_rows: usize) -> Vec<Range<usize>> {
        let block_size = total_rows / self.config.n_blocks;
        (0..self.config.n_blocks)
            .map(|i| {
                let start = i * block_size;
                let end = if i + 1 == self.config.n_blocks {
                    total_rows
                } else {
                    start + block_size
                };
                start..end
            })
            .collect()
    }

    /// Number of folds the splitter will produce
    pub fn fold_count(&self) -> usize {
        combinations(self.config.n_blocks, self.config.n_test_blocks).len()
    }

    fn purge_and_embargo(
        &self,
        keep: &mut [bool],
        runs: &[Range<usize>],
        records: &[LabeledRecord],
    ) {
        for run in runs {
            if self.config.use_barrier_times {
                let run_start = records[run.start].timestamp;
                let run_end = records[run.clone()]
                    .iter()
                    .map(|r| r.exit_timestamp)
                    .max()
                    .unwrap_or(run_start);

                for (i, record) in records.iter().enumerate() {
                    if record.timestamp <= run_end && record.exit_timestamp >= run_start {
                        keep[i] = false;
                    }
                }
            } else {
                let purge_start = run.start.saturating_sub(self.config.purge_window);
                keep[purge_start..run.start].iter_mut().for_each(|k| *k = false);
            }

            let embargo_end = run.end.saturating_add(self.config.embargo_window).min(keep.len());
            keep[run.end..embargo_end].iter_mut().for_each(|k| *k = false);
        }
    }
}

impl DataSplitter for CpcvSplitter {
    fn split(&self, records: &[LabeledRecord]) -> Result<Vec<Fold>> {
        let total_rows = records.len();
        if total_rows < self.config.n_blocks {
            return Err(TradelabelError::InsufficientData {
                available: total_rows,
                required: self.config.n_blocks,
            });
        }

        let blocks = self.blocks(total_rows);
        let mut folds = Vec::new();

        for (index, test_blocks) in combinations(self.config.n_blocks, self.config.n_test_blocks)
            .into_iter()
            .enumerate()
        {
            let runs = contiguous_runs(&test_blocks, &blocks);

            // Test records are never train records
            let mut keep = vec![true; total_rows];
            for run in &runs {
                keep[run.clone()].iter_mut().for_each(|k| *k = false);
            }
            self.purge_and_embargo(&mut keep, &runs, records);

            let test_indices: Vec<usize> = runs.iter().flat_map(|r| r.clone()).collect();
            let train_indices: Vec<usize> = (0..total_rows).filter(|&i| keep[i]).collect();

            folds.push(Fold::from_indices(index, train_indices, test_indices, records));
        }

        log::debug!(
            "CPCV split (blocks {}, test blocks {}): {} folds from {} records",
            self.config.n_blocks,
            self.config.n_test_blocks,
            folds.len(),
            total_rows
        );

        Ok(folds)
    }

    fn name(&self) -> &'static str {
        "cpcv"
    }
}

/// k-combinations of 0..n in lexicographic order
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut combo: Vec<usize> = (0..k).collect();

    loop {
        result.push(combo.clone());

        let mut i = k;
        while i > 0 && combo[i - 1] == n - k + i - 1 {
            i -= 1;
        }
        if i == 0 {
            break;
        }

        combo[i - 1] += 1;
        for j in i..k {
            combo[j] = combo[j - 1] + 1;
        }
    }

    result
}

/// Merge adjacent test blocks into contiguous index runs
fn contiguous_runs(test_blocks: &[usize], blocks: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = Vec::new();
    for &b in test_blocks {
        let block = blocks[b].clone();
        match runs.last_mut() {
            Some(last) if last.end == block.start => last.end = block.end,
            _ => runs.push(block),
        }
    }
    runs
}
