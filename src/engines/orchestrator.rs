use crate::config::{ConfigManager, ExperimentConfig};
use crate::data::{LabeledTable, PriceSeries, SeriesLoader};
use crate::engines::metrics::FoldReport;
use crate::error::{Result, TradelabelError};
use crate::ml::labeling::{LabelStats, LabeledRecord, TripleBarrierLabeler};
use crate::ml::splitters::{CpcvSplitter, DataSplitter, Fold, RollingHorizonSplitter, SplitSummary};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

pub const SNAPSHOT_FILE: &str = "experiment_config.toml";
pub const SUMMARY_FILE: &str = "summary.json";
pub const CPCV_DIR: &str = "cpcv";

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSummary {
    pub ticker: String,
    pub record_count: usize,
    pub label_stats: LabelStats,
    pub rolling: SplitSummary,
    pub cpcv: Option<SplitSummary>,
    pub save_dir: String,
}

/// Result of one ticker in a batch run
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: std::result::Result<ExperimentSummary, String>,
}

impl TickerOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct ExperimentOrchestrator {
    config: ExperimentConfig,
}

impl ExperimentOrchestrator {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Load the raw series, label it and write the labeled CSV.
    /// Returns `None` when labeling is disabled for this experiment.
    pub fn label_ticker(&self) -> Result<Option<Vec<LabeledRecord>>> {
        if !self.config.labeling.enabled {
            log::info!("[{}] Labeling disabled, skipping", self.config.ticker);
            return Ok(None);
        }

        let input = self.config.labeling_input();
        let series = SeriesLoader::load(&input, self.config.labeling.date_column.as_deref())?;
        let records = self.label_series(&series)?;

        let output = self.config.labeling_output();
        LabeledTable::write_csv(&records, &output)?;
        log::info!(
            "[{}] Wrote {} labeled records to {}",
            self.config.ticker,
            records.len(),
            output.display()
        );

        Ok(Some(records))
    }

    pub fn label_series(&self, series: &PriceSeries) -> Result<Vec<LabeledRecord>> {
        let labeler = TripleBarrierLabeler::new(self.config.labeling.clone())?;
        let records = labeler.label(series)?;

        let stats = TripleBarrierLabeler::analyze_distribution(&records);
        log::info!(
            "[{}] Labels: {} up ({:.1}%), {} neutral ({:.1}%), {} down ({:.1}%)",
            self.config.ticker,
            stats.up_count,
            stats.up_pct,
            stats.neutral_count,
            stats.neutral_pct,
            stats.down_count,
            stats.down_pct
        );

        Ok(records)
    }

    /// Read the labeled CSV and write rolling (and CPCV) folds
    pub fn split_ticker(&self) -> Result<ExperimentSummary> {
        let input = self.config.split_input();
        if !input.is_file() {
            return Err(TradelabelError::Configuration(format!(
                "Labeled data not found: {} (run labeling first)",
                input.display()
            )));
        }

        let records = LabeledTable::read_csv(&input)?;
        log::info!(
            "[{}] Read {} labeled records from {}",
            self.config.ticker,
            records.len(),
            input.display()
        );
        self.split_records(&records)
    }

    /// Label and split in one pass without re-reading the labeled CSV
    pub fn run(&self) -> Result<ExperimentSummary> {
        match self.label_ticker()? {
            Some(records) => self.split_records(&records),
            None => self.split_ticker(),
        }
    }

    pub fn split_records(&self, records: &[LabeledRecord]) -> Result<ExperimentSummary> {
        let save_dir = self.config.save_dir();
        std::fs::create_dir_all(&save_dir)?;

        let rolling = RollingHorizonSplitter::new(self.config.split.clone())?;
        let rolling_summary = self.write_split(&rolling, records, &save_dir)?;

        let cpcv_summary = match &self.config.cpcv {
            Some(cpcv) => {
                let splitter = CpcvSplitter::new(cpcv.clone())?;
                Some(self.write_split(&splitter, records, &save_dir.join(CPCV_DIR))?)
            }
            None => {
                let stale = save_dir.join(CPCV_DIR);
                if stale.is_dir() {
                    std::fs::remove_dir_all(&stale)?;
                }
                None
            }
        };

        ConfigManager::save_snapshot(&self.config, save_dir.join(SNAPSHOT_FILE))?;

        Ok(ExperimentSummary {
            ticker: self.config.ticker.clone(),
            record_count: records.len(),
            label_stats: TripleBarrierLabeler::analyze_distribution(records),
            rolling: rolling_summary,
            cpcv: cpcv_summary,
            save_dir: save_dir.to_string_lossy().to_string(),
        })
    }

    fn write_split(
        &self,
        splitter: &dyn DataSplitter,
        records: &[LabeledRecord],
        dir: &Path,
    ) -> Result<SplitSummary> {
        let folds = match splitter.split(records) {
            Ok(folds) => folds,
            Err(e) if e.is_insufficient_data() => {
                log::warn!("[{}] {} split skipped: {}", self.config.ticker, splitter.name(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Self::clear_folds(dir)?;
        for fold in &folds {
            self.write_fold(fold, dir)?;
        }

        let summary =
            SplitSummary::new(&self.config.ticker, splitter.name(), records.len(), &folds);
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(SUMMARY_FILE), serde_json::to_string_pretty(&summary)?)?;

        log::info!(
            "[{}] {} produced {} folds in {}",
            self.config.ticker,
            splitter.name(),
            folds.len(),
            dir.display()
        );

        Ok(summary)
    }

    /// Remove `fold_<n>` directories left by an earlier run
    fn clear_folds(dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let is_fold = name
                .to_str()
                .and_then(|n| n.strip_prefix("fold_"))
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
            if is_fold && entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
            }
        }
        Ok(())
    }

    fn write_fold(&self, fold: &Fold, dir: &Path) -> Result<()> {
        let fold_dir = dir.join(format!("fold_{}", fold.index));
        std::fs::create_dir_all(&fold_dir)?;

        LabeledTable::write_csv(&fold.train_records, fold_dir.join("train.csv"))?;
        LabeledTable::write_csv(&fold.test_records, fold_dir.join("test.csv"))?;

        let report = FoldReport::new(fold, &self.config.split.stats_columns);
        std::fs::write(fold_dir.join("stats.json"), serde_json::to_string_pretty(&report)?)?;

        log::debug!(
            "fold_{}: train {} / test {} records",
            fold.index,
            fold.train_records.len(),
            fold.test_records.len()
        );
        Ok(())
    }
}

/// Run each experiment end to end in parallel. One failing ticker does not
/// stop the others.
pub fn run_batch(configs: Vec<ExperimentConfig>) -> Vec<TickerOutcome> {
    configs
        .into_par_iter()
        .map(|config| {
            let ticker = config.ticker.clone();
            let result = ExperimentOrchestrator::new(config)
                .and_then(|orchestrator| orchestrator.run())
                .map_err(|e| {
                    log::error!("[{}] Experiment failed: {}", ticker, e);
                    e.to_string()
                });
            TickerOutcome { ticker, result }
        })
        .collect()
}
