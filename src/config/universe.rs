use super::manager::{ConfigManager, ExperimentConfig};
use super::traits::resolve_template;
use crate::error::TradelabelError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ticker universe driving per-ticker config generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub tickers: Vec<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl UniverseConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TradelabelError> {
        let universe: UniverseConfig = ConfigManager::load_document(path)?;
        if universe.tickers.is_empty() {
            return Err(TradelabelError::Configuration("Universe has no tickers".to_string()));
        }
        Ok(universe)
    }
}

/// Build one ticker's experiment config from the shared template
pub fn ticker_config(
    ticker: &str,
    template: &ExperimentConfig,
    data_dir: &str,
) -> ExperimentConfig {
    let mut config = template.clone();
    config.ticker = ticker.to_string();
    config.labeling.input_data = resolve_template(&template.labeling.input_data, ticker);
    config.labeling.output_data = resolve_template(&template.labeling.output_data, ticker);
    config.split.input_data = resolve_template(&template.split.input_data, ticker);
    config.split.save_dir = format!("{}/splits/{}", data_dir.trim_end_matches('/'), ticker);
    config
}

/// Write `<TICKER>_experiment.json` for every ticker in the universe
pub fn generate_ticker_configs<P: AsRef<Path>>(
    universe: &UniverseConfig,
    template: &ExperimentConfig,
    output_dir: P,
) -> Result<Vec<PathBuf>, TradelabelError> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let mut generated = Vec::with_capacity(universe.tickers.len());
    for ticker in &universe.tickers {
        let config = ticker_config(ticker, template, &universe.data_dir);
        config.validate()?;

        let path = output_dir.join(format!("{}_experiment.json", ticker));
        std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        log::info!("Generated {}", path.display());
        generated.push(path);
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_config_fills_paths() {
        let template = ExperimentConfig::default();
        let config = ticker_config("NVDA", &template, "data/");

        assert_eq!(config.ticker, "NVDA");
        assert_eq!(config.labeling.input_data, "data/raw/NVDA.parquet");
        assert_eq!(config.split.input_data, "data/processed/NVDA_labeled.csv");
        assert_eq!(config.split.save_dir, "data/splits/NVDA");
        assert_eq!(config.labeling.upper_return, template.labeling.upper_return);
    }

    #[test]
    fn test_generate_writes_loadable_configs() {
        let dir = tempfile::tempdir().unwrap();
        let universe = UniverseConfig {
            tickers: vec!["AAPL".to_string(), "TSLA".to_string()],
            data_dir: "data".to_string(),
        };

        let files =
            generate_ticker_configs(&universe, &ExperimentConfig::default(), dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[1].ends_with("TSLA_experiment.json"));

        let loaded = ConfigManager::load_from_file(&files[0]).unwrap();
        assert_eq!(loaded.ticker, "AAPL");
        assert_eq!(loaded.save_dir(), PathBuf::from("data/splits/AAPL"));
    }
}
