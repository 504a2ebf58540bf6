use super::{
    labeling::BarrierConfig,
    split::{CpcvConfig, SplitConfig},
    traits::{resolve_template, ConfigSection},
};
use crate::error::TradelabelError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One ticker's experiment: labeling, rolling split and optional CPCV settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub ticker: String,
    pub labeling: BarrierConfig,
    pub split: SplitConfig,
    pub cpcv: Option<CpcvConfig>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            ticker: "UNKNOWN".to_string(),
            labeling: BarrierConfig::default(),
            split: SplitConfig::default(),
            cpcv: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), TradelabelError> {
        if self.ticker.trim().is_empty() {
            return Err(TradelabelError::Configuration("ticker must not be empty".to_string()));
        }
        self.labeling.validate()?;
        self.split.validate()?;
        if let Some(cpcv) = &self.cpcv {
            cpcv.validate()?;
        }
        Ok(())
    }

    pub fn labeling_input(&self) -> PathBuf {
        PathBuf::from(resolve_template(&self.labeling.input_data, &self.ticker))
    }

    pub fn labeling_output(&self) -> PathBuf {
        PathBuf::from(resolve_template(&self.labeling.output_data, &self.ticker))
    }

    pub fn split_input(&self) -> PathBuf {
        PathBuf::from(resolve_template(&self.split.input_data, &self.ticker))
    }

    pub fn save_dir(&self) -> PathBuf {
        PathBuf::from(resolve_template(&self.split.save_dir, &self.ticker))
    }
}

/// Environment variables prefixed with this override file values,
/// e.g. `TRADELABEL__LABELING__UPPER_RETURN=0.05`
pub const ENV_PREFIX: &str = "TRADELABEL";

pub struct ConfigManager;

impl ConfigManager {
    /// Load and validate an experiment config from YAML, JSON or TOML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig, TradelabelError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TradelabelError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let format = Self::detect_format(path)?;
        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), format))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let experiment: ExperimentConfig = settings
            .try_deserialize()
            .map_err(|e| TradelabelError::Configuration(format!("Failed to parse config: {}", e)))?;

        experiment.validate()?;
        log::debug!("Loaded experiment config for {} from {}", experiment.ticker, path.display());
        Ok(experiment)
    }

    /// Load any deserializable document (used for universe files and templates)
    pub fn load_document<T, P>(path: P) -> Result<T, TradelabelError>
    where
        T: for<'de> Deserialize<'de>,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = Self::detect_format(path)?;
        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), format))
            .build()?;
        settings.try_deserialize().map_err(|e| {
            TradelabelError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Write the config actually used next to the experiment outputs
    pub fn save_snapshot<P: AsRef<Path>>(
        config: &ExperimentConfig,
        path: P,
    ) -> Result<(), TradelabelError> {
        let toml_str = toml::to_string_pretty(config)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    fn detect_format(path: &Path) -> Result<FileFormat, TradelabelError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(TradelabelError::Configuration(format!(
                "Unsupported config format: {}",
                path.display()
            ))),
        }
    }
}
