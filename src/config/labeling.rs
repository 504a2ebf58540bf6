use super::traits::{invalid, ConfigSection};
use crate::error::TradelabelError;
use serde::{Deserialize, Serialize};

/// Triple-barrier parameters plus the labeling step's file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarrierConfig {
    pub enabled: bool,
    pub upper_return: f64, // e.g., 0.03 = +3% profit barrier
    pub lower_return: f64, // e.g., -0.02 = -2% stop barrier
    #[serde(alias = "max_holding_days")]
    pub max_holding_periods: usize,
    #[serde(alias = "reference_column")]
    pub reference_field: String,
    /// Time exits get label 0; otherwise the sign of the final return
    pub include_neutral: bool,
    /// Emit time exits for trailing rows whose window is cut short by the series end
    pub label_partial_windows: bool,
    /// Optional intrabar fields used to detect barrier touches
    pub high_field: Option<String>,
    pub low_field: Option<String>,
    pub date_column: Option<String>,
    pub input_data: String,
    pub output_data: String,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            upper_return: 0.03,
            lower_return: -0.02,
            max_holding_periods: 5,
            reference_field: "Close".to_string(),
            include_neutral: true,
            label_partial_windows: true,
            high_field: None,
            low_field: None,
            date_column: None,
            input_data: "data/raw/{ticker}.parquet".to_string(),
            output_data: "data/processed/{ticker}_labeled.csv".to_string(),
        }
    }
}

impl BarrierConfig {
    pub fn new(upper_return: f64, lower_return: f64, max_holding_periods: usize) -> Self {
        Self {
            upper_return,
            lower_return,
            max_holding_periods,
            ..Self::default()
        }
    }

    pub fn with_reference_field(mut self, field: impl Into<String>) -> Self {
        self.reference_field = field.into();
        self
    }

    pub fn with_touch_fields(mut self, high: impl Into<String>, low: impl Into<String>) -> Self {
        self.high_field = Some(high.into());
        self.low_field = Some(low.into());
        self
    }

    /// Field used for upper-barrier touches
    pub fn upper_touch_field(&self) -> &str {
        self.high_field.as_deref().unwrap_or(&self.reference_field)
    }

    /// Field used for lower-barrier touches
    pub fn lower_touch_field(&self) -> &str {
        self.low_field.as_deref().unwrap_or(&self.reference_field)
    }
}

impl ConfigSection for BarrierConfig {
    fn section_name() -> &'static str {
        "labeling"
    }

    fn validate(&self) -> Result<(), TradelabelError> {
        let section = Self::section_name();
        if !self.upper_return.is_finite() || self.upper_return <= 0.0 {
            return Err(invalid(
                section,
                format!("upper_return must be positive, got {}", self.upper_return),
            ));
        }
        if !self.lower_return.is_finite() || self.lower_return >= 0.0 {
            return Err(invalid(
                section,
                format!("lower_return must be negative, got {}", self.lower_return),
            ));
        }
        if self.lower_return <= -1.0 {
            return Err(invalid(
                section,
                "lower_return must be greater than -1 (price cannot fall below zero)",
            ));
        }
        if self.max_holding_periods == 0 {
            return Err(invalid(section, "max_holding_periods must be at least 1"));
        }
        if self.reference_field.trim().is_empty() {
            return Err(invalid(section, "reference_field must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BarrierConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_barriers() {
        assert!(BarrierConfig::new(-0.01, -0.02, 5).validate().is_err());
        assert!(BarrierConfig::new(0.03, 0.02, 5).validate().is_err());
        assert!(BarrierConfig::new(0.03, 0.0, 5).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_holding() {
        let err = BarrierConfig::new(0.03, -0.02, 0).validate().unwrap_err();
        assert!(matches!(err, TradelabelError::Configuration(_)));
    }

    #[test]
    fn test_touch_fields_fall_back_to_reference() {
        let config = BarrierConfig::default();
        assert_eq!(config.upper_touch_field(), "Close");
        assert_eq!(config.lower_touch_field(), "Close");

        let config = config.with_touch_fields("High", "Low");
        assert_eq!(config.upper_touch_field(), "High");
        assert_eq!(config.lower_touch_field(), "Low");
    }
}
