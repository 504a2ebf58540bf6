use crate::error::TradelabelError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), TradelabelError>;
}

/// Substitute `{ticker}` placeholders in a path template
pub fn resolve_template(template: &str, ticker: &str) -> String {
    template.replace("{ticker}", ticker)
}

pub(crate) fn invalid(section: &str, message: impl Into<String>) -> TradelabelError {
    TradelabelError::Configuration(format!("[{}] {}", section, message.into()))
}
