use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Down = -1,   // Lower barrier first, or negative time exit without neutral
    Neutral = 0, // Time barrier
    Up = 1,      // Upper barrier first
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Down, Label::Neutral, Label::Up];

    pub fn as_i8(self) -> i8 {
        self as i8
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Down),
            0 => Some(Self::Neutral),
            1 => Some(Self::Up),
            _ => None,
        }
    }

    /// Sign of a return, used for time exits when neutral labels are disabled
    pub fn from_return(return_pct: f64) -> Self {
        if return_pct > 0.0 {
            Self::Up
        } else if return_pct < 0.0 {
            Self::Down
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitReason {
    Upper, // Profit barrier
    Lower, // Stop barrier
    Time,  // Holding period exhausted or series ended
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Time => "time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of entering at one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub timestamp: DateTime<Utc>,
    pub reference_price: f64,
    pub label: Label,
    pub exit_timestamp: DateTime<Utc>,
    pub exit_reason: ExitReason,
    pub exit_price: f64,
    pub return_pct: f64,
    pub holding_periods: usize,
}

impl LabeledRecord {
    /// Columns usable for per-fold statistics
    pub const NUMERIC_COLUMNS: [&'static str; 5] =
        ["reference_price", "exit_price", "return_pct", "holding_periods", "label"];

    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        match column {
            "reference_price" => Some(self.reference_price),
            "exit_price" => Some(self.exit_price),
            "return_pct" => Some(self.return_pct),
            "holding_periods" => Some(self.holding_periods as f64),
            "label" => Some(self.label.as_i8() as f64),
            _ => None,
        }
    }
}
