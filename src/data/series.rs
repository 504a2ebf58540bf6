use crate::error::{Result, TradelabelError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Time-ordered price data for one ticker, stored column-wise.
///
/// Timestamps are strictly increasing. Every field column has one cell per
/// timestamp; a cell is `None` when the source value was missing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    timestamps: Vec<DateTime<Utc>>,
    fields: HashMap<String, Vec<Option<f64>>>,
}

impl PriceSeries {
    /// Create a series with no fields yet. Fails on an empty or unordered index.
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(TradelabelError::Configuration(
                "Price series is empty".to_string(),
            ));
        }

        if let Some(pos) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TradelabelError::Configuration(format!(
                "Timestamps must be strictly increasing: record {} ({}) follows {}",
                pos + 1,
                timestamps[pos + 1],
                timestamps[pos]
            )));
        }

        Ok(Self {
            timestamps,
            fields: HashMap::new(),
        })
    }

    /// Convenience constructor for a single fully-populated price field
    pub fn from_prices(
        timestamps: Vec<DateTime<Utc>>,
        field: &str,
        prices: Vec<f64>,
    ) -> Result<Self> {
        Self::new(timestamps)?.with_field(field, prices.into_iter().map(Some).collect())
    }

    pub fn with_field(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != self.timestamps.len() {
            return Err(TradelabelError::Data(format!(
                "Field '{}' has {} values for {} timestamps",
                name,
                values.len(),
                self.timestamps.len()
            )));
        }
        self.fields.insert(name.to_string(), values);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn timestamp(&self, idx: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(idx).copied()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Column for `name`; absent fields are a data error at the first record
    pub fn field(&self, name: &str) -> Result<&[Option<f64>]> {
        self.fields
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| {
                TradelabelError::data_at(
                    0,
                    name,
                    format!("is missing (available: {:?})", self.field_names()),
                )
            })
    }

    /// Single value, failing on a missing or non-finite cell
    pub fn value(&self, name: &str, idx: usize) -> Result<f64> {
        let column = self.field(name)?;
        let cell = column.get(idx).ok_or_else(|| {
            TradelabelError::data_at(idx, name, format!("is out of range (len {})", column.len()))
        })?;
        match cell {
            Some(v) if v.is_finite() => Ok(*v),
            Some(v) => Err(TradelabelError::data_at(idx, name, format!("is not finite ({})", v))),
            None => Err(TradelabelError::data_at(idx, name, "is null")),
        }
    }

    pub fn date_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        // `new` guarantees at least one timestamp
        (self.timestamps[0], self.timestamps[self.timestamps.len() - 1])
    }
}
