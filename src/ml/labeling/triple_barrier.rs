use super::types::{ExitReason, Label, LabeledRecord};
use crate::config::{BarrierConfig, ConfigSection};
use crate::data::PriceSeries;
use crate::error::{Result, TradelabelError};
use serde::Serialize;

pub struct TripleBarrierLabeler {
    config: BarrierConfig,
}

/// First barrier touched inside one look-ahead window
struct Touch {
    exit_idx: usize,
    reason: ExitReason,
}

impl TripleBarrierLabeler {
    pub fn new(config: BarrierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BarrierConfig {
        &self.config
    }

    /// Label every timestamp that has look-ahead data.
    ///
    /// Records come back in series order. The last row is never labeled, and
    /// rows whose window is cut short by the end of the series are kept only
    /// when they hit a barrier or `label_partial_windows` is set.
    pub fn label(&self, series: &PriceSeries) -> Result<Vec<LabeledRecord>> {
        if series.is_empty() {
            return Err(TradelabelError::Configuration(
                "Cannot label an empty series".to_string(),
            ));
        }

        let reference_field = self.config.reference_field.as_str();
        let upper_field = self.config.upper_touch_field();
        let lower_field = self.config.lower_touch_field();

        let reference = series.field(reference_field)?;
        let upper_values = series.field(upper_field)?;
        let lower_values = series.field(lower_field)?;

        let n = series.len();
        let mut labeled = Vec::with_capacity(n);

        for entry_idx in 0..n.saturating_sub(1) {
            let entry_price = Self::entry_price(reference, reference_field, entry_idx)?;
            let horizon_end = entry_idx.saturating_add(self.config.max_holding_periods);
            let window_end = horizon_end.min(n - 1);
            let full_window = horizon_end <= n - 1;

            let touch = self.scan_window(
                entry_idx,
                window_end,
                entry_price,
                (upper_values, upper_field),
                (lower_values, lower_field),
            )?;

            let record = match touch {
                Some(touch) => {
                    let label = match touch.reason {
                        ExitReason::Upper => Label::Up,
                        _ => Label::Down,
                    };
                    self.build_record(
                        series,
                        reference,
                        entry_idx,
                        entry_price,
                        touch.exit_idx,
                        touch.reason,
                        label,
                    )?
                }
                None if full_window || self.config.label_partial_windows => {
                    let exit_price = Self::cell(reference, reference_field, window_end)?;
                    let label = if self.config.include_neutral {
                        Label::Neutral
                    } else {
                        Label::from_return((exit_price - entry_price) / entry_price)
                    };
                    self.build_record(
                        series,
                        reference,
                        entry_idx,
                        entry_price,
                        window_end,
                        ExitReason::Time,
                        label,
                    )?
                }
                None => continue,
            };

            labeled.push(record);
        }

        log::debug!(
            "Labeled {} of {} records (max holding {})",
            labeled.len(),
            n,
            self.config.max_holding_periods
        );

        Ok(labeled)
    }

    /// Walk forward from the entry; upper is checked before lower at each step
    fn scan_window(
        &self,
        entry_idx: usize,
        window_end: usize,
        entry_price: f64,
        upper: (&[Option<f64>], &str),
        lower: (&[Option<f64>], &str),
    ) -> Result<Option<Touch>> {
        for j in (entry_idx + 1)..=window_end {
            let upper_return = (Self::cell(upper.0, upper.1, j)? - entry_price) / entry_price;
            if upper_return >= self.config.upper_return {
                return Ok(Some(Touch { exit_idx: j, reason: ExitReason::Upper }));
            }

            let lower_return = (Self::cell(lower.0, lower.1, j)? - entry_price) / entry_price;
            if lower_return <= self.config.lower_return {
                return Ok(Some(Touch { exit_idx: j, reason: ExitReason::Lower }));
            }
        }

        Ok(None)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_record(
        &self,
        series: &PriceSeries,
        reference: &[Option<f64>],
        entry_idx: usize,
        entry_price: f64,
        exit_idx: usize,
        exit_reason: ExitReason,
        label: Label,
    ) -> Result<LabeledRecord> {
        let exit_price = Self::cell(reference, &self.config.reference_field, exit_idx)?;
        let timestamps = series.timestamps();

        Ok(LabeledRecord {
            timestamp: timestamps[entry_idx],
            reference_price: entry_price,
            label,
            exit_timestamp: timestamps[exit_idx],
            exit_reason,
            exit_price,
            return_pct: (exit_price - entry_price) / entry_price,
            holding_periods: exit_idx - entry_idx,
        })
    }

    fn entry_price(column: &[Option<f64>], field: &str, idx: usize) -> Result<f64> {
        let price = Self::cell(column, field, idx)?;
        if price <= 0.0 {
            return Err(TradelabelError::data_at(
                idx,
                field,
                format!("must be positive to compute returns, got {}", price),
            ));
        }
        Ok(price)
    }

    fn cell(column: &[Option<f64>], field: &str, idx: usize) -> Result<f64> {
        match column.get(idx).copied().flatten() {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(TradelabelError::data_at(idx, field, format!("is not finite ({})", v))),
            None => Err(TradelabelError::data_at(idx, field, "is missing")),
        }
    }

    /// Analyze label distribution
    pub fn analyze_distribution(labels: &[LabeledRecord]) -> LabelStats {
        let mut stats = LabelStats::default();
        let mut up_returns = Vec::new();
        let mut down_returns = Vec::new();
        let mut neutral_returns = Vec::new();

        for record in labels {
            match record.label {
                Label::Up => {
                    stats.up_count += 1;
                    up_returns.push(record.return_pct);
                }
                Label::Down => {
                    stats.down_count += 1;
                    down_returns.push(record.return_pct);
                }
                Label::Neutral => {
                    stats.neutral_count += 1;
                    neutral_returns.push(record.return_pct);
                }
            }
            match record.exit_reason {
                ExitReason::Upper => stats.upper_exits += 1,
                ExitReason::Lower => stats.lower_exits += 1,
                ExitReason::Time => stats.time_exits += 1,
            }
            stats.total_count += 1;
        }

        if stats.total_count > 0 {
            let total = stats.total_count as f64;
            stats.up_pct = stats.up_count as f64 / total * 100.0;
            stats.down_pct = stats.down_count as f64 / total * 100.0;
            stats.neutral_pct = stats.neutral_count as f64 / total * 100.0;
            stats.avg_holding_periods =
                labels.iter().map(|r| r.holding_periods as f64).sum::<f64>() / total;
        }

        stats.up_mean_return = mean(&up_returns);
        stats.down_mean_return = mean(&down_returns);
        stats.neutral_mean_return = mean(&neutral_returns);

        stats
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LabelStats {
    pub total_count: usize,
    pub up_count: usize,
    pub down_count: usize,
    pub neutral_count: usize,
    pub up_pct: f64,
    pub down_pct: f64,
    pub neutral_pct: f64,
    pub upper_exits: usize,
    pub lower_exits: usize,
    pub time_exits: usize,
    pub avg_holding_periods: f64,
    pub up_mean_return: Option<f64>,
    pub down_mean_return: Option<f64>,
    pub neutral_mean_return: Option<f64>,
}

impl LabelStats {
    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Up => self.up_count,
            Label::Down => self.down_count,
            Label::Neutral => self.neutral_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn days(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_prices(days(prices.len()), "Close", prices.to_vec()).unwrap()
    }

    #[test]
    fn test_upper_barrier_first_touch() {
        let labeler = TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, 5)).unwrap();
        // +1%, +2%, +4% then a crash that must be ignored
        let prices = [100.0, 101.0, 102.0, 104.0, 90.0, 80.0, 80.0];
        let records = labeler.label(&series(&prices)).unwrap();

        let first = &records[0];
        assert_eq!(first.label, Label::Up);
        assert_eq!(first.exit_reason, ExitReason::Upper);
        assert_eq!(first.holding_periods, 3);
        assert_eq!(first.exit_timestamp, days(7)[3]);
    }

    #[test]
    fn test_unbounded_holding_stays_inside_series() {
        let labeler =
            TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, usize::MAX)).unwrap();
        let records = labeler.label(&series(&[100.0, 100.5, 101.0, 100.8])).unwrap();

        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.exit_reason, ExitReason::Time);
            assert_eq!(record.exit_timestamp, days(4)[3]);
            assert_eq!(record.holding_periods, 3 - i);
        }
    }

    #[test]
    fn test_lower_barrier() {
        let labeler = TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, 3)).unwrap();
        let records = labeler.label(&series(&[100.0, 99.5, 97.9, 120.0, 120.0])).unwrap();

        assert_eq!(records[0].label, Label::Down);
        assert_eq!(records[0].exit_reason, ExitReason::Lower);
        assert_eq!(records[0].holding_periods, 2);
        assert!((records[0].return_pct - (-0.021)).abs() < 1e-12);
    }

    #[test]
    fn test_time_barrier_sign_without_neutral() {
        let mut config = BarrierConfig::new(0.10, -0.10, 2);
        config.include_neutral = false;
        let labeler = TripleBarrierLabeler::new(config).unwrap();
        let records = labeler.label(&series(&[100.0, 101.0, 102.0, 101.0, 100.0])).unwrap();

        assert_eq!(records[0].exit_reason, ExitReason::Time);
        assert_eq!(records[0].label, Label::Up);
        assert_eq!(records[2].label, Label::Down);
    }

    #[test]
    fn test_partial_windows_dropped_when_disabled() {
        let mut config = BarrierConfig::new(0.03, -0.02, 3);
        config.label_partial_windows = false;
        let labeler = TripleBarrierLabeler::new(config).unwrap();
        // Index 3 hits the upper barrier inside its partial window, index 4 does not
        let records = labeler.label(&series(&[100.0, 100.0, 100.0, 100.0, 100.0, 104.0])).unwrap();

        let labeled_ts: Vec<_> = records.iter().map(|r| r.timestamp).collect();
        let ts = days(6);
        assert_eq!(labeled_ts, vec![ts[0], ts[1], ts[2], ts[3], ts[4]]);

        let flat = labeler.label(&series(&[100.0; 6])).unwrap();
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_missing_reference_field() {
        let labeler = TripleBarrierLabeler::new(
            BarrierConfig::new(0.03, -0.02, 5).with_reference_field("Adj Close"),
        )
        .unwrap();
        let err = labeler.label(&series(&[100.0, 101.0])).unwrap_err();
        assert!(matches!(err, TradelabelError::Data(_)));
    }

    #[test]
    fn test_null_reference_aborts_scan() {
        let s = PriceSeries::new(days(4))
            .unwrap()
            .with_field("Close", vec![Some(100.0), Some(100.0), None, Some(100.0)])
            .unwrap();
        let labeler = TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, 5)).unwrap();

        let err = labeler.label(&s).unwrap_err();
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_non_positive_entry_price() {
        let labeler = TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, 5)).unwrap();
        let err = labeler.label(&series(&[0.0, 1.0, 2.0])).unwrap_err();
        assert!(matches!(err, TradelabelError::Data(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TripleBarrierLabeler::new(BarrierConfig::new(0.03, 0.01, 5));
        assert!(matches!(result, Err(TradelabelError::Configuration(_))));
    }

    #[test]
    fn test_distribution() {
        let labeler = TripleBarrierLabeler::new(BarrierConfig::new(0.03, -0.02, 2)).unwrap();
        let records = labeler.label(&series(&[100.0, 104.0, 100.0, 100.0, 97.0])).unwrap();
        let stats = TripleBarrierLabeler::analyze_distribution(&records);

        assert_eq!(stats.total_count, records.len());
        assert_eq!(stats.up_count + stats.down_count + stats.neutral_count, stats.total_count);
        assert_eq!(stats.upper_exits + stats.lower_exits + stats.time_exits, stats.total_count);
        assert!((stats.up_pct + stats.down_pct + stats.neutral_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_of_nothing() {
        let stats = TripleBarrierLabeler::analyze_distribution(&[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.up_pct, 0.0);
        assert!(stats.up_mean_return.is_none());
    }
}
