// src/engines/metrics/risk.rs
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS: usize = 252;

/// Risk figures over a per-period return series; `None` when undefined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub calmar_ratio: Option<f64>,
}

pub struct RiskMetrics;

impl RiskMetrics {
    pub fn calculate(returns: &[f64]) -> RiskReport {
        RiskReport {
            sharpe_ratio: Self::sharpe_ratio(returns, 0.0, TRADING_DAYS),
            max_drawdown: Self::max_drawdown(&Self::cumulative(returns)),
            calmar_ratio: Self::calmar_ratio(returns, TRADING_DAYS),
        }
    }

    /// Annualised Sharpe ratio with sample standard deviation
    pub fn sharpe_ratio(
        returns: &[f64],
        risk_free_rate: f64,
        periods_per_year: usize,
    ) -> Option<f64> {
        if returns.len() < 2 {
            return None;
        }

        let per_period_rf = risk_free_rate / periods_per_year as f64;
        let excess: Vec<f64> = returns.iter().map(|r| r - per_period_rf).collect();
        let std = Self::sample_std(&excess)?;
        if std <= f64::EPSILON {
            return None;
        }

        Some((periods_per_year as f64).sqrt() * Self::mean(&excess) / std)
    }

    /// Deepest fall from a running peak, as a non-positive fraction
    pub fn max_drawdown(curve: &[f64]) -> Option<f64> {
        if curve.len() < 2 {
            return None;
        }

        let mut peak = curve[0];
        let mut max_dd = 0.0;

        for &value in curve {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                let dd = (value - peak) / peak;
                if dd < max_dd {
                    max_dd = dd;
                }
            }
        }

        Some(max_dd)
    }

    /// Annualised mean return over the absolute max drawdown
    pub fn calmar_ratio(returns: &[f64], periods_per_year: usize) -> Option<f64> {
        if returns.len() < 2 {
            return None;
        }

        let annual_return = Self::mean(returns) * periods_per_year as f64;
        let max_dd = Self::max_drawdown(&Self::cumulative(returns))?;
        if max_dd == 0.0 {
            return None;
        }

        Some(annual_return / max_dd.abs())
    }

    /// Compounded growth curve: (1 + r1), (1 + r1)(1 + r2), ...
    pub fn cumulative(returns: &[f64]) -> Vec<f64> {
        returns
            .iter()
            .scan(1.0, |acc, r| {
                *acc *= 1.0 + r;
                Some(*acc)
            })
            .collect()
    }

    /// Simple period-over-period returns of a price path
    pub fn period_returns(prices: &[f64]) -> Vec<f64> {
        prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
    }

    pub(crate) fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }

        let mean = Self::mean(values);
        let variance =
            values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

        Some(variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETURNS: [f64; 7] = [0.01, -0.02, 0.03, -0.01, 0.02, 0.01, -0.015];

    #[test]
    fn test_sharpe_ratio() {
        let sharpe = RiskMetrics::sharpe_ratio(&RETURNS, 0.0, TRADING_DAYS).unwrap();

        let mean = RETURNS.iter().sum::<f64>() / 7.0;
        let std = (RETURNS.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 6.0).sqrt();
        assert!((sharpe - 252f64.sqrt() * mean / std).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_values() {
        assert_eq!(RiskMetrics::sharpe_ratio(&[0.01], 0.0, TRADING_DAYS), None);
        assert_eq!(RiskMetrics::sharpe_ratio(&[0.01, 0.01, 0.01], 0.0, TRADING_DAYS), None);
        assert_eq!(RiskMetrics::max_drawdown(&[1.0]), None);
        // Monotone gains never draw down
        assert_eq!(RiskMetrics::calmar_ratio(&[0.01, 0.02, 0.03], TRADING_DAYS), None);
    }

    #[test]
    fn test_max_drawdown() {
        let dd = RiskMetrics::max_drawdown(&[1.0, 1.1, 1.05, 1.15, 1.0]).unwrap();
        assert!((dd - (1.0 - 1.15) / 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_calmar_ratio() {
        let calmar = RiskMetrics::calmar_ratio(&RETURNS, TRADING_DAYS).unwrap();
        let max_dd = RiskMetrics::max_drawdown(&RiskMetrics::cumulative(&RETURNS)).unwrap();
        let expected = RETURNS.iter().sum::<f64>() / 7.0 * 252.0 / max_dd.abs();
        assert!((calmar - expected).abs() < 1e-9);
        assert!(calmar > 0.0);
    }

    #[test]
    fn test_report_serializes_undefined_as_null() {
        let report = RiskMetrics::calculate(&[0.01]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["sharpe_ratio"].is_null());
    }
}
