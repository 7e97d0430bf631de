//! Load balance metrics.
//!
//! Quantifies how evenly a schedule spreads committed minutes across
//! the horizon — the quantity the refinement pass drives down.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Sum of committed minutes |
//! | Max / Min | Heaviest and lightest day |
//! | Spread | Max − min |
//! | Mean | Total / horizon |
//! | Std Dev | Population standard deviation of day loads |

use super::ledger::LoadLedger;

/// Per-run load balance indicators. All values are minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadKpi {
    /// Sum of committed minutes over the horizon.
    pub total_minutes: i64,
    /// Load of the heaviest day.
    pub max_minutes: i64,
    /// Load of the lightest day.
    pub min_minutes: i64,
    /// Max − min.
    pub spread_minutes: i64,
    /// Mean daily load.
    pub mean_minutes: f64,
    /// Population standard deviation of daily loads.
    pub std_dev_minutes: f64,
    /// Day index (0 = today) of the heaviest day; earliest on ties.
    pub busiest_day: i64,
}

impl LoadKpi {
    /// Computes balance metrics from a ledger.
    pub fn calculate(ledger: &LoadLedger) -> Self {
        let days = ledger.minutes();
        let total: i64 = days.iter().sum();
        let max = days.iter().copied().max().unwrap_or(0);
        let min = days.iter().copied().min().unwrap_or(0);
        let busiest_day = days
            .iter()
            .position(|&m| m == max)
            .unwrap_or(0) as i64;

        let n = days.len() as f64;
        let mean = total as f64 / n;
        let variance = days
            .iter()
            .map(|&m| {
                let d = m as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            total_minutes: total,
            max_minutes: max,
            min_minutes: min,
            spread_minutes: max - min,
            mean_minutes: mean,
            std_dev_minutes: variance.sqrt(),
            busiest_day,
        }
    }
}
