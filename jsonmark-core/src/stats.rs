// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Order statistics over sampled measurements.

use serde::{Deserialize, Serialize};

/// Quantile of sorted samples with linear interpolation between ranks.
///
/// Position is `q * (n - 1)`. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Arithmetic mean.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Max, median and 95th percentile of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub max: f64,
    pub median: f64,
    pub p95: f64,
}

impl OrderStats {
    /// Calculate from unsorted samples. `None` when there are none.
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        samples.sort_unstable_by(f64::total_cmp);
        Some(Self {
            max: *samples.last()?,
            median: quantile(&samples, 0.5)?,
            p95: quantile(&samples, 0.95)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_order_stats_interpolate() {
        let samples: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let stats = OrderStats::from_samples(samples).unwrap();

        assert!(close(stats.max, 10.0));
        assert!(close(stats.median, 5.5));
        assert!(close(stats.p95, 9.55));
    }

    #[test]
    fn test_single_sample() {
        let stats = OrderStats::from_samples(vec![42.0]).unwrap();
        assert_eq!(
            stats,
            OrderStats {
                max: 42.0,
                median: 42.0,
                p95: 42.0
            }
        );
    }

    #[test]
    fn test_empty() {
        assert!(OrderStats::from_samples(Vec::new()).is_none());
        assert!(quantile(&[], 0.5).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_quantile_bounds() {
        let sorted = [1.0, 2.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&sorted, 0.75), Some(3.0));
        assert!(close(mean(&sorted).unwrap(), 7.0 / 3.0));
    }
}
