//! Report derivation from accumulated statistics.

use serde::{Deserialize, Serialize};

use crate::stats::{Histogram, SimStats};

/// Payout percentiles as win multiples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Fractions of spins at or above notable win multiples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRates {
    pub gte_100x: f64,
    pub gte_1000x: f64,
    pub gte_5000x: f64,
    pub cap_hit_rate: f64,
}

/// 95% confidence interval around the mean win.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

/// Final statistical profile of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub spins: u64,
    pub mean_win_x: f64,
    /// Return to player; wins are bet multiples, so this equals the mean.
    pub rtp: f64,
    pub variance: f64,
    pub stddev: f64,
    pub std_error: f64,
    pub ci95: ConfidenceInterval,
    /// Fraction of spins with any win.
    pub hit_rate: f64,
    /// Fraction of spins that entered the bonus.
    pub bonus_frequency: f64,
    pub avg_cascades: f64,
    /// Mean free spins per triggered bonus.
    pub avg_bonus_length: f64,
    pub quantiles: Quantiles,
    pub tail_rates: TailRates,
    /// Carried only when quantiles were derived from the histogram.
    pub histogram: Option<Histogram>,
}

impl SimReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Derive the report from merged worker statistics.
///
/// Sample variance uses the sum-of-squares identity with Bessel's
/// correction; it is 0 for fewer than two spins. Quantiles come from the
/// exact sorted payouts when the run retained them, otherwise from the
/// histogram.
pub fn finalize_report(stats: &SimStats) -> SimReport {
    let n = stats.count;
    let nf = n as f64;
    let mean = if n > 0 { stats.sum / nf } else { 0.0 };
    let variance = if n > 1 {
        (stats.sum_sq - (stats.sum * stats.sum) / nf) / (nf - 1.0)
    } else {
        0.0
    };
    let stddev = variance.max(0.0).sqrt();
    let std_error = if n > 0 { stddev / nf.sqrt() } else { 0.0 };
    let quantiles = match stats.payouts.as_deref() {
        Some(payouts) => exact_quantiles(payouts),
        None => histogram_quantiles(&stats.histogram),
    };
    let rate = |count: u64| if n > 0 { count as f64 / nf } else { 0.0 };
    SimReport {
        spins: n,
        mean_win_x: mean,
        rtp: mean,
        variance,
        stddev,
        std_error,
        ci95: ConfidenceInterval {
            low: mean - 1.96 * std_error,
            high: mean + 1.96 * std_error,
        },
        hit_rate: rate(stats.hit_count),
        bonus_frequency: rate(stats.bonus_count),
        avg_cascades: rate(stats.total_cascades),
        avg_bonus_length: if stats.bonus_count > 0 {
            stats.total_bonus_spins as f64 / stats.bonus_count as f64
        } else {
            0.0
        },
        quantiles,
        tail_rates: TailRates {
            gte_100x: rate(stats.tail_100),
            gte_1000x: rate(stats.tail_1000),
            gte_5000x: rate(stats.tail_5000),
            cap_hit_rate: rate(stats.cap_hit_count),
        },
        histogram: stats
            .payouts
            .is_none()
            .then(|| stats.histogram.clone()),
    }
}

fn exact_quantiles(payouts: &[f64]) -> Quantiles {
    if payouts.is_empty() {
        return Quantiles {
            p50: 0.0,
            p90: 0.0,
            p95: 0.0,
            p99: 0.0,
        };
    }
    let mut sorted = payouts.to_vec();
    sorted.sort_by(f64::total_cmp);
    Quantiles {
        p50: percentile(&sorted, 0.5),
        p90: percentile(&sorted, 0.9),
        p95: percentile(&sorted, 0.95),
        p99: percentile(&sorted, 0.99),
    }
}

/// Linear interpolation at fractional rank `(len - 1) × p` over a sorted
/// slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (sorted.len() - 1) as f64 * p;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let w = idx - lo as f64;
    sorted[lo] * (1.0 - w) + sorted[hi] * w
}

fn histogram_quantiles(histogram: &Histogram) -> Quantiles {
    let total = histogram.total();
    Quantiles {
        p50: histogram_quantile(histogram, total, 0.5),
        p90: histogram_quantile(histogram, total, 0.9),
        p95: histogram_quantile(histogram, total, 0.95),
        p99: histogram_quantile(histogram, total, 0.99),
    }
}

/// Midpoint of the bucket containing the target rank; the unbounded last
/// bucket reports its lower edge.
fn histogram_quantile(histogram: &Histogram, total: u64, q: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let target = total as f64 * q;
    let mut cum = 0.0;
    for (i, &count) in histogram.counts.iter().enumerate() {
        if cum + count as f64 >= target {
            let lo = histogram.edges[i];
            let hi = histogram.edges[i + 1];
            if !hi.is_finite() {
                return lo;
            }
            return (lo + hi) / 2.0;
        }
        cum += count as f64;
    }
    histogram.edges[histogram.edges.len() - 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats_with_payouts(payouts: &[f64]) -> SimStats {
        let mut stats = SimStats::new(Histogram::default(), true);
        for &value in payouts {
            stats.record_spin(
                &cc_engine::SpinResult {
                    total_win_x: value,
                    base_win_x: value,
                    bonus_win_x: 0.0,
                    bonus_triggered: false,
                    bonus_spins_played: 0,
                    cap_hit: false,
                },
                0,
            );
        }
        stats
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [0.0, 0.0, 1.0, 2.0, 5.0];
        assert_relative_eq!(percentile(&sorted, 0.5), 1.0);
        assert_relative_eq!(percentile(&sorted, 0.0), 0.0);
        assert_relative_eq!(percentile(&sorted, 1.0), 5.0);
        // Rank 3.6 sits between 2.0 and 5.0.
        assert_relative_eq!(percentile(&sorted, 0.9), 2.0 * 0.4 + 5.0 * 0.6);
    }

    #[test]
    fn test_variance_matches_two_pass_formula() {
        let values = [1.0, 3.0, 5.0, 7.0];
        let report = finalize_report(&stats_with_payouts(&values));
        let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
        let expected: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
            / (values.len() - 1) as f64;
        assert_relative_eq!(report.mean_win_x, mean);
        assert_relative_eq!(report.variance, expected, epsilon = 1e-9);
        assert_relative_eq!(report.stddev, expected.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_single_spin_has_zero_variance() {
        let report = finalize_report(&stats_with_payouts(&[4.0]));
        assert_relative_eq!(report.variance, 0.0);
        assert_relative_eq!(report.std_error, 0.0);
        assert_relative_eq!(report.ci95.low, 4.0);
        assert_relative_eq!(report.ci95.high, 4.0);
    }

    #[test]
    fn test_empty_stats_report_all_zero() {
        let report = finalize_report(&SimStats::default());
        assert_eq!(report.spins, 0);
        assert_relative_eq!(report.mean_win_x, 0.0);
        assert_relative_eq!(report.hit_rate, 0.0);
        assert_relative_eq!(report.quantiles.p99, 0.0);
    }

    #[test]
    fn test_exact_quantiles_suppress_histogram() {
        let report = finalize_report(&stats_with_payouts(&[0.0, 1.0, 2.0]));
        assert!(report.histogram.is_none());
    }

    #[test]
    fn test_histogram_quantile_uses_bucket_midpoint() {
        let mut stats = SimStats::new(Histogram::new(vec![0.0, 10.0, 20.0, f64::INFINITY]), false);
        stats.histogram.counts = vec![6, 3, 1];
        stats.count = 10;
        let report = finalize_report(&stats);
        assert_relative_eq!(report.quantiles.p50, 5.0);
        assert_relative_eq!(report.quantiles.p90, 15.0);
        // Target rank lands in the unbounded bucket: lower edge.
        assert_relative_eq!(report.quantiles.p99, 20.0);
        assert!(report.histogram.is_some());
    }

    #[test]
    fn test_report_serializes() {
        let report = finalize_report(&stats_with_payouts(&[0.0, 2.0]));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"rtp\""));
        assert!(json.contains("\"ci95\""));
    }
}
