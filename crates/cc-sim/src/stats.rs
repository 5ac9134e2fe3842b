//! Merge-able per-worker spin statistics.

use cc_engine::SpinResult;
use serde::{Deserialize, Serialize};

/// Win-multiple bucket edges used when no custom edges are supplied.
///
/// Buckets are `[edge[i], edge[i+1])`; the last bucket is unbounded.
pub const DEFAULT_HISTOGRAM_EDGES: [f64; 16] = [
    0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0,
    15000.0, f64::INFINITY,
];

/// Exact payouts are kept up to this many spins; beyond it, quantiles fall
/// back to the histogram.
pub const DEFAULT_PAYOUT_RETENTION: u64 = 1_000_000;

/// Fixed-bucket payout histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn new(edges: Vec<f64>) -> Self {
        let buckets = edges.len().saturating_sub(1);
        Self {
            edges,
            counts: vec![0; buckets],
        }
    }

    /// Count `value` in its half-open bucket; values outside every bucket
    /// land in the last one.
    pub fn record(&mut self, value: f64) {
        for i in 0..self.counts.len() {
            if value >= self.edges[i] && value < self.edges[i + 1] {
                self.counts[i] += 1;
                return;
            }
        }
        if let Some(last) = self.counts.last_mut() {
            *last += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_EDGES.to_vec())
    }
}

/// Accumulated spin counters for one worker, merge-able across workers.
///
/// Mean and variance derive from `sum`/`sum_sq` at report time, so two
/// partials merge by plain addition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimStats {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub hit_count: u64,
    pub bonus_count: u64,
    pub cap_hit_count: u64,
    pub tail_100: u64,
    pub tail_1000: u64,
    pub tail_5000: u64,
    pub total_cascades: u64,
    pub total_bonus_spins: u64,
    /// Present only when exact-quantile retention is enabled for the run.
    pub payouts: Option<Vec<f64>>,
    pub histogram: Histogram,
}

impl SimStats {
    pub fn new(histogram: Histogram, keep_payouts: bool) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            hit_count: 0,
            bonus_count: 0,
            cap_hit_count: 0,
            tail_100: 0,
            tail_1000: 0,
            tail_5000: 0,
            total_cascades: 0,
            total_bonus_spins: 0,
            payouts: keep_payouts.then(Vec::new),
            histogram,
        }
    }

    pub fn record_spin(&mut self, result: &SpinResult, cascades: u32) {
        let win = result.total_win_x;
        self.count += 1;
        self.sum += win;
        self.sum_sq += win * win;
        self.total_cascades += u64::from(cascades);
        self.total_bonus_spins += u64::from(result.bonus_spins_played);
        if win > 0.0 {
            self.hit_count += 1;
        }
        if result.bonus_triggered {
            self.bonus_count += 1;
        }
        if result.cap_hit {
            self.cap_hit_count += 1;
        }
        if win >= 100.0 {
            self.tail_100 += 1;
        }
        if win >= 1000.0 {
            self.tail_1000 += 1;
        }
        if win >= 5000.0 {
            self.tail_5000 += 1;
        }
        if let Some(payouts) = self.payouts.as_mut() {
            payouts.push(win);
        }
        self.histogram.record(win);
    }

    /// Fold `other` into `self`. Exact payouts survive a merge only when
    /// both sides kept them.
    pub fn merge(&mut self, other: SimStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.hit_count += other.hit_count;
        self.bonus_count += other.bonus_count;
        self.cap_hit_count += other.cap_hit_count;
        self.tail_100 += other.tail_100;
        self.tail_1000 += other.tail_1000;
        self.tail_5000 += other.tail_5000;
        self.total_cascades += other.total_cascades;
        self.total_bonus_spins += other.total_bonus_spins;
        self.payouts = match (self.payouts.take(), other.payouts) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend(theirs);
                Some(mine)
            }
            _ => None,
        };
        for (mine, theirs) in self.histogram.counts.iter_mut().zip(other.histogram.counts) {
            *mine += theirs;
        }
    }
}

impl Default for SimStats {
    fn default() -> Self {
        Self::new(Histogram::default(), false)
    }
}
