//! Parallel simulation runner: spin partitioning, worker fan-out with
//! deterministic per-worker seeds, and fan-in to a single report.

use cc_engine::{simulate_spin, GameConfig, GameRng, RandBridge, RngError, XorShift32Rng};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::{finalize_report, ConfidenceInterval, SimReport};
use crate::stats::{Histogram, SimStats, DEFAULT_HISTOGRAM_EDGES, DEFAULT_PAYOUT_RETENTION};

/// Offset between consecutive worker (and batch) seeds.
pub const SEED_STRIDE: u64 = 101;

/// Errors of a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation requested zero spins")]
    NoSpins,
    #[error("worker {worker}: {source}")]
    Rng {
        worker: usize,
        #[source]
        source: RngError,
    },
}

/// Batch run parameters.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub spins: u64,
    /// 0 selects the machine's logical CPU count.
    pub workers: usize,
    pub base_seed: u64,
    /// Exact payouts are retained when `spins` does not exceed this.
    pub store_payouts_up_to: u64,
    /// `None` selects [`DEFAULT_HISTOGRAM_EDGES`].
    pub histogram_edges: Option<Vec<f64>>,
}

impl SimOptions {
    pub fn new(spins: u64) -> Self {
        Self {
            spins,
            workers: 1,
            base_seed: 1,
            store_payouts_up_to: DEFAULT_PAYOUT_RETENTION,
            histogram_edges: None,
        }
    }
}

/// Builds one private generator per worker from that worker's seed.
pub trait RngFactory: Send + Sync {
    fn create(&self, seed: u64) -> Box<dyn GameRng>;
}

impl<F> RngFactory for F
where
    F: Fn(u64) -> Box<dyn GameRng> + Send + Sync,
{
    fn create(&self, seed: u64) -> Box<dyn GameRng> {
        self(seed)
    }
}

/// The production xorshift32 generator family.
pub fn xorshift_factory() -> impl RngFactory {
    |seed: u64| Box::new(XorShift32Rng::new(seed)) as Box<dyn GameRng>
}

/// ChaCha8 generator family; statistically independent streams without
/// relying on seed striding.
pub fn chacha_factory() -> impl RngFactory {
    |seed: u64| Box::new(RandBridge::new(ChaCha8Rng::seed_from_u64(seed))) as Box<dyn GameRng>
}

/// Split `spins` into `workers` shares, remainder to the first workers.
pub fn partition_spins(spins: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let per = spins / workers;
    let remainder = spins % workers;
    (0..workers)
        .map(|i| per + u64::from(i < remainder))
        .collect()
}

/// Run `options.spins` spins across parallel workers and derive the report.
///
/// Worker `i` simulates its share on a private generator seeded with
/// `base_seed + i × SEED_STRIDE`. The run is deterministic for a fixed
/// (factory, options) pair, including the worker count.
pub fn run_simulation(
    config: &GameConfig,
    rng_factory: &dyn RngFactory,
    options: &SimOptions,
) -> Result<SimReport, SimError> {
    if options.spins == 0 {
        return Err(SimError::NoSpins);
    }
    let workers = if options.workers == 0 {
        num_cpus::get()
    } else {
        options.workers
    };
    let shares = partition_spins(options.spins, workers);
    let keep_payouts = options.spins <= options.store_payouts_up_to;
    let edges = options
        .histogram_edges
        .clone()
        .unwrap_or_else(|| DEFAULT_HISTOGRAM_EDGES.to_vec());
    debug!(
        "simulation fan-out: {} spins over {workers} workers, base seed {}",
        options.spins, options.base_seed
    );
    let partials: Result<Vec<SimStats>, SimError> = shares
        .par_iter()
        .enumerate()
        .map(|(worker, &spins)| {
            let seed = options.base_seed + worker as u64 * SEED_STRIDE;
            run_worker(config, rng_factory, spins, seed, keep_payouts, &edges)
                .map_err(|source| SimError::Rng { worker, source })
        })
        .collect();
    let mut merged = SimStats::new(Histogram::new(edges), keep_payouts);
    for partial in partials? {
        merged.merge(partial);
    }
    debug!("simulation fan-in: {} spins merged", merged.count);
    Ok(finalize_report(&merged))
}

fn run_worker(
    config: &GameConfig,
    rng_factory: &dyn RngFactory,
    spins: u64,
    seed: u64,
    keep_payouts: bool,
    edges: &[f64],
) -> Result<SimStats, RngError> {
    let mut stats = SimStats::new(Histogram::new(edges.to_vec()), keep_payouts);
    let mut rng = rng_factory.create(seed);
    for _ in 0..spins {
        let sim = simulate_spin(rng.as_mut(), config)?;
        stats.record_spin(&sim.result, sim.cascades);
    }
    Ok(stats)
}

/// RTP of one batch of a convergence run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub seed: u64,
    pub mean_win_x: f64,
    pub rtp: f64,
}

/// Across-batch RTP spread of several independent simulations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batches: usize,
    pub spins_per_batch: u64,
    pub avg_rtp: f64,
    pub stddev_across_batches: f64,
    pub std_error_across_batches: f64,
    pub ci95: ConfidenceInterval,
    pub per_batch: Vec<BatchResult>,
}

impl BatchReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run `batches` independent simulations at strided base seeds and report
/// how their RTP estimates spread. Convergence check for a configuration.
pub fn run_batches(
    config: &GameConfig,
    rng_factory: &dyn RngFactory,
    options: &SimOptions,
    batches: usize,
) -> Result<BatchReport, SimError> {
    let mut per_batch = Vec::with_capacity(batches);
    for i in 0..batches {
        let seed = options.base_seed + i as u64 * SEED_STRIDE;
        let batch_options = SimOptions {
            base_seed: seed,
            ..options.clone()
        };
        let report = run_simulation(config, rng_factory, &batch_options)?;
        debug!("batch {}/{batches} seed={seed} rtp={:.6}", i + 1, report.rtp);
        per_batch.push(BatchResult {
            seed,
            mean_win_x: report.mean_win_x,
            rtp: report.rtp,
        });
    }
    let n = per_batch.len() as f64;
    let avg = if per_batch.is_empty() {
        0.0
    } else {
        per_batch.iter().map(|b| b.rtp).sum::<f64>() / n
    };
    let variance = if per_batch.len() > 1 {
        per_batch
            .iter()
            .map(|b| (b.rtp - avg) * (b.rtp - avg))
            .sum::<f64>()
            / (n - 1.0)
    } else {
        0.0
    };
    let stddev = variance.sqrt();
    let std_error = if per_batch.is_empty() { 0.0 } else { stddev / n.sqrt() };
    Ok(BatchReport {
        batches: per_batch.len(),
        spins_per_batch: options.spins,
        avg_rtp: avg,
        stddev_across_batches: stddev,
        std_error_across_batches: std_error,
        ci95: ConfidenceInterval {
            low: avg - 1.96 * std_error,
            high: avg + 1.96 * std_error,
        },
        per_batch,
    })
}
