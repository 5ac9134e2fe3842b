//! # cc-sim: Monte-Carlo Batch Simulator
//!
//! Runs large spin batches against the cc-engine resolver and derives the
//! statistical profile of a game configuration: RTP with confidence bounds,
//! hit and bonus rates, payout quantiles and tail rates.
//!
//! ## Architecture
//!
//! ```text
//! run_simulation(config, rng_factory, options)
//!     │
//!     ├── partition_spins        (even split, remainder to first workers)
//!     ├── rayon fan-out          (worker i: seed = base + i × 101)
//!     │     └── SimStats         (private per-worker accumulator)
//!     ├── SimStats::merge        (elementwise fan-in)
//!     └── finalize_report        (mean / variance / CI / quantiles / tails)
//! ```
//!
//! Workers share nothing; any worker error aborts the whole run with no
//! partial results.

pub mod report;
pub mod runner;
pub mod stats;

pub use report::*;
pub use runner::*;
pub use stats::*;
