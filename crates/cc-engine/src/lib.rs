//! # cc-engine: Cluster-Cascade Resolution Engine
//!
//! Resolves a single play ("spin") of a cascading cluster-pays game on a
//! grid of symbols: connected-component clustering, wild-symbol assignment,
//! win computation, board collapse/refill and the base/bonus orchestration
//! loop, with per-cell multiplier accumulation and a hard win cap.
//!
//! ## Architecture
//!
//! ```text
//! spin()
//!     │
//!     ├── Grid / MultiplierGrid (per-spin mutable state)
//!     ├── WeightedSampler (base + bonus CDF tables)
//!     ├── GameRng (seeded xorshift / scripted replay / rand bridge)
//!     └── run_cascades (resolve → remove → collapse → refill loop)
//!           │
//!           v
//!     SpinResult + SpinTranscript
//! ```
//!
//! The transcript is an observational side channel for replay tooling;
//! `SpinResult` never depends on whether it was captured.

pub mod cascade;
pub mod config;
pub mod grid;
pub mod multiplier;
pub mod rng;
pub mod sampler;
pub mod spin;
pub mod symbols;
pub mod transcript;

pub use cascade::*;
pub use config::*;
pub use grid::*;
pub use multiplier::*;
pub use rng::*;
pub use sampler::*;
pub use spin::*;
pub use symbols::*;
pub use transcript::*;
