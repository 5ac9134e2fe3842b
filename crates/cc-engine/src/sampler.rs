//! Weighted symbol sampling via cumulative-weight lookup

use crate::config::{Mode, Weights};
use crate::rng::{GameRng, RngError};

/// Draws symbols from the per-mode weight tables.
///
/// A draw generates a uniform integer in `[0, total_weight)` and locates the
/// owning symbol by binary search over the cumulative table.
pub struct WeightedSampler<'a> {
    weights: &'a Weights,
}

impl<'a> WeightedSampler<'a> {
    pub fn new(weights: &'a Weights) -> Self {
        Self { weights }
    }

    pub fn sample(&self, mode: Mode, rng: &mut dyn GameRng) -> Result<crate::Symbol, RngError> {
        let table = match mode {
            Mode::Base => &self.weights.base,
            Mode::Bonus => &self.weights.bonus,
        };
        let roll = rng.next_int(table.total())?;
        Ok(table.symbol_for_roll(roll))
    }
}
