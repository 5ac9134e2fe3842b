//! Per-cell multiplier accumulators

use serde::{Deserialize, Serialize};

use crate::grid::Coord;

/// Hard ceiling on any single cell multiplier.
pub const MULTIPLIER_CAP: f64 = (1u64 << 40) as f64;

/// Ceiling on the multiplier product over a cluster's cells.
pub const PRODUCT_CAP: f64 = 1e12;

/// rows×cols matrix of multiplier values.
///
/// Values are monotonically non-decreasing within a spin (each cluster hit
/// multiplies the hit cells, clamped to [`MULTIPLIER_CAP`]) and are reset to
/// the initial value only at spin boundaries, never between cascade steps
/// or bonus sub-spins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    initial: f64,
    cap: f64,
}

impl MultiplierGrid {
    pub fn new(rows: usize, cols: usize, initial: f64) -> Self {
        Self::with_cap(rows, cols, initial, MULTIPLIER_CAP)
    }

    pub fn with_cap(rows: usize, cols: usize, initial: f64, cap: f64) -> Self {
        Self {
            rows,
            cols,
            values: vec![initial; rows * cols],
            initial,
            cap,
        }
    }

    /// Restore every cell to the initial value.
    pub fn reset(&mut self) {
        self.values.fill(self.initial);
    }

    pub fn get(&self, coord: Coord) -> f64 {
        self.values[coord.flat_index(self.cols)]
    }

    /// Multiply one cell by `factor`, clamped to the cap.
    pub fn multiply(&mut self, coord: Coord, factor: f64) {
        let idx = coord.flat_index(self.cols);
        let current = self.values[idx];
        if current >= self.cap {
            self.values[idx] = self.cap;
            return;
        }
        let next = current * factor;
        self.values[idx] = if next > self.cap { self.cap } else { next };
    }

    /// Sum of multiplier values over `cells`.
    pub fn sum_over(&self, cells: &[Coord]) -> f64 {
        cells.iter().map(|&c| self.get(c)).sum()
    }

    /// Product of multiplier values over `cells`, capped at [`PRODUCT_CAP`].
    pub fn product_over(&self, cells: &[Coord]) -> f64 {
        let mut product = 1.0;
        for &cell in cells {
            product *= self.get(cell);
            if product >= PRODUCT_CAP {
                return PRODUCT_CAP;
            }
        }
        product
    }

    /// Copy of the multiplier state as nested rows, for transcripts.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|r| self.values[r * self.cols..(r + 1) * self.cols].to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_initial() {
        let mult = MultiplierGrid::new(2, 2, 1.0);
        assert_relative_eq!(mult.sum_over(&[Coord::new(0, 0), Coord::new(1, 1)]), 2.0);
    }

    #[test]
    fn test_multiply_compounds() {
        let mut mult = MultiplierGrid::new(2, 2, 1.0);
        mult.multiply(Coord::new(0, 0), 2.0);
        mult.multiply(Coord::new(0, 0), 2.0);
        assert_relative_eq!(mult.get(Coord::new(0, 0)), 4.0);
    }

    #[test]
    fn test_multiply_clamps_at_cap() {
        let mut mult = MultiplierGrid::with_cap(1, 1, 1.0, 8.0);
        for _ in 0..10 {
            mult.multiply(Coord::new(0, 0), 2.0);
        }
        assert_relative_eq!(mult.get(Coord::new(0, 0)), 8.0);
    }

    #[test]
    fn test_values_never_decrease() {
        let mut mult = MultiplierGrid::new(1, 1, 1.0);
        let mut prev = mult.get(Coord::new(0, 0));
        for _ in 0..50 {
            mult.multiply(Coord::new(0, 0), 2.0);
            let cur = mult.get(Coord::new(0, 0));
            assert!(cur >= prev);
            assert!(cur <= MULTIPLIER_CAP);
            prev = cur;
        }
    }

    #[test]
    fn test_product_capped() {
        let mut mult = MultiplierGrid::new(1, 4, 1.0);
        let cells: Vec<Coord> = (0..4).map(|c| Coord::new(0, c)).collect();
        for &cell in &cells {
            for _ in 0..40 {
                mult.multiply(cell, 2.0);
            }
        }
        assert_relative_eq!(mult.product_over(&cells), PRODUCT_CAP);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut mult = MultiplierGrid::new(2, 2, 1.0);
        mult.multiply(Coord::new(1, 1), 2.0);
        mult.reset();
        assert_relative_eq!(mult.get(Coord::new(1, 1)), 1.0);
    }
}
