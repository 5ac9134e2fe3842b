//! Mutable symbol grid with bounds-checked access and snapshotting

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// A 0-indexed (row, column) board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Flat row-major index; all per-cell lookup structures key on this.
    pub fn flat_index(self, cols: usize) -> usize {
        self.row * cols + self.col
    }
}

/// rows×cols matrix of symbols, stored row-major.
///
/// Every cell always holds exactly one symbol; `Empty` appears only
/// between removal and refill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// Create a grid filled with `Empty`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, Symbol::Empty)
    }

    /// Create a grid filled with the given symbol.
    pub fn filled(rows: usize, cols: usize, fill: Symbol) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    pub fn get(&self, coord: Coord) -> Symbol {
        assert!(self.in_bounds(coord), "coordinate out of bounds: {coord:?}");
        self.cells[coord.flat_index(self.cols)]
    }

    pub fn set(&mut self, coord: Coord, value: Symbol) {
        assert!(self.in_bounds(coord), "coordinate out of bounds: {coord:?}");
        let idx = coord.flat_index(self.cols);
        self.cells[idx] = value;
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: Symbol) {
        self.cells.fill(value);
    }

    /// Count cells holding `value`.
    pub fn count_of(&self, value: Symbol) -> usize {
        self.cells.iter().filter(|&&s| s == value).count()
    }

    /// In-bounds 4-neighbors, in up/down/left/right order.
    pub fn neighbors4(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        const DELTAS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        DELTAS.into_iter().filter_map(move |(dr, dc)| {
            let r = coord.row as i64 + dr;
            let c = coord.col as i64 + dc;
            (r >= 0 && c >= 0 && (r as usize) < self.rows && (c as usize) < self.cols)
                .then(|| Coord::new(r as usize, c as usize))
        })
    }

    /// Copy of the board as nested rows, for transcripts.
    pub fn snapshot(&self) -> Vec<Vec<Symbol>> {
        (0..self.rows)
            .map(|r| self.cells[r * self.cols..(r + 1) * self.cols].to_vec())
            .collect()
    }
}
