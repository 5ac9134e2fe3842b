//! Spin transcripts: an observational record of each cascade step,
//! consumed by replay tooling. Never load-bearing for win computation.

use serde::{Deserialize, Serialize};

use crate::cascade::{Cluster, ClusterWin};
use crate::grid::Coord;
use crate::symbols::Symbol;

/// One resolve-remove-collapse-refill cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeStep {
    /// Qualifying clusters of this step.
    pub clusters: Vec<Cluster>,
    /// Per-cluster wins.
    pub wins: Vec<ClusterWin>,
    /// Cells cleared from the board.
    pub removed: Vec<Coord>,
    /// Multiplier state after the step's hits were applied.
    pub multiplier_grid: Vec<Vec<f64>>,
    /// Board state after collapse and refill.
    pub grid_after: Vec<Vec<Symbol>>,
}

/// Free-spin sub-transcripts of a triggered bonus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BonusTranscript {
    pub spins: Vec<SpinTranscript>,
}

/// Full record of one spin resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpinTranscript {
    /// Board immediately after the initial fill.
    pub initial_grid: Vec<Vec<Symbol>>,
    /// Cascade steps in resolution order.
    pub cascades: Vec<CascadeStep>,
    /// Present only when the bonus was entered.
    pub bonus: Option<BonusTranscript>,
}

impl SpinTranscript {
    pub fn new(initial_grid: Vec<Vec<Symbol>>) -> Self {
        Self {
            initial_grid,
            cascades: Vec::new(),
            bonus: None,
        }
    }

    /// Serialize for the replay layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
