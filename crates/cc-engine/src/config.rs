//! Game configuration: pay tables, symbol weights, bonus and multiplier
//! parameters. Immutable for the duration of a spin.

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Spin phase; selects the weight table used for fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Base,
    Bonus,
}

/// Maps (symbol, cluster size) to a payout multiple of the bet.
pub trait PayTable: Send + Sync {
    fn pay(&self, symbol: Symbol, size: usize) -> f64;
}

impl<F> PayTable for F
where
    F: Fn(Symbol, usize) -> f64 + Send + Sync,
{
    fn pay(&self, symbol: Symbol, size: usize) -> f64 {
        self(symbol, size)
    }
}

/// Pay table linear in cluster size: `size × rate(symbol) × scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPayTable {
    /// Per-symbol rate overrides.
    pub rates: Vec<(Symbol, f64)>,
    /// Rate for symbols without an override.
    pub fallback_rate: f64,
    /// Global scale applied to every payout.
    pub scale: f64,
}

impl LinearPayTable {
    /// Rates of the reference game tuning.
    pub fn reference() -> Self {
        Self {
            rates: vec![
                (Symbol::H2, 100.0),
                (Symbol::H1, 80.0),
                (Symbol::M4, 2.6),
                (Symbol::M3, 1.6),
                (Symbol::M2, 1.1),
                (Symbol::M1, 0.9),
            ],
            fallback_rate: 0.4,
            scale: 0.05,
        }
    }

    fn rate(&self, symbol: Symbol) -> f64 {
        self.rates
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, rate)| *rate)
            .unwrap_or(self.fallback_rate)
    }
}

impl PayTable for LinearPayTable {
    fn pay(&self, symbol: Symbol, size: usize) -> f64 {
        size as f64 * self.rate(symbol) * self.scale
    }
}

/// One entry of a cumulative-weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdfEntry {
    pub symbol: Symbol,
    pub cum_weight: u32,
}

/// Integer symbol weights with a precomputed cumulative table.
///
/// Entries are kept in symbol enumeration order; cumulative values are
/// non-decreasing and the last entry equals the total weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    entries: Vec<(Symbol, u32)>,
    cdf: Vec<CdfEntry>,
    total: u32,
}

impl WeightTable {
    pub fn new(entries: &[(Symbol, u32)]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by_key(|(symbol, _)| *symbol as u8);
        let mut cdf = Vec::with_capacity(entries.len());
        let mut cum = 0u32;
        for &(symbol, weight) in &entries {
            cum += weight;
            cdf.push(CdfEntry {
                symbol,
                cum_weight: cum,
            });
        }
        Self {
            entries,
            cdf,
            total: cum,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn cdf(&self) -> &[CdfEntry] {
        &self.cdf
    }

    /// Symbol owning the first cumulative entry strictly greater than `roll`.
    pub fn symbol_for_roll(&self, roll: u32) -> Symbol {
        if self.cdf.is_empty() {
            return Symbol::Empty;
        }
        let idx = self
            .cdf
            .partition_point(|entry| entry.cum_weight <= roll)
            .min(self.cdf.len() - 1);
        self.cdf[idx].symbol
    }
}

/// Per-mode symbol weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    pub base: WeightTable,
    pub bonus: WeightTable,
}

impl Weights {
    pub fn new(base: &[(Symbol, u32)], bonus: &[(Symbol, u32)]) -> Self {
        Self {
            base: WeightTable::new(base),
            bonus: WeightTable::new(bonus),
        }
    }

    /// Same weights in both modes; convenient for tests.
    pub fn uniform(entries: &[(Symbol, u32)]) -> Self {
        Self::new(entries, entries)
    }
}

/// Free-spin bonus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusConfig {
    /// Scatter count that triggers the bonus.
    pub trigger_scatters: usize,
    /// Free spins granted on trigger.
    pub bonus_spins: u32,
    /// Free spins granted per retrigger.
    pub retrigger_spins: u32,
    /// Budget of extra spins across all retriggers of one bonus sequence.
    pub max_extra_spins: u32,
}

/// Per-cell multiplier parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierConfig {
    /// Cell value at spin start.
    pub initial_cell_multiplier: f64,
    /// Factor applied to each cell of a winning cluster.
    pub on_hit_multiplier: f64,
}

/// Full game configuration, externally constructed and injected.
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Smallest cluster size that pays.
    pub min_cluster_size: usize,
    /// Maximum total win multiple a single spin may award.
    pub max_win_x: f64,
    pub pay_table: Box<dyn PayTable>,
    pub bonus: BonusConfig,
    pub multiplier: MultiplierConfig,
    pub weights: Weights,
}

impl GameConfig {
    /// The reference 8×8 cluster game tuning.
    pub fn reference() -> Self {
        let base = [
            (Symbol::L1, 32),
            (Symbol::L2, 32),
            (Symbol::L3, 32),
            (Symbol::L4, 32),
            (Symbol::M1, 16),
            (Symbol::M2, 16),
            (Symbol::M3, 16),
            (Symbol::M4, 16),
            (Symbol::H1, 4),
            (Symbol::H2, 4),
            (Symbol::Wild, 10),
            (Symbol::Scatter, 1),
        ];
        let bonus = [
            (Symbol::L1, 28),
            (Symbol::L2, 28),
            (Symbol::L3, 28),
            (Symbol::L4, 28),
            (Symbol::M1, 18),
            (Symbol::M2, 18),
            (Symbol::M3, 18),
            (Symbol::M4, 18),
            (Symbol::H1, 5),
            (Symbol::H2, 5),
            (Symbol::Wild, 8),
            (Symbol::Scatter, 1),
        ];
        Self {
            rows: 8,
            cols: 8,
            min_cluster_size: 4,
            max_win_x: 15_000.0,
            pay_table: Box::new(LinearPayTable::reference()),
            bonus: BonusConfig {
                trigger_scatters: 4,
                bonus_spins: 10,
                retrigger_spins: 3,
                max_extra_spins: 1000,
            },
            multiplier: MultiplierConfig {
                initial_cell_multiplier: 1.0,
                on_hit_multiplier: 2.0,
            },
            weights: Weights::new(&base, &bonus),
        }
    }

    /// Shorthand for the configured pay function.
    pub fn pay(&self, symbol: Symbol, size: usize) -> f64 {
        self.pay_table.pay(symbol, size)
    }
}
