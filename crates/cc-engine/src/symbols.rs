//! Symbol set for the cluster-pays grid

use serde::{Deserialize, Serialize};

/// A board symbol.
///
/// `L*` are low-tier paying symbols, `M*` mid-tier, `H*` high-tier.
/// `Wild` extends adjacent clusters, `Scatter` counts toward the bonus
/// trigger, `Empty` only appears transiently between removal and refill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    L1 = 0,
    L2 = 1,
    L3 = 2,
    L4 = 3,
    M1 = 4,
    M2 = 5,
    M3 = 6,
    M4 = 7,
    H1 = 8,
    H2 = 9,
    Wild = 10,
    Scatter = 11,
    Empty = 12,
}

impl Symbol {
    /// Number of distinct symbols.
    pub const COUNT: usize = 13;

    /// Fixed enumeration order; weight tables and CDFs follow this order.
    pub const ALL: [Symbol; Symbol::COUNT] = [
        Symbol::L1,
        Symbol::L2,
        Symbol::L3,
        Symbol::L4,
        Symbol::M1,
        Symbol::M2,
        Symbol::M3,
        Symbol::M4,
        Symbol::H1,
        Symbol::H2,
        Symbol::Wild,
        Symbol::Scatter,
        Symbol::Empty,
    ];

    /// True for symbols that can seed a cluster (not wild/scatter/empty).
    pub fn is_base(self) -> bool {
        !matches!(self, Symbol::Wild | Symbol::Scatter | Symbol::Empty)
    }

    /// Pay-table tier rank used as a wild-assignment tie-break.
    ///
    /// Lowest-paying symbols rank lowest; non-scoring symbols rank 0.
    pub fn rank(self) -> u8 {
        match self {
            Symbol::L1 => 1,
            Symbol::L2 => 2,
            Symbol::L3 => 3,
            Symbol::L4 => 4,
            Symbol::M1 => 5,
            Symbol::M2 => 6,
            Symbol::M3 => 7,
            Symbol::M4 => 8,
            Symbol::H1 => 9,
            Symbol::H2 => 10,
            Symbol::Wild | Symbol::Scatter | Symbol::Empty => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_symbol_classification() {
        assert!(Symbol::L1.is_base());
        assert!(Symbol::H2.is_base());
        assert!(!Symbol::Wild.is_base());
        assert!(!Symbol::Scatter.is_base());
        assert!(!Symbol::Empty.is_base());
    }

    #[test]
    fn test_rank_ordering() {
        assert!(Symbol::H2.rank() > Symbol::H1.rank());
        assert!(Symbol::H1.rank() > Symbol::M4.rank());
        assert!(Symbol::M1.rank() > Symbol::L4.rank());
        assert_eq!(Symbol::Wild.rank(), 0);
        assert_eq!(Symbol::Scatter.rank(), 0);
    }

    #[test]
    fn test_enumeration_order_matches_discriminants() {
        for (i, sym) in Symbol::ALL.iter().enumerate() {
            assert_eq!(*sym as usize, i);
        }
    }
}
