//! Cascade resolution: connected-component clustering, wild assignment,
//! win computation, and the resolve-remove-collapse-refill loop.

use std::cmp::Ordering;
use std::collections::VecDeque;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, Mode, PayTable};
use crate::grid::{Coord, Grid};
use crate::multiplier::MultiplierGrid;
use crate::rng::{GameRng, RngError};
use crate::sampler::WeightedSampler;
use crate::symbols::Symbol;
use crate::transcript::{CascadeStep, SpinTranscript};

/// A maximal 4-connected region of one base symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Increasing in row-major scan order.
    pub id: usize,
    pub symbol: Symbol,
    pub cells: Vec<Coord>,
    /// Cell count before any wild attachment.
    pub base_size: usize,
}

/// A component after wild attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub symbol: Symbol,
    /// Base cells followed by attached wilds.
    pub cells: Vec<Coord>,
    pub size: usize,
}

/// A qualifying cluster and its computed win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterWin {
    pub cluster: Cluster,
    pub win_x: f64,
}

/// Result of running one cascade sequence to termination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Win multiple accumulated across all steps, clamped to the cap.
    pub win_x: f64,
    /// Scatter trigger observed after any base-mode refill.
    pub bonus_triggered: bool,
    /// The cap terminated the sequence.
    pub cap_hit: bool,
    /// Materialized steps (a capped step is not materialized).
    pub steps: u32,
}

/// A candidate (wild, component) pairing with its priority keys.
#[derive(Debug, Clone, Copy)]
struct WildEdge {
    wild: Coord,
    comp_id: usize,
    score: f64,
    base_size: usize,
    symbol: Symbol,
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPONENT DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════

/// Find all maximal 4-connected same-symbol regions of base symbols.
///
/// Breadth-first flood fill; every cell is visited once and component ids
/// increase in row-major scan order of their seed cells.
pub fn find_base_components(grid: &Grid) -> Vec<Component> {
    let mut visited = vec![false; grid.rows() * grid.cols()];
    let mut components = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let seed = Coord::new(row, col);
            let symbol = grid.get(seed);
            if visited[seed.flat_index(grid.cols())] || !symbol.is_base() {
                continue;
            }
            let mut cells = Vec::new();
            let mut queue = VecDeque::new();
            visited[seed.flat_index(grid.cols())] = true;
            queue.push_back(seed);
            while let Some(cur) = queue.pop_front() {
                cells.push(cur);
                for next in grid.neighbors4(cur) {
                    let idx = next.flat_index(grid.cols());
                    if visited[idx] || grid.get(next) != symbol {
                        continue;
                    }
                    visited[idx] = true;
                    queue.push_back(next);
                }
            }
            let base_size = cells.len();
            components.push(Component {
                id: components.len(),
                symbol,
                cells,
                base_size,
            });
        }
    }
    components
}

/// Flat cell-to-component map; `None` for cells outside any component.
pub fn build_component_index(
    components: &[Component],
    rows: usize,
    cols: usize,
) -> Vec<Option<usize>> {
    let mut index = vec![None; rows * cols];
    for comp in components {
        for cell in &comp.cells {
            index[cell.flat_index(cols)] = Some(comp.id);
        }
    }
    index
}

// ═══════════════════════════════════════════════════════════════════════════
// WILD ASSIGNMENT
// ═══════════════════════════════════════════════════════════════════════════

/// For each wild cell, the distinct component ids adjacent to it.
///
/// Wilds with no adjacent component are omitted; they stay unassigned and
/// have no effect on clustering.
pub fn build_wild_candidates(
    grid: &Grid,
    comp_index: &[Option<usize>],
) -> Vec<(Coord, Vec<usize>)> {
    let mut candidates = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let coord = Coord::new(row, col);
            if grid.get(coord) != Symbol::Wild {
                continue;
            }
            let mut comps: Vec<usize> = Vec::new();
            for next in grid.neighbors4(coord) {
                if let Some(id) = comp_index[next.flat_index(grid.cols())] {
                    if !comps.contains(&id) {
                        comps.push(id);
                    }
                }
            }
            if !comps.is_empty() {
                candidates.push((coord, comps));
            }
        }
    }
    candidates
}

/// Marginal payout gain of growing `component` by one cell, with a
/// deterministic nudge favoring clusters one step from the common
/// pay-table breakpoints (base sizes 6 and 7). The nudge is hand-tuned
/// game balancing, not an algorithmic requirement.
pub fn score_wild_edge(component: &Component, pay_table: &dyn PayTable) -> f64 {
    let s0 = component.base_size;
    let mut delta =
        pay_table.pay(component.symbol, s0 + 1) - pay_table.pay(component.symbol, s0);
    if s0 == 7 {
        delta += 0.001;
    } else if s0 == 6 {
        delta += 0.0005;
    }
    delta
}

fn build_wild_edges(
    candidates: &[(Coord, Vec<usize>)],
    components: &[Component],
    pay_table: &dyn PayTable,
) -> Vec<WildEdge> {
    let mut edges = Vec::new();
    for (wild, comp_ids) in candidates {
        for &comp_id in comp_ids {
            let comp = &components[comp_id];
            edges.push(WildEdge {
                wild: *wild,
                comp_id,
                score: score_wild_edge(comp, pay_table),
                base_size: comp.base_size,
                symbol: comp.symbol,
            });
        }
    }
    edges.sort_by(edge_order);
    edges
}

/// Single total order over candidate edges: score desc, base size desc,
/// symbol rank desc, component id asc, wild row asc, wild column asc.
fn edge_order(a: &WildEdge, b: &WildEdge) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.base_size.cmp(&a.base_size))
        .then_with(|| b.symbol.rank().cmp(&a.symbol.rank()))
        .then_with(|| a.comp_id.cmp(&b.comp_id))
        .then_with(|| a.wild.row.cmp(&b.wild.row))
        .then_with(|| a.wild.col.cmp(&b.wild.col))
}

/// Greedy single-pass assignment over priority-sorted edges.
///
/// Each wild goes to the first component it appears with; a component may
/// receive several wilds. Returns (wild, component id) pairs in assignment
/// order.
fn assign_wilds_greedy(
    edges: &[WildEdge],
    rows: usize,
    cols: usize,
) -> Vec<(Coord, usize)> {
    let mut assigned = vec![false; rows * cols];
    let mut assignments = Vec::new();
    for edge in edges {
        let idx = edge.wild.flat_index(cols);
        if assigned[idx] {
            continue;
        }
        assigned[idx] = true;
        assignments.push((edge.wild, edge.comp_id));
    }
    assignments
}

/// Turn components into clusters and attach assigned wilds.
pub fn build_clusters(
    components: &[Component],
    assignments: &[(Coord, usize)],
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = components
        .iter()
        .map(|comp| Cluster {
            symbol: comp.symbol,
            cells: comp.cells.clone(),
            size: comp.base_size,
        })
        .collect();
    for &(wild, comp_id) in assignments {
        if let Some(cluster) = clusters.get_mut(comp_id) {
            cluster.cells.push(wild);
            cluster.size += 1;
        }
    }
    clusters
}

// ═══════════════════════════════════════════════════════════════════════════
// WIN COMPUTATION AND BOARD MUTATION
// ═══════════════════════════════════════════════════════════════════════════

/// `pay(symbol, size) × product of cell multipliers` (product capped).
pub fn compute_cluster_win(
    cluster: &Cluster,
    mult: &MultiplierGrid,
    pay_table: &dyn PayTable,
) -> f64 {
    if cluster.size == 0 {
        return 0.0;
    }
    let base = pay_table.pay(cluster.symbol, cluster.size);
    base * mult.product_over(&cluster.cells)
}

/// Multiply every winning cell's multiplier and clear it to `Empty`.
pub fn apply_wins_and_remove(
    grid: &mut Grid,
    mult: &mut MultiplierGrid,
    clusters: &[Cluster],
    on_hit_multiplier: f64,
) {
    for cluster in clusters {
        for &cell in &cluster.cells {
            mult.multiply(cell, on_hit_multiplier);
            grid.set(cell, Symbol::Empty);
        }
    }
}

/// Compact each column downward, preserving relative order, leaving
/// `Empty` at the top.
pub fn collapse_columns(grid: &mut Grid) {
    for col in 0..grid.cols() {
        let mut write = grid.rows();
        for row in (0..grid.rows()).rev() {
            let symbol = grid.get(Coord::new(row, col));
            if symbol == Symbol::Empty {
                continue;
            }
            write -= 1;
            if write != row {
                grid.set(Coord::new(write, col), symbol);
                grid.set(Coord::new(row, col), Symbol::Empty);
            }
        }
    }
}

/// Fill every `Empty` cell from the mode's weight table.
pub fn fill_grid(
    grid: &mut Grid,
    sampler: &WeightedSampler<'_>,
    mode: Mode,
    rng: &mut dyn GameRng,
) -> Result<(), RngError> {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let coord = Coord::new(row, col);
            if grid.get(coord) == Symbol::Empty {
                grid.set(coord, sampler.sample(mode, rng)?);
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// CASCADE LOOP
// ═══════════════════════════════════════════════════════════════════════════

/// Run cascades on `grid` until no qualifying cluster remains or the win
/// cap fires.
///
/// A step whose wins would push the cumulative total past the cap is not
/// materialized: the outcome is clamped to the cap, `cap_hit` is set, and
/// the board is left untouched by that step. Multiplier state persists
/// across steps. In base mode, reaching the scatter trigger count after a
/// refill sets `bonus_triggered` (sticky).
pub fn run_cascades(
    mode: Mode,
    grid: &mut Grid,
    mult: &mut MultiplierGrid,
    rng: &mut dyn GameRng,
    config: &GameConfig,
    mut transcript: Option<&mut SpinTranscript>,
) -> Result<CascadeOutcome, RngError> {
    let sampler = WeightedSampler::new(&config.weights);
    let mut win_x = 0.0;
    let mut bonus_triggered = false;
    let mut steps = 0u32;
    loop {
        let components = find_base_components(grid);
        let comp_index = build_component_index(&components, grid.rows(), grid.cols());
        let candidates = build_wild_candidates(grid, &comp_index);
        let edges = build_wild_edges(&candidates, &components, config.pay_table.as_ref());
        let assignments = assign_wilds_greedy(&edges, grid.rows(), grid.cols());
        let clusters: Vec<Cluster> = build_clusters(&components, &assignments)
            .into_iter()
            .filter(|c| c.size >= config.min_cluster_size)
            .collect();
        if clusters.is_empty() {
            break;
        }
        let wins: Vec<ClusterWin> = clusters
            .iter()
            .map(|cluster| ClusterWin {
                cluster: cluster.clone(),
                win_x: compute_cluster_win(cluster, mult, config.pay_table.as_ref()),
            })
            .collect();
        let step_win: f64 = wins.iter().map(|w| w.win_x).sum();
        if win_x + step_win > config.max_win_x {
            return Ok(CascadeOutcome {
                win_x: config.max_win_x,
                bonus_triggered,
                cap_hit: true,
                steps,
            });
        }
        win_x += step_win;
        apply_wins_and_remove(grid, mult, &clusters, config.multiplier.on_hit_multiplier);
        collapse_columns(grid);
        fill_grid(grid, &sampler, mode, rng)?;
        if mode == Mode::Base
            && grid.count_of(Symbol::Scatter) >= config.bonus.trigger_scatters
        {
            bonus_triggered = true;
        }
        if let Some(t) = transcript.as_deref_mut() {
            t.cascades.push(CascadeStep {
                removed: clusters.iter().flat_map(|c| c.cells.clone()).collect(),
                clusters,
                wins,
                multiplier_grid: mult.snapshot(),
                grid_after: grid.snapshot(),
            });
        }
        steps += 1;
        trace!("cascade step {steps}: step_win={step_win:.4} total={win_x:.4}");
    }
    Ok(CascadeOutcome {
        win_x,
        bonus_triggered,
        cap_hit: false,
        steps,
    })
}

/// Resolve cascades on a caller-prepared board and return the outcome with
/// a transcript of what happened. Intended for scenario testing and replay
/// capture.
pub fn run_cascades_on_grid(
    grid: &mut Grid,
    mult: &mut MultiplierGrid,
    mode: Mode,
    rng: &mut dyn GameRng,
    config: &GameConfig,
) -> Result<(CascadeOutcome, SpinTranscript), RngError> {
    let mut transcript = SpinTranscript::new(grid.snapshot());
    let outcome = run_cascades(mode, grid, mult, rng, config, Some(&mut transcript))?;
    Ok((outcome, transcript))
}
