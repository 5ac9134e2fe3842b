//! End-to-end cascade scenarios on hand-built boards.

use cc_engine::cascade::{run_cascades_on_grid, Cluster};
use cc_engine::config::{BonusConfig, GameConfig, Mode, MultiplierConfig, Weights};
use cc_engine::grid::{Coord, Grid};
use cc_engine::multiplier::MultiplierGrid;
use cc_engine::rng::XorShift32Rng;
use cc_engine::spin::spin;
use cc_engine::symbols::Symbol;

fn make_config(min_cluster_size: usize) -> GameConfig {
    GameConfig {
        rows: 8,
        cols: 8,
        min_cluster_size,
        max_win_x: 15_000.0,
        pay_table: Box::new(|_: Symbol, size: usize| size as f64),
        bonus: BonusConfig {
            trigger_scatters: 3,
            bonus_spins: 10,
            retrigger_spins: 3,
            max_extra_spins: 15,
        },
        multiplier: MultiplierConfig {
            initial_cell_multiplier: 1.0,
            on_hit_multiplier: 2.0,
        },
        // Refills produce only scatters, which never cluster, so every
        // scenario terminates after its prepared board resolves.
        weights: Weights::uniform(&[(Symbol::Scatter, 1)]),
    }
}

fn set_cells(grid: &mut Grid, cells: &[(usize, usize, Symbol)]) {
    for &(row, col, symbol) in cells {
        grid.set(Coord::new(row, col), symbol);
    }
}

fn first_cascade_clusters(config: &GameConfig, grid: &mut Grid) -> Vec<Cluster> {
    let mut mult = MultiplierGrid::new(config.rows, config.cols, 1.0);
    let mut rng = XorShift32Rng::new(1);
    let (_, transcript) =
        run_cascades_on_grid(grid, &mut mult, Mode::Base, &mut rng, config).unwrap();
    assert!(!transcript.cascades.is_empty());
    transcript.cascades[0].clusters.clone()
}

fn cluster_of(clusters: &[Cluster], symbol: Symbol) -> Option<&Cluster> {
    clusters.iter().find(|c| c.symbol == symbol)
}

#[test]
fn test_wild_touching_one_component_is_assigned() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (0, 1, Symbol::L1),
            (0, 2, Symbol::Wild),
        ],
    );
    let config = make_config(1);
    let clusters = first_cascade_clusters(&config, &mut grid);
    assert_eq!(cluster_of(&clusters, Symbol::L1).map(|c| c.size), Some(3));
}

#[test]
fn test_wild_between_two_components_goes_to_higher_delta() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (1, 0, Symbol::L1),
            (0, 2, Symbol::H2),
            (1, 2, Symbol::H2),
            (0, 1, Symbol::Wild),
        ],
    );
    let mut config = make_config(1);
    config.pay_table = Box::new(|symbol: Symbol, size: usize| {
        let rate = if symbol == Symbol::H2 { 2.0 } else { 1.0 };
        rate * size as f64
    });
    let clusters = first_cascade_clusters(&config, &mut grid);
    assert_eq!(cluster_of(&clusters, Symbol::H2).map(|c| c.size), Some(3));
    assert_eq!(cluster_of(&clusters, Symbol::L1).map(|c| c.size), Some(2));
}

#[test]
fn test_two_wilds_join_same_component() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (0, 1, Symbol::L1),
            (1, 0, Symbol::Wild),
            (1, 1, Symbol::Wild),
        ],
    );
    let config = make_config(1);
    let clusters = first_cascade_clusters(&config, &mut grid);
    assert_eq!(cluster_of(&clusters, Symbol::L1).map(|c| c.size), Some(4));
}

#[test]
fn test_isolated_wild_stays_unassigned() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (0, 1, Symbol::L1),
            (7, 7, Symbol::Wild),
        ],
    );
    let config = make_config(1);
    let clusters = first_cascade_clusters(&config, &mut grid);
    assert_eq!(cluster_of(&clusters, Symbol::L1).map(|c| c.size), Some(2));
}

#[test]
fn test_breakpoint_nudge_outranks_larger_component() {
    // With a pay table linear in size, every component has the same raw
    // delta. The breakpoint nudge then steers the wild to the size-7
    // component even though a size-8 neighbor would win the size tie-break.
    let mut grid = Grid::new(8, 8);
    for col in 0..8 {
        grid.set(Coord::new(0, col), Symbol::L1);
    }
    for row in 2..8 {
        grid.set(Coord::new(row, 3), Symbol::L2);
    }
    grid.set(Coord::new(7, 2), Symbol::L2);
    grid.set(Coord::new(1, 3), Symbol::Wild);
    let config = make_config(1);
    let clusters = first_cascade_clusters(&config, &mut grid);
    assert_eq!(cluster_of(&clusters, Symbol::L2).map(|c| c.size), Some(8));
    assert_eq!(cluster_of(&clusters, Symbol::L1).map(|c| c.size), Some(8));
}

#[test]
fn test_scatters_after_refill_trigger_bonus() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (0, 1, Symbol::L1),
            (1, 0, Symbol::Scatter),
            (1, 1, Symbol::Scatter),
        ],
    );
    let config = make_config(2);
    let mut mult = MultiplierGrid::new(8, 8, 1.0);
    let mut rng = XorShift32Rng::new(1);
    let (outcome, _) =
        run_cascades_on_grid(&mut grid, &mut mult, Mode::Base, &mut rng, &config).unwrap();
    assert!(outcome.bonus_triggered);
}

#[test]
fn test_bonus_trigger_does_not_cut_cascades_short() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (0, 0, Symbol::L1),
            (0, 1, Symbol::L1),
            (1, 0, Symbol::Scatter),
            (1, 1, Symbol::Scatter),
            (1, 2, Symbol::Scatter),
        ],
    );
    let config = make_config(2);
    let mut mult = MultiplierGrid::new(8, 8, 1.0);
    let mut rng = XorShift32Rng::new(1);
    let (outcome, _) =
        run_cascades_on_grid(&mut grid, &mut mult, Mode::Base, &mut rng, &config).unwrap();
    assert!(outcome.bonus_triggered);
    assert_eq!(outcome.steps, 1);
}

#[test]
fn test_cap_clamps_payout_and_ends_spin() {
    let mut config = make_config(1);
    config.pay_table = Box::new(|_: Symbol, _: usize| 20_000.0);
    config.weights = Weights::uniform(&[(Symbol::L1, 1)]);
    let mut rng = XorShift32Rng::new(1);
    let outcome = spin(&mut rng, &config).unwrap();
    assert_eq!(outcome.result.total_win_x, 15_000.0);
    assert!(outcome.result.cap_hit);
    assert_eq!(outcome.result.bonus_spins_played, 0);
}

#[test]
fn test_capped_step_leaves_no_transcript_entry() {
    let mut config = make_config(1);
    config.pay_table = Box::new(|_: Symbol, _: usize| 20_000.0);
    config.weights = Weights::uniform(&[(Symbol::L1, 1)]);
    let mut rng = XorShift32Rng::new(1);
    let outcome = spin(&mut rng, &config).unwrap();
    assert!(outcome.transcript.cascades.is_empty());
    assert!(!outcome.transcript.initial_grid.is_empty());
}

#[test]
fn test_multipliers_double_on_every_winning_cell() {
    let mut grid = Grid::new(8, 8);
    set_cells(
        &mut grid,
        &[
            (6, 0, Symbol::L1),
            (6, 1, Symbol::L1),
            (7, 0, Symbol::L2),
            (7, 1, Symbol::L2),
        ],
    );
    let config = make_config(2);
    let mut mult = MultiplierGrid::new(8, 8, 1.0);
    let mut rng = XorShift32Rng::new(1);
    let (outcome, transcript) =
        run_cascades_on_grid(&mut grid, &mut mult, Mode::Base, &mut rng, &config).unwrap();
    assert_eq!(outcome.steps, 1);
    // Both pairs cluster in the same step; each winning cell doubled.
    let step = &transcript.cascades[0];
    assert_eq!(step.clusters.len(), 2);
    assert_eq!(step.multiplier_grid[7][0], 2.0);
    assert_eq!(step.multiplier_grid[6][1], 2.0);
}
