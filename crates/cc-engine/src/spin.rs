//! Spin orchestration: base resolution, bonus trigger, and the free-spin
//! loop with retriggers, all under the total win cap.

use serde::{Deserialize, Serialize};

use crate::cascade::{fill_grid, run_cascades};
use crate::config::{GameConfig, Mode};
use crate::grid::Grid;
use crate::multiplier::MultiplierGrid;
use crate::rng::{GameRng, RngError};
use crate::sampler::WeightedSampler;
use crate::symbols::Symbol;
use crate::transcript::{BonusTranscript, SpinTranscript};

/// Aggregate result of one spin. All win fields are bet multiples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// `base_win_x + bonus_win_x`, clamped to the cap.
    pub total_win_x: f64,
    pub base_win_x: f64,
    pub bonus_win_x: f64,
    pub bonus_triggered: bool,
    /// Free spins actually resolved, including retriggered ones.
    pub bonus_spins_played: u32,
    pub cap_hit: bool,
}

/// A spin result together with its full transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub result: SpinResult,
    pub transcript: SpinTranscript,
}

/// A spin result with only the counters the simulator needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinSim {
    pub result: SpinResult,
    /// Materialized cascade steps across base and bonus.
    pub cascades: u32,
}

/// Resolve one spin and capture the full transcript. Intended for replay
/// and presentation layers.
pub fn spin(rng: &mut dyn GameRng, config: &GameConfig) -> Result<SpinOutcome, RngError> {
    let mut transcript = SpinTranscript::default();
    let (result, _) = run_spin(rng, config, Some(&mut transcript))?;
    Ok(SpinOutcome { result, transcript })
}

/// Resolve one spin without transcript capture. Intended for bulk
/// simulation, where allocating snapshots per step would dominate runtime.
pub fn simulate_spin(rng: &mut dyn GameRng, config: &GameConfig) -> Result<SpinSim, RngError> {
    let (result, cascades) = run_spin(rng, config, None)?;
    Ok(SpinSim { result, cascades })
}

/// Core spin loop shared by [`spin`] and [`simulate_spin`].
///
/// The multiplier grid persists from the base spin through every free spin
/// of a triggered bonus. The bonus is skipped entirely when the base game
/// already hit the cap. Inside the bonus loop, a free spin that would push
/// the running total to or past the cap clamps the bonus win to the cap
/// remainder; retrigger spins are credited before a capped cascade
/// sequence ends the loop.
fn run_spin(
    rng: &mut dyn GameRng,
    config: &GameConfig,
    mut transcript: Option<&mut SpinTranscript>,
) -> Result<(SpinResult, u32), RngError> {
    let mut grid = Grid::new(config.rows, config.cols);
    let mut mult = MultiplierGrid::new(
        config.rows,
        config.cols,
        config.multiplier.initial_cell_multiplier,
    );
    let sampler = WeightedSampler::new(&config.weights);

    fill_grid(&mut grid, &sampler, Mode::Base, rng)?;
    if let Some(t) = transcript.as_deref_mut() {
        t.initial_grid = grid.snapshot();
    }

    // The initial fill can already show enough scatters to trigger.
    let mut bonus_triggered =
        grid.count_of(Symbol::Scatter) >= config.bonus.trigger_scatters;
    let base_outcome = run_cascades(
        Mode::Base,
        &mut grid,
        &mut mult,
        rng,
        config,
        transcript.as_deref_mut(),
    )?;
    bonus_triggered = bonus_triggered || base_outcome.bonus_triggered;

    let base_win_x = base_outcome.win_x;
    let mut bonus_win_x = 0.0;
    let mut cap_hit = base_outcome.cap_hit;
    let mut total_win_x = base_win_x;
    let mut total_cascades = base_outcome.steps;
    let mut bonus_spins_played = 0u32;

    if !cap_hit && bonus_triggered {
        if let Some(t) = transcript.as_deref_mut() {
            t.bonus = Some(BonusTranscript::default());
        }
        let mut free_spins = config.bonus.bonus_spins;
        let mut extra_awarded = 0u32;
        let max_extra = config.bonus.max_extra_spins;
        let mut i = 0u32;
        while i < free_spins {
            grid.fill(Symbol::Empty);
            fill_grid(&mut grid, &sampler, Mode::Bonus, rng)?;
            let mut spin_transcript = transcript
                .as_deref_mut()
                .map(|_| SpinTranscript::new(grid.snapshot()));
            let outcome = run_cascades(
                Mode::Bonus,
                &mut grid,
                &mut mult,
                rng,
                config,
                spin_transcript.as_mut(),
            )?;
            if let (Some(t), Some(st)) = (transcript.as_deref_mut(), spin_transcript) {
                if let Some(bonus) = t.bonus.as_mut() {
                    bonus.spins.push(st);
                }
            }
            bonus_spins_played += 1;
            total_cascades += outcome.steps;
            if base_win_x + bonus_win_x + outcome.win_x >= config.max_win_x {
                bonus_win_x = config.max_win_x - base_win_x;
                total_win_x = config.max_win_x;
                cap_hit = true;
                break;
            }
            bonus_win_x += outcome.win_x;
            total_win_x = base_win_x + bonus_win_x;

            if grid.count_of(Symbol::Scatter) >= config.bonus.trigger_scatters
                && extra_awarded < max_extra
            {
                let add = config.bonus.retrigger_spins.min(max_extra - extra_awarded);
                free_spins += add;
                extra_awarded += add;
            }
            if outcome.cap_hit {
                cap_hit = true;
                total_win_x = total_win_x.min(config.max_win_x);
                break;
            }
            i += 1;
        }
    }

    Ok((
        SpinResult {
            total_win_x,
            base_win_x,
            bonus_win_x,
            bonus_triggered,
            bonus_spins_played,
            cap_hit,
        },
        total_cascades,
    ))
}
