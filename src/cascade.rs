//! Cascade resolution: clear matches, drop gems, refill, repeat until stable.

use crate::board::{Cell, Coord, Gem, Grid};
use crate::error::EngineError;
use crate::matcher::find_matches;
use crate::scoring::ScoreEngine;
use rand::Rng;
use std::collections::BTreeSet;

/// Default bound on rounds per chain.
pub const MAX_CASCADE_ROUNDS: u32 = 64;

/// One clearing round of a chain. The grids are the render phases
/// (matched -> cleared -> compacted -> refilled).
#[derive(Debug, Clone)]
pub struct CascadeRound {
    /// 0-based position within the chain; 0 is the swap's own match.
    pub step: u32,
    pub cleared: BTreeSet<Coord>,
    pub multiplier_pct: u32,
    pub points: u32,
    /// Grid as found at the start of the round, matched gems still in place.
    pub before: Grid,
    pub after_clear: Grid,
    pub after_gravity: Grid,
    pub after_refill: Grid,
}

/// Result of resolving one move.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub rounds: Vec<CascadeRound>,
    pub points: u32,
}

impl Chain {
    pub fn cleared_total(&self) -> usize {
        self.rounds.iter().map(|r| r.cleared.len()).sum()
    }

    pub fn cleared_per_round(&self) -> Vec<usize> {
        self.rounds.iter().map(|r| r.cleared.len()).collect()
    }

    /// Number of rounds after the first (chain reactions).
    pub fn combo_steps(&self) -> usize {
        self.rounds.len().saturating_sub(1)
    }
}

/// Resolve `grid` in place until no match remains.
/// Fails with `CascadeLimit` if matches persist after `max_rounds` rounds; the grid is
/// left as it was after the last completed round.
pub fn resolve<R: Rng + ?Sized>(
    grid: &mut Grid,
    alphabet: &[Gem],
    scoring: &ScoreEngine,
    max_rounds: u32,
    rng: &mut R,
) -> Result<Chain, EngineError> {
    let mut chain = Chain::default();
    let mut step = 0u32;
    loop {
        let cleared = find_matches(grid);
        if cleared.is_empty() {
            debug_assert_eq!(chain.points, scoring.chain_total(&chain.cleared_per_round()));
            return Ok(chain);
        }
        if step >= max_rounds {
            return Err(EngineError::CascadeLimit { rounds: step });
        }

        let before = grid.clone();
        for &at in &cleared {
            grid.set(at, Cell::Empty);
        }
        let after_clear = grid.clone();
        debug_assert_eq!(after_clear.count_empty(), cleared.len());
        let dropped = grid.apply_gravity();
        let after_gravity = grid.clone();
        let filled = grid.refill(alphabet, rng);

        let points = scoring.round_delta(cleared.len(), step);
        tracing::debug!(step, cleared = cleared.len(), dropped, filled, points, "cascade round");
        chain.points = chain.points.saturating_add(points);
        chain.rounds.push(CascadeRound {
            step,
            multiplier_pct: scoring.multiplier_pct(step),
            cleared,
            points,
            before,
            after_clear,
            after_gravity,
            after_refill: grid.clone(),
        });
        step += 1;
    }
}
