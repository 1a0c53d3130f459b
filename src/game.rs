//! Game state: grid, score, moves, selection, and the swap -> cascade -> settle cycle.

use crate::GameConfig;
use crate::board::{Coord, Gem, Grid};
use crate::cascade::{self, Chain};
use crate::error::EngineError;
use crate::generator;
use crate::matcher::has_matches;
use crate::scoring::ScoreEngine;
use rand::rngs::StdRng;

/// Turn/selection state. `Resolving` is the lock: set before the swap mutates the
/// grid, released by `GameState::settle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Selected(Coord),
    Resolving,
    GameOver,
}

/// What a `select` did.
#[derive(Debug, Clone)]
pub enum SelectOutcome {
    /// Locked, game over, out of moves, or out of bounds.
    Ignored,
    Selected(Coord),
    Deselected,
    /// Non-adjacent click moved the selection.
    Reselected(Coord),
    /// Swap produced no match and was undone; no move spent.
    Reverted { from: Coord, to: Coord },
    /// Swap matched; a move was spent and the chain resolved. Call `settle` once shown.
    Resolved {
        from: Coord,
        to: Coord,
        chain: Chain,
    },
}

/// Outcome of a finished chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub score: u32,
    pub best_score: u32,
    pub moves_remaining: u32,
    /// Score beats the best score the game started with.
    pub new_best: bool,
    pub game_over: bool,
}

/// Runs while the lock is still held, when the last move has been spent.
pub trait GameOverHook {
    fn on_game_over(&mut self, summary: &Settlement);
}

impl GameOverHook for () {
    fn on_game_over(&mut self, _summary: &Settlement) {}
}

#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    scoring: ScoreEngine,
    rng: StdRng,
    grid: Grid,
    score: u32,
    best_score: u32,
    /// Best score when this game began; decides `Settlement::new_best`.
    best_at_start: u32,
    moves_remaining: u32,
    status: Status,
    /// A cascade fault ended the game and `settle` has not reported it yet.
    unsettled_fault: bool,
}

impl GameState {
    /// New game with a freshly generated match-free grid.
    pub fn new(config: GameConfig, best_score: u32, mut rng: StdRng) -> Self {
        let grid = generator::generate(config.size, Gem::alphabet(config.gem_kinds), &mut rng);
        Self::with_grid(config, grid, best_score, rng)
    }

    /// New game on a given grid.
    pub fn with_grid(config: GameConfig, grid: Grid, best_score: u32, rng: StdRng) -> Self {
        tracing::info!(
            size = grid.size(),
            moves = config.initial_moves,
            best_score,
            "new game"
        );
        Self {
            scoring: ScoreEngine::new(config.base_match_score, config.combo_bonus_pct),
            moves_remaining: config.initial_moves,
            config,
            rng,
            grid,
            score: 0,
            best_score,
            best_at_start: best_score,
            status: Status::Idle,
            unsettled_fault: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoreEngine {
        &self.scoring
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn selection(&self) -> Option<Coord> {
        match self.status {
            Status::Selected(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.status == Status::Resolving
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    /// Adopt a best score learned after construction (e.g. loaded late from the store).
    pub fn raise_best_score(&mut self, best: u32) {
        self.best_score = self.best_score.max(best);
        self.best_at_start = self.best_at_start.max(best);
    }

    /// Click on a cell.
    pub fn select(&mut self, at: Coord) -> Result<SelectOutcome, EngineError> {
        if self.moves_remaining == 0 || !self.grid.contains(at) {
            return Ok(SelectOutcome::Ignored);
        }
        match self.status {
            Status::Resolving | Status::GameOver => Ok(SelectOutcome::Ignored),
            Status::Idle => {
                self.status = Status::Selected(at);
                Ok(SelectOutcome::Selected(at))
            }
            Status::Selected(current) if current == at => {
                self.status = Status::Idle;
                Ok(SelectOutcome::Deselected)
            }
            Status::Selected(current) if !current.is_adjacent(at) => {
                self.status = Status::Selected(at);
                Ok(SelectOutcome::Reselected(at))
            }
            Status::Selected(current) => self.swap(current, at),
        }
    }

    fn swap(&mut self, from: Coord, to: Coord) -> Result<SelectOutcome, EngineError> {
        self.status = Status::Resolving;
        self.grid.swap(from, to);
        if !has_matches(&self.grid) {
            self.grid.swap(from, to);
            self.status = Status::Idle;
            tracing::debug!(?from, ?to, "swap reverted");
            return Ok(SelectOutcome::Reverted { from, to });
        }

        self.moves_remaining -= 1;
        let chain = match cascade::resolve(
            &mut self.grid,
            Gem::alphabet(self.config.gem_kinds),
            &self.scoring,
            self.config.max_cascade_rounds,
            &mut self.rng,
        ) {
            Ok(chain) => chain,
            Err(err) => {
                tracing::error!(%err, grid = %self.grid, "cascade aborted");
                self.status = Status::GameOver;
                self.unsettled_fault = true;
                return Err(err);
            }
        };
        self.score = self.score.saturating_add(chain.points);
        tracing::debug!(
            ?from,
            ?to,
            rounds = chain.rounds.len(),
            points = chain.points,
            moves_remaining = self.moves_remaining,
            "swap resolved"
        );
        Ok(SelectOutcome::Resolved { from, to, chain })
    }

    /// Completion signal once the chain has been shown. Updates the best score, runs
    /// game-over handling if the last move was spent, then releases the lock.
    /// After a cascade fault it reports the game over once, with the score before the
    /// faulted move. Returns None when there is nothing to settle.
    pub fn settle(&mut self, hook: &mut dyn GameOverHook) -> Option<Settlement> {
        let faulted = std::mem::take(&mut self.unsettled_fault);
        if self.status != Status::Resolving && !faulted {
            return None;
        }
        self.best_score = self.best_score.max(self.score);
        let summary = Settlement {
            score: self.score,
            best_score: self.best_score,
            moves_remaining: self.moves_remaining,
            new_best: self.score > self.best_at_start,
            game_over: faulted || self.moves_remaining == 0,
        };
        if summary.game_over {
            tracing::info!(score = summary.score, best = summary.best_score, "game over");
            hook.on_game_over(&summary);
            self.status = Status::GameOver;
        } else {
            self.status = Status::Idle;
        }
        Some(summary)
    }

    /// Fresh grid, score 0, full moves; best score kept. Ignored while resolving.
    pub fn restart(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.grid = generator::generate(
            self.config.size,
            Gem::alphabet(self.config.gem_kinds),
            &mut self.rng,
        );
        self.score = 0;
        self.moves_remaining = self.config.initial_moves;
        self.best_at_start = self.best_score;
        self.status = Status::Idle;
        self.unsettled_fault = false;
        tracing::info!(best_score = self.best_score, "game restarted");
        true
    }

    /// Platform primary action: restart, but only once the moves are used up.
    pub fn primary_action(&mut self) -> bool {
        self.moves_remaining == 0 && self.restart()
    }
}
