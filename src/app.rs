//! App: terminal init, main loop, cascade playback and key handling.

use crate::board::Coord;
use crate::cascade::Chain;
use crate::game::{GameState, SelectOutcome, Settlement};
use crate::highscores::FileBestScore;
use crate::input::{Action, key_to_action};
use crate::leaderboard::{Entry, FileLeaderboard};
use crate::records::{Player, Records};
use crate::theme::Theme;
use crate::ui::{self, MoveSummary, Phase, PhaseFrame, View};
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Frame budget for event polling (~60 FPS).
const FRAME_MS: u64 = 16;

/// Chain playback: one frame per phase, each shown for `--phase-ms`.
struct Animation {
    frames: VecDeque<PhaseFrame>,
    shown_at: Instant,
}

impl Animation {
    fn new(chain: &Chain, now: Instant) -> Self {
        Self {
            frames: phase_frames(chain),
            shown_at: now,
        }
    }

    /// Step to the next frame once the current one has been up for `hold`.
    /// Returns true when playback is over.
    fn advance(&mut self, now: Instant, hold: Duration) -> bool {
        if !self.frames.is_empty() && now.saturating_duration_since(self.shown_at) >= hold {
            self.frames.pop_front();
            self.shown_at = now;
        }
        self.frames.is_empty()
    }
}

/// Flatten a chain into its render phases, in order.
fn phase_frames(chain: &Chain) -> VecDeque<PhaseFrame> {
    let mut frames = VecDeque::with_capacity(chain.rounds.len() * 4);
    for round in &chain.rounds {
        let phases = [
            (Phase::Matched, &round.before),
            (Phase::Cleared, &round.after_clear),
            (Phase::Compacted, &round.after_gravity),
            (Phase::Refilled, &round.after_refill),
        ];
        for (phase, grid) in phases {
            frames.push_back(PhaseFrame {
                phase,
                step: round.step,
                multiplier_pct: round.multiplier_pct,
                points: round.points,
                grid: grid.clone(),
                cleared: round.cleared.clone(),
            });
        }
    }
    frames
}

/// Cursor after a movement action, clamped to the board.
fn move_cursor(cursor: Coord, action: Action, size: usize) -> Coord {
    let last = size.saturating_sub(1);
    match action {
        Action::CursorUp => Coord::new(cursor.row.saturating_sub(1), cursor.col),
        Action::CursorDown => Coord::new((cursor.row + 1).min(last), cursor.col),
        Action::CursorLeft => Coord::new(cursor.row, cursor.col.saturating_sub(1)),
        Action::CursorRight => Coord::new(cursor.row, (cursor.col + 1).min(last)),
        _ => cursor,
    }
}

fn center(size: usize) -> Coord {
    Coord::new(size / 2, size / 2)
}

/// Player from --player, else $USER, else the guest identity.
fn resolve_player(name: Option<&str>) -> Player {
    let name = name
        .map(str::to_string)
        .or_else(|| std::env::var("USER").ok())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    match name {
        Some(name) => Player {
            id: name.to_lowercase(),
            name,
        },
        None => Player::default(),
    }
}

fn open_records(player: Player) -> Records {
    let best = FileBestScore::default_location().unwrap_or_else(|err| {
        tracing::warn!(%err, "no config directory, best score kept in working directory");
        FileBestScore::new("gemtui-best")
    });
    let board = FileLeaderboard::default_location().unwrap_or_else(|err| {
        tracing::warn!(%err, "no config directory, leaderboard kept in working directory");
        FileLeaderboard::new("gemtui-leaderboard.json")
    });
    tracing::info!(
        best = %best.path().display(),
        leaderboard = %board.path().display(),
        player = %player.name,
        "stores opened"
    );
    Records::new(Box::new(best), Box::new(board), player)
}

pub struct App {
    args: Args,
    theme: Theme,
    state: GameState,
    records: Records,
    cursor: Coord,
    animation: Option<Animation>,
    /// TachyonFX fade over matched gems (created when a Matched frame shows).
    clear_effect: Option<Effect>,
    /// Last time the fade was processed (for delta).
    clear_effect_time: Option<Instant>,
    last_move: Option<MoveSummary>,
    settlement: Option<Settlement>,
    notice: Option<String>,
    fault: Option<String>,
    /// Some while the leaderboard overlay is open; inner None = unavailable.
    leaderboard: Option<Option<Vec<Entry>>>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let mut records = open_records(resolve_player(args.player.as_deref()));
        let best = records.load_best();
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let cursor = center(config.size);
        let state = GameState::new(config, best, rng);
        Ok(Self {
            args,
            theme,
            state,
            records,
            cursor,
            animation: None,
            clear_effect: None,
            clear_effect_time: None,
            last_move: None,
            settlement: None,
            notice: None,
            fault: None,
            leaderboard: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let hold = Duration::from_millis(self.args.phase_ms);
        loop {
            let now = Instant::now();
            self.tick_animation(now, hold);

            terminal.draw(|f| {
                let view = View {
                    state: &self.state,
                    theme: &self.theme,
                    cursor: self.cursor,
                    frame: self.animation.as_ref().and_then(|a| a.frames.front()),
                    last_move: self.last_move,
                    settlement: self.settlement,
                    notice: self.notice.as_deref(),
                    fault: self.fault.as_deref(),
                    player: &self.records.player().name,
                    leaderboard: self.leaderboard.as_ref().map(|l| l.as_deref()),
                    fade_ms: self.args.phase_ms.min(u64::from(u32::MAX)) as u32,
                };
                ui::draw(
                    f,
                    &view,
                    &mut self.clear_effect,
                    &mut self.clear_effect_time,
                    now,
                );
            })?;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn tick_animation(&mut self, now: Instant, hold: Duration) {
        let finished = self
            .animation
            .as_mut()
            .is_some_and(|a| a.advance(now, hold));
        if finished {
            self.animation = None;
            self.clear_effect = None;
            self.clear_effect_time = None;
            self.finish_chain();
        }
    }

    /// Render of the chain is complete: hand the completion signal to the engine.
    fn finish_chain(&mut self) {
        let Some(summary) = self.state.settle(&mut self.records) else {
            return;
        };
        self.settlement = Some(summary);
        self.notice = match summary.moves_remaining {
            1 => Some("Last move!".to_string()),
            n @ 2..=3 => Some(format!("{n} moves left")),
            _ => None,
        };
        if summary.game_over {
            self.notice = None;
            if self.leaderboard.is_some() {
                self.leaderboard = Some(self.records.leaderboard());
            }
        }
    }

    /// Returns true to quit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::Leaderboard => {
                self.leaderboard = match self.leaderboard {
                    Some(_) => None,
                    None => Some(self.records.leaderboard()),
                };
            }
            _ if self.leaderboard.is_some() => self.leaderboard = None,
            _ if self.animation.is_some() || self.state.is_locked() => {}
            Action::Restart => {
                if self.state.restart() {
                    self.reset_view();
                }
            }
            Action::Select if self.state.is_game_over() => {
                if self.state.primary_action() {
                    self.reset_view();
                }
            }
            Action::Select => self.select(),
            Action::CursorUp | Action::CursorDown | Action::CursorLeft | Action::CursorRight => {
                self.cursor = move_cursor(self.cursor, action, self.state.grid().size());
            }
            Action::None => {}
        }
        false
    }

    fn select(&mut self) {
        match self.state.select(self.cursor) {
            Ok(SelectOutcome::Resolved { from, to, chain }) => {
                tracing::debug!(%from, %to, rounds = chain.rounds.len(), "playing chain");
                self.notice = None;
                self.last_move = Some(MoveSummary {
                    points: chain.points,
                    cleared: chain.cleared_total(),
                    combos: chain.combo_steps(),
                });
                if self.args.no_animation {
                    self.finish_chain();
                } else {
                    self.animation = Some(Animation::new(&chain, Instant::now()));
                }
            }
            Ok(SelectOutcome::Reverted { from, to }) => {
                self.notice = Some(format!("No match at {from} / {to}"));
            }
            Ok(SelectOutcome::Selected(at) | SelectOutcome::Reselected(at)) => {
                self.notice = Some(format!("Selected {at}"));
            }
            Ok(SelectOutcome::Deselected) => {
                self.notice = None;
            }
            Ok(SelectOutcome::Ignored) => {}
            Err(err) => {
                tracing::error!(%err, "move aborted, game over");
                self.fault = Some(err.to_string());
                self.finish_chain();
            }
        }
    }

    /// Clear per-game view state after a restart; pick up a best score saved elsewhere.
    fn reset_view(&mut self) {
        let best = self.records.load_best();
        self.state.raise_best_score(best);
        self.cursor = center(self.state.grid().size());
        self.animation = None;
        self.clear_effect = None;
        self.clear_effect_time = None;
        self.last_move = None;
        self.settlement = None;
        self.notice = None;
        self.fault = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;
    use crate::cascade;
    use crate::scoring::ScoreEngine;

    #[test]
    fn test_cursor_clamped_to_board() {
        let size = 6;
        let origin = Coord::new(0, 0);
        assert_eq!(move_cursor(origin, Action::CursorUp, size), origin);
        assert_eq!(move_cursor(origin, Action::CursorLeft, size), origin);
        assert_eq!(
            move_cursor(origin, Action::CursorRight, size),
            Coord::new(0, 1)
        );
        let corner = Coord::new(5, 5);
        assert_eq!(move_cursor(corner, Action::CursorDown, size), corner);
        assert_eq!(move_cursor(corner, Action::CursorRight, size), corner);
        assert_eq!(move_cursor(corner, Action::Select, size), corner);
    }

    #[test]
    fn test_phase_frames_follow_rounds() {
        let mut grid = Grid::from_rows(&[
            "RRRYPO", //
            "BGYPOR", //
            "GYPORB", //
            "YPORBG", //
            "PORBGY", //
            "ORBGYP", //
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let chain = cascade::resolve(
            &mut grid,
            crate::board::Gem::alphabet(6),
            &ScoreEngine::default(),
            cascade::MAX_CASCADE_ROUNDS,
            &mut rng,
        )
        .unwrap();
        let frames = phase_frames(&chain);
        assert_eq!(frames.len(), chain.rounds.len() * 4);
        let phases: Vec<Phase> = frames.iter().take(4).map(|f| f.phase).collect();
        assert_eq!(
            phases,
            [Phase::Matched, Phase::Cleared, Phase::Compacted, Phase::Refilled]
        );
        assert_eq!(frames[0].grid, chain.rounds[0].before);
        assert_eq!(frames.back().map(|f| &f.grid), chain.rounds.last().map(|r| &r.after_refill));
    }

    #[test]
    fn test_animation_advances_per_hold() {
        let start = Instant::now();
        let hold = Duration::from_millis(100);
        let mut anim = Animation {
            frames: VecDeque::from(vec![
                PhaseFrame {
                    phase: Phase::Matched,
                    step: 0,
                    multiplier_pct: 100,
                    points: 30,
                    grid: Grid::new(4),
                    cleared: Default::default(),
                },
                PhaseFrame {
                    phase: Phase::Refilled,
                    step: 0,
                    multiplier_pct: 100,
                    points: 30,
                    grid: Grid::new(4),
                    cleared: Default::default(),
                },
            ]),
            shown_at: start,
        };
        assert!(!anim.advance(start + Duration::from_millis(50), hold));
        assert_eq!(anim.frames.len(), 2);
        assert!(!anim.advance(start + hold, hold));
        assert_eq!(anim.frames.len(), 1);
        assert!(anim.advance(start + hold * 3, hold));
    }

    #[test]
    fn test_player_resolution() {
        let p = resolve_player(Some("  Ada "));
        assert_eq!(p.name, "Ada");
        assert_eq!(p.id, "ada");
    }
}
