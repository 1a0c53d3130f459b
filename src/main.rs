//! Gemtui: turn-limited match-3 gem puzzle in the terminal.

mod app;
mod board;
mod cascade;
mod error;
mod game;
mod generator;
mod highscores;
mod input;
mod leaderboard;
mod matcher;
mod records;
mod scoring;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use error::ConfigError;
use std::path::{Path, PathBuf};

/// Engine constants. Everything the rules depend on, adjustable without touching the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub size: usize,
    pub gem_kinds: usize,
    pub initial_moves: u32,
    pub base_match_score: u32,
    pub combo_bonus_pct: u32,
    pub max_cascade_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: 6,
            gem_kinds: 6,
            initial_moves: 20,
            base_match_score: scoring::BASE_MATCH_SCORE,
            combo_bonus_pct: scoring::COMBO_BONUS_PCT,
            max_cascade_rounds: cascade::MAX_CASCADE_ROUNDS,
        }
    }
}

impl GameConfig {
    pub const SIZES: std::ops::RangeInclusive<usize> = 4..=12;
    pub const GEM_KINDS: std::ops::RangeInclusive<usize> = generator::MIN_KINDS..=6;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Self::SIZES.contains(&self.size) {
            return Err(ConfigError::Validation(format!(
                "size must be in {}..={}, got {}",
                Self::SIZES.start(),
                Self::SIZES.end(),
                self.size
            )));
        }
        if !Self::GEM_KINDS.contains(&self.gem_kinds) {
            return Err(ConfigError::Validation(format!(
                "gems must be in {}..={}, got {}",
                Self::GEM_KINDS.start(),
                Self::GEM_KINDS.end(),
                self.gem_kinds
            )));
        }
        if self.initial_moves == 0 {
            return Err(ConfigError::Validation("moves must be > 0".into()));
        }
        if self.max_cascade_rounds == 0 {
            return Err(ConfigError::Validation("max-cascade must be > 0".into()));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());

    let config = GameConfig {
        size: args.size,
        gem_kinds: args.gems,
        initial_moves: args.moves,
        base_match_score: args.base_score,
        combo_bonus_pct: args.combo_bonus,
        max_cascade_rounds: args.max_cascade,
    };
    config.validate().context("invalid game configuration")?;

    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(t) => t,
        Err(err) => {
            tracing::warn!(%err, "theme not loaded, using defaults");
            theme::Theme::default()
        }
    };
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Log to a file; the terminal belongs to the TUI. Logging is skipped if the file can't be opened.
fn init_logging(path: Option<&Path>) {
    use tracing_subscriber::EnvFilter;

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match highscores::config_dir() {
            Ok(dir) => dir.join("gemtui.log"),
            Err(_) => return,
        },
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init();
}

/// Match-3 gem puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "gemtui",
    version,
    about = "Match-3 gem puzzle in the terminal. Swap neighbouring gems to line up three or more; you have a limited number of moves.",
    long_about = "Gemtui is a turn-limited match-3 puzzle.\n\n\
        Swap two neighbouring gems to line up three or more of the same kind. Matched gems \
        clear, the gems above fall, new gems drop in, and any new lines clear too with a \
        growing combo bonus. A swap that makes no line is undone and costs nothing.\n\n\
        CONTROLS:\n  Arrows / hjkl   Move cursor    Enter / Space   Select / swap\n  \
        R               Restart        Tab / b         Leaderboard\n  Q / Esc         Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board size (cells per side).
    #[arg(long, default_value = "6", value_name = "N")]
    pub size: usize,

    /// Number of gem kinds in play (3..=6).
    #[arg(long, default_value = "6", value_name = "N")]
    pub gems: usize,

    /// Moves per game.
    #[arg(short, long, default_value = "20", value_name = "N")]
    pub moves: u32,

    /// Points per cleared gem.
    #[arg(long, default_value = "10", value_name = "POINTS")]
    pub base_score: u32,

    /// Combo bonus per cascade step, in percent of the base multiplier.
    #[arg(long, default_value = "5", value_name = "PCT")]
    pub combo_bonus: u32,

    /// Safety bound on cascade rounds per move.
    #[arg(long, default_value = "64", value_name = "N")]
    pub max_cascade: u32,

    /// RNG seed for a reproducible game.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Name shown on the leaderboard. Defaults to $USER, else "Guest".
    #[arg(short, long, value_name = "NAME")]
    pub player: Option<String>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable cascade animation (chains resolve instantly).
    #[arg(long)]
    pub no_animation: bool,

    /// Time each cascade phase (cleared, dropped, refilled) stays on screen.
    #[arg(long, default_value = "180", value_name = "MS")]
    pub phase_ms: u64,

    /// Log file. Defaults to the config directory (gemtui.log). Level via RUST_LOG.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_bounds() {
        let bad = [
            GameConfig {
                size: 3,
                ..GameConfig::default()
            },
            GameConfig {
                gem_kinds: 2,
                ..GameConfig::default()
            },
            GameConfig {
                initial_moves: 0,
                ..GameConfig::default()
            },
            GameConfig {
                max_cascade_rounds: 0,
                ..GameConfig::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_cli_defaults_match_config() {
        let args = Args::parse_from(["gemtui"]);
        assert_eq!(args.size, GameConfig::default().size);
        assert_eq!(args.moves, GameConfig::default().initial_moves);
        assert_eq!(args.combo_bonus, GameConfig::default().combo_bonus_pct);
        assert_eq!(args.max_cascade, GameConfig::default().max_cascade_rounds);
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::parse_from(["gemtui", "--size", "8", "--gems", "4", "--seed", "7"]);
        assert_eq!(args.size, 8);
        assert_eq!(args.gems, 4);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.palette, Palette::Normal);
    }
}
