//! Best-effort bridge between the game and its stores. Store failures are logged and
//! never reach game state; the last known values are used instead.

use crate::game::{GameOverHook, Settlement};
use crate::highscores::BestScoreStore;
use crate::leaderboard::{Entry, Leaderboard};

/// Who is playing, as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: "guest".to_string(),
            name: "Guest".to_string(),
        }
    }
}

pub struct Records {
    best: Box<dyn BestScoreStore>,
    board: Box<dyn Leaderboard>,
    player: Player,
    /// Last best score known to be persisted (or loaded).
    cached_best: u32,
}

impl Records {
    pub fn new(best: Box<dyn BestScoreStore>, board: Box<dyn Leaderboard>, player: Player) -> Self {
        Self {
            best,
            board,
            player,
            cached_best: 0,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Load the best score, falling back to the cached value.
    pub fn load_best(&mut self) -> u32 {
        match self.best.load_best_score() {
            Ok(best) => {
                self.cached_best = self.cached_best.max(best);
            }
            Err(err) => {
                tracing::warn!(%err, fallback = self.cached_best, "could not load best score");
            }
        }
        self.cached_best
    }

    /// Leaderboard rows, or None when unavailable.
    pub fn leaderboard(&self) -> Option<Vec<Entry>> {
        match self.board.fetch() {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(%err, "could not load leaderboard");
                None
            }
        }
    }
}

impl GameOverHook for Records {
    fn on_game_over(&mut self, summary: &Settlement) {
        if summary.best_score > self.cached_best {
            match self.best.save_best_score(summary.best_score) {
                Ok(()) => self.cached_best = summary.best_score,
                Err(err) => tracing::warn!(%err, "could not save best score"),
            }
        }
        if summary.score == 0 {
            return;
        }
        let entry = Entry {
            user_id: self.player.id.clone(),
            user_name: self.player.name.clone(),
            score: summary.score,
        };
        if let Err(err) = self.board.submit_score(&entry) {
            tracing::warn!(%err, "could not submit score");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Default)]
    struct MemBest {
        value: Rc<RefCell<Option<u32>>>,
        fail: bool,
    }

    fn io_failure() -> StoreError {
        StoreError::Io {
            path: PathBuf::from("mem"),
            source: std::io::Error::other("offline"),
        }
    }

    impl BestScoreStore for MemBest {
        fn load_best_score(&self) -> Result<u32, StoreError> {
            if self.fail {
                return Err(io_failure());
            }
            Ok(self.value.borrow().unwrap_or(0))
        }

        fn save_best_score(&self, score: u32) -> Result<(), StoreError> {
            if self.fail {
                return Err(io_failure());
            }
            *self.value.borrow_mut() = Some(score);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemBoard {
        entries: Rc<RefCell<Vec<Entry>>>,
        fail: bool,
    }

    impl Leaderboard for MemBoard {
        fn submit_score(&self, entry: &Entry) -> Result<(), StoreError> {
            if self.fail {
                return Err(io_failure());
            }
            crate::leaderboard::merge(&mut self.entries.borrow_mut(), entry);
            Ok(())
        }

        fn fetch(&self) -> Result<Vec<Entry>, StoreError> {
            if self.fail {
                return Err(io_failure());
            }
            Ok(self.entries.borrow().clone())
        }
    }

    fn summary(score: u32, best: u32) -> Settlement {
        Settlement {
            score,
            best_score: best,
            moves_remaining: 0,
            new_best: score >= best,
            game_over: true,
        }
    }

    #[test]
    fn test_game_over_saves_best_and_submits() {
        let saved = Rc::new(RefCell::new(None));
        let entries = Rc::new(RefCell::new(Vec::new()));
        let mut records = Records::new(
            Box::new(MemBest {
                value: saved.clone(),
                fail: false,
            }),
            Box::new(MemBoard {
                entries: entries.clone(),
                fail: false,
            }),
            Player::default(),
        );
        assert_eq!(records.load_best(), 0);
        records.on_game_over(&summary(420, 420));
        assert_eq!(*saved.borrow(), Some(420));
        assert_eq!(entries.borrow().len(), 1);
        assert_eq!(entries.borrow()[0].score, 420);

        // Lower score: best untouched, still submitted.
        records.on_game_over(&summary(100, 420));
        assert_eq!(*saved.borrow(), Some(420));
        assert_eq!(records.leaderboard().unwrap()[0].score, 420);
    }

    #[test]
    fn test_failures_fall_back() {
        let mut records = Records::new(
            Box::new(MemBest {
                fail: true,
                ..MemBest::default()
            }),
            Box::new(MemBoard {
                fail: true,
                ..MemBoard::default()
            }),
            Player::default(),
        );
        assert_eq!(records.load_best(), 0);
        records.on_game_over(&summary(50, 50));
        assert_eq!(records.load_best(), 0);
        assert!(records.leaderboard().is_none());
    }

    #[test]
    fn test_load_reads_store() {
        let value = Rc::new(RefCell::new(Some(77)));
        let mut records = Records::new(
            Box::new(MemBest {
                value,
                fail: false,
            }),
            Box::new(MemBoard::default()),
            Player::default(),
        );
        assert_eq!(records.load_best(), 77);
    }
}
