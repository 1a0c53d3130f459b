//! Leaderboard: best score per player, highest first.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "leaderboard.json";
/// Entries kept on the board.
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub user_id: String,
    pub user_name: String,
    pub score: u32,
}

/// Leaderboard collaborator.
pub trait Leaderboard {
    fn submit_score(&self, entry: &Entry) -> Result<(), StoreError>;
    /// Entries ordered by score, highest first.
    fn fetch(&self) -> Result<Vec<Entry>, StoreError>;
}

/// Merge `entry` into `entries`: one row per user keeping their higher score,
/// sorted descending (ties keep earlier rows first), capped at `LEADERBOARD_SIZE`.
pub fn merge(entries: &mut Vec<Entry>, entry: &Entry) {
    match entries.iter_mut().find(|e| e.user_id == entry.user_id) {
        Some(existing) => {
            if entry.score > existing.score {
                existing.score = entry.score;
            }
            existing.user_name.clone_from(&entry.user_name);
        }
        None => entries.push(entry.clone()),
    }
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(LEADERBOARD_SIZE);
}

/// JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, StoreError> {
        Ok(Self::new(crate::highscores::config_dir()?.join(FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Entry>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl Leaderboard for FileLeaderboard {
    fn submit_score(&self, entry: &Entry) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        merge(&mut entries, entry);
        let json = serde_json::to_string_pretty(&entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)
    }

    fn fetch(&self) -> Result<Vec<Entry>, StoreError> {
        let mut entries = self.read()?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }
}
