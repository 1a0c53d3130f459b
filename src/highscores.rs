//! Persist the best score to disk (XDG config or ~/.config/gemtui).

use crate::error::StoreError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const FILENAME: &str = "best";

/// Persistence collaborator for the best score.
pub trait BestScoreStore {
    fn load_best_score(&self) -> Result<u32, StoreError>;
    fn save_best_score(&self, score: u32) -> Result<(), StoreError>;
}

/// Returns the app config directory (config dir / gemtui).
pub fn config_dir() -> Result<PathBuf, StoreError> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .map_err(|_| StoreError::NoConfigDir)?,
    };
    Ok(base.join("gemtui"))
}

/// Best score as a single decimal line in a text file.
#[derive(Debug, Clone)]
pub struct FileBestScore {
    path: PathBuf,
}

impl FileBestScore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location.
    pub fn default_location() -> Result<Self, StoreError> {
        Ok(Self::new(config_dir()?.join(FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for FileBestScore {
    /// Missing file means no best score yet (0).
    fn load_best_score(&self) -> Result<u32, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let line = content.lines().next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(0);
        }
        line.parse::<u32>().map_err(|_| StoreError::Parse {
            path: self.path.clone(),
            value: line.to_string(),
        })
    }

    /// Creates the parent directory if needed.
    fn save_best_score(&self, score: u32) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut f = fs::File::create(&self.path).map_err(io_err)?;
        writeln!(f, "{}", score).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gemtui-test-{}-{}", std::process::id(), name))
            .join(FILENAME)
    }

    #[test]
    fn test_missing_file_is_zero() {
        let store = FileBestScore::new(temp_path("missing"));
        assert_eq!(store.load_best_score().unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let store = FileBestScore::new(&path);
        store.save_best_score(1234).unwrap();
        assert_eq!(store.load_best_score().unwrap(), 1234);
        store.save_best_score(99).unwrap();
        assert_eq!(store.load_best_score().unwrap(), 99);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a number\n").unwrap();
        let err = FileBestScore::new(&path).load_best_score().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
