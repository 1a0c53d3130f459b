//! Error types: engine faults, config validation, store I/O.

use std::path::PathBuf;

/// Faults inside the puzzle engine. Distinct from rejected input, which is not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cascade did not settle within {rounds} rounds")]
    CascadeLimit { rounds: u32 },
}

/// Errors that can occur when validating the game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors from the best-score and leaderboard stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no config directory (HOME and XDG_CONFIG_HOME unset)")]
    NoConfigDir,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid score {value:?} in {path}")]
    Parse { path: PathBuf, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_limit_display() {
        let err = EngineError::CascadeLimit { rounds: 64 };
        assert_eq!(err.to_string(), "cascade did not settle within 64 rounds");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("gems must be in 3..=6".to_string());
        assert_eq!(err.to_string(), "config validation error: gems must be in 3..=6");
    }

    #[test]
    fn test_parse_error_display() {
        let err = StoreError::Parse {
            path: PathBuf::from("best"),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid score \"abc\" in best");
    }
}
