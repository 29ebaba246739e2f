// Error types for battle rules and battle configuration.

use thiserror::Error;

/// A rejected battle action. Callers treat these as no-ops: the action is
/// dropped and battle state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("unrecognized move key {0:?}")]
    InvalidMove(String),

    #[error("no inactive creature to swap in")]
    NoBench,
}

/// Failure to load or validate a `BattleConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read battle config")]
    Io(#[from] std::io::Error),

    #[error("failed to parse battle config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid battle config: {0}")]
    Invalid(String),
}
