//! Error types for the PromptLoom domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The formatting engine
//! itself never fails — these errors only surface from the outer shell
//! (file loading, argument parsing).

use thiserror::Error;

/// The top-level error type for PromptLoom operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid speaker: {0} (expected \"user\" or \"other\")")]
    InvalidSpeaker(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
