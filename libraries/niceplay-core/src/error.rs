/// Core error types for NicePlay
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for NicePlay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A textual context id could not be parsed
    #[error("Invalid playback context: {0:?}")]
    InvalidContext(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Create an invalid context error
    pub fn invalid_context(raw: impl Into<String>) -> Self {
        Self::InvalidContext(raw.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
