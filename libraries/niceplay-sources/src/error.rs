//! Error types for track sources

use niceplay_client::ClientError;
use thiserror::Error;

/// Source errors
///
/// Cloneable: every caller waiting on a shared in-flight fetch receives the
/// same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The backend fetch failed
    #[error("{provider} fetch failed: {message}")]
    Fetch { provider: String, message: String },

    /// A side-loaded cache was queried before anything was loaded into it
    #[error("{0} has no playlist loaded")]
    NotLoaded(String),

    /// The fetch needs a logged-in user
    #[error("Authentication required")]
    AuthRequired,
}

impl SourceError {
    /// Wrap any displayable failure as a fetch error for `provider`
    pub fn fetch(provider: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            provider: provider.into(),
            message: err.to_string(),
        }
    }

    /// Map a backend client failure for `provider`, keeping auth failures distinct
    pub(crate) fn from_client(provider: &str, err: ClientError) -> Self {
        match err {
            ClientError::AuthRequired => Self::AuthRequired,
            other => Self::fetch(provider, other),
        }
    }
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
