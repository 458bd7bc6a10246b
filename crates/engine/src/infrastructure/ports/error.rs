//! Error types for port operations.

/// Repository operation errors with context for debugging.
///
/// A missing entity is not an error; finders return `Option`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepoError {
    /// Storage operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }
}

/// A single metadata backend could not produce a usable answer.
///
/// Never leaves the metadata service; it only decides whether the next
/// backend is tried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Timed out after {0} ms")]
    Timeout(u64),
    #[error("Nothing found for {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}
