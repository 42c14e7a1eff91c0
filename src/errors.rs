/*!
 * Error types for the termguard engine.
 *
 * This module contains custom error types for the different layers,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors returned by a remote glossary provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Invalid, missing or revoked API key
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Character or glossary quota of the account is exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Too many requests in a short period
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        /// Error message from the API
        message: String,
        /// Value of the Retry-After header, if any
        retry_after_secs: Option<u64>,
    },

    /// The provider rejected the request payload
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The remote resource does not exist (anymore)
    #[error("Remote resource not found: {0}")]
    NotFound(String),

    /// The provider failed internally
    #[error("Server error: {status_code} - {message}")]
    Server {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider could not be reached
    #[error("Connection error: {0}")]
    Connection(String),
}

impl RemoteError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::RateLimited { .. }
            | RemoteError::Server { .. }
            | RemoteError::Timeout(_)
            | RemoteError::Connection(_) => true,
            RemoteError::Authentication(_)
            | RemoteError::QuotaExceeded(_)
            | RemoteError::BadRequest(_)
            | RemoteError::NotFound(_) => false,
        }
    }

    /// Whether the user has to reconfigure something before the call can work
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            RemoteError::Authentication(_) | RemoteError::QuotaExceeded(_)
        )
    }
}

/// Errors raised by glossary operations
#[derive(Error, Debug)]
pub enum GlossaryError {
    /// A glossary or entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data that cannot be processed (empty term, empty entry set, ...)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Reading or writing a glossary file failed
    #[error("File error: {0}")]
    File(String),

    /// Failure reported by the remote provider
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Unexpected local failure during the sync workflow
    #[error("Sync error: {0}")]
    Sync(String),

    /// Repository failure
    #[error("Database error: {0}")]
    Database(String),
}

impl GlossaryError {
    /// The remote failure behind this error, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            GlossaryError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for GlossaryError {
    fn from(error: anyhow::Error) -> Self {
        Self::Database(format!("{:#}", error))
    }
}

impl From<std::io::Error> for GlossaryError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
