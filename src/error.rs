//! Error types for note synthesis and Evernote calls
//!
//! `StoreError` is what a remote store raises. `EvernoteError` is what callers
//! of this crate branch on: every store failure is translated into one of its
//! variants with the original failure kept as `source()`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// EDAM error code signalling that the API rate limit was reached.
pub const RATE_LIMIT_REACHED: i32 = 19;

pub type Result<T, E = EvernoteError> = std::result::Result<T, E>;

/// Failure raised by a remote note/user store.
///
/// Mirrors the EDAM exception family: not-found, system and user exceptions,
/// plus transport failures that never reached the service.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {}", identifier.as_deref().unwrap_or("<unknown>"))]
    NotFound {
        identifier: Option<String>,
        key: Option<String>,
    },

    #[error("system error {code}: {}", message.as_deref().unwrap_or(""))]
    System {
        code: i32,
        message: Option<String>,
        /// Seconds to wait before retrying, set when `code` is RATE_LIMIT_REACHED
        rate_limit_duration: Option<u32>,
    },

    #[error("user error {code}: {}", parameter.as_deref().unwrap_or(""))]
    User {
        code: i32,
        parameter: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Error returned by the content builder, the client and the merge engine.
#[derive(Debug, Error)]
pub enum EvernoteError {
    /// Malformed or insufficient input, not retryable
    #[error("invalid note content: {0}")]
    Validation(String),

    /// An attachment could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The note no longer exists on the remote side
    #[error("note not found")]
    NoteNotFound {
        #[source]
        source: StoreError,
    },

    /// The account hit the API rate limit; retry after `retry_after`
    #[error("rate limit reached, retry after {}s", retry_after.as_secs())]
    RateLimit {
        retry_after: Duration,
        #[source]
        source: StoreError,
    },

    /// Any other remote failure
    #[error("evernote api error: {message}")]
    Api {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl EvernoteError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            source: None,
        }
    }

    /// Only rate-limit errors are worth resubmitting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<StoreError> for EvernoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NoteNotFound { source: err },
            StoreError::System {
                code: RATE_LIMIT_REACHED,
                rate_limit_duration: Some(secs),
                ..
            } => Self::RateLimit {
                retry_after: Duration::from_secs(u64::from(secs)),
                source: err,
            },
            StoreError::System {
                code, ref message, ..
            } => Self::Api {
                message: format!("{}: {}", code, message.as_deref().unwrap_or("")),
                source: Some(Box::new(err)),
            },
            other => Self::Api {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
