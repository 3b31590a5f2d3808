//! Error types module
//!
//! The ingestion pipeline distinguishes three disjoint error kinds and never
//! collapses them into one message:
//!
//! - `Validation` — user-correctable, reported before any network call.
//! - `Auth` — loss of session; triggers token cleanup and a caller-driven
//!   redirect to re-authentication, not a retry.
//! - `Transfer` — transport or non-success HTTP outcome during verification
//!   or upload; retryable by the user, never auto-retried.
//!
//! All three are recoverable at the UI level; none may crash or corrupt
//! unrelated application state.

use crate::validation::RejectReason;

/// Coarse classification of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Transfer,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid file: {0}")]
    Validation(RejectReason),

    #[error("Unauthorized: {0}")]
    Auth(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),
}

impl From<RejectReason> for IngestError {
    fn from(reason: RejectReason) -> Self {
        IngestError::Validation(reason)
    }
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Validation(_) => ErrorKind::Validation,
            IngestError::Auth(_) => ErrorKind::Auth,
            IngestError::Transfer(_) => ErrorKind::Transfer,
        }
    }

    /// Whether the same request may succeed if simply retried.
    ///
    /// Auth failures are not retryable: the session is gone and the user has
    /// to log in again. Validation failures need a different file.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::Transfer(_))
    }

    /// Suggested action for the client.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            IngestError::Validation(RejectReason::InvalidType) => {
                "Upload a .tsv or .txt file"
            }
            IngestError::Validation(RejectReason::TooLarge) => {
                "Reduce the file below 25 MiB"
            }
            IngestError::Auth(_) => "Log in again to obtain a new session token",
            IngestError::Transfer(_) => "Retry after a short delay",
        }
    }
}
