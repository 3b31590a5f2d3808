//! Local candidate-file validation.
//!
//! Runs before any network call: checks the declared media type against a
//! fixed allow-list and the byte size against a fixed ceiling. Pure and
//! deterministic; both the file-picker and drag-and-drop entry points go
//! through this single function so the rules cannot drift apart.

use crate::models::SelectedFile;

/// Media types accepted for inventory uploads.
pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["text/tab-separated-values", "text/plain"];

/// Maximum accepted file size: 25 MiB.
pub const MAX_FILE_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Why a candidate file was rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Declared media type is not in the allow-list.
    InvalidType,
    /// Byte size exceeds the ceiling.
    TooLarge,
}

impl RejectReason {
    /// Stable machine-readable form, used in status messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidType => "invalid-type",
            RejectReason::TooLarge => "too-large",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a candidate file against the type allow-list and size ceiling.
///
/// The type check takes precedence: a file of a disallowed type is rejected
/// as `invalid-type` regardless of its size.
pub fn validate(candidate: &SelectedFile) -> Result<(), RejectReason> {
    if !ALLOWED_CONTENT_TYPES.contains(&candidate.content_type.as_str()) {
        return Err(RejectReason::InvalidType);
    }

    if candidate.len() > MAX_FILE_SIZE_BYTES {
        return Err(RejectReason::TooLarge);
    }

    Ok(())
}
