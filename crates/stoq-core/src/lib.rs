//! Stoq Core Library
//!
//! This crate provides the core domain models, error types, configuration, and
//! local validation that are shared across all stoq components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorKind, IngestError};
pub use models::SelectedFile;
pub use validation::{validate, RejectReason, ALLOWED_CONTENT_TYPES, MAX_FILE_SIZE_BYTES};
