//! Validation modules

pub mod file;

pub use file::{validate, RejectReason, ALLOWED_CONTENT_TYPES, MAX_FILE_SIZE_BYTES};
