//! Authenticated file-ingestion pipeline.
//!
//! Three cooperating stages with strict sequencing: a local validator (media
//! type allow-list plus size ceiling, no I/O), a credential verifier (single
//! read-only backend call), and an upload submitter (single multipart write).
//! A stage only runs if the previous one succeeded; the coordinator tracks
//! one authoritative [`state::PipelineState`] with pure transition functions
//! so every intermediate state is inspectable in isolation.

pub mod coordinator;
pub mod state;

pub use coordinator::{SubmitUpload, UploadPipeline, VerifyCredential};
pub use state::{PipelineEvent, PipelineOutcome, PipelineState};
