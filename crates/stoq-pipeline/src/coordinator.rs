//! Pipeline coordinator.
//!
//! Owns the session, the candidate file and the current state, and sequences
//! the three stages: local validation on selection, then on submit a single
//! verification call followed (only on success) by a single upload call.
//! The verifier and submitter sit behind traits so tests can inject spies.

use anyhow::Result;
use async_trait::async_trait;
use stoq_client::{ApiClient, Session, SubmissionReceipt, TokenStore, Verification};
use stoq_core::{validation, SelectedFile};

use crate::state::{PipelineEvent, PipelineOutcome, PipelineState};

/// Credential verification stage.
#[async_trait]
pub trait VerifyCredential: Send + Sync {
    /// Ask the backend whether the token is valid. `Err` means the backend
    /// could not be reached; it is never folded into `Invalid`.
    async fn verify(&self, token: &str) -> Result<Verification>;
}

/// Upload submission stage.
///
/// Preconditions are the caller's job: the file passed validation and the
/// token passed verification. Neither is re-checked here.
#[async_trait]
pub trait SubmitUpload: Send + Sync {
    async fn submit(&self, file: &SelectedFile, token: &str) -> Result<SubmissionReceipt>;
}

#[async_trait]
impl VerifyCredential for ApiClient {
    async fn verify(&self, token: &str) -> Result<Verification> {
        self.verify_token(token).await
    }
}

#[async_trait]
impl SubmitUpload for ApiClient {
    async fn submit(&self, file: &SelectedFile, token: &str) -> Result<SubmissionReceipt> {
        self.ingest_file(file, token).await
    }
}

/// Coordinator for one ingestion pipeline instance.
///
/// Single-threaded by construction (`&mut self` on every mutation); at most
/// one verification and one upload call are in flight per attempt. Each file
/// selection starts a new attempt generation, and a completion carrying a
/// stale generation is dropped instead of writing to discarded state.
pub struct UploadPipeline<V, S, T> {
    verifier: V,
    submitter: S,
    store: T,
    session: Session,
    file: Option<SelectedFile>,
    state: PipelineState,
    generation: u64,
}

impl<V, S, T> UploadPipeline<V, S, T>
where
    V: VerifyCredential,
    S: SubmitUpload,
    T: TokenStore,
{
    pub fn new(verifier: V, submitter: S, store: T, session: Session) -> Self {
        Self {
            verifier,
            submitter,
            store,
            session,
            file: None,
            state: PipelineState::Idle,
            generation: 0,
        }
    }

    /// Build a pipeline whose session is loaded from the durable store.
    pub async fn init(verifier: V, submitter: S, store: T) -> Result<Self> {
        let session = Session::from_store(&store).await?;
        Ok(Self::new(verifier, submitter, store, session))
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn outcome(&self) -> PipelineOutcome {
        self.state.outcome()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether a candidate file is held for (re)submission.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// The caller should redirect to re-authentication.
    pub fn needs_login(&self) -> bool {
        matches!(self.state, PipelineState::Unauthorized)
    }

    /// Discard the current attempt and candidate file.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.file = None;
        self.state = PipelineState::Idle;
    }

    /// Run the local validator on a freshly selected candidate.
    ///
    /// Both the file picker and drag-and-drop entry points land here, so the
    /// rules are identical for both. Always starts a new attempt.
    pub fn select_file(&mut self, file: SelectedFile) -> PipelineOutcome {
        self.reset();
        let generation = self.generation;

        match validation::validate(&file) {
            Ok(()) => {
                tracing::debug!(
                    file_name = %file.file_name,
                    size_bytes = file.len(),
                    "Candidate file accepted"
                );
                self.file = Some(file);
                self.apply(generation, PipelineEvent::FileAccepted);
            }
            Err(reason) => {
                tracing::info!(
                    file_name = %file.file_name,
                    content_type = %file.content_type,
                    size_bytes = file.len(),
                    reason = %reason,
                    "Candidate file rejected"
                );
                self.apply(generation, PipelineEvent::FileRejected(reason));
            }
        }

        self.outcome()
    }

    /// Verify the session token and, only on success, upload the file.
    ///
    /// No token short-circuits to `Unauthorized` without any network call.
    /// A rejected token is erased from the durable store and the session,
    /// so subsequent runs start unauthenticated. A verification transport
    /// failure leaves the token untouched and is reported as retryable.
    pub async fn submit(&mut self) -> Result<PipelineOutcome> {
        // A failed upload keeps the validated file; submitting again starts
        // a fresh attempt with it.
        if matches!(self.state, PipelineState::Failed(_)) && self.file.is_some() {
            self.generation += 1;
            self.state = PipelineState::Validated;
        }

        if self.state != PipelineState::Validated || self.file.is_none() {
            tracing::debug!(state = ?self.state, "Submit ignored: no validated file");
            return Ok(self.outcome());
        }

        let generation = self.generation;

        let Some(token) = self.session.token().map(str::to_string) else {
            self.state = PipelineState::Unauthorized;
            tracing::info!("No session token; skipping verification");
            return Ok(self.outcome());
        };

        self.apply(generation, PipelineEvent::SubmitRequested);

        match self.verifier.verify(&token).await {
            Ok(Verification::Valid) => {
                self.session.mark_verified();
                self.apply(generation, PipelineEvent::VerificationPassed);
            }
            Ok(Verification::Invalid) => {
                // Erase the durable entry first so a later run cannot pick
                // the dead token back up.
                if let Err(e) = self.store.clear().await {
                    tracing::warn!(error = %e, "Failed to clear stored token");
                }
                self.session.invalidate();
                self.apply(generation, PipelineEvent::VerificationRejected);
                return Ok(self.outcome());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Verification transport failure");
                self.apply(generation, PipelineEvent::VerificationErrored);
                return Ok(self.outcome());
            }
        }

        if self.generation != generation {
            return Ok(self.outcome());
        }

        self.apply(generation, PipelineEvent::UploadStarted);

        let result = {
            let Some(file) = self.file.as_ref() else {
                return Ok(self.outcome());
            };
            self.submitter.submit(file, &token).await
        };

        match result {
            Ok(receipt) => {
                tracing::info!(status = receipt.status, "Inventory file ingested");
                self.apply(generation, PipelineEvent::UploadSucceeded);
                // Drop the file so a stale copy cannot be resubmitted.
                if self.state == PipelineState::Succeeded {
                    self.file = None;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed; file retained for resubmission");
                self.apply(generation, PipelineEvent::UploadFailed);
            }
        }

        Ok(self.outcome())
    }

    /// Advance the state machine, unless the completion is from a stale
    /// attempt (the user selected a new file or reset in the meantime).
    fn apply(&mut self, generation: u64, event: PipelineEvent) {
        if generation != self.generation {
            tracing::debug!(?event, "Dropping completion from a stale attempt");
            return;
        }
        self.state = self.state.clone().apply(event);
    }
}
