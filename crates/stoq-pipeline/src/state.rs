//! Pipeline state machine.
//!
//! One authoritative current-state value per pipeline instance, advanced by
//! pure transition functions. The happy path is
//! `Idle -> Validated -> Verifying -> Verified -> Uploading -> Succeeded`;
//! `Rejected`, `Unauthorized` and `Failed` are absorbing error states for the
//! current attempt. An event that is illegal in the current state leaves the
//! state unchanged, so a `Rejected` validation outcome can never be silently
//! overwritten by a later stage.

use stoq_core::validation::RejectReason;
use stoq_core::IngestError;

/// Reason string carried by `Failed`: the verification transport failed.
pub const VERIFICATION_ERROR: &str = "verification-error";
/// Reason string carried by `Failed`: the upload request failed.
pub const UPLOAD_ERROR: &str = "upload-error";

/// Current state of one pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// No candidate file selected, or the previous attempt was reset.
    Idle,
    /// A candidate passed local validation and awaits submission.
    Validated,
    /// Credential verification is in flight.
    Verifying,
    /// The current token was verified; upload starts automatically.
    Verified,
    /// The upload request is in flight.
    Uploading,
    /// The file was ingested; terminal for this attempt.
    Succeeded,
    /// Local validation rejected the candidate; terminal.
    Rejected(RejectReason),
    /// No token, or the backend rejected it; terminal, caller redirects.
    Unauthorized,
    /// Verification transport failure or upload failure; terminal, retryable.
    Failed(&'static str),
}

/// Events that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    FileAccepted,
    FileRejected(RejectReason),
    SubmitRequested,
    VerificationPassed,
    VerificationRejected,
    VerificationErrored,
    UploadStarted,
    UploadSucceeded,
    UploadFailed,
}

/// User-facing outcome of the last completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Idle,
    Rejected(RejectReason),
    Unauthorized,
    Uploading,
    Succeeded,
    Failed(&'static str),
}

impl PipelineOutcome {
    /// The error this outcome carries, if any, in the shared taxonomy.
    ///
    /// The three kinds stay disjoint: a local rejection is a validation
    /// error, a missing or rejected token is an auth error, and both failure
    /// reasons are transfer errors.
    pub fn as_error(&self) -> Option<IngestError> {
        match self {
            PipelineOutcome::Rejected(reason) => Some(IngestError::Validation(*reason)),
            PipelineOutcome::Unauthorized => Some(IngestError::Auth(
                "session token missing or rejected".to_string(),
            )),
            PipelineOutcome::Failed(reason) => {
                Some(IngestError::Transfer((*reason).to_string()))
            }
            PipelineOutcome::Idle | PipelineOutcome::Uploading | PipelineOutcome::Succeeded => {
                None
            }
        }
    }
}

impl PipelineState {
    /// Apply one event, returning the next state.
    ///
    /// Pure: no side effects, callable from tests with any (state, event)
    /// pair. Illegal pairs return the state unchanged.
    pub fn apply(self, event: PipelineEvent) -> PipelineState {
        use PipelineEvent as E;
        use PipelineState as S;

        match (self, event) {
            (S::Idle, E::FileAccepted) => S::Validated,
            (S::Idle, E::FileRejected(reason)) => S::Rejected(reason),
            (S::Validated, E::SubmitRequested) => S::Verifying,
            (S::Verifying, E::VerificationPassed) => S::Verified,
            (S::Verifying, E::VerificationRejected) => S::Unauthorized,
            (S::Verifying, E::VerificationErrored) => S::Failed(VERIFICATION_ERROR),
            (S::Verified, E::UploadStarted) => S::Uploading,
            (S::Uploading, E::UploadSucceeded) => S::Succeeded,
            (S::Uploading, E::UploadFailed) => S::Failed(UPLOAD_ERROR),
            (state, _) => state,
        }
    }

    /// Terminal states require new user input before anything else happens.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Succeeded
                | PipelineState::Rejected(_)
                | PipelineState::Unauthorized
                | PipelineState::Failed(_)
        )
    }

    /// Project the internal state onto the user-facing outcome.
    ///
    /// Intermediate network states all present as `Uploading`; `Validated`
    /// presents as `Idle` because no attempt has completed yet.
    pub fn outcome(&self) -> PipelineOutcome {
        match self {
            PipelineState::Idle | PipelineState::Validated => PipelineOutcome::Idle,
            PipelineState::Verifying | PipelineState::Verified | PipelineState::Uploading => {
                PipelineOutcome::Uploading
            }
            PipelineState::Succeeded => PipelineOutcome::Succeeded,
            PipelineState::Rejected(reason) => PipelineOutcome::Rejected(*reason),
            PipelineState::Unauthorized => PipelineOutcome::Unauthorized,
            PipelineState::Failed(reason) => PipelineOutcome::Failed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::{PipelineEvent as E, PipelineState as S};

    #[test]
    fn happy_path_transitions() {
        let state = S::Idle
            .apply(E::FileAccepted)
            .apply(E::SubmitRequested)
            .apply(E::VerificationPassed)
            .apply(E::UploadStarted)
            .apply(E::UploadSucceeded);
        assert_eq!(state, S::Succeeded);
    }

    #[test]
    fn validation_failure_is_absorbing() {
        let rejected = S::Idle.apply(E::FileRejected(RejectReason::InvalidType));
        assert_eq!(rejected, S::Rejected(RejectReason::InvalidType));

        // No later event may overwrite a rejection.
        for event in [
            E::SubmitRequested,
            E::VerificationPassed,
            E::VerificationRejected,
            E::UploadStarted,
            E::UploadSucceeded,
            E::UploadFailed,
        ] {
            assert_eq!(
                rejected.clone().apply(event),
                S::Rejected(RejectReason::InvalidType),
                "event {:?} must not escape Rejected",
                event
            );
        }
    }

    #[test]
    fn verification_rejection_goes_unauthorized() {
        let state = S::Verifying.apply(E::VerificationRejected);
        assert_eq!(state, S::Unauthorized);
        assert!(state.is_terminal());
    }

    #[test]
    fn verification_transport_error_is_failed_not_unauthorized() {
        let state = S::Verifying.apply(E::VerificationErrored);
        assert_eq!(state, S::Failed(VERIFICATION_ERROR));
        assert_ne!(state, S::Unauthorized);
    }

    #[test]
    fn upload_failure_reason() {
        let state = S::Uploading.apply(E::UploadFailed);
        assert_eq!(state, S::Failed(UPLOAD_ERROR));
    }

    #[test]
    fn submit_is_only_legal_from_validated() {
        for state in [S::Idle, S::Verifying, S::Verified, S::Uploading, S::Succeeded] {
            assert_eq!(state.clone().apply(E::SubmitRequested), state);
        }
    }

    #[test]
    fn upload_events_are_illegal_before_verification() {
        assert_eq!(S::Validated.apply(E::UploadStarted), S::Validated);
        assert_eq!(S::Verifying.apply(E::UploadSucceeded), S::Verifying);
    }

    #[test]
    fn terminal_states() {
        assert!(S::Succeeded.is_terminal());
        assert!(S::Rejected(RejectReason::TooLarge).is_terminal());
        assert!(S::Unauthorized.is_terminal());
        assert!(S::Failed(UPLOAD_ERROR).is_terminal());
        assert!(!S::Idle.is_terminal());
        assert!(!S::Validated.is_terminal());
        assert!(!S::Verifying.is_terminal());
    }

    #[test]
    fn outcomes_map_onto_disjoint_error_kinds() {
        use stoq_core::ErrorKind;

        assert!(PipelineOutcome::Idle.as_error().is_none());
        assert!(PipelineOutcome::Succeeded.as_error().is_none());

        let rejected = PipelineOutcome::Rejected(RejectReason::TooLarge)
            .as_error()
            .unwrap();
        assert_eq!(rejected.kind(), ErrorKind::Validation);

        let unauthorized = PipelineOutcome::Unauthorized.as_error().unwrap();
        assert_eq!(unauthorized.kind(), ErrorKind::Auth);

        let failed = PipelineOutcome::Failed(VERIFICATION_ERROR).as_error().unwrap();
        assert_eq!(failed.kind(), ErrorKind::Transfer);
        assert!(failed.is_recoverable());
        assert!(!unauthorized.is_recoverable());
    }

    #[test]
    fn outcome_projection() {
        assert_eq!(S::Idle.outcome(), PipelineOutcome::Idle);
        assert_eq!(S::Validated.outcome(), PipelineOutcome::Idle);
        assert_eq!(S::Verifying.outcome(), PipelineOutcome::Uploading);
        assert_eq!(S::Verified.outcome(), PipelineOutcome::Uploading);
        assert_eq!(S::Uploading.outcome(), PipelineOutcome::Uploading);
        assert_eq!(S::Succeeded.outcome(), PipelineOutcome::Succeeded);
        assert_eq!(
            S::Rejected(RejectReason::TooLarge).outcome(),
            PipelineOutcome::Rejected(RejectReason::TooLarge)
        );
        assert_eq!(S::Unauthorized.outcome(), PipelineOutcome::Unauthorized);
        assert_eq!(
            S::Failed(UPLOAD_ERROR).outcome(),
            PipelineOutcome::Failed(UPLOAD_ERROR)
        );
    }
}
