use crate::error::ProfileError;
use rolegate_policy::{Decision, DirtyReport};
use serde::Serialize;

/// Lifecycle of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Working copy equals the pristine snapshot.
    Loaded,
    /// Working copy differs from the pristine snapshot.
    Dirty,
    /// A submit is in flight.
    Saving,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Loaded => "loaded",
            SessionState::Dirty => "dirty",
            SessionState::Saving => "saving",
        }
    }
}

/// Result of the last `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Persisted; pristine now equals the submitted state.
    Saved,
    /// Refused by the invariant engine; nothing was sent.
    RejectedLocally(ProfileError),
    /// Refused or failed at the store.
    RejectedRemote(ProfileError),
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitOutcome::Saved => "saved",
            SubmitOutcome::RejectedLocally(_) => "rejected_locally",
            SubmitOutcome::RejectedRemote(_) => "rejected_remote",
        }
    }

    pub fn error(&self) -> Option<&ProfileError> {
        match self {
            SubmitOutcome::Saved => None,
            SubmitOutcome::RejectedLocally(err) | SubmitOutcome::RejectedRemote(err) => Some(err),
        }
    }
}

/// What a confirmation step shows before `submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReview {
    pub dirty: DirtyReport,
    pub decision: Decision,
}

impl ChangeReview {
    /// Whether a submit would reach the store.
    pub fn submittable(&self) -> bool {
        self.decision.is_allowed()
    }
}
