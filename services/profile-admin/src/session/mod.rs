//! Editing session for one profile.
//!
//! # Purpose
//! A `ProfileSession` is the in-memory working copy of a stored profile: the
//! record, its resolved kind, a pristine snapshot of attributes and grants, and
//! the current (edited) state. All edits go through the session so that the
//! catalog and invariant engine see every change.
//!
//! # State machine
//! ```text
//! Loaded --edit--> Dirty --submit(Allow)--> Saving --ok--> Loaded
//!   ^                |                         |
//!   |                |  submit(Reject)         +--err--> Dirty
//!   +--revert/undo---+  stays Dirty
//! ```
//!
//! # Key invariants
//! - Mutators refuse grants outside the catalog and leave state unchanged.
//! - Otherwise mutators always apply; the returned [`Decision`] tells the
//!   caller whether the resulting state could be submitted.
//! - `pristine` changes only on load and after a successful submit.
//!
//! # Common pitfalls
//! - A local `Allow` is advice. The store re-checks everything on submit.
mod state;

pub use state::{ChangeReview, SessionState, SubmitOutcome};

use crate::batch::{WriteStrategy, replace_profile};
use crate::error::{ProfileError, ProfileResult, read_error};
use crate::store::PolicyStore;
use rolegate_policy::{
    Catalog, Decision, DirtyReport, FeatureCode, KindSource, PermissionCode, Profile,
    ProfileClassifier, ProfileDraft, ProfileId, ProfileKind, evaluate, join_fields,
};
use std::sync::Arc;

pub struct ProfileSession {
    store: Arc<dyn PolicyStore>,
    catalog: Arc<Catalog>,
    strategy: WriteStrategy,
    record: Profile,
    kind: ProfileKind,
    pristine: ProfileDraft,
    current: ProfileDraft,
    state: SessionState,
    last_outcome: Option<SubmitOutcome>,
}

impl ProfileSession {
    /// Load profile `id`: attributes and grants are fetched concurrently and
    /// the load fails if either fetch fails.
    pub async fn load(
        store: Arc<dyn PolicyStore>,
        catalog: Arc<Catalog>,
        classifier: &ProfileClassifier,
        strategy: WriteStrategy,
        id: ProfileId,
    ) -> ProfileResult<Self> {
        let (record, permissions) =
            tokio::try_join!(store.get_profile(id), store.get_permission_map(id))
                .map_err(read_error)?;

        let (kind, source) = classifier.classify(&record);
        if source == KindSource::DisplayName {
            tracing::warn!(profile_id = %id, name = %record.name, %kind, "untagged profile classified by name");
        }
        tracing::debug!(profile_id = %id, %kind, features = permissions.granted_feature_count(), "profile loaded");

        let pristine = ProfileDraft::new(record.attributes(), permissions);
        Ok(Self {
            store,
            catalog,
            strategy,
            current: pristine.clone(),
            pristine,
            record,
            kind,
            state: SessionState::Loaded,
            last_outcome: None,
        })
    }

    pub fn id(&self) -> ProfileId {
        self.record.id
    }

    /// Last record reported by the store.
    pub fn profile(&self) -> &Profile {
        &self.record
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_outcome(&self) -> Option<&SubmitOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn current(&self) -> &ProfileDraft {
        &self.current
    }

    pub fn pristine(&self) -> &ProfileDraft {
        &self.pristine
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Flip one grant.
    pub fn toggle_permission(
        &mut self,
        feature: impl Into<FeatureCode>,
        permission: impl Into<PermissionCode>,
    ) -> ProfileResult<Decision> {
        let (feature, permission) = (feature.into(), permission.into());
        self.catalog.check_grant(&feature, &permission)?;
        self.current.permissions.toggle(feature, permission);
        Ok(self.after_edit())
    }

    /// Grant every permission the catalog allows for `feature`.
    pub fn select_all(&mut self, feature: impl Into<FeatureCode>) -> ProfileResult<Decision> {
        let feature = feature.into();
        let allowed = self.catalog.require_feature(&feature)?.allowed();
        self.current.permissions.set(feature, allowed);
        Ok(self.after_edit())
    }

    /// Revoke every permission for `feature`.
    pub fn clear_all(&mut self, feature: impl Into<FeatureCode>) -> ProfileResult<Decision> {
        let feature = feature.into();
        self.catalog.require_feature(&feature)?;
        self.current.permissions.clear(&feature);
        Ok(self.after_edit())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ProfileResult<Decision> {
        self.current.attributes.name = name.into();
        Ok(self.after_edit())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> ProfileResult<Decision> {
        self.current.attributes.description = description.into();
        Ok(self.after_edit())
    }

    pub fn set_active(&mut self, active: bool) -> ProfileResult<Decision> {
        self.current.attributes.active = active;
        Ok(self.after_edit())
    }

    /// Discard every unsaved edit.
    pub fn revert_to_pristine(&mut self) {
        self.current = self.pristine.clone();
        self.transition(SessionState::Loaded);
    }

    pub fn compute_dirty(&self) -> DirtyReport {
        rolegate_policy::compute_dirty(&self.pristine, &self.current)
    }

    /// Changed fields plus the local decision, for a confirmation step.
    pub fn review(&self) -> ChangeReview {
        ChangeReview {
            dirty: self.compute_dirty(),
            decision: self.decide(),
        }
    }

    /// Validate the working copy and persist it with full-replace semantics.
    ///
    /// On success the pristine snapshot becomes the submitted state. On any
    /// rejection the working copy is kept as-is and the session stays dirty.
    pub async fn submit(&mut self) -> ProfileResult<Profile> {
        let dirty = self.compute_dirty();

        if let Decision::Reject(rejection) = self.decide() {
            tracing::info!(profile_id = %self.id(), kind = %self.kind, %rejection, "submit rejected locally");
            let err = ProfileError::from(rejection);
            self.finish(SubmitOutcome::RejectedLocally(err.clone()));
            return Err(err);
        }
        if !dirty.dirty {
            self.finish(SubmitOutcome::Saved);
            return Ok(self.record.clone());
        }

        self.transition(SessionState::Saving);
        let result = replace_profile(
            self.store.as_ref(),
            self.strategy,
            self.id(),
            &self.pristine,
            &self.current,
            &dirty.changed,
        )
        .await;

        match result {
            Ok(record) => {
                tracing::info!(profile_id = %record.id, changed = %join_fields(&dirty.changed), "profile saved");
                self.record = record;
                self.pristine = self.current.clone();
                self.transition(SessionState::Loaded);
                self.finish(SubmitOutcome::Saved);
                Ok(self.record.clone())
            }
            Err(err) => {
                tracing::warn!(profile_id = %self.id(), error = %err, "submit rejected by store");
                self.transition(SessionState::Dirty);
                self.finish(SubmitOutcome::RejectedRemote(err.clone()));
                Err(err)
            }
        }
    }

    fn decide(&self) -> Decision {
        evaluate(self.kind, &self.pristine, &self.current)
    }

    fn after_edit(&mut self) -> Decision {
        let next = if self.compute_dirty().dirty {
            SessionState::Dirty
        } else {
            SessionState::Loaded
        };
        self.transition(next);
        self.decide()
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!(profile_id = %self.id(), from = self.state.as_str(), to = next.as_str(), "session transition");
            self.state = next;
        }
    }

    fn finish(&mut self, outcome: SubmitOutcome) {
        metrics::counter!("rolegate_submit_total", "outcome" => outcome.as_str()).increment(1);
        self.last_outcome = Some(outcome);
    }
}
