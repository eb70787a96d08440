//! Invariant engine for profile mutations.
//!
//! This module is the single place that decides whether a proposed profile
//! state may be submitted. It is pure: no I/O, no clocks, no shared state, so
//! clients and the store evaluate the exact same rules.
//!
//! Precedence:
//! 1. super-admin: only `description` may differ from pristine.
//! 2. default-limited: `name` and `active` must equal pristine.
//! 3. custom: no extra restriction.
//! 4. base validation for every kind: trimmed `name` and `description` are
//!    non-empty and at least one feature has a grant.
//!
//! Deletion is decided separately by [`evaluate_delete`].
use crate::diff::compute_dirty;
use crate::{Profile, ProfileDraft, ProfileField, ProfileKind, join_fields};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    ValidationFailed,
    SystemProfileRestricted,
    SystemProfileUndeletable,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::ValidationFailed => "validation_failed",
            RejectReason::SystemProfileRestricted => "system_profile_restricted",
            RejectReason::SystemProfileUndeletable => "system_profile_undeletable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    /// Offending fields in [`ProfileField`] order; empty for undeletable.
    pub fields: Vec<ProfileField>,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fields.is_empty() {
            f.write_str(self.reason.as_str())
        } else {
            write!(f, "{} [{}]", self.reason.as_str(), join_fields(&self.fields))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    Allow,
    Reject(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Allow => None,
            Decision::Reject(rejection) => Some(rejection),
        }
    }

    fn reject(reason: RejectReason, fields: Vec<ProfileField>) -> Self {
        Decision::Reject(Rejection { reason, fields })
    }
}

/// Decide whether `proposed` may replace `pristine` for a profile of `kind`.
pub fn evaluate(kind: ProfileKind, pristine: &ProfileDraft, proposed: &ProfileDraft) -> Decision {
    let restricted = restricted_changes(kind, pristine, proposed);
    if !restricted.is_empty() {
        return Decision::reject(RejectReason::SystemProfileRestricted, restricted);
    }
    validate_new(proposed)
}

/// Base validation only; used for profiles that have no pristine state yet.
pub fn validate_new(proposed: &ProfileDraft) -> Decision {
    let invalid = base_violations(proposed);
    if invalid.is_empty() {
        Decision::Allow
    } else {
        Decision::reject(RejectReason::ValidationFailed, invalid)
    }
}

/// Decide whether a stored profile may be deleted.
///
/// Dependent users are the store's concern; this only enforces that system
/// profiles are never deletable, whatever their dependents.
pub fn evaluate_delete(profile: &Profile) -> Decision {
    if profile.is_system_profile {
        Decision::reject(RejectReason::SystemProfileUndeletable, Vec::new())
    } else {
        Decision::Allow
    }
}

/// Fields whose change is forbidden for `kind`, in reporting order.
pub fn restricted_changes(
    kind: ProfileKind,
    pristine: &ProfileDraft,
    proposed: &ProfileDraft,
) -> Vec<ProfileField> {
    let locked: &[ProfileField] = match kind {
        ProfileKind::SuperAdmin => &[
            ProfileField::Name,
            ProfileField::Active,
            ProfileField::Permissions,
        ],
        ProfileKind::DefaultLimited => &[ProfileField::Name, ProfileField::Active],
        ProfileKind::Custom => &[],
    };
    if locked.is_empty() {
        return Vec::new();
    }
    compute_dirty(pristine, proposed)
        .changed
        .into_iter()
        .filter(|field| locked.contains(field))
        .collect()
}

fn base_violations(proposed: &ProfileDraft) -> Vec<ProfileField> {
    let mut invalid = Vec::new();
    if proposed.attributes.name.trim().is_empty() {
        invalid.push(ProfileField::Name);
    }
    if proposed.attributes.description.trim().is_empty() {
        invalid.push(ProfileField::Description);
    }
    if !proposed.permissions.has_any_grant() {
        invalid.push(ProfileField::Permissions);
    }
    invalid
}
