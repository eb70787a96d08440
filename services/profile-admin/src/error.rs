//! Profile administration error taxonomy and store-error translation.
//!
//! # Purpose
//! Every operation of the admin service fails with a [`ProfileError`], whether
//! the violation was found locally by the invariant engine or reported by the
//! policy store. Store failures are translated per call site, because the same
//! store variant means different things for different writes.
//!
//! # Key invariants
//! - Local violations never reach the store and are never retried.
//! - Unexpected store failures surface as `TransportFailure` and are logged
//!   server-side with their full chain.
use crate::store::StoreError;
use rolegate_policy::{PolicyError, ProfileField, RejectReason, Rejection, join_fields};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("validation failed: {}", join_fields(.0))]
    ValidationFailed(Vec<ProfileField>),
    #[error("system profile restricted: {}", join_fields(.0))]
    SystemProfileRestricted(Vec<ProfileField>),
    #[error("system profiles cannot be deleted")]
    SystemProfileUndeletable,
    #[error("profile is assigned to {0} users")]
    DependencyConflict(u64),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

pub type ProfileResult<T> = Result<T, ProfileError>;

impl ProfileError {
    /// Stable label for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            ProfileError::ValidationFailed(_) => "validation_failed",
            ProfileError::SystemProfileRestricted(_) => "system_profile_restricted",
            ProfileError::SystemProfileUndeletable => "system_profile_undeletable",
            ProfileError::DependencyConflict(_) => "dependency_conflict",
            ProfileError::NotFound(_) => "not_found",
            ProfileError::TransportFailure(_) => "transport_failure",
        }
    }
}

impl From<Rejection> for ProfileError {
    fn from(rejection: Rejection) -> Self {
        match rejection.reason {
            RejectReason::ValidationFailed => ProfileError::ValidationFailed(rejection.fields),
            RejectReason::SystemProfileRestricted => {
                ProfileError::SystemProfileRestricted(rejection.fields)
            }
            RejectReason::SystemProfileUndeletable => ProfileError::SystemProfileUndeletable,
        }
    }
}

/// Catalog violations are always about the permission map.
impl From<PolicyError> for ProfileError {
    fn from(err: PolicyError) -> Self {
        tracing::debug!(error = %err, "grant outside catalog");
        ProfileError::ValidationFailed(vec![ProfileField::Permissions])
    }
}

fn transport(operation: &str, err: StoreError) -> ProfileError {
    tracing::error!(operation, error = ?err, "policy store failure");
    ProfileError::TransportFailure(err.to_string())
}

/// The field the store named, or the payload's own field when it named none.
fn invalid(field: Option<ProfileField>, payload: ProfileField) -> ProfileError {
    ProfileError::ValidationFailed(vec![field.unwrap_or(payload)])
}

/// Translate a failed read.
pub(crate) fn read_error(err: StoreError) -> ProfileError {
    match err {
        StoreError::NotFound(what) => ProfileError::NotFound(what),
        other => transport("read", other),
    }
}

/// Translate a failed attribute write; `changed` are the locally computed
/// changed fields reported when the store refuses a system profile edit.
pub(crate) fn attribute_write_error(err: StoreError, changed: &[ProfileField]) -> ProfileError {
    match err {
        StoreError::NotFound(what) => ProfileError::NotFound(what),
        StoreError::Forbidden(_) => ProfileError::SystemProfileRestricted(changed.to_vec()),
        StoreError::Invalid { field, .. } => invalid(field, ProfileField::Name),
        other => transport("update_profile", other),
    }
}

/// Translate a failed permission-map write.
pub(crate) fn map_write_error(err: StoreError, changed: &[ProfileField]) -> ProfileError {
    match err {
        StoreError::NotFound(what) => ProfileError::NotFound(what),
        StoreError::Forbidden(_) => ProfileError::SystemProfileRestricted(changed.to_vec()),
        StoreError::Invalid { field, .. } => invalid(field, ProfileField::Permissions),
        other => transport("replace_permission_map", other),
    }
}

/// Translate a failed delete.
pub(crate) fn delete_error(err: StoreError) -> ProfileError {
    match err {
        StoreError::NotFound(what) => ProfileError::NotFound(what),
        StoreError::Forbidden(_) => ProfileError::SystemProfileUndeletable,
        StoreError::Conflict {
            dependent_users: Some(count),
            ..
        } => ProfileError::DependencyConflict(count),
        other => transport("delete_profile", other),
    }
}

/// Translate a failed create; duplicate names come back as `Invalid`.
pub(crate) fn create_error(err: StoreError) -> ProfileError {
    match err {
        StoreError::Invalid { field, .. } => invalid(field, ProfileField::Permissions),
        other => transport("create_profile", other),
    }
}

/// Translate a failed user assignment.
pub(crate) fn assign_error(err: StoreError) -> ProfileError {
    match err {
        StoreError::NotFound(what) => ProfileError::NotFound(what),
        StoreError::Invalid { field, .. } => invalid(field, ProfileField::Active),
        other => transport("assign_profile", other),
    }
}
