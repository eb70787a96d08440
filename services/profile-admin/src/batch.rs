//! Full-replace persistence of a profile's target state.
//!
//! # Purpose
//! Writes a complete [`ProfileDraft`] to the policy store as two effects:
//! 1. overwrite the scalar attributes (`update_profile`)
//! 2. overwrite the permission map (`replace_permission_map`)
//!
//! Both writes carry the full target, so anything the target omits is revoked.
//!
//! # Strategies
//! - [`WriteStrategy::Concurrent`] dispatches both writes together and awaits
//!   both. The attribute error is reported before the map error. When exactly
//!   one half failed and the other half changed stored state, the store is
//!   left partially applied and the caller sees `TransportFailure`.
//! - [`WriteStrategy::Compensating`] writes attributes first, then the map; if
//!   the map write fails after attributes changed, the pristine attributes are
//!   written back before the map error is reported.
//!
//! # Common pitfalls
//! - Neither strategy is atomic. A crash between the writes of the
//!   compensating strategy still leaves attributes applied.
use crate::error::{ProfileError, attribute_write_error, map_write_error};
use crate::store::{PolicyStore, StoreError};
use rolegate_policy::{Profile, ProfileDraft, ProfileField, ProfileId, join_fields};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    #[default]
    Concurrent,
    Compensating,
}

impl WriteStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteStrategy::Concurrent => "concurrent",
            WriteStrategy::Compensating => "compensating",
        }
    }
}

impl FromStr for WriteStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(WriteStrategy::Concurrent),
            "compensating" => Ok(WriteStrategy::Compensating),
            other => Err(format!("unknown write strategy: {other}")),
        }
    }
}

fn attributes_changed(changed: &[ProfileField]) -> bool {
    changed.iter().any(|field| *field != ProfileField::Permissions)
}

fn permissions_changed(changed: &[ProfileField]) -> bool {
    changed.contains(&ProfileField::Permissions)
}

fn partial_write(id: ProfileId, applied: &str, failed: &str, err: &StoreError) -> ProfileError {
    tracing::error!(profile_id = %id, applied, failed, error = %err, "profile partially written");
    metrics::counter!("rolegate_partial_writes_total").increment(1);
    ProfileError::TransportFailure(format!(
        "profile {id} partially written: {applied} applied, {failed} failed: {err}"
    ))
}

/// Persist `target` over the stored state of profile `id`.
///
/// `pristine` is the last state loaded from the store and `changed` the
/// fields in which `target` differs from it.
pub async fn replace_profile(
    store: &dyn PolicyStore,
    strategy: WriteStrategy,
    id: ProfileId,
    pristine: &ProfileDraft,
    target: &ProfileDraft,
    changed: &[ProfileField],
) -> Result<Profile, ProfileError> {
    tracing::debug!(
        profile_id = %id,
        strategy = strategy.as_str(),
        changed = %join_fields(changed),
        "replacing profile"
    );
    match strategy {
        WriteStrategy::Concurrent => replace_concurrent(store, id, target, changed).await,
        WriteStrategy::Compensating => {
            replace_compensating(store, id, pristine, target, changed).await
        }
    }
}

async fn replace_concurrent(
    store: &dyn PolicyStore,
    id: ProfileId,
    target: &ProfileDraft,
    changed: &[ProfileField],
) -> Result<Profile, ProfileError> {
    let (attributes, permissions) = tokio::join!(
        store.update_profile(id, target.attributes.clone()),
        store.replace_permission_map(id, target.permissions.clone()),
    );
    match (attributes, permissions) {
        (Ok(profile), Ok(_)) => Ok(profile),
        (Err(err), Ok(_)) if permissions_changed(changed) => {
            Err(partial_write(id, "permissions", "attributes", &err))
        }
        (Err(err), _) => Err(attribute_write_error(err, changed)),
        (Ok(_), Err(err)) if attributes_changed(changed) => {
            Err(partial_write(id, "attributes", "permissions", &err))
        }
        (Ok(_), Err(err)) => Err(map_write_error(err, changed)),
    }
}

async fn replace_compensating(
    store: &dyn PolicyStore,
    id: ProfileId,
    pristine: &ProfileDraft,
    target: &ProfileDraft,
    changed: &[ProfileField],
) -> Result<Profile, ProfileError> {
    let profile = store
        .update_profile(id, target.attributes.clone())
        .await
        .map_err(|err| attribute_write_error(err, changed))?;

    match store
        .replace_permission_map(id, target.permissions.clone())
        .await
    {
        Ok(_) => Ok(profile),
        Err(err) if attributes_changed(changed) => {
            tracing::warn!(profile_id = %id, error = %err, "map write failed; restoring attributes");
            if let Err(undo) = store.update_profile(id, pristine.attributes.clone()).await {
                return Err(partial_write(id, "attributes", "permissions and compensation", &undo));
            }
            metrics::counter!("rolegate_compensations_total").increment(1);
            Err(map_write_error(err, changed))
        }
        Err(err) => Err(map_write_error(err, changed)),
    }
}
