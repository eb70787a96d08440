//! Profile administration entry point.
//!
//! # Purpose
//! `ProfileAdmin` owns the store handles, the catalog cache, the classifier,
//! and the write strategy, and hands out editing sessions. Operations that do
//! not need a working copy (create, delete, listings, user assignment) live
//! here directly.
//!
//! # Notes
//! Every write is checked locally first; local rejections never reach the
//! store.
use crate::batch::WriteStrategy;
use crate::catalog::CatalogCache;
use crate::config::AdminConfig;
use crate::error::{
    ProfileError, ProfileResult, assign_error, create_error, delete_error, read_error,
};
use crate::model::{ProfileSummary, User};
use crate::session::ProfileSession;
use crate::store::{CatalogProvider, PolicyStore};
use rolegate_policy::{
    Catalog, Decision, Profile, ProfileClassifier, ProfileDraft, ProfileField, ProfileId,
    UserId, evaluate_delete, validate_new,
};
use std::sync::Arc;

pub struct ProfileAdmin {
    store: Arc<dyn PolicyStore>,
    catalog: CatalogCache,
    classifier: ProfileClassifier,
    strategy: WriteStrategy,
}

impl ProfileAdmin {
    pub fn new<S>(store: Arc<S>, classifier: ProfileClassifier, strategy: WriteStrategy) -> Self
    where
        S: CatalogProvider + PolicyStore + 'static,
    {
        let provider: Arc<dyn CatalogProvider> = store.clone();
        Self {
            store,
            catalog: CatalogCache::new(provider),
            classifier,
            strategy,
        }
    }

    pub fn from_config<S>(store: Arc<S>, config: &AdminConfig) -> Self
    where
        S: CatalogProvider + PolicyStore + 'static,
    {
        Self::new(store, config.classifier(), config.write_strategy)
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Cached catalog; the first call loads it.
    pub async fn catalog(&self) -> ProfileResult<Arc<Catalog>> {
        self.catalog.get().await
    }

    /// Drop the cached catalog so the next session reloads it.
    pub async fn refresh_catalog(&self) {
        self.catalog.invalidate().await;
    }

    /// Open an editing session on profile `id`.
    pub async fn open(&self, id: ProfileId) -> ProfileResult<ProfileSession> {
        let catalog = self.catalog().await?;
        ProfileSession::load(
            Arc::clone(&self.store),
            catalog,
            &self.classifier,
            self.strategy,
            id,
        )
        .await
    }

    /// Create a custom profile from a complete draft.
    pub async fn create(&self, draft: ProfileDraft) -> ProfileResult<Profile> {
        let catalog = self.catalog().await?;
        catalog.check_map(&draft.permissions)?;
        if let Decision::Reject(rejection) = validate_new(&draft) {
            return Err(rejection.into());
        }
        let profile = self
            .store
            .create_profile(draft.attributes, draft.permissions)
            .await
            .map_err(create_error)?;
        tracing::info!(profile_id = %profile.id, name = %profile.name, "profile created");
        Ok(profile)
    }

    /// Delete profile `id`; system profiles and profiles with users are kept.
    pub async fn delete(&self, id: ProfileId) -> ProfileResult<()> {
        let profile = self.store.get_profile(id).await.map_err(read_error)?;
        if let Decision::Reject(rejection) = evaluate_delete(&profile) {
            tracing::info!(profile_id = %id, %rejection, "delete rejected locally");
            return Err(rejection.into());
        }
        self.store.delete_profile(id).await.map_err(|err| {
            let err = delete_error(err);
            tracing::info!(profile_id = %id, error = %err, "delete rejected by store");
            err
        })?;
        tracing::info!(profile_id = %id, "profile deleted");
        Ok(())
    }

    /// All profiles with their resolved kind and granted-feature count.
    pub async fn list_profiles(&self) -> ProfileResult<Vec<ProfileSummary>> {
        let profiles = self.store.list_profiles().await.map_err(read_error)?;
        let mut summaries = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let grants = self
                .store
                .get_permission_map(profile.id)
                .await
                .map_err(read_error)?;
            let (kind, _) = self.classifier.classify(&profile);
            summaries.push(ProfileSummary {
                profile,
                kind,
                granted_features: grants.granted_feature_count(),
            });
        }
        Ok(summaries)
    }

    /// Fails with `TransportFailure` when the backing store is unreachable.
    pub async fn health_check(&self) -> ProfileResult<()> {
        self.store.health_check().await.map_err(read_error)
    }

    pub async fn list_users(&self) -> ProfileResult<Vec<User>> {
        self.store.list_users().await.map_err(read_error)
    }

    /// Point `user` at `profile`, replacing any previous assignment.
    pub async fn assign_profile(&self, user: UserId, profile: ProfileId) -> ProfileResult<User> {
        let target = self.store.get_profile(profile).await.map_err(read_error)?;
        if !target.active {
            return Err(ProfileError::ValidationFailed(vec![ProfileField::Active]));
        }
        let user = self
            .store
            .assign_profile(user, profile)
            .await
            .map_err(assign_error)?;
        tracing::info!(user_id = %user.id, profile_id = %profile, "profile assigned");
        Ok(user)
    }
}
