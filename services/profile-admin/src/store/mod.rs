//! Policy store collaborator contracts.
//!
//! # Purpose
//! Declares what the admin service needs from the authoritative store: the
//! read-only feature catalog, profile records, permission maps, and users.
//!
//! # Key invariants
//! - `replace_permission_map` overwrites; features omitted from the payload are
//!   revoked.
//! - Stores are the final authority and may reject what local checks allowed.
use crate::model::User;
use async_trait::async_trait;
use rolegate_policy::{
    Feature, PermissionMap, Profile, ProfileAttributes, ProfileField, ProfileId, UserId,
};
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        dependent_users: Option<u64>,
    },
    /// The payload was refused; `field` names the offending profile field
    /// when there is one.
    #[error("invalid: {message}")]
    Invalid {
        field: Option<ProfileField>,
        message: String,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn invalid(field: ProfileField, message: impl Into<String>) -> Self {
        StoreError::Invalid {
            field: Some(field),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_features(&self) -> StoreResult<Vec<Feature>>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;
    async fn get_profile(&self, id: ProfileId) -> StoreResult<Profile>;
    async fn get_permission_map(&self, id: ProfileId) -> StoreResult<PermissionMap>;
    async fn create_profile(
        &self,
        attributes: ProfileAttributes,
        permissions: PermissionMap,
    ) -> StoreResult<Profile>;
    async fn update_profile(
        &self,
        id: ProfileId,
        attributes: ProfileAttributes,
    ) -> StoreResult<Profile>;
    async fn replace_permission_map(
        &self,
        id: ProfileId,
        permissions: PermissionMap,
    ) -> StoreResult<Profile>;
    async fn delete_profile(&self, id: ProfileId) -> StoreResult<()>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn assign_profile(&self, user: UserId, profile: ProfileId) -> StoreResult<User>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

/// A store that serves both the catalog and profile state.
pub trait PolicyAdminStore: CatalogProvider + PolicyStore {}

impl<T: CatalogProvider + PolicyStore> PolicyAdminStore for T {}
