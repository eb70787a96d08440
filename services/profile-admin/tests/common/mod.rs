#![allow(dead_code)]

use async_trait::async_trait;
use profile_admin::ProfileAdmin;
use profile_admin::WriteStrategy;
use profile_admin::model::User;
use profile_admin::seed::SeedData;
use profile_admin::store::memory::InMemoryPolicyStore;
use profile_admin::store::{CatalogProvider, PolicyStore, StoreError, StoreResult};
use rolegate_policy::{
    Feature, PermissionMap, Profile, ProfileAttributes, ProfileClassifier, ProfileId, UserId,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// Profiles in the bundled seed.
pub const ADMINISTRADOR: ProfileId = ProfileId::new(7);
pub const USUARIO: ProfileId = ProfileId::new(8);
pub const REGIONAL_MANAGER: ProfileId = ProfileId::new(12);
pub const SALES: ProfileId = ProfileId::new(15);

pub async fn seeded_store() -> Arc<InMemoryPolicyStore> {
    let store = SeedData::bundled()
        .expect("bundled seed")
        .into_store(ProfileClassifier::default())
        .await
        .expect("seeded store");
    Arc::new(store)
}

pub fn admin<S>(store: Arc<S>, strategy: WriteStrategy) -> ProfileAdmin
where
    S: CatalogProvider + PolicyStore + 'static,
{
    ProfileAdmin::new(store, ProfileClassifier::default(), strategy)
}

pub fn grants(pairs: &[(&str, &[&str])]) -> PermissionMap {
    pairs
        .iter()
        .map(|(feature, perms)| (*feature, perms.iter().copied()))
        .collect()
}

fn injected(what: &str) -> StoreError {
    StoreError::Unexpected(anyhow::anyhow!("injected {what} failure"))
}

/// Wraps the in-memory store and fails selected calls on demand.
pub struct FaultyStore {
    pub inner: Arc<InMemoryPolicyStore>,
    pub fail_map_reads: AtomicBool,
    pub fail_map_writes: AtomicBool,
    pub fail_attribute_writes: AtomicBool,
    pub fail_health: AtomicBool,
    /// Attribute writes allowed before they start failing.
    pub attribute_write_budget: AtomicUsize,
    pub attribute_writes: AtomicUsize,
    pub map_writes: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryPolicyStore>) -> Self {
        Self {
            inner,
            fail_map_reads: AtomicBool::new(false),
            fail_map_writes: AtomicBool::new(false),
            fail_attribute_writes: AtomicBool::new(false),
            fail_health: AtomicBool::new(false),
            attribute_write_budget: AtomicUsize::new(usize::MAX),
            attribute_writes: AtomicUsize::new(0),
            map_writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogProvider for FaultyStore {
    async fn list_features(&self) -> StoreResult<Vec<Feature>> {
        self.inner.list_features().await
    }
}

#[async_trait]
impl PolicyStore for FaultyStore {
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        self.inner.list_profiles().await
    }

    async fn get_profile(&self, id: ProfileId) -> StoreResult<Profile> {
        self.inner.get_profile(id).await
    }

    async fn get_permission_map(&self, id: ProfileId) -> StoreResult<PermissionMap> {
        if self.fail_map_reads.load(Ordering::SeqCst) {
            return Err(injected("map read"));
        }
        self.inner.get_permission_map(id).await
    }

    async fn create_profile(
        &self,
        attributes: ProfileAttributes,
        permissions: PermissionMap,
    ) -> StoreResult<Profile> {
        self.inner.create_profile(attributes, permissions).await
    }

    async fn update_profile(
        &self,
        id: ProfileId,
        attributes: ProfileAttributes,
    ) -> StoreResult<Profile> {
        let seen = self.attribute_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_attribute_writes.load(Ordering::SeqCst)
            || seen >= self.attribute_write_budget.load(Ordering::SeqCst)
        {
            return Err(injected("attribute write"));
        }
        self.inner.update_profile(id, attributes).await
    }

    async fn replace_permission_map(
        &self,
        id: ProfileId,
        permissions: PermissionMap,
    ) -> StoreResult<Profile> {
        self.map_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_map_writes.load(Ordering::SeqCst) {
            return Err(injected("map write"));
        }
        self.inner.replace_permission_map(id, permissions).await
    }

    async fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        self.inner.delete_profile(id).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn assign_profile(&self, user: UserId, profile: ProfileId) -> StoreResult<User> {
        self.inner.assign_profile(user, profile).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(injected("health check"));
        }
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}
