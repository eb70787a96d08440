//! YAML seed data for the in-memory policy store.
//!
//! A seed file carries the catalog, profiles with their grant maps, and users.
//! Seeded profiles bypass mutation rules, which is the only way to create
//! system profiles; grants are still checked against the seeded catalog.
use crate::model::User;
use crate::store::memory::InMemoryPolicyStore;
use anyhow::{Context, Result};
use rolegate_policy::{
    Catalog, Feature, PermissionMap, Profile, ProfileClassifier, ProfileId, ProfileKind,
};
use serde::Deserialize;
use std::path::Path;

const BUNDLED_SEED: &str = include_str!("../seed/default.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub catalog: Vec<Feature>,
    #[serde(default)]
    pub profiles: Vec<SeedProfile>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub is_system_profile: bool,
    #[serde(default)]
    pub kind: Option<ProfileKind>,
    #[serde(default)]
    pub permissions: PermissionMap,
}

fn default_active() -> bool {
    true
}

impl SeedProfile {
    fn into_parts(self) -> (Profile, PermissionMap) {
        let profile = Profile {
            id: self.id,
            name: self.name,
            description: self.description,
            active: self.active,
            is_system_profile: self.is_system_profile,
            kind: self.kind,
        };
        (profile, self.permissions)
    }
}

impl SeedData {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).with_context(|| "parse seed yaml")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read seed file: {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Demo data shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_yaml(BUNDLED_SEED)
    }

    /// Build a populated store. Users are inserted after profiles so their
    /// profile references resolve.
    pub async fn into_store(self, classifier: ProfileClassifier) -> Result<InMemoryPolicyStore> {
        let catalog = Catalog::new(self.catalog).with_context(|| "build seed catalog")?;
        let store = InMemoryPolicyStore::new(catalog, classifier);
        for seed in self.profiles {
            let id = seed.id;
            let (profile, permissions) = seed.into_parts();
            store
                .insert_profile(profile, permissions)
                .await
                .with_context(|| format!("seed profile {id}"))?;
        }
        for user in self.users {
            let id = user.id;
            store
                .insert_user(user)
                .await
                .with_context(|| format!("seed user {id}"))?;
        }
        Ok(store)
    }
}
