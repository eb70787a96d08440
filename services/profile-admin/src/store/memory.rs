//! In-memory implementation of the policy store.
//!
//! # Purpose
//! Implements `CatalogProvider` and `PolicyStore` entirely in memory using
//! `HashMap`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - seeding a demo environment from YAML
//!
//! # Authority
//! The store re-checks every write with the same rules the client uses:
//! - grants must be a subset of the catalog (`Invalid`)
//! - system-profile restrictions apply to stored state (`Forbidden`)
//! - a stored profile keeps at least one grant (`Invalid`)
//! - profile names are unique (`Invalid`)
//! - deletes refuse system profiles (`Forbidden`) and profiles with users
//!   (`Conflict` carrying the dependent count)
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - Attribute and permission-map writes take the profile write lock
//!   independently, so the store offers no atomicity across the two.
use super::{CatalogProvider, PolicyStore, StoreError, StoreResult};
use crate::model::User;
use async_trait::async_trait;
use rolegate_policy::{
    Catalog, Feature, PermissionMap, Profile, ProfileAttributes, ProfileClassifier, ProfileDraft,
    ProfileField, ProfileId, ProfileKind, UserId, join_fields, restricted_changes,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredProfile {
    profile: Profile,
    permissions: PermissionMap,
}

impl StoredProfile {
    fn draft(&self) -> ProfileDraft {
        ProfileDraft::new(self.profile.attributes(), self.permissions.clone())
    }
}

pub struct InMemoryPolicyStore {
    /// Reference data; fixed for the lifetime of the store.
    catalog: Arc<Catalog>,
    /// Resolves kinds of untagged records before applying restrictions.
    classifier: ProfileClassifier,
    /// Authoritative profiles keyed by id.
    profiles: Arc<RwLock<HashMap<ProfileId, StoredProfile>>>,
    /// Users keyed by id; used for assignment and dependent counts.
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// Next id handed out by `create_profile`.
    next_profile_id: Arc<RwLock<u64>>,
}

impl InMemoryPolicyStore {
    pub fn new(catalog: Catalog, classifier: ProfileClassifier) -> Self {
        Self {
            catalog: Arc::new(catalog),
            classifier,
            profiles: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            next_profile_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Insert a profile as-is, bypassing mutation rules. Used for seeding.
    ///
    /// The grant map is still checked against the catalog.
    pub async fn insert_profile(
        &self,
        profile: Profile,
        permissions: PermissionMap,
    ) -> StoreResult<()> {
        self.catalog
            .check_map(&permissions)
            .map_err(|err| StoreError::invalid(ProfileField::Permissions, err.to_string()))?;
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(StoreError::Conflict {
                message: format!("profile {} exists", profile.id),
                dependent_users: None,
            });
        }
        // The id after this one must stay representable for `create_profile`.
        let after = profile.id.get().checked_add(1).ok_or_else(|| StoreError::Invalid {
            field: None,
            message: format!("profile id {} leaves no room for new ids", profile.id),
        })?;
        {
            let mut next = self.next_profile_id.write().await;
            *next = (*next).max(after);
        }
        profiles.insert(
            profile.id,
            StoredProfile {
                profile,
                permissions,
            },
        );
        metrics::gauge!("rolegate_profiles_total").set(profiles.len() as f64);
        Ok(())
    }

    /// Insert a user as-is. Used for seeding.
    pub async fn insert_user(&self, user: User) -> StoreResult<()> {
        let profiles = self.profiles.read().await;
        if let Some(profile_id) = user.profile_id {
            if !profiles.contains_key(&profile_id) {
                return Err(StoreError::NotFound(format!("profile {profile_id}")));
            }
        }
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict {
                message: format!("user {} exists", user.id),
                dependent_users: None,
            });
        }
        users.insert(user.id, user);
        Ok(())
    }

    fn kind_of(&self, profile: &Profile) -> ProfileKind {
        self.classifier.classify(profile).0
    }

}

// Lock order everywhere: `profiles`, then `next_profile_id` or `users`.
fn dependent_users(users: &HashMap<UserId, User>, id: ProfileId) -> u64 {
    users
        .values()
        .filter(|user| user.profile_id == Some(id))
        .count() as u64
}

fn name_taken(
    profiles: &HashMap<ProfileId, StoredProfile>,
    name: &str,
    except: Option<ProfileId>,
) -> bool {
    profiles
        .values()
        .any(|stored| Some(stored.profile.id) != except && stored.profile.name == name)
}

fn check_attributes(attributes: &ProfileAttributes) -> StoreResult<()> {
    if attributes.name.trim().is_empty() {
        return Err(StoreError::invalid(ProfileField::Name, "name must not be blank"));
    }
    if attributes.description.trim().is_empty() {
        return Err(StoreError::invalid(
            ProfileField::Description,
            "description must not be blank",
        ));
    }
    Ok(())
}

#[async_trait]
impl CatalogProvider for InMemoryPolicyStore {
    async fn list_features(&self) -> StoreResult<Vec<Feature>> {
        Ok(self.catalog.features().to_vec())
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .read()
            .await
            .values()
            .map(|stored| stored.profile.clone())
            .collect();
        profiles.sort_by_key(|profile| profile.id);
        Ok(profiles)
    }

    async fn get_profile(&self, id: ProfileId) -> StoreResult<Profile> {
        self.profiles
            .read()
            .await
            .get(&id)
            .map(|stored| stored.profile.clone())
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    async fn get_permission_map(&self, id: ProfileId) -> StoreResult<PermissionMap> {
        self.profiles
            .read()
            .await
            .get(&id)
            .map(|stored| stored.permissions.clone())
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    async fn create_profile(
        &self,
        attributes: ProfileAttributes,
        permissions: PermissionMap,
    ) -> StoreResult<Profile> {
        check_attributes(&attributes)?;
        if !permissions.has_any_grant() {
            return Err(StoreError::invalid(
                ProfileField::Permissions,
                "profile needs at least one grant",
            ));
        }
        self.catalog
            .check_map(&permissions)
            .map_err(|err| StoreError::invalid(ProfileField::Permissions, err.to_string()))?;

        let mut profiles = self.profiles.write().await;
        if name_taken(&profiles, &attributes.name, None) {
            return Err(StoreError::invalid(
                ProfileField::Name,
                format!("profile name {} already in use", attributes.name),
            ));
        }
        let id = {
            let mut next = self.next_profile_id.write().await;
            let following = next.checked_add(1).ok_or_else(|| StoreError::Conflict {
                message: "profile id space exhausted".to_string(),
                dependent_users: None,
            })?;
            let id = ProfileId::new(*next);
            *next = following;
            id
        };
        // Created profiles are always custom; system status is seeded only.
        let profile = Profile {
            id,
            name: attributes.name,
            description: attributes.description,
            active: attributes.active,
            is_system_profile: false,
            kind: Some(ProfileKind::Custom),
        };
        profiles.insert(
            id,
            StoredProfile {
                profile: profile.clone(),
                permissions,
            },
        );
        tracing::info!(profile_id = %id, name = %profile.name, "profile created");
        metrics::counter!("rolegate_profile_changes_total", "op" => "created").increment(1);
        metrics::gauge!("rolegate_profiles_total").set(profiles.len() as f64);
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: ProfileId,
        attributes: ProfileAttributes,
    ) -> StoreResult<Profile> {
        let mut profiles = self.profiles.write().await;
        let taken = name_taken(&profiles, &attributes.name, Some(id));
        let stored = profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;

        let kind = self.kind_of(&stored.profile);
        let pristine = stored.draft();
        let proposed = ProfileDraft::new(attributes.clone(), stored.permissions.clone());
        let locked = restricted_changes(kind, &pristine, &proposed);
        if !locked.is_empty() {
            tracing::warn!(profile_id = %id, %kind, fields = %join_fields(&locked), "attribute write refused");
            return Err(StoreError::Forbidden(format!(
                "{kind} profile cannot change {}",
                join_fields(&locked)
            )));
        }
        check_attributes(&attributes)?;
        if taken {
            return Err(StoreError::invalid(
                ProfileField::Name,
                format!("profile name {} already in use", attributes.name),
            ));
        }

        stored.profile.name = attributes.name;
        stored.profile.description = attributes.description;
        stored.profile.active = attributes.active;
        metrics::counter!("rolegate_profile_changes_total", "op" => "updated").increment(1);
        Ok(stored.profile.clone())
    }

    async fn replace_permission_map(
        &self,
        id: ProfileId,
        permissions: PermissionMap,
    ) -> StoreResult<Profile> {
        let mut profiles = self.profiles.write().await;
        let stored = profiles
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;

        let kind = self.kind_of(&stored.profile);
        let pristine = stored.draft();
        let proposed = ProfileDraft::new(stored.profile.attributes(), permissions.clone());
        if !restricted_changes(kind, &pristine, &proposed).is_empty() {
            tracing::warn!(profile_id = %id, %kind, "permission map write refused");
            return Err(StoreError::Forbidden(format!(
                "{kind} profile permissions are fixed"
            )));
        }
        self.catalog
            .check_map(&permissions)
            .map_err(|err| StoreError::invalid(ProfileField::Permissions, err.to_string()))?;
        if !permissions.has_any_grant() {
            return Err(StoreError::invalid(
                ProfileField::Permissions,
                "profile needs at least one grant",
            ));
        }

        // Full replace: whatever the payload omits is revoked.
        stored.permissions = permissions;
        metrics::counter!("rolegate_profile_changes_total", "op" => "permissions_replaced")
            .increment(1);
        Ok(stored.profile.clone())
    }

    async fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        let stored = profiles
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;
        if stored.profile.is_system_profile {
            return Err(StoreError::Forbidden("system profiles cannot be deleted".into()));
        }
        // Counted under the profiles guard so no assignment can slip in.
        let dependents = dependent_users(&*self.users.read().await, id);
        if dependents > 0 {
            return Err(StoreError::Conflict {
                message: format!("profile {id} is assigned to {dependents} users"),
                dependent_users: Some(dependents),
            });
        }
        profiles.remove(&id);
        tracing::info!(profile_id = %id, "profile deleted");
        metrics::counter!("rolegate_profile_changes_total", "op" => "deleted").increment(1);
        metrics::gauge!("rolegate_profiles_total").set(profiles.len() as f64);
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn assign_profile(&self, user: UserId, profile: ProfileId) -> StoreResult<User> {
        // Held until the assignment lands so the target cannot be deleted.
        let profiles = self.profiles.read().await;
        let target = profiles
            .get(&profile)
            .ok_or_else(|| StoreError::NotFound(format!("profile {profile}")))?;
        if !target.profile.active {
            return Err(StoreError::invalid(
                ProfileField::Active,
                format!("profile {profile} is inactive"),
            ));
        }
        let mut users = self.users.write().await;
        let entry = users
            .get_mut(&user)
            .ok_or_else(|| StoreError::NotFound(format!("user {user}")))?;
        // One profile per user: assignment replaces any previous reference.
        entry.profile_id = Some(profile);
        metrics::counter!("rolegate_profile_changes_total", "op" => "assigned").increment(1);
        Ok(entry.clone())
    }

    async fn health_check(&self) -> StoreResult<()> {
        // In-memory backend is always "healthy" if the process is running.
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
