//! Records the admin service reports that are not part of the policy model.
use rolegate_policy::{Profile, ProfileId, ProfileKind, UserId};
use serde::{Deserialize, Serialize};

/// Application user; references exactly one profile in this surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub profile_id: Option<ProfileId>,
}

fn default_active() -> bool {
    true
}

/// Listing entry: the stored record plus its resolved kind and grant count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub kind: ProfileKind,
    pub granted_features: usize,
}
