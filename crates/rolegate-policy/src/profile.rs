//! Profile records, editable drafts, and system-profile classification.
//!
//! # Purpose
//! Separates what the store reports about a profile (`Profile`) from what a
//! client may write (`ProfileAttributes` + `PermissionMap`, bundled as a
//! `ProfileDraft`). `is_system_profile` and `kind` live only on the record, so
//! no write payload can carry them.
//!
//! # Key invariants
//! - `ProfileKind` is decided by the store-supplied tag when present.
//! - Name-based classification is a fallback for untagged records only.
//!
//! # Common pitfalls
//! - Renaming seeded profiles silently changes the fallback classification of
//!   untagged records; prefer tagging them in the store.
use crate::{PermissionMap, ProfileId};
use serde::{Deserialize, Serialize};

/// Classification of a profile for the mutation rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileKind {
    #[default]
    Custom,
    SuperAdmin,
    DefaultLimited,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Custom => "CUSTOM",
            ProfileKind::SuperAdmin => "SUPER_ADMIN",
            ProfileKind::DefaultLimited => "DEFAULT_LIMITED",
        }
    }

    pub fn is_system(self) -> bool {
        !matches!(self, ProfileKind::Custom)
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-writable scalar attributes of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub name: String,
    pub description: String,
    pub active: bool,
}

impl ProfileAttributes {
    pub fn new(name: impl Into<String>, description: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            active,
        }
    }
}

/// Profile record as reported by the policy store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub is_system_profile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProfileKind>,
}

impl Profile {
    pub fn attributes(&self) -> ProfileAttributes {
        ProfileAttributes {
            name: self.name.clone(),
            description: self.description.clone(),
            active: self.active,
        }
    }
}

/// Complete editable state of a profile: attributes plus grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub attributes: ProfileAttributes,
    pub permissions: PermissionMap,
}

impl ProfileDraft {
    pub fn new(attributes: ProfileAttributes, permissions: PermissionMap) -> Self {
        Self {
            attributes,
            permissions,
        }
    }
}

/// How a profile's kind was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSource {
    /// The store supplied an explicit tag.
    Tag,
    /// No tag; the display name matched a configured system name.
    DisplayName,
    /// No tag and no name match.
    Default,
}

/// Resolves the [`ProfileKind`] of store records.
///
/// # Example
/// ```rust
/// use rolegate_policy::{Profile, ProfileClassifier, ProfileId, ProfileKind};
///
/// let classifier = ProfileClassifier::new("ADMINISTRADOR", "USUARIO");
/// let profile = Profile {
///     id: ProfileId::new(7),
///     name: "ADMINISTRADOR".to_string(),
///     description: "Platform administrators".to_string(),
///     active: true,
///     is_system_profile: true,
///     kind: None,
/// };
/// assert_eq!(classifier.classify(&profile).0, ProfileKind::SuperAdmin);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileClassifier {
    super_admin_name: String,
    default_limited_name: String,
}

impl ProfileClassifier {
    pub fn new(super_admin_name: impl Into<String>, default_limited_name: impl Into<String>) -> Self {
        Self {
            super_admin_name: super_admin_name.into(),
            default_limited_name: default_limited_name.into(),
        }
    }

    pub fn classify(&self, profile: &Profile) -> (ProfileKind, KindSource) {
        if let Some(kind) = profile.kind {
            return (kind, KindSource::Tag);
        }
        // Exact match only: the fallback must not widen to look-alike names.
        if profile.name == self.super_admin_name {
            (ProfileKind::SuperAdmin, KindSource::DisplayName)
        } else if profile.name == self.default_limited_name {
            (ProfileKind::DefaultLimited, KindSource::DisplayName)
        } else {
            (ProfileKind::Custom, KindSource::Default)
        }
    }
}

impl Default for ProfileClassifier {
    fn default() -> Self {
        Self::new("ADMINISTRADOR", "USUARIO")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: Option<ProfileKind>) -> Profile {
        Profile {
            id: ProfileId::new(1),
            name: name.to_string(),
            description: "d".to_string(),
            active: true,
            is_system_profile: kind.is_some_and(ProfileKind::is_system),
            kind,
        }
    }

    #[test]
    fn tag_wins_over_display_name() {
        let classifier = ProfileClassifier::default();
        let tagged = record("ADMINISTRADOR", Some(ProfileKind::Custom));
        assert_eq!(
            classifier.classify(&tagged),
            (ProfileKind::Custom, KindSource::Tag)
        );
    }

    #[test]
    fn untagged_records_fall_back_to_exact_name() {
        let classifier = ProfileClassifier::default();
        assert_eq!(
            classifier.classify(&record("USUARIO", None)),
            (ProfileKind::DefaultLimited, KindSource::DisplayName)
        );
        assert_eq!(
            classifier.classify(&record("administrador", None)),
            (ProfileKind::Custom, KindSource::Default)
        );
    }

    #[test]
    fn kind_serializes_as_screaming_tag() {
        let rendered = serde_yaml::to_string(&ProfileKind::DefaultLimited).expect("yaml");
        assert_eq!(rendered.trim(), "DEFAULT_LIMITED");
        assert!(ProfileKind::SuperAdmin.is_system());
        assert!(!ProfileKind::Custom.is_system());
    }
}
