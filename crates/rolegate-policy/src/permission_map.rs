//! Feature → permission-set grant maps.
//!
//! # Purpose
//! A `PermissionMap` is the complete grant state of one profile. It is the
//! payload of full-replace writes, so it models "absent" and "empty" the same
//! way: features whose set becomes empty are pruned immediately.
//!
//! # Key invariants
//! - No entry ever holds an empty `PermissionSet`.
//! - Equality is structural over the pruned map, so two maps that differ only
//!   by empty entries compare equal.
//! - Catalog membership is not checked here; see [`crate::Catalog::check_map`].
//!
//! # Examples
//! ```rust
//! use rolegate_policy::{FeatureCode, PermissionCode, PermissionMap};
//!
//! let mut map = PermissionMap::new();
//! map.toggle(FeatureCode::new("USERS"), PermissionCode::new("READ"));
//! assert!(map.has_any_grant());
//! map.toggle(FeatureCode::new("USERS"), PermissionCode::new("READ"));
//! assert!(map.is_empty());
//! ```
use crate::{FeatureCode, PermissionCode, PermissionSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FeatureCode, PermissionSet>",
    into = "BTreeMap<FeatureCode, PermissionSet>"
)]
pub struct PermissionMap(BTreeMap<FeatureCode, PermissionSet>);

impl PermissionMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, feature: &FeatureCode) -> Option<&PermissionSet> {
        self.0.get(feature)
    }

    pub fn grants(&self, feature: &FeatureCode, permission: &PermissionCode) -> bool {
        self.0
            .get(feature)
            .is_some_and(|set| set.contains(permission))
    }

    pub fn grant(&mut self, feature: FeatureCode, permission: PermissionCode) -> bool {
        self.0.entry(feature).or_default().insert(permission)
    }

    pub fn revoke(&mut self, feature: &FeatureCode, permission: &PermissionCode) -> bool {
        let Some(set) = self.0.get_mut(feature) else {
            return false;
        };
        let removed = set.remove(permission);
        if set.is_empty() {
            self.0.remove(feature);
        }
        removed
    }

    /// Flip one grant and return whether it is now granted.
    pub fn toggle(&mut self, feature: FeatureCode, permission: PermissionCode) -> bool {
        let set = self.0.entry(feature.clone()).or_default();
        let granted = set.toggle(permission);
        if set.is_empty() {
            self.0.remove(&feature);
        }
        granted
    }

    /// Replace the whole set for `feature`; an empty set removes the entry.
    pub fn set(&mut self, feature: FeatureCode, permissions: PermissionSet) {
        if permissions.is_empty() {
            self.0.remove(&feature);
        } else {
            self.0.insert(feature, permissions);
        }
    }

    pub fn clear(&mut self, feature: &FeatureCode) -> bool {
        self.0.remove(feature).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of features with at least one granted permission.
    pub fn granted_feature_count(&self) -> usize {
        self.0.len()
    }

    /// Whether at least one feature carries a non-empty permission set.
    pub fn has_any_grant(&self) -> bool {
        self.0.values().any(|set| !set.is_empty())
    }

    pub fn features(&self) -> impl Iterator<Item = &FeatureCode> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureCode, &PermissionSet)> {
        self.0.iter()
    }
}

impl From<BTreeMap<FeatureCode, PermissionSet>> for PermissionMap {
    fn from(mut raw: BTreeMap<FeatureCode, PermissionSet>) -> Self {
        raw.retain(|_, set| !set.is_empty());
        Self(raw)
    }
}

impl From<PermissionMap> for BTreeMap<FeatureCode, PermissionSet> {
    fn from(map: PermissionMap) -> Self {
        map.0
    }
}

impl<F, S> FromIterator<(F, S)> for PermissionMap
where
    F: Into<FeatureCode>,
    S: IntoIterator,
    S::Item: Into<PermissionCode>,
{
    fn from_iter<I: IntoIterator<Item = (F, S)>>(iter: I) -> Self {
        let mut map = PermissionMap::new();
        for (feature, permissions) in iter {
            let feature = feature.into();
            let mut set = map.0.remove(&feature).unwrap_or_default();
            for permission in permissions {
                set.insert(permission.into());
            }
            map.set(feature, set);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> FeatureCode {
        FeatureCode::new("USERS")
    }

    #[test]
    fn empty_sets_are_pruned_on_construction() {
        let map: PermissionMap = [
            ("USERS", vec!["READ", "UPDATE"]),
            ("CONTACTS", Vec::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.granted_feature_count(), 1);
        assert!(map.get(&FeatureCode::new("CONTACTS")).is_none());
    }

    #[test]
    fn revoke_last_permission_removes_feature() {
        let mut map: PermissionMap = [("USERS", vec!["READ"])].into_iter().collect();
        assert!(map.revoke(&users(), &PermissionCode::new("READ")));
        assert!(map.is_empty());
        assert!(!map.revoke(&users(), &PermissionCode::new("READ")));
    }

    #[test]
    fn absent_and_empty_compare_equal() {
        let mut with_empty = PermissionMap::new();
        with_empty.set(users(), PermissionSet::new());
        assert_eq!(with_empty, PermissionMap::new());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut map = PermissionMap::new();
        assert!(map.toggle(users(), PermissionCode::new("DELETE")));
        assert!(map.grants(&users(), &PermissionCode::new("DELETE")));
        assert!(!map.toggle(users(), PermissionCode::new("DELETE")));
        assert!(!map.has_any_grant());
    }

    #[test]
    fn yaml_decoding_prunes_empty_entries() {
        let map: PermissionMap =
            serde_yaml::from_str("USERS: [READ, UPDATE]\nREPORTS: []\n").expect("parse map");
        let expected: PermissionMap = [("USERS", vec!["READ", "UPDATE"])].into_iter().collect();
        assert_eq!(map, expected);
    }
}
