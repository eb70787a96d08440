//! Permission reference data and per-feature permission sets.
//!
//! # Purpose
//! Defines the catalog `Permission` record and `PermissionSet`, the explicit
//! set type used for a feature's granted (or allowed) permission codes.
//!
//! # Key invariants
//! - A `PermissionSet` never holds duplicates and iterates in code order.
//!
//! # Examples
//! ```rust
//! use rolegate_policy::{PermissionCode, PermissionSet};
//!
//! let mut set = PermissionSet::new();
//! assert!(set.toggle(PermissionCode::new("READ")));
//! assert!(!set.toggle(PermissionCode::new("READ")));
//! assert!(set.is_empty());
//! ```
use crate::PermissionCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Catalog entry describing one action right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub code: PermissionCode,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl Permission {
    pub fn new(code: impl Into<PermissionCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            icon: String::new(),
        }
    }
}

/// Set of permission codes granted on (or allowed for) a single feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PermissionCode>);

impl PermissionSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Add a code; returns `true` when it was not already present.
    pub fn insert(&mut self, code: PermissionCode) -> bool {
        self.0.insert(code)
    }

    /// Remove a code; returns `true` when it was present.
    pub fn remove(&mut self, code: &PermissionCode) -> bool {
        self.0.remove(code)
    }

    /// Flip membership of `code` and return the new membership.
    pub fn toggle(&mut self, code: PermissionCode) -> bool {
        if self.0.remove(&code) {
            false
        } else {
            self.0.insert(code);
            true
        }
    }

    pub fn contains(&self, code: &PermissionCode) -> bool {
        self.0.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.0.iter()
    }
}

impl<P: Into<PermissionCode>> FromIterator<P> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a PermissionCode;
    type IntoIter = std::collections::btree_set::Iter<'a, PermissionCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for PermissionSet {
    type Item = PermissionCode;
    type IntoIter = std::collections::btree_set::IntoIter<PermissionCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_deduplicates_and_orders_codes() {
        let set: PermissionSet = ["UPDATE", "READ", "UPDATE"].into_iter().collect();
        let codes: Vec<&str> = set.iter().map(PermissionCode::as_str).collect();
        assert_eq!(codes, vec!["READ", "UPDATE"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn subset_checks_membership() {
        let allowed: PermissionSet = ["READ", "CREATE", "UPDATE", "DELETE"].into_iter().collect();
        let granted: PermissionSet = ["READ", "DELETE"].into_iter().collect();
        let foreign: PermissionSet = ["READ", "EXPORT"].into_iter().collect();
        assert!(granted.is_subset(&allowed));
        assert!(!foreign.is_subset(&allowed));
    }

    #[test]
    fn permission_defaults_optional_fields() {
        let parsed: Permission =
            serde_yaml::from_str("code: READ\nname: Read\n").expect("parse permission");
        assert_eq!(parsed, Permission::new("READ", "Read"));
    }
}
