//! Feature catalog: the read-only reference data every grant is checked against.
//!
//! # Purpose
//! Holds the features of the application and, per feature, the ordered list of
//! permissions it supports. Grant maps are only meaningful relative to a catalog.
//!
//! # Key invariants
//! - Feature codes are unique across the catalog.
//! - Permission codes are unique within a feature and keep catalog order.
//! - A catalog is immutable once built; reloads build a new value.
//!
//! # Common pitfalls
//! - Checking a map against a stale catalog after reference data changed;
//!   invalidate the cache that owns it instead of patching in place.
use crate::{
    FeatureCode, Permission, PermissionCode, PermissionMap, PermissionSet, PolicyError,
    PolicyResult,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A functional area subject to access control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub code: FeatureCode,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub permissions: Vec<Permission>,
}

impl Feature {
    pub fn allows(&self, permission: &PermissionCode) -> bool {
        self.permissions.iter().any(|p| &p.code == permission)
    }

    /// Every permission this feature supports, as a grantable set.
    pub fn allowed(&self) -> PermissionSet {
        self.permissions.iter().map(|p| p.code.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    features: Vec<Feature>,
    index: HashMap<FeatureCode, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate feature or permission codes.
    ///
    /// # Errors
    /// - [`PolicyError::DuplicateFeature`] when two features share a code.
    /// - [`PolicyError::DuplicatePermission`] when a feature lists a code twice.
    pub fn new(features: Vec<Feature>) -> PolicyResult<Self> {
        let mut index = HashMap::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            if index.insert(feature.code.clone(), position).is_some() {
                return Err(PolicyError::DuplicateFeature(feature.code.to_string()));
            }
            let mut seen = HashSet::new();
            for permission in &feature.permissions {
                if !seen.insert(&permission.code) {
                    return Err(PolicyError::DuplicatePermission {
                        feature: feature.code.to_string(),
                        permission: permission.code.to_string(),
                    });
                }
            }
        }
        Ok(Self { features, index })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, code: &FeatureCode) -> Option<&Feature> {
        self.index.get(code).map(|position| &self.features[*position])
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Resolve a feature or fail with [`PolicyError::UnknownFeature`].
    pub fn require_feature(&self, code: &FeatureCode) -> PolicyResult<&Feature> {
        self.feature(code)
            .ok_or_else(|| PolicyError::UnknownFeature(code.to_string()))
    }

    /// Check that a single grant is permitted by the catalog.
    pub fn check_grant(&self, feature: &FeatureCode, permission: &PermissionCode) -> PolicyResult<()> {
        let entry = self.require_feature(feature)?;
        if entry.allows(permission) {
            Ok(())
        } else {
            Err(PolicyError::PermissionNotAllowed {
                feature: feature.to_string(),
                permission: permission.to_string(),
            })
        }
    }

    /// Check that every grant in `map` is a subset of the catalog.
    pub fn check_map(&self, map: &PermissionMap) -> PolicyResult<()> {
        for (feature, permissions) in map.iter() {
            for permission in permissions {
                self.check_grant(feature, permission)?;
            }
        }
        Ok(())
    }
}
