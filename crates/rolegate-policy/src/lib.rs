//! Rolegate policy model shared by the profile-admin service and its stores.
//!
//! # Purpose
//! Defines the Profile × Feature × Permission data model, the feature catalog,
//! the pure invariant engine that gates profile mutations, and the structural
//! diff used to detect unsaved edits.
//!
//! # How it fits
//! The admin service evaluates mutations locally with this crate before it
//! calls a policy store; stores evaluate the same rules again as the final
//! authority. Nothing here performs I/O.
//!
//! # Key invariants
//! - Grants in a `PermissionMap` must be a subset of the catalog (`Catalog::check_map`).
//! - `is_system_profile` and `ProfileKind` are store-derived and never part of
//!   a write payload.
//! - Super-admin profiles may only change `description`; default-limited
//!   profiles may not change `name` or `active`.
//!
//! # Examples
//! ```rust
//! use rolegate_policy::{
//!     Decision, PermissionMap, ProfileAttributes, ProfileDraft, ProfileKind, evaluate,
//! };
//!
//! let pristine = ProfileDraft::new(
//!     ProfileAttributes::new("ADMINISTRADOR", "Platform administrators", true),
//!     [("USERS", ["READ", "UPDATE"])].into_iter().collect(),
//! );
//! let mut proposed = pristine.clone();
//! proposed.attributes.description = "Everything".to_string();
//! assert_eq!(evaluate(ProfileKind::SuperAdmin, &pristine, &proposed), Decision::Allow);
//!
//! proposed.permissions = PermissionMap::new();
//! assert!(!evaluate(ProfileKind::SuperAdmin, &pristine, &proposed).is_allowed());
//! ```
//!
//! # Common pitfalls
//! - Treating a local `Allow` as a guarantee; the store may still reject.

mod catalog;
mod diff;
mod errors;
mod field;
mod invariant;
mod permission;
mod permission_map;
mod profile;
mod types;

pub use catalog::{Catalog, Feature};
pub use diff::{DirtyReport, compute_dirty};
pub use errors::{PolicyError, PolicyResult};
pub use field::{ProfileField, join_fields};
pub use invariant::{
    Decision, RejectReason, Rejection, evaluate, evaluate_delete, restricted_changes,
    validate_new,
};
pub use permission::{Permission, PermissionSet};
pub use permission_map::PermissionMap;
pub use profile::{
    KindSource, Profile, ProfileAttributes, ProfileClassifier, ProfileDraft, ProfileKind,
};
pub use types::{FeatureCode, PermissionCode, ProfileId, UserId};
