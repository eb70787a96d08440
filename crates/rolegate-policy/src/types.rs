//! Strongly typed identifiers for catalog entries, profiles, and users.
//!
//! # Purpose
//! Wraps raw codes and numeric ids so feature codes, permission codes, and
//! profile ids cannot be mixed up at call sites.
//!
//! # Key invariants
//! - Codes are preserved exactly; comparison is case-sensitive.
//! - Codes order lexicographically so permission maps iterate deterministically.
//!
//! # Examples
//! ```rust
//! use rolegate_policy::{FeatureCode, PermissionCode};
//!
//! let feature = FeatureCode::new("USERS");
//! let permission = PermissionCode::from("READ");
//! assert_eq!(format!("{feature}.{permission}"), "USERS.READ");
//! ```
//!
//! # Common pitfalls
//! - Constructing codes with surrounding whitespace; the catalog will not
//!   recognize them.
use serde::{Deserialize, Serialize};

/// Feature code wrapper (e.g. `USERS`, `CONTACTS`).
///
/// # Example
/// ```rust
/// use rolegate_policy::FeatureCode;
///
/// let feature = FeatureCode::new("USERS");
/// assert_eq!(feature.as_str(), "USERS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureCode(String);

impl FeatureCode {
    /// Construct a new feature code wrapper.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the inner code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FeatureCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Permission code wrapper (e.g. `READ`, `DELETE`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Construct a new permission code wrapper.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the inner code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Store-assigned profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(u64);

impl ProfileId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureCode, PermissionCode, ProfileId, UserId};

    #[test]
    fn type_constructors_and_display() {
        let feature = FeatureCode::new("USERS");
        let permission = PermissionCode::from("READ".to_string());
        let profile = ProfileId::new(7);
        let user = UserId::new(42);

        assert_eq!(feature.as_str(), "USERS");
        assert_eq!(permission.to_string(), "READ");
        assert_eq!(profile.get(), 7);
        assert_eq!(profile.to_string(), "7");
        assert_eq!(user.to_string(), "42");
    }

    #[test]
    fn codes_order_lexicographically() {
        let mut codes = vec![
            FeatureCode::new("USERS"),
            FeatureCode::new("CONTACTS"),
            FeatureCode::new("REPORTS"),
        ];
        codes.sort();
        let rendered: Vec<&str> = codes.iter().map(FeatureCode::as_str).collect();
        assert_eq!(rendered, vec!["CONTACTS", "REPORTS", "USERS"]);
    }
}
