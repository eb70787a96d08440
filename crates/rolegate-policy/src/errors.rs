use thiserror::Error;

/// Errors raised while building or checking catalog-bound data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("duplicate feature in catalog: {0}")]
    DuplicateFeature(String),
    #[error("duplicate permission {permission} in feature {feature}")]
    DuplicatePermission { feature: String, permission: String },
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("permission {permission} is not allowed for feature {feature}")]
    PermissionNotAllowed { feature: String, permission: String },
}

pub type PolicyResult<T> = Result<T, PolicyError>;
