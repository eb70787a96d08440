use serde::{Deserialize, Serialize};

/// Top-level editable fields of a profile, in reporting order.
///
/// The derived `Ord` follows declaration order, which is also the order in
/// which validation and diff results list fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Description,
    Active,
    Permissions,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Name,
        ProfileField::Description,
        ProfileField::Active,
        ProfileField::Permissions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Description => "description",
            ProfileField::Active => "active",
            ProfileField::Permissions => "permissions",
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a field list as `name, permissions` for log lines and error text.
pub fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
