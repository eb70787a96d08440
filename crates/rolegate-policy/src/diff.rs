//! Structural diff between a pristine and a current profile draft.
use crate::{ProfileDraft, ProfileField};
use serde::Serialize;

/// Result of comparing a working copy to its pristine snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirtyReport {
    pub dirty: bool,
    /// Differing top-level fields in [`ProfileField`] order.
    pub changed: Vec<ProfileField>,
}

impl DirtyReport {
    pub fn contains(&self, field: ProfileField) -> bool {
        self.changed.contains(&field)
    }
}

pub fn compute_dirty(pristine: &ProfileDraft, current: &ProfileDraft) -> DirtyReport {
    let changed: Vec<ProfileField> = ProfileField::ALL
        .into_iter()
        .filter(|field| field_differs(*field, pristine, current))
        .collect();
    DirtyReport {
        dirty: !changed.is_empty(),
        changed,
    }
}

fn field_differs(field: ProfileField, pristine: &ProfileDraft, current: &ProfileDraft) -> bool {
    match field {
        ProfileField::Name => pristine.attributes.name != current.attributes.name,
        ProfileField::Description => {
            pristine.attributes.description != current.attributes.description
        }
        ProfileField::Active => pristine.attributes.active != current.attributes.active,
        ProfileField::Permissions => pristine.permissions != current.permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PermissionMap, ProfileAttributes};
    use proptest::prelude::*;

    fn draft(name: &str, active: bool, map: PermissionMap) -> ProfileDraft {
        ProfileDraft::new(ProfileAttributes::new(name, "desc", active), map)
    }

    #[test]
    fn identical_drafts_are_clean() {
        let map: PermissionMap = [("USERS", vec!["READ"])].into_iter().collect();
        let report = compute_dirty(&draft("Ops", true, map.clone()), &draft("Ops", true, map));
        assert_eq!(report, DirtyReport::default());
    }

    #[test]
    fn changed_fields_follow_declared_order() {
        let pristine = draft("Ops", true, PermissionMap::new());
        let current = draft(
            "Operations",
            false,
            [("USERS", vec!["READ"])].into_iter().collect(),
        );
        let report = compute_dirty(&pristine, &current);
        assert!(report.dirty);
        assert_eq!(
            report.changed,
            vec![
                ProfileField::Name,
                ProfileField::Active,
                ProfileField::Permissions
            ]
        );
    }

    #[test]
    fn whitespace_only_name_change_is_dirty() {
        let pristine = draft("Ops", true, PermissionMap::new());
        let current = draft("Ops ", true, PermissionMap::new());
        assert!(compute_dirty(&pristine, &current).contains(ProfileField::Name));
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Toggle(&'static str, &'static str),
        Clear(&'static str),
        Rename(String),
        Flip,
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        let feature = prop_oneof![Just("USERS"), Just("CONTACTS")];
        let permission = prop_oneof![Just("READ"), Just("UPDATE")];
        prop_oneof![
            (feature.clone(), permission).prop_map(|(f, p)| Edit::Toggle(f, p)),
            feature.prop_map(Edit::Clear),
            "[a-z]{0,6}".prop_map(Edit::Rename),
            Just(Edit::Flip),
        ]
    }

    fn apply(draft: &mut ProfileDraft, edit: Edit) {
        match edit {
            Edit::Toggle(feature, permission) => {
                draft.permissions.toggle(feature.into(), permission.into());
            }
            Edit::Clear(feature) => {
                draft.permissions.clear(&feature.into());
            }
            Edit::Rename(name) => draft.attributes.name = name,
            Edit::Flip => draft.attributes.active = !draft.attributes.active,
        }
    }

    proptest! {
        #[test]
        fn reverting_any_edit_sequence_is_clean(
            edits in proptest::collection::vec(edit_strategy(), 0..12),
        ) {
            let pristine = draft("Ops", true, [("USERS", vec!["READ"])].into_iter().collect());
            let mut current = pristine.clone();
            for edit in edits {
                apply(&mut current, edit);
            }
            let report = compute_dirty(&pristine, &current);
            prop_assert_eq!(report.dirty, current != pristine);

            current = pristine.clone();
            prop_assert!(!compute_dirty(&pristine, &current).dirty);
        }
    }
}
