//! Built-in profile registry. Loads every document-family profile from
//! embedded TOML.
//!
//! Each `.toml` file in `packages/document/profiles/` is baked into the
//! binary at compile time via [`include_str!`]. Supporting a new document
//! family means writing a new TOML file and adding it to the list below.

use crate::ProfileError;
use crate::profile::{DocumentProfile, parse_profile_toml};

/// Profile TOMLs embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    // ── Purchase orders ──────────────────────────────────────────────
    ("startex_po", include_str!("../profiles/startex_po.toml")),
    // ── Delivery challans ────────────────────────────────────────────
    ("inctl_challan", include_str!("../profiles/inctl_challan.toml")),
];

/// Total number of built-in profiles (used in tests).
#[cfg(test)]
const EXPECTED_PROFILE_COUNT: usize = 2;

/// Returns every built-in profile, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML profile is malformed (the profiles are embedded, so
/// this is caught by the tests below).
#[must_use]
pub fn all_profiles() -> Vec<DocumentProfile> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_profile_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a built-in profile by id.
///
/// # Errors
///
/// Returns [`ProfileError::UnknownProfile`] if no built-in profile has that
/// id.
pub fn find_profile(id: &str) -> Result<DocumentProfile, ProfileError> {
    all_profiles()
        .into_iter()
        .find(|profile| profile.id == id)
        .ok_or_else(|| ProfileError::UnknownProfile(id.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{LayoutConfig, RecordStrategy};

    #[test]
    fn loads_all_profiles() {
        assert_eq!(all_profiles().len(), EXPECTED_PROFILE_COUNT);
    }

    #[test]
    fn profile_ids_are_unique_and_match_file_names() {
        let profiles = all_profiles();
        let mut ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        for ((name, _), id) in PROFILE_TOMLS.iter().zip(&ids) {
            assert_eq!(name, id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_PROFILE_COUNT);
    }

    #[test]
    fn all_profiles_have_required_fields() {
        for profile in &all_profiles() {
            assert!(!profile.id.is_empty(), "profile id is empty");
            assert!(!profile.name.is_empty(), "{}: name is empty", profile.id);
            assert!(
                !profile.segmentation.anchor.is_empty(),
                "{}: no anchor",
                profile.id
            );
            assert!(
                !profile.segmentation.terminator.is_empty(),
                "{}: no terminator",
                profile.id
            );
            assert!(
                !profile.output.columns.is_empty(),
                "{}: no output columns",
                profile.id
            );
        }
    }

    #[test]
    fn startex_profile_shape() {
        let profile = find_profile("startex_po").unwrap();
        let LayoutConfig::Keyphrase(layout) = &profile.layout else {
            panic!("expected keyphrase layout");
        };
        assert_eq!(layout.fields.len(), 16);
        assert!(layout.variant.is_some());
        assert!(profile.catalog.is_some());
        assert_eq!(profile.output.columns.len(), 24);
        let RecordStrategy::SizeMatrix(hints) = &profile.records else {
            panic!("expected size matrix");
        };
        assert_eq!(hints.variant(true).size_sentinel.as_deref(), Some("ASS"));
        assert_eq!(
            hints.correction("Greymelange").map(|c| c.display.as_str()),
            Some("Grey Mélange")
        );
    }

    #[test]
    fn challan_profile_shape() {
        let profile = find_profile("inctl_challan").unwrap();
        assert!(matches!(profile.layout, LayoutConfig::WholeDocument));
        assert_eq!(profile.segmentation.anchor_column, 3);
        assert_eq!(profile.segmentation.max_columns, Some(15));
        assert_eq!(profile.segment_fields.len(), 4);
        assert!(matches!(profile.records, RecordStrategy::KeyedRows(_)));
        assert!(profile.catalog.is_none());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        assert!(matches!(
            find_profile("nope"),
            Err(ProfileError::UnknownProfile(id)) if id == "nope"
        ));
    }
}
