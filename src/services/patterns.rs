//! Folder name recognition: version folders, hidden entries and signature folders.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix marking an entry as hidden. Hidden entries are never copied.
pub const HIDDEN_MARKER: char = '.';

/// Numeric groups joined by dots, at least two groups ("1.60", "1.60.1").
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)+$").expect("Invalid version regex"));

/// True when `name` is a version-like folder name such as `1.60` or `1.60.1`.
pub fn looks_like_version(name: &str) -> bool {
    VERSION_PATTERN.is_match(name)
}

/// Number of dot-separated groups in a version-like name, `None` otherwise.
///
/// Used to prefer three-part names over two-part ones when several candidates exist.
pub fn version_rank(name: &str) -> Option<usize> {
    looks_like_version(name).then(|| name.split('.').count())
}

/// Numeric groups of a version-like name, for ordering (`1.61.10` sorts after `1.61.2`).
///
/// Groups too large for `u64` saturate.
pub fn version_key(name: &str) -> Option<Vec<u64>> {
    looks_like_version(name).then(|| {
        name.split('.')
            .map(|group| group.parse().unwrap_or(u64::MAX))
            .collect()
    })
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// True when `name` is one of the signature folder names.
pub fn is_signature_folder(name: &str, signatures: &[&str]) -> bool {
    signatures.iter().any(|s| *s == name)
}

/// How many signature folders a directory must hold directly to count as a mod pack root.
///
/// Two for the standard table; smaller tables only need as many as they define.
pub fn required_signature_count(signatures: &[&str]) -> usize {
    signatures.len().min(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_version_names() {
        assert!(looks_like_version("1.60"));
        assert!(looks_like_version("1.60.1"));
        assert!(looks_like_version("10.2.33.4"));

        assert!(!looks_like_version("1"));
        assert!(!looks_like_version("1."));
        assert!(!looks_like_version(".1.60"));
        assert!(!looks_like_version("v1.60"));
        assert!(!looks_like_version("Resources"));
        assert!(!looks_like_version("1.60.1 (copy)"));
        assert!(!looks_like_version(".ModInstaller_Backup"));
    }

    #[test]
    fn test_version_key_compares_numerically() {
        assert_eq!(version_key("1.61.10"), Some(vec![1, 61, 10]));
        assert!(version_key("1.61.10") > version_key("1.61.2"));
        assert_eq!(version_key("Resources"), None);
    }

    #[test]
    fn test_version_rank_prefers_three_parts() {
        assert_eq!(version_rank("1.60"), Some(2));
        assert_eq!(version_rank("1.60.1"), Some(3));
        assert_eq!(version_rank("Resources"), None);
    }

    #[test]
    fn test_hidden() {
        assert!(is_hidden(".DS_Store"));
        assert!(is_hidden(".ModInstaller_Backup"));
        assert!(!is_hidden("assetbundle"));
    }

    #[test]
    fn test_signature_helpers() {
        let signatures = ["AssetRefs", "assetbundle", "Databin"];
        assert!(is_signature_folder("Databin", &signatures));
        assert!(!is_signature_folder("databin", &signatures));
        assert_eq!(required_signature_count(&signatures), 2);
        assert_eq!(required_signature_count(&["assetbundle"]), 1);
    }

    proptest! {
        #[test]
        fn prop_dotted_numbers_are_versions(parts in prop::collection::vec(0u32..10_000, 2..5)) {
            let name = parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
            prop_assert!(looks_like_version(&name));
            prop_assert_eq!(version_rank(&name), Some(parts.len()));
        }

        #[test]
        fn prop_names_with_letters_are_not_versions(prefix in "[A-Za-z_]{1,8}", n in 0u32..100) {
            let name = format!("{}{}.{}", prefix, n, n);
            prop_assert!(!looks_like_version(&name));
        }
    }
}
