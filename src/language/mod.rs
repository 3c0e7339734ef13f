//! Static language registry.
//!
//! Read-only catalog of every language the engine can be asked to recognize,
//! with per-backend support and a quality tier. The table is shared by all
//! engine instances; nothing here is mutable at runtime.

mod detect;
mod table;

pub use detect::LanguageDetector;

use crate::backend::BackendId;

/// Expected recognition quality for a language on its best backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

/// One registry entry. `native_backend` marks platform-native support; the
/// offline-neural backend serves every registered language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageDescriptor {
    pub code: &'static str,
    pub display_name: &'static str,
    pub native_name: &'static str,
    pub native_backend: bool,
    pub tier: QualityTier,
}

impl LanguageDescriptor {
    pub fn supports(&self, backend: BackendId) -> bool {
        match backend {
            BackendId::Native => self.native_backend,
            BackendId::Neural => true,
        }
    }
}

/// Every registered language, in registry order (detection tie-break order).
pub fn all() -> &'static [LanguageDescriptor] {
    table::LANGUAGES
}

/// Look up a language by exact code, case-insensitively.
pub fn find(code: &str) -> Option<&'static LanguageDescriptor> {
    table::LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
}

/// Case-insensitive substring search over code, display name, and native name.
pub fn search(query: &str) -> Vec<&'static LanguageDescriptor> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    table::LANGUAGES
        .iter()
        .filter(|lang| {
            lang.code.to_lowercase().contains(&needle)
                || lang.display_name.to_lowercase().contains(&needle)
                || lang.native_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Whether `backend` can serve `code`. Unknown codes are unsupported.
pub fn supports(backend: BackendId, code: &str) -> bool {
    find(code).map(|lang| lang.supports(backend)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_at_least_150_languages() {
        assert!(
            all().len() >= 150,
            "expected 150+ descriptors, got {}",
            all().len()
        );
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for lang in all() {
            assert!(
                seen.insert(lang.code.to_lowercase()),
                "duplicate code {}",
                lang.code
            );
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        assert!(find("en-US").is_some());
        assert!(find("EN-us").is_some());
        assert!(find("xx-XX").is_none());
    }

    #[test]
    fn neural_serves_everything_native_does_not() {
        for lang in all() {
            assert!(lang.supports(BackendId::Neural));
        }
        assert!(all().iter().any(|lang| !lang.supports(BackendId::Native)));
    }

    #[test]
    fn search_matches_native_names() {
        let hits = search("Deutsch");
        assert!(hits.iter().any(|lang| lang.code == "de-DE"));
        let hits = search("english");
        assert!(hits.len() >= 4, "all English variants should match");
        assert!(search("   ").is_empty());
    }

    #[test]
    fn supports_rejects_unknown_codes() {
        assert!(!supports(BackendId::Native, "zz"));
        assert!(!supports(BackendId::Neural, "zz"));
        assert!(supports(BackendId::Native, "ja-JP"));
    }
}
