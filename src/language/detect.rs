//! Text-based language detection.
//!
//! Scores each candidate language by counting matches of patterns
//! characteristic of that language against the recognized text window. The
//! highest positive score wins; ties fall to registry order; an all-zero
//! window leaves the current language unchanged (the caller sees `None`).

use regex::Regex;
use std::sync::OnceLock;

/// Candidate patterns, in registry order. Script-based patterns for
/// languages with a distinctive script, stopword lists for Latin-script
/// languages.
const CANDIDATES: &[(&str, &str)] = &[
    (
        "en-US",
        r"(?i)\b(the|and|you|that|have|this|with|what|hello|world|test)\b",
    ),
    (
        "es-ES",
        r"(?i)[ñ¿¡]|\b(el|los|las|que|está|pero|cómo|gracias|hola|mundo)\b",
    ),
    (
        "fr-FR",
        r"(?i)\b(les|est|avec|vous|bonjour|merci|c'est|dans|pour|oui)\b",
    ),
    (
        "de-DE",
        r"(?i)[äöüß]|\b(der|die|das|und|ist|nicht|ich|sie|danke|hallo)\b",
    ),
    (
        "it-IT",
        r"(?i)\b(che|per|con|sono|ciao|grazie|questo|della|anche)\b",
    ),
    (
        "pt-PT",
        r"(?i)[ãõ]|\b(que|não|com|para|obrigado|você|isso|muito)\b",
    ),
    ("ru-RU", r"\p{Cyrillic}+"),
    ("zh-CN", r"\p{Han}+"),
    ("ja-JP", r"[\p{Hiragana}\p{Katakana}]+"),
    ("ko-KR", r"\p{Hangul}+"),
    ("ar-SA", r"\p{Arabic}+"),
    ("hi-IN", r"\p{Devanagari}+"),
    ("el-GR", r"\p{Greek}+"),
    ("he-IL", r"\p{Hebrew}+"),
    ("th-TH", r"\p{Thai}+"),
    (
        "nl-NL",
        r"(?i)\b(het|een|van|niet|ik|je|dat|voor|maar)\b",
    ),
];

fn compiled() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CANDIDATES
            .iter()
            .map(|(code, pattern)| {
                let re = Regex::new(pattern).expect("detector pattern should compile");
                (*code, re)
            })
            .collect()
    })
}

/// Stateless scorer over recognized text. Cheap to construct; the compiled
/// patterns are shared process-wide.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Best-scoring language for `text`, or `None` when nothing matches.
    pub fn detect(&self, text: &str) -> Option<&'static str> {
        if text.trim().is_empty() {
            return None;
        }
        let mut best: Option<(&'static str, usize)> = None;
        for (code, re) in compiled() {
            let score = re.find_iter(text).count();
            if score == 0 {
                continue;
            }
            // Strictly-greater keeps the first candidate on ties.
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((code, score)),
            }
        }
        best.map(|(code, _)| code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_major_scripts() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("Привет, как дела"), Some("ru-RU"));
        assert_eq!(detector.detect("こんにちは、元気ですか"), Some("ja-JP"));
        assert_eq!(detector.detect("안녕하세요 반갑습니다"), Some("ko-KR"));
        assert_eq!(detector.detect("مرحبا كيف حالك"), Some("ar-SA"));
        assert_eq!(detector.detect("नमस्ते आप कैसे हैं"), Some("hi-IN"));
    }

    #[test]
    fn detects_latin_languages_by_stopwords() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("hello world this is the test"), Some("en-US"));
        assert_eq!(detector.detect("hola cómo está el mundo gracias"), Some("es-ES"));
        assert_eq!(detector.detect("bonjour merci pour les fleurs"), Some("fr-FR"));
        assert_eq!(detector.detect("der Hund ist nicht müde"), Some("de-DE"));
    }

    #[test]
    fn empty_or_unmatched_text_yields_none() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect(""), None);
        assert_eq!(detector.detect("   "), None);
        assert_eq!(detector.detect("1234 5678 !!!"), None);
    }

    #[test]
    fn ties_resolve_to_registry_order() {
        let detector = LanguageDetector::new();
        // "que" scores once for Spanish and once for Portuguese; Spanish is
        // earlier in the registry.
        assert_eq!(detector.detect("que"), Some("es-ES"));
    }
}
