//! GL-002: Slug derivation and reference parsing.
//!
//! This is the only place slugs and references are built. Reference equality
//! across the whole store depends on every caller going through here.

const MAX_SLUG_CHARS: usize = 120;
const ILLEGAL: &[char] = &['/', '\\', '?', '*', ':', '|', '"', '<', '>'];

/// Build a filesystem-safe slug from content, preserving Unicode.
///
/// Removes characters illegal on common filesystems and ASCII control
/// characters, trims trailing spaces and dots, truncates to 120 characters,
/// then trims again. Returns `None` when nothing is left.
pub fn derive_slug(content: &str) -> Option<String> {
    let cleaned: String = content
        .chars()
        .filter(|c| !ILLEGAL.contains(c) && !c.is_ascii_control())
        .collect();
    let trimmed = trim_trailing(&cleaned);
    let slug = if trimmed.chars().count() > MAX_SLUG_CHARS {
        let truncated: String = trimmed.chars().take(MAX_SLUG_CHARS).collect();
        trim_trailing(&truncated).to_string()
    } else {
        trimmed.to_string()
    };
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

fn trim_trailing(s: &str) -> &str {
    s.trim_end_matches([' ', '.'])
}

/// Normalize a language code for comparison: trimmed, lowercase.
pub fn normalize_language_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// A valid code is exactly three lowercase ASCII letters.
pub fn is_valid_language_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Build a `lang:slug` reference.
pub fn make_reference(language: &str, slug: &str) -> String {
    format!("{}:{}", normalize_language_code(language), slug)
}

/// Split a `lang:slug` reference. Returns `None` for malformed input.
pub fn parse_reference(reference: &str) -> Option<(String, String)> {
    let (lang, slug) = reference.split_once(':')?;
    let lang = normalize_language_code(lang);
    let slug = slug.trim();
    if lang.is_empty() || slug.is_empty() {
        return None;
    }
    Some((lang, slug.to_string()))
}

/// Language part of a reference, without resolving it.
pub fn reference_language(reference: &str) -> Option<String> {
    parse_reference(reference).map(|(lang, _)| lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gl002_slug_plain() {
        assert_eq!(derive_slug("Guten Tag").as_deref(), Some("Guten Tag"));
    }

    #[test]
    fn test_gl002_slug_removes_illegal() {
        assert_eq!(
            derive_slug(r#"a/b\c?d*e:f|g"h<i>j"#).as_deref(),
            Some("abcdefghij")
        );
        assert_eq!(derive_slug("tab\there\n").as_deref(), Some("tabhere"));
    }

    #[test]
    fn test_gl002_slug_trims_trailing() {
        assert_eq!(derive_slug("Really?. . ").as_deref(), Some("Really"));
        assert_eq!(derive_slug("  leading kept").as_deref(), Some("  leading kept"));
    }

    #[test]
    fn test_gl002_slug_preserves_unicode() {
        assert_eq!(derive_slug("مرحبا").as_deref(), Some("مرحبا"));
        assert_eq!(derive_slug("¿Dónde está?").as_deref(), Some("¿Dónde está"));
    }

    #[test]
    fn test_gl002_slug_truncates_and_retrims() {
        let mut content = "x".repeat(119);
        content.push_str(" tail");
        let slug = derive_slug(&content).unwrap();
        assert_eq!(slug, "x".repeat(119));
    }

    #[test]
    fn test_gl002_slug_empty() {
        assert_eq!(derive_slug(""), None);
        assert_eq!(derive_slug("???"), None);
        assert_eq!(derive_slug(" . ."), None);
    }

    #[test]
    fn test_gl002_parse_reference() {
        assert_eq!(
            parse_reference("DEU:Guten Tag"),
            Some(("deu".to_string(), "Guten Tag".to_string()))
        );
        assert_eq!(
            parse_reference("eng:time: 10:00"),
            Some(("eng".to_string(), "time: 10:00".to_string()))
        );
        assert_eq!(parse_reference("no-colon"), None);
        assert_eq!(parse_reference("eng:"), None);
        assert_eq!(parse_reference(":slug"), None);
    }

    #[test]
    fn test_gl002_language_codes() {
        assert_eq!(normalize_language_code(" DeU "), "deu");
        assert!(is_valid_language_code("arb"));
        assert!(!is_valid_language_code("en"));
        assert!(!is_valid_language_code("ENG"));
        assert!(!is_valid_language_code("e1g"));
    }

    #[test]
    fn test_gl002_make_reference() {
        assert_eq!(make_reference("ENG", "hello"), "eng:hello");
        assert_eq!(reference_language("spa:hola").as_deref(), Some("spa"));
    }

    proptest! {
        #[test]
        fn prop_gl002_slug_is_filesystem_safe(content in "\\PC{0,200}") {
            if let Some(slug) = derive_slug(&content) {
                prop_assert!(!slug.is_empty());
                prop_assert!(slug.chars().count() <= MAX_SLUG_CHARS);
                prop_assert!(!slug.chars().any(|c| ILLEGAL.contains(&c) || c.is_ascii_control()));
                prop_assert!(!slug.ends_with(' ') && !slug.ends_with('.'));
            }
        }

        #[test]
        fn prop_gl002_slug_is_idempotent(content in "\\PC{0,200}") {
            if let Some(slug) = derive_slug(&content) {
                prop_assert_eq!(derive_slug(&slug), Some(slug.clone()));
            }
        }
    }
}
