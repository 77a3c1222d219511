//! GL-004: Goal classification relative to a language pair.

use super::slug::normalize_language_code;
use super::types::{Gloss, GoalKind, LanguagePair, PROCEDURAL_GOAL_TAG, UNDERSTANDING_GOAL_TAG};

/// Decide whether a gloss is a goal for this pair, and of which kind.
///
/// A gloss tagged for both kinds is still classified by its language, so at
/// most one kind can apply. A gloss whose language matches neither side of
/// the pair is never a goal.
pub fn detect_goal_type(gloss: &Gloss, pair: &LanguagePair) -> Option<GoalKind> {
    let language = normalize_language_code(&gloss.language);
    if language == normalize_language_code(&pair.native) && gloss.has_tag(PROCEDURAL_GOAL_TAG) {
        return Some(GoalKind::Procedural);
    }
    if language == normalize_language_code(&pair.target) && gloss.has_tag(UNDERSTANDING_GOAL_TAG) {
        return Some(GoalKind::Understanding);
    }
    None
}

/// Primary learn-language for a goal kind: the language whose glosses the
/// learner memorizes.
pub fn learn_language(kind: GoalKind, pair: &LanguagePair) -> &str {
    match kind {
        GoalKind::Procedural => &pair.native,
        GoalKind::Understanding => &pair.target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tagged(lang: &str, tags: &[&str]) -> Gloss {
        let mut g = Gloss::new(lang, "x");
        g.tags = tags.iter().map(|t| t.to_string()).collect();
        g
    }

    #[test]
    fn test_gl004_procedural() {
        let pair = LanguagePair::new("eng", "deu");
        let g = tagged("eng", &[PROCEDURAL_GOAL_TAG]);
        assert_eq!(detect_goal_type(&g, &pair), Some(GoalKind::Procedural));
    }

    #[test]
    fn test_gl004_understanding() {
        let pair = LanguagePair::new("eng", "deu");
        let g = tagged("deu", &[UNDERSTANDING_GOAL_TAG]);
        assert_eq!(detect_goal_type(&g, &pair), Some(GoalKind::Understanding));
    }

    #[test]
    fn test_gl004_wrong_language_for_tag() {
        let pair = LanguagePair::new("eng", "deu");
        assert_eq!(detect_goal_type(&tagged("deu", &[PROCEDURAL_GOAL_TAG]), &pair), None);
        assert_eq!(detect_goal_type(&tagged("eng", &[UNDERSTANDING_GOAL_TAG]), &pair), None);
    }

    #[test]
    fn test_gl004_goal_for_other_pair_only() {
        let g = tagged("spa", &[UNDERSTANDING_GOAL_TAG]);
        assert_eq!(detect_goal_type(&g, &LanguagePair::new("eng", "deu")), None);
        assert_eq!(
            detect_goal_type(&g, &LanguagePair::new("eng", "spa")),
            Some(GoalKind::Understanding)
        );
    }

    #[test]
    fn test_gl004_case_insensitive_codes() {
        let pair = LanguagePair {
            native: " ENG".into(),
            target: "Deu ".into(),
        };
        let mut g = tagged("deu", &[UNDERSTANDING_GOAL_TAG]);
        g.language = "DEU".into();
        assert_eq!(detect_goal_type(&g, &pair), Some(GoalKind::Understanding));
    }

    #[test]
    fn test_gl004_untagged_is_not_goal() {
        let pair = LanguagePair::new("eng", "deu");
        assert_eq!(detect_goal_type(&tagged("eng", &[]), &pair), None);
    }

    #[test]
    fn test_gl004_learn_language() {
        let pair = LanguagePair::new("eng", "deu");
        assert_eq!(learn_language(GoalKind::Procedural, &pair), "eng");
        assert_eq!(learn_language(GoalKind::Understanding, &pair), "deu");
    }

    proptest! {
        #[test]
        fn prop_gl004_exclusive_and_language_bound(
            lang in "[a-c]{3}",
            native in "[a-c]{3}",
            target in "[a-c]{3}",
            proc_tag in any::<bool>(),
            undr_tag in any::<bool>(),
        ) {
            let mut tags = Vec::new();
            if proc_tag { tags.push(PROCEDURAL_GOAL_TAG); }
            if undr_tag { tags.push(UNDERSTANDING_GOAL_TAG); }
            let g = tagged(&lang, &tags);
            let pair = LanguagePair::new(&native, &target);
            let kind = detect_goal_type(&g, &pair);
            match kind {
                Some(GoalKind::Procedural) => prop_assert!(lang == native && proc_tag),
                Some(GoalKind::Understanding) => prop_assert!(lang == target && undr_tag),
                None => {}
            }
            if lang != native && lang != target {
                prop_assert_eq!(kind, None);
            }
        }
    }
}
