//! GL-006: Goal state evaluation.
//!
//! Readiness is always derived from a `GoalWalk`, the same walk the tree
//! builder renders, so the state shown next to a tree can never disagree with
//! the tree itself. Evaluation is total: anything that is not a goal for the
//! pair is red with a log saying why.

use super::classifier::detect_goal_type;
use super::recursion::{walk_goal, GoalWalk, PartsReport};
use super::slug::normalize_language_code;
use super::store::GlossStore;
use super::types::{Gloss, GoalEvaluation, GoalKind, GoalState, LanguagePair};
use std::collections::BTreeSet;

/// Minimum counterpart translations (and usage examples per part) for green.
const GREEN_MIN: usize = 2;

/// Evaluate one gloss as a goal for the given language pair.
pub fn evaluate_goal_state<S: GlossStore + ?Sized>(
    gloss: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> GoalEvaluation {
    match detect_goal_type(gloss, pair) {
        Some(kind) => assess(gloss, pair, &walk_goal(store, pair, gloss, kind)),
        None => GoalEvaluation {
            state: GoalState::Red,
            log: vec![
                "kind=unknown".to_string(),
                format!(
                    "[FAIL] {} is not a goal for {} (language={}, needs {} procedural or {} understanding tag)",
                    gloss.reference(),
                    pair,
                    gloss.language,
                    pair.native,
                    pair.target
                ),
                format!("state={}", GoalState::Red),
            ],
        },
    }
}

/// Turn a finished goal walk into a state and rationale.
pub fn assess(gloss: &Gloss, pair: &LanguagePair, walk: &GoalWalk) -> GoalEvaluation {
    let mut log = RationaleLog::default();
    log.line(format!("kind={}", walk.kind));
    let state = match walk.kind {
        GoalKind::Understanding => assess_understanding(gloss, pair, walk, &mut log),
        GoalKind::Procedural => assess_procedural(gloss, pair, walk, &mut log),
    };
    log.line(format!("state={}", state));
    GoalEvaluation {
        state,
        log: log.lines,
    }
}

#[derive(Default)]
struct RationaleLog {
    lines: Vec<String>,
}

impl RationaleLog {
    fn line(&mut self, text: String) {
        self.lines.push(text);
    }

    /// Record a checked condition and return whether it passed.
    fn check(&mut self, passed: bool, text: String) -> bool {
        let status = if passed { "PASS" } else { "FAIL" };
        self.lines.push(format!("[{}] {}", status, text));
        passed
    }
}

fn join(refs: &BTreeSet<String>) -> String {
    refs.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// One line per failure category that has entries.
fn describe_failures(report: &PartsReport) -> String {
    let mut parts = Vec::new();
    for (label, set) in [
        ("missing parts", &report.parts_missing),
        ("missing native translation", &report.native_missing),
        ("missing target translation", &report.target_missing),
        ("missing usage examples", &report.usage_missing),
    ] {
        if !set.is_empty() {
            parts.push(format!("{}: {}", label, join(set)));
        }
    }
    parts.join("; ")
}

fn recursion_line(report: &PartsReport) -> String {
    if report.is_satisfied() {
        "parts recursion satisfied".to_string()
    } else {
        format!("parts recursion: {}", describe_failures(report))
    }
}

fn assess_understanding(
    gloss: &Gloss,
    pair: &LanguagePair,
    walk: &GoalWalk,
    log: &mut RationaleLog,
) -> GoalState {
    let translations = walk.translations.len();
    let mut yellow = log.check(
        normalize_language_code(&gloss.language) == pair.target,
        format!("language={} (target {})", gloss.language, pair.target),
    );
    yellow &= log.check(
        translations >= 1,
        format!("{} translation(s) into {} (need 1)", translations, pair.native),
    );
    yellow &= log.check(walk.report.is_satisfied(), recursion_line(&walk.report));
    if !yellow {
        return GoalState::Red;
    }

    let mut green = log.check(
        translations >= GREEN_MIN,
        format!(
            "green: {} translation(s) into {} (need {})",
            translations, pair.native, GREEN_MIN
        ),
    );
    let short: Vec<String> = walk
        .report
        .part_coverage
        .iter()
        .filter(|(_, coverage)| !coverage.is_complete(GREEN_MIN))
        .map(|(reference, coverage)| {
            format!(
                "{} ({} example(s), {} translated)",
                reference, coverage.examples, coverage.translated
            )
        })
        .collect();
    green &= log.check(
        short.is_empty(),
        if short.is_empty() {
            format!(
                "green: every part has {} usage examples translated into {}",
                GREEN_MIN, pair.native
            )
        } else {
            format!(
                "green: parts lacking {} translated usage examples: {}",
                GREEN_MIN,
                short.join(", ")
            )
        },
    );
    if green {
        GoalState::Green
    } else {
        GoalState::Yellow
    }
}

fn assess_procedural(
    gloss: &Gloss,
    pair: &LanguagePair,
    walk: &GoalWalk,
    log: &mut RationaleLog,
) -> GoalState {
    let translations = walk.translations.len();
    let mut yellow = log.check(
        normalize_language_code(&gloss.language) == pair.native,
        format!("language={} (native {})", gloss.language, pair.native),
    );
    yellow &= log.check(gloss.is_paraphrase(), "tagged eng:paraphrase".to_string());
    yellow &= log.check(
        translations >= 1,
        format!(
            "{} non-paraphrase translation(s) into {} (need 1)",
            translations, pair.target
        ),
    );
    for outcome in &walk.translations {
        yellow &= log.check(
            outcome.failures == 0,
            if outcome.failures == 0 {
                format!("translation {} satisfies parts recursion", outcome.reference)
            } else {
                format!(
                    "translation {} has {} failed check(s)",
                    outcome.reference, outcome.failures
                )
            },
        );
    }
    if !gloss.parts.is_empty() {
        yellow &= log.check(
            walk.own_part_failures == 0,
            if walk.own_part_failures == 0 {
                "own parts satisfy parts recursion".to_string()
            } else {
                format!("own parts have {} failed check(s)", walk.own_part_failures)
            },
        );
    }
    if !yellow {
        if !walk.report.is_satisfied() {
            log.line(format!("details: {}", describe_failures(&walk.report)));
        }
        return GoalState::Red;
    }

    let green = log.check(
        translations >= GREEN_MIN,
        format!(
            "green: {} non-paraphrase translation(s) into {} (need {})",
            translations, pair.target, GREEN_MIN
        ),
    );
    if green {
        GoalState::Green
    } else {
        GoalState::Yellow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::core::types::{
        LogMarker, PARAPHRASE_TAG, PROCEDURAL_GOAL_TAG, UNDERSTANDING_GOAL_TAG,
    };

    fn pair() -> LanguagePair {
        LanguagePair::new("eng", "deu")
    }

    fn put(store: &mut MemoryStore, lang: &str, content: &str, f: impl FnOnce(&mut Gloss)) -> Gloss {
        let mut g = Gloss::new(lang, content);
        g.slug = content.to_string();
        f(&mut g);
        store.save_gloss(&g).unwrap();
        g
    }

    fn split(g: &mut Gloss) {
        g.logs.insert("t-split".into(), LogMarker::SplitUnnecessary.into());
    }

    fn no_usage(g: &mut Gloss) {
        g.logs
            .insert("t-usage".into(), LogMarker::UsageExampleImpossible("deu".into()).into());
    }

    /// Understanding goal "Guten Tag" with one English translation and no parts.
    fn scenario_one(store: &mut MemoryStore) -> Gloss {
        put(store, "eng", "good day", |g| g.translations.push("deu:Guten Tag".into()));
        put(store, "deu", "Guten Tag", |g| {
            g.tags.push(UNDERSTANDING_GOAL_TAG.into());
            g.translations.push("eng:good day".into());
        })
    }

    #[test]
    fn test_gl006_scenario_understanding_without_parts_is_red() {
        let mut store = MemoryStore::new();
        let goal = scenario_one(&mut store);
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert!(eval.log_text().contains("missing parts: deu:Guten Tag"));
        assert_eq!(eval.log.last().map(String::as_str), Some("state=red"));
    }

    #[test]
    fn test_gl006_scenario_understanding_with_translated_part_is_yellow() {
        let mut store = MemoryStore::new();
        scenario_one(&mut store);
        put(&mut store, "eng", "day", |g| g.translations.push("deu:Tag".into()));
        put(&mut store, "deu", "Tag", |g| {
            split(g);
            no_usage(g);
            g.translations.push("eng:day".into());
        });
        let goal = put(&mut store, "deu", "Guten Tag", |g| {
            g.tags.push(UNDERSTANDING_GOAL_TAG.into());
            g.translations.push("eng:good day".into());
            g.parts.push("deu:Tag".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Yellow, "{}", eval.log_text());
        assert!(eval.log_text().contains("[PASS] parts recursion satisfied"));
        assert!(eval.log_text().contains("[FAIL] green: 1 translation(s)"));
    }

    #[test]
    fn test_gl006_scenario_understanding_green() {
        let mut store = MemoryStore::new();
        put(&mut store, "eng", "good day", |_| {});
        put(&mut store, "eng", "hello", |_| {});
        put(&mut store, "eng", "day", |_| {});
        put(&mut store, "eng", "The day is long", |_| {});
        put(&mut store, "eng", "Day and night", |_| {});
        put(&mut store, "deu", "Der Tag ist lang", |g| g.translations.push("eng:The day is long".into()));
        put(&mut store, "deu", "Tag und Nacht", |g| g.translations.push("eng:Day and night".into()));
        put(&mut store, "deu", "Tag", |g| {
            split(g);
            g.translations.push("eng:day".into());
            g.usage_examples.push("deu:Der Tag ist lang".into());
            g.usage_examples.push("deu:Tag und Nacht".into());
        });
        let goal = put(&mut store, "deu", "Guten Tag", |g| {
            g.tags.push(UNDERSTANDING_GOAL_TAG.into());
            g.translations.push("eng:good day".into());
            g.translations.push("eng:hello".into());
            g.parts.push("deu:Tag".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Green, "{}", eval.log_text());
    }

    #[test]
    fn test_gl006_green_needs_every_usage_translated() {
        let mut store = MemoryStore::new();
        put(&mut store, "eng", "good day", |_| {});
        put(&mut store, "eng", "hello", |_| {});
        put(&mut store, "eng", "day", |_| {});
        put(&mut store, "eng", "The day is long", |_| {});
        put(&mut store, "deu", "Der Tag ist lang", |g| g.translations.push("eng:The day is long".into()));
        put(&mut store, "deu", "Tag und Nacht", |g| {
            g.logs.insert("t".into(), LogMarker::TranslationImpossible("eng".into()).into());
        });
        put(&mut store, "deu", "Tag", |g| {
            split(g);
            g.translations.push("eng:day".into());
            g.usage_examples.push("deu:Der Tag ist lang".into());
            g.usage_examples.push("deu:Tag und Nacht".into());
        });
        let goal = put(&mut store, "deu", "Guten Tag", |g| {
            g.tags.push(UNDERSTANDING_GOAL_TAG.into());
            g.translations.push("eng:good day".into());
            g.translations.push("eng:hello".into());
            g.parts.push("deu:Tag".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Yellow, "{}", eval.log_text());
        assert!(eval.log_text().contains("deu:Tag (2 example(s), 1 translated)"));
    }

    #[test]
    fn test_gl006_scenario_procedural_bare_translation_is_red() {
        let mut store = MemoryStore::new();
        put(&mut store, "deu", "Die Rechnung, bitte", |_| {});
        let goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.tags.push(PARAPHRASE_TAG.into());
            g.translations.push("deu:Die Rechnung, bitte".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        let text = eval.log_text();
        assert!(text.contains("[FAIL] translation deu:Die Rechnung, bitte has 3 failed check(s)"));
        assert!(text.contains("missing parts: deu:Die Rechnung, bitte"));
    }

    fn complete_target(store: &mut MemoryStore, content: &str) {
        put(store, "deu", content, |g| {
            split(g);
            no_usage(g);
            g.translations.push("eng:ask for the bill".into());
        });
    }

    #[test]
    fn test_gl006_procedural_yellow_and_green() {
        let mut store = MemoryStore::new();
        complete_target(&mut store, "Die Rechnung, bitte");
        complete_target(&mut store, "Zahlen, bitte");
        let mut goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.tags.push(PARAPHRASE_TAG.into());
            g.translations.push("deu:Die Rechnung, bitte".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Yellow, "{}", eval.log_text());

        goal.translations.push("deu:Zahlen, bitte".into());
        store.save_gloss(&goal).unwrap();
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Green, "{}", eval.log_text());
    }

    #[test]
    fn test_gl006_procedural_shared_usage_gap_fails_both_translations() {
        let mut store = MemoryStore::new();
        put(&mut store, "deu", "Die Rechnung kommt", |_| {});
        for content in ["Die Rechnung, bitte", "Zahlen, bitte"] {
            put(&mut store, "deu", content, |g| {
                split(g);
                g.translations.push("eng:ask for the bill".into());
                g.usage_examples.push("deu:Die Rechnung kommt".into());
            });
        }
        let goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.tags.push(PARAPHRASE_TAG.into());
            g.translations.push("deu:Die Rechnung, bitte".into());
            g.translations.push("deu:Zahlen, bitte".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        let text = eval.log_text();
        assert!(text.contains("[FAIL] translation deu:Die Rechnung, bitte has 1 failed check(s)"));
        assert!(text.contains("[FAIL] translation deu:Zahlen, bitte has 1 failed check(s)"), "{}", text);
        assert!(!text.contains("satisfies parts recursion"));
    }

    #[test]
    fn test_gl006_procedural_requires_paraphrase_tag() {
        let mut store = MemoryStore::new();
        complete_target(&mut store, "Die Rechnung, bitte");
        let goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.translations.push("deu:Die Rechnung, bitte".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert!(eval.log_text().contains("[FAIL] tagged eng:paraphrase"));
    }

    #[test]
    fn test_gl006_procedural_paraphrase_translations_do_not_qualify() {
        let mut store = MemoryStore::new();
        put(&mut store, "deu", "um die Rechnung bitten", |g| g.tags.push(PARAPHRASE_TAG.into()));
        let goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.tags.push(PARAPHRASE_TAG.into());
            g.translations.push("deu:um die Rechnung bitten".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert!(eval.log_text().contains("[FAIL] 0 non-paraphrase translation(s)"));
    }

    #[test]
    fn test_gl006_procedural_own_parts_checked_when_present() {
        let mut store = MemoryStore::new();
        complete_target(&mut store, "Die Rechnung, bitte");
        put(&mut store, "eng", "bill", |_| {});
        let goal = put(&mut store, "eng", "ask for the bill", |g| {
            g.tags.push(PROCEDURAL_GOAL_TAG.into());
            g.tags.push(PARAPHRASE_TAG.into());
            g.translations.push("deu:Die Rechnung, bitte".into());
            g.parts.push("eng:bill".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert!(eval.log_text().contains("[FAIL] own parts have 2 failed check(s)"));
    }

    #[test]
    fn test_gl006_unknown_kind_is_red() {
        let store = MemoryStore::new();
        let mut g = Gloss::new("spa", "hola");
        g.slug = "hola".into();
        g.tags.push(UNDERSTANDING_GOAL_TAG.into());
        let eval = evaluate_goal_state(&g, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert_eq!(eval.log[0], "kind=unknown");
    }

    #[test]
    fn test_gl006_dangling_translation_is_not_counted() {
        let mut store = MemoryStore::new();
        let goal = put(&mut store, "deu", "Guten Tag", |g| {
            split(g);
            g.tags.push(UNDERSTANDING_GOAL_TAG.into());
            g.translations.push("eng:deleted".into());
        });
        let eval = evaluate_goal_state(&goal, &store, &pair());
        assert_eq!(eval.state, GoalState::Red);
        assert!(eval.log_text().contains("[FAIL] 0 translation(s) into eng"));
    }
}
