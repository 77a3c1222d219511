//! GL-015: Maintenance candidate lists for curators.
//!
//! Every list here is read off `build_goal_nodes` output for one situation and
//! pair. Nothing re-walks the graph, so a gloss listed as missing parts is
//! exactly a gloss drawn with `[WARN-PARTS]` in the tree.

use crate::core::slug::reference_language;
use crate::core::store::GlossStore;
use crate::core::tree::{build_goal_nodes, TreeStats};
use crate::core::types::{Gloss, GoalEvaluation, GoalKind, GoalState, LanguagePair};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Glosses in the situation lacking parts.
pub fn missing_parts<S: GlossStore + ?Sized>(situation: &Gloss, store: &S, pair: &LanguagePair) -> BTreeSet<String> {
    build_goal_nodes(situation, store, pair).1.parts_missing()
}

/// Target-language glosses in the situation lacking usage examples.
pub fn missing_usage<S: GlossStore + ?Sized>(situation: &Gloss, store: &S, pair: &LanguagePair) -> BTreeSet<String> {
    build_goal_nodes(situation, store, pair).1.usage_missing()
}

// ============================================================================
// Missing translations
// ============================================================================

/// Glosses lacking a counterpart translation, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingTranslations {
    /// Target-language glosses with no native translation.
    pub native_missing: BTreeSet<String>,
    /// Native glosses (not paraphrases) with no target translation.
    pub target_missing: BTreeSet<String>,
    /// Native paraphrase glosses with no target translation.
    pub paraphrased_native_missing: BTreeSet<String>,
}

impl MissingTranslations {
    pub fn is_empty(&self) -> bool {
        self.native_missing.is_empty() && self.target_missing.is_empty() && self.paraphrased_native_missing.is_empty()
    }

    pub fn total(&self) -> usize {
        self.native_missing.len() + self.target_missing.len() + self.paraphrased_native_missing.len()
    }
}

pub fn missing_translations<S: GlossStore + ?Sized>(
    situation: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> MissingTranslations {
    let (_, stats) = build_goal_nodes(situation, store, pair);
    let mut out = MissingTranslations {
        native_missing: stats.native_missing(),
        ..MissingTranslations::default()
    };
    for reference in stats.target_missing() {
        let paraphrase = store
            .resolve_reference(&reference)
            .is_some_and(|g| g.is_paraphrase());
        if paraphrase {
            out.paraphrased_native_missing.insert(reference);
        } else {
            out.target_missing.insert(reference);
        }
    }
    out
}

// ============================================================================
// Translation siblings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingTranslation {
    pub reference: String,
    pub content: String,
    pub has_note: bool,
}

/// A native gloss whose several target translations are not yet told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingGroup {
    pub native: String,
    pub content: String,
    pub translations: Vec<SiblingTranslation>,
}

/// Native glosses in the situation with at least two target translations,
/// at least one of which carries no notes.
pub fn translation_siblings<S: GlossStore + ?Sized>(
    situation: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> Vec<SiblingGroup> {
    let (_, stats) = build_goal_nodes(situation, store, pair);
    let mut groups = Vec::new();

    for reference in &stats.situation_glosses {
        if reference_language(reference).as_deref() != Some(pair.native.as_str()) {
            continue;
        }
        let Some(gloss) = store.resolve_reference(reference) else {
            continue;
        };
        let translations: Vec<SiblingTranslation> = gloss
            .translations
            .iter()
            .filter(|r| reference_language(r).as_deref() == Some(pair.target.as_str()))
            .filter_map(|r| store.resolve_reference(r))
            .map(|t| SiblingTranslation {
                reference: t.reference(),
                content: t.content.clone(),
                has_note: !t.notes.is_empty(),
            })
            .collect();
        if translations.len() >= 2 && translations.iter().any(|t| !t.has_note) {
            groups.push(SiblingGroup {
                native: gloss.reference(),
                content: gloss.content,
                translations,
            });
        }
    }
    groups
}

// ============================================================================
// Situation assessment
// ============================================================================

/// Goal states and rationales for one situation.
#[derive(Debug, Clone, Default)]
pub struct SituationAssessment {
    pub situation: String,
    pub red: Vec<String>,
    pub yellow: Vec<String>,
    pub green: Vec<String>,
    pub procedural_count: usize,
    pub understanding_count: usize,
    /// Evaluation per goal, in situation order.
    pub logs: IndexMap<String, GoalEvaluation>,
    pub stats: TreeStats,
}

impl SituationAssessment {
    pub fn total_goals(&self) -> usize {
        self.red.len() + self.yellow.len() + self.green.len()
    }

    /// One line telling the curator where to look next.
    pub fn summary(&self) -> String {
        let total = self.total_goals();
        if total == 0 {
            "No goals found. Start by adding procedural and understanding goals.".to_string()
        } else if !self.red.is_empty() {
            format!(
                "{} red goals need attention. Focus on adding translations and parts.",
                self.red.len()
            )
        } else if !self.yellow.is_empty() {
            format!(
                "{} yellow goals can be improved. Add more translations and usage examples.",
                self.yellow.len()
            )
        } else {
            format!("All {} goals are green! Situation is well covered.", total)
        }
    }
}

pub fn assess_situation<S: GlossStore + ?Sized>(
    situation: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> SituationAssessment {
    let (nodes, stats) = build_goal_nodes(situation, store, pair);
    let mut out = SituationAssessment {
        situation: situation.reference(),
        ..SituationAssessment::default()
    };
    for root in nodes {
        let Some(goal) = root.goal else {
            continue;
        };
        match goal.kind {
            GoalKind::Procedural => out.procedural_count += 1,
            GoalKind::Understanding => out.understanding_count += 1,
        }
        let bucket = match goal.evaluation.state {
            GoalState::Red => &mut out.red,
            GoalState::Yellow => &mut out.yellow,
            GoalState::Green => &mut out.green,
        };
        bucket.push(root.reference.clone());
        out.logs.insert(root.reference, goal.evaluation);
    }
    out.stats = stats;
    out
}
