//! GL-005: Standard parts recursion, the one traversal behind both goal
//! evaluation and tree building.
//!
//! A `PartsWalk` expands a gloss into a `TreeNode`, checking parts,
//! counterpart translations, and usage examples at every first occurrence,
//! and records every failure in a `PartsReport`. The visited set spans one
//! whole goal: a gloss seen anywhere earlier in the goal is attached again as
//! a bare leaf, never re-expanded, never re-checked.

use super::classifier::learn_language;
use super::slug::{normalize_language_code, reference_language};
use super::store::GlossStore;
use super::types::{Gloss, GoalKind, LanguagePair, LogMarker, NodeRole, TreeNode};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Usage-example coverage of one part, for the Green rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCoverage {
    /// Resolved usage examples.
    pub examples: usize,
    /// Of those, how many have at least one resolved native translation.
    pub translated: usize,
}

impl UsageCoverage {
    /// At least `min` examples, every one of them translated.
    pub fn is_complete(&self, min: usize) -> bool {
        self.examples >= min && self.translated == self.examples
    }
}

/// Everything one walk learned about the glosses it visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartsReport {
    /// Target-language glosses without a native translation.
    pub native_missing: BTreeSet<String>,
    /// Native-language glosses without a target translation.
    pub target_missing: BTreeSet<String>,
    pub parts_missing: BTreeSet<String>,
    pub usage_missing: BTreeSet<String>,
    /// Every gloss attached to the tree, including leaves.
    pub touched: BTreeSet<String>,
    /// Glosses the learner memorizes.
    pub to_learn: BTreeSet<String>,
    /// Usage coverage of each part, in visit order.
    pub part_coverage: IndexMap<String, UsageCoverage>,
}

impl PartsReport {
    /// Number of distinct failed checks recorded so far.
    pub fn failures(&self) -> usize {
        self.native_missing.len()
            + self.target_missing.len()
            + self.parts_missing.len()
            + self.usage_missing.len()
    }

    pub fn is_satisfied(&self) -> bool {
        self.failures() == 0
    }
}

/// One walk over one goal (or any gloss subtree).
pub struct PartsWalk<'a, S: GlossStore + ?Sized> {
    store: &'a S,
    pair: &'a LanguagePair,
    learn_language: String,
    visited: FxHashSet<String>,
    report: PartsReport,
    /// Every failed check, counted per occurrence even when the gloss is
    /// already in a report set.
    failed_checks: usize,
}

impl<'a, S: GlossStore + ?Sized> PartsWalk<'a, S> {
    pub fn new(store: &'a S, pair: &'a LanguagePair, learn_language: &str) -> Self {
        Self {
            store,
            pair,
            learn_language: normalize_language_code(learn_language),
            visited: FxHashSet::default(),
            report: PartsReport::default(),
            failed_checks: 0,
        }
    }

    pub fn report(&self) -> &PartsReport {
        &self.report
    }

    pub fn into_report(self) -> PartsReport {
        self.report
    }

    /// Failed checks so far, repeats included.
    pub fn failed_checks(&self) -> usize {
        self.failed_checks
    }

    /// Target-language paraphrases are never attached to a tree.
    fn is_hidden(&self, gloss: &Gloss) -> bool {
        normalize_language_code(&gloss.language) == self.pair.target && gloss.is_paraphrase()
    }

    /// Resolved translations of `gloss` into `language`. Translations into the
    /// target language exclude paraphrases.
    pub fn translations_into(&self, gloss: &Gloss, language: &str) -> Vec<Gloss> {
        let exclude_paraphrase = language == self.pair.target;
        gloss
            .translations
            .iter()
            .filter(|r| reference_language(r).as_deref() == Some(language))
            .filter_map(|r| self.store.resolve_reference(r))
            .filter(|t| normalize_language_code(&t.language) == language)
            .filter(|t| !(exclude_paraphrase && t.is_paraphrase()))
            .collect()
    }

    fn leaf(&mut self, gloss: &Gloss, role: NodeRole) -> TreeNode {
        self.report.touched.insert(gloss.reference());
        TreeNode::new(gloss, role)
    }

    /// Mark a node as a to-learn member when it lies on the learn line.
    fn apply_learn(&mut self, node: &mut TreeNode, learn_line: bool) {
        if learn_line && normalize_language_code(&node.gloss.language) == self.learn_language {
            node.bold = true;
            self.report.to_learn.insert(node.reference.clone());
        }
    }

    /// Claim a gloss for expansion. A gloss already visited in this walk
    /// comes back as a repeated leaf.
    fn enter(&mut self, gloss: &Gloss, role: NodeRole, learn_line: bool) -> TreeNode {
        let mut node = self.leaf(gloss, role);
        self.apply_learn(&mut node, learn_line);
        if !self.visited.insert(node.reference.clone()) {
            node.repeated = true;
        }
        node
    }

    /// Record a missing counterpart translation on `node`.
    fn check_translation(&mut self, node: &mut TreeNode, found: usize) {
        let language = normalize_language_code(&node.gloss.language);
        let Some(counterpart) = self.pair.counterpart(&language).map(str::to_string) else {
            return;
        };
        if found > 0 || node.gloss.has_marker(&LogMarker::TranslationImpossible(counterpart)) {
            return;
        }
        self.failed_checks += 1;
        if language == self.pair.native {
            node.warnings.missing_target = true;
            self.report.target_missing.insert(node.reference.clone());
        } else {
            node.warnings.missing_native = true;
            self.report.native_missing.insert(node.reference.clone());
        }
    }

    fn check_parts(&mut self, node: &mut TreeNode) {
        if node.gloss.parts.is_empty() && !node.gloss.has_marker(&LogMarker::SplitUnnecessary) {
            node.warnings.missing_parts = true;
            self.failed_checks += 1;
            self.report.parts_missing.insert(node.reference.clone());
        }
    }

    /// Expand one gloss per the standard recursion.
    ///
    /// `skip_usage` suppresses the usage-example check at this gloss only.
    /// `learn_line` is true for the goal root and propagates through parts.
    pub fn walk(&mut self, gloss: &Gloss, role: NodeRole, skip_usage: bool, learn_line: bool) -> TreeNode {
        let mut node = self.enter(gloss, role, learn_line);
        if node.repeated {
            return node;
        }
        let store = self.store;
        let language = normalize_language_code(&gloss.language);

        self.check_parts(&mut node);

        let counterpart = self.pair.counterpart(&language).map(str::to_string);
        let translations = counterpart
            .as_deref()
            .map(|c| self.translations_into(gloss, c))
            .unwrap_or_default();
        self.check_translation(&mut node, translations.len());
        for translation in &translations {
            let leaf = self.leaf(translation, NodeRole::Translation);
            node.children.push(leaf);
        }

        if language == self.pair.target && !skip_usage {
            let target = self.pair.target.clone();
            if gloss.usage_examples.is_empty()
                && !gloss.has_marker(&LogMarker::UsageExampleImpossible(target))
            {
                node.warnings.missing_usage = true;
                self.failed_checks += 1;
                self.report.usage_missing.insert(node.reference.clone());
            }
            let mut coverage = UsageCoverage::default();
            for example in gloss.usage_examples.iter().filter_map(|r| store.resolve_reference(r)) {
                if self.is_hidden(&example) {
                    continue;
                }
                let (usage, translated) = self.usage_node(&example);
                coverage.examples += 1;
                if translated {
                    coverage.translated += 1;
                }
                node.children.push(usage);
            }
            if role == NodeRole::Part {
                self.report.part_coverage.insert(node.reference.clone(), coverage);
            }
        } else if role == NodeRole::Part {
            self.report
                .part_coverage
                .insert(node.reference.clone(), UsageCoverage::default());
        }

        for part in gloss.parts.iter().filter_map(|r| store.resolve_reference(r)) {
            if self.is_hidden(&part) {
                continue;
            }
            let child = self.walk(&part, NodeRole::Part, false, learn_line);
            node.children.push(child);
        }

        node
    }

    /// A usage example with its native translations as leaves. Its own parts
    /// are never checked or shown. Returns whether a native translation exists.
    fn usage_node(&mut self, example: &Gloss) -> (TreeNode, bool) {
        let native = self.pair.native.clone();
        let translations = self.translations_into(example, &native);
        let mut node = self.leaf(example, NodeRole::Usage);
        if self.visited.contains(&node.reference) {
            node.repeated = true;
            return (node, !translations.is_empty());
        }
        if translations.is_empty()
            && !example.has_marker(&LogMarker::TranslationImpossible(native))
        {
            node.warnings.missing_native = true;
            self.failed_checks += 1;
            self.report.native_missing.insert(node.reference.clone());
        }
        for translation in &translations {
            let leaf = self.leaf(translation, NodeRole::Translation);
            node.children.push(leaf);
        }
        (node, !translations.is_empty())
    }
}

// ============================================================================
// Goal walk
// ============================================================================

/// How one procedural target translation fared in its own recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub reference: String,
    /// Failed checks added by this translation's subtree.
    pub failures: usize,
}

/// The expanded goal plus what evaluation needs from the walk.
#[derive(Debug, Clone)]
pub struct GoalWalk {
    pub kind: GoalKind,
    pub root: TreeNode,
    pub report: PartsReport,
    /// Qualifying counterpart translations of the goal root.
    pub translations: Vec<TranslationOutcome>,
    /// Failed checks added by the root's own parts (procedural only).
    pub own_part_failures: usize,
}

/// Expand a goal root according to its kind.
pub fn walk_goal<S: GlossStore + ?Sized>(
    store: &S,
    pair: &LanguagePair,
    gloss: &Gloss,
    kind: GoalKind,
) -> GoalWalk {
    let mut walk = PartsWalk::new(store, pair, learn_language(kind, pair));
    match kind {
        GoalKind::Understanding => {
            let translations = walk
                .translations_into(gloss, &pair.native)
                .into_iter()
                .map(|t| TranslationOutcome {
                    reference: t.reference(),
                    failures: 0,
                })
                .collect();
            let root = walk.walk(gloss, NodeRole::Root, true, true);
            GoalWalk {
                kind,
                root,
                report: walk.into_report(),
                translations,
                own_part_failures: 0,
            }
        }
        GoalKind::Procedural => walk_procedural(walk, gloss),
    }
}

/// Procedural roots are never required to have parts; each target
/// translation is recursed as its own subtree.
fn walk_procedural<S: GlossStore + ?Sized>(mut walk: PartsWalk<'_, S>, gloss: &Gloss) -> GoalWalk {
    let store = walk.store;
    let mut root = walk.enter(gloss, NodeRole::Root, true);
    let target = walk.pair.target.clone();
    let translations = walk.translations_into(gloss, &target);
    walk.check_translation(&mut root, translations.len());

    let mut outcomes = Vec::with_capacity(translations.len());
    for translation in &translations {
        let before = walk.failed_checks();
        let child = walk.walk(translation, NodeRole::Translation, false, false);
        outcomes.push(TranslationOutcome {
            reference: child.reference.clone(),
            failures: walk.failed_checks() - before,
        });
        root.children.push(child);
    }

    let before = walk.failed_checks();
    for part in gloss.parts.iter().filter_map(|r| store.resolve_reference(r)) {
        if walk.is_hidden(&part) {
            continue;
        }
        let child = walk.walk(&part, NodeRole::Part, false, true);
        root.children.push(child);
    }
    let own_part_failures = walk.failed_checks() - before;

    GoalWalk {
        kind: GoalKind::Procedural,
        root,
        report: walk.into_report(),
        translations: outcomes,
        own_part_failures,
    }
}
