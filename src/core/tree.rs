//! GL-007: Tree builder, the sanctioned entry point for goal tree shape.
//!
//! Every consumer (rendering, maintenance lists, export) goes through
//! `build_goal_nodes`. Each goal is walked once; its state comes from the same
//! walk via `evaluator::assess`.

use super::classifier::detect_goal_type;
use super::evaluator::assess;
use super::recursion::{walk_goal, PartsReport};
use super::store::GlossStore;
use super::types::{Gloss, GoalInfo, GoalKind, GoalState, LanguagePair, NodeRole, TreeNode};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Missing-data diagnostics for one goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalDiagnostics {
    pub native_missing: BTreeSet<String>,
    pub target_missing: BTreeSet<String>,
    pub parts_missing: BTreeSet<String>,
    pub usage_missing: BTreeSet<String>,
}

impl From<&PartsReport> for GoalDiagnostics {
    fn from(report: &PartsReport) -> Self {
        Self {
            native_missing: report.native_missing.clone(),
            target_missing: report.target_missing.clone(),
            parts_missing: report.parts_missing.clone(),
            usage_missing: report.usage_missing.clone(),
        }
    }
}

/// Stats gathered while building a situation's goal trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Every gloss attached to any goal tree.
    pub situation_glosses: BTreeSet<String>,
    /// Glosses the learner must memorize, across all goals.
    pub glosses_to_learn: BTreeSet<String>,
    /// Per-goal diagnostics keyed by goal reference, in situation order.
    pub goals: IndexMap<String, GoalDiagnostics>,
}

impl TreeStats {
    fn union(&self, pick: impl Fn(&GoalDiagnostics) -> &BTreeSet<String>) -> BTreeSet<String> {
        self.goals.values().flat_map(|d| pick(d).iter().cloned()).collect()
    }

    pub fn native_missing(&self) -> BTreeSet<String> {
        self.union(|d| &d.native_missing)
    }

    pub fn target_missing(&self) -> BTreeSet<String> {
        self.union(|d| &d.target_missing)
    }

    pub fn parts_missing(&self) -> BTreeSet<String> {
        self.union(|d| &d.parts_missing)
    }

    pub fn usage_missing(&self) -> BTreeSet<String> {
        self.union(|d| &d.usage_missing)
    }
}

/// Build one tree per goal among the situation's children.
///
/// Children that do not resolve, or are not goals for this pair, are skipped
/// silently. Each goal gets its own visited set and its own diagnostics.
pub fn build_goal_nodes<S: GlossStore + ?Sized>(
    situation: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> (Vec<TreeNode>, TreeStats) {
    let mut nodes = Vec::new();
    let mut stats = TreeStats::default();

    for reference in &situation.children {
        let Some(gloss) = store.resolve_reference(reference) else {
            continue;
        };
        let Some(kind) = detect_goal_type(&gloss, pair) else {
            continue;
        };
        let walk = walk_goal(store, pair, &gloss, kind);
        let evaluation = assess(&gloss, pair, &walk);
        debug!(
            goal = %walk.root.reference,
            %kind,
            state = %evaluation.state,
            nodes = walk.root.count(),
            "built goal tree"
        );

        stats.situation_glosses.extend(walk.report.touched.iter().cloned());
        stats.glosses_to_learn.extend(walk.report.to_learn.iter().cloned());
        stats
            .goals
            .insert(walk.root.reference.clone(), GoalDiagnostics::from(&walk.report));

        let mut root = walk.root;
        root.goal = Some(GoalInfo { kind, evaluation });
        nodes.push(root);
    }

    (nodes, stats)
}

// ============================================================================
// Text rendering
// ============================================================================

fn kind_marker(kind: GoalKind) -> &'static str {
    match kind {
        GoalKind::Procedural => "PROC",
        GoalKind::Understanding => "UNDR",
    }
}

fn state_marker(state: GoalState) -> &'static str {
    match state {
        GoalState::Red => "[RED]",
        GoalState::Yellow => "[YELLOW]",
        GoalState::Green => "[GREEN]",
    }
}

fn label_for(node: &TreeNode) -> String {
    let mut text = node.gloss.display_text();
    if node.struck() {
        text = format!("~~{}~~", text);
    }
    if node.warnings.missing_native || node.warnings.missing_target {
        text.push_str(" [WARN-TRANSLATION]");
    }
    if node.warnings.missing_usage {
        text.push_str(" [WARN-USAGE]");
    }
    if node.warnings.missing_parts {
        text.push_str(" [WARN-PARTS]");
    }
    if node.bold {
        text = format!("*{}*", text);
    }
    if node.repeated {
        text.push_str(" (seen)");
    }

    let prefix = match (&node.goal, node.role) {
        (Some(goal), _) => format!(
            "{} {} ",
            kind_marker(goal.kind),
            state_marker(goal.evaluation.state)
        ),
        (None, NodeRole::Usage) => "USG ".to_string(),
        _ => String::new(),
    };
    format!("{}{}", prefix, text)
}

fn render_level(nodes: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    for (idx, node) in nodes.iter().enumerate() {
        let is_last = idx + 1 == nodes.len();
        let connector = if is_last { "`-- " } else { "|-- " };
        lines.push(format!("{}{}{}", prefix, connector, label_for(node)));
        if !node.children.is_empty() {
            let next = format!("{}{}", prefix, if is_last { "    " } else { "|   " });
            render_level(&node.children, &next, lines);
        }
    }
}

/// Draw goal trees as indented ASCII.
pub fn render_tree_text(nodes: &[TreeNode]) -> String {
    let mut lines = Vec::new();
    render_level(nodes, "", &mut lines);
    lines.join("\n")
}
