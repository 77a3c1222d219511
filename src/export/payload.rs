//! GL-012: Situation payloads.
//!
//! A payload is a filter over `build_goal_nodes` output: goals below yellow
//! are dropped, flagged glosses are left out, nothing is re-traversed.

use crate::core::slug::reference_language;
use crate::core::store::GlossStore;
use crate::core::tree::build_goal_nodes;
use crate::core::types::{Gloss, GoalKind, GoalState, LanguagePair, TreeNode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One exported goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalPayload {
    #[serde(rename = "finalChallenge")]
    pub final_challenge: String,
    #[serde(rename = "needToBeLearned")]
    pub need_to_be_learned: Vec<String>,
    pub references: Vec<String>,
}

/// Contents of `situation.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SituationPayload {
    #[serde(rename = "procedural-paraphrase-expression-goals")]
    pub procedural: Vec<GoalPayload>,
    #[serde(rename = "understand-expression-goals")]
    pub understanding: Vec<GoalPayload>,
}

/// A goal left out of the export because it is not ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGoal {
    pub reference: String,
    pub state: GoalState,
}

/// Everything needed to write one situation for one language pair.
#[derive(Debug, Clone)]
pub struct SituationExport {
    pub situation: Gloss,
    pub pair: LanguagePair,
    pub payload: SituationPayload,
    /// Exported glosses keyed by reference, sorted.
    pub glosses: BTreeMap<String, Gloss>,
    pub skipped_goals: Vec<SkippedGoal>,
    /// Distinct flagged glosses left out.
    pub excluded: BTreeSet<String>,
}

impl SituationExport {
    pub fn goal_count(&self) -> usize {
        self.payload.procedural.len() + self.payload.understanding.len()
    }

    /// True when no goal qualified.
    pub fn is_empty(&self) -> bool {
        self.goal_count() == 0
    }

    pub fn situation_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.payload).map_err(|e| format!("JSON serialize error: {}", e))
    }

    /// One gloss object per line, with its reference under `ref`.
    pub fn glosses_jsonl(&self) -> Result<String, String> {
        let mut lines = Vec::with_capacity(self.glosses.len());
        for (reference, gloss) in &self.glosses {
            let mut item = serde_json::to_value(gloss).map_err(|e| format!("JSON serialize error: {}", e))?;
            if let Some(obj) = item.as_object_mut() {
                obj.insert("ref".to_string(), serde_json::Value::String(reference.clone()));
            }
            lines.push(item.to_string());
        }
        Ok(lines.join("\n"))
    }
}

/// Collect a goal's references (pre-order, first occurrence) and its
/// to-learn members other than the root, leaving flagged glosses out.
fn gather(root: &TreeNode, excluded: &mut BTreeSet<String>) -> (Vec<String>, Vec<String>, Vec<Gloss>) {
    let mut refs = Vec::new();
    let mut learn = Vec::new();
    let mut glosses = Vec::new();
    let mut seen = BTreeSet::new();
    root.walk(&mut |node| {
        if node.struck() {
            excluded.insert(node.reference.clone());
            return;
        }
        if seen.insert(node.reference.clone()) {
            refs.push(node.reference.clone());
            glosses.push(node.gloss.clone());
        }
        if node.bold && node.reference != root.reference && !learn.contains(&node.reference) {
            learn.push(node.reference.clone());
        }
    });
    (refs, learn, glosses)
}

/// Build the export for one situation and pair.
pub fn build_situation_export<S: GlossStore + ?Sized>(
    situation: &Gloss,
    store: &S,
    pair: &LanguagePair,
) -> SituationExport {
    let (nodes, _stats) = build_goal_nodes(situation, store, pair);
    let mut export = SituationExport {
        situation: situation.clone(),
        pair: pair.clone(),
        payload: SituationPayload::default(),
        glosses: BTreeMap::new(),
        skipped_goals: Vec::new(),
        excluded: BTreeSet::new(),
    };

    for root in &nodes {
        let Some(goal) = &root.goal else {
            continue;
        };
        if goal.evaluation.state < GoalState::Yellow {
            export.skipped_goals.push(SkippedGoal {
                reference: root.reference.clone(),
                state: goal.evaluation.state,
            });
            continue;
        }
        if root.struck() {
            export.excluded.insert(root.reference.clone());
            continue;
        }
        let (references, need_to_be_learned, glosses) = gather(root, &mut export.excluded);
        for gloss in glosses {
            export.glosses.insert(gloss.reference(), gloss);
        }
        let payload = GoalPayload {
            final_challenge: root.reference.clone(),
            need_to_be_learned,
            references,
        };
        match goal.kind {
            GoalKind::Procedural => export.payload.procedural.push(payload),
            GoalKind::Understanding => export.payload.understanding.push(payload),
        }
    }

    if !export.is_empty() {
        let mut context = vec![situation.clone()];
        context.extend(
            situation
                .translations
                .iter()
                .filter(|r| {
                    let lang = reference_language(r);
                    lang.as_deref() == Some(pair.native.as_str()) || lang.as_deref() == Some(pair.target.as_str())
                })
                .filter_map(|r| store.resolve_reference(r)),
        );
        for gloss in context {
            if gloss.is_flagged() {
                export.excluded.insert(gloss.reference());
            } else {
                export.glosses.insert(gloss.reference(), gloss);
            }
        }
    }

    export
}
