//! GL-001: Domain types: glosses, log markers, language pairs, goal kinds,
//! readiness states, and the ephemeral tree nodes produced by the builder.
//!
//! Gloss files are JSON on disk; every type that lands in a file derives
//! Serialize/Deserialize. Tree nodes and evaluations never touch disk.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// ============================================================================
// Well-known tags
// ============================================================================

/// Tag carried by situation glosses.
pub const SITUATION_TAG: &str = "eng:situation";

/// Tag carried by native-language procedural goals.
pub const PROCEDURAL_GOAL_TAG: &str = "eng:procedural-paraphrase-expression-goal";

/// Tag carried by target-language understanding goals.
pub const UNDERSTANDING_GOAL_TAG: &str = "eng:understand-expression-goal";

/// Tag marking a native gloss as an abstract paraphrase of an intent.
pub const PARAPHRASE_TAG: &str = "eng:paraphrase";

// ============================================================================
// Log markers
// ============================================================================

const SPLIT_SENTINEL: &str = "SPLIT_CONSIDERED_UNNECESSARY";
const TRANSLATION_SENTINEL: &str = "TRANSLATION_CONSIDERED_IMPOSSIBLE";
const USAGE_SENTINEL: &str = "USAGE_EXAMPLE_CONSIDERED_IMPOSSIBLE";

static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"SPLIT_CONSIDERED_UNNECESSARY|(TRANSLATION_CONSIDERED_IMPOSSIBLE|USAGE_EXAMPLE_CONSIDERED_IMPOSSIBLE):\s*([A-Za-z]{3})\b",
    )
    .expect("marker pattern is a valid regex")
});

/// A deliberately accepted gap in a gloss's data.
///
/// Each marker suppresses exactly one missing-data warning. Language-scoped
/// markers only apply to the language they name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogMarker {
    /// The gloss was checked and does not need to be split into parts.
    SplitUnnecessary,
    /// No translation into the given language exists.
    TranslationImpossible(String),
    /// No usable usage example in the given language exists.
    UsageExampleImpossible(String),
}

impl LogMarker {
    /// Parse the first marker embedded in a free-form log value.
    pub fn parse(text: &str) -> Option<Self> {
        MARKER_PATTERN.captures(text).map(|caps| Self::from_captures(&caps))
    }

    /// Every marker embedded in a free-form log value, in text order.
    pub fn parse_all(text: &str) -> Vec<Self> {
        MARKER_PATTERN
            .captures_iter(text)
            .map(|caps| Self::from_captures(&caps))
            .collect()
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        match (caps.get(1), caps.get(2)) {
            (Some(kind), Some(lang)) => {
                let lang = lang.as_str().to_lowercase();
                if kind.as_str() == TRANSLATION_SENTINEL {
                    Self::TranslationImpossible(lang)
                } else {
                    Self::UsageExampleImpossible(lang)
                }
            }
            _ => Self::SplitUnnecessary,
        }
    }
}

impl fmt::Display for LogMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SplitUnnecessary => write!(f, "{}", SPLIT_SENTINEL),
            Self::TranslationImpossible(lang) => write!(f, "{}:{}", TRANSLATION_SENTINEL, lang),
            Self::UsageExampleImpossible(lang) => write!(f, "{}:{}", USAGE_SENTINEL, lang),
        }
    }
}

/// One `logs` value: the raw text as stored, plus the markers parsed from it on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LogEntry {
    pub text: String,
    pub markers: Vec<LogMarker>,
}

impl From<String> for LogEntry {
    fn from(text: String) -> Self {
        let markers = LogMarker::parse_all(&text);
        Self { text, markers }
    }
}

impl From<LogEntry> for String {
    fn from(entry: LogEntry) -> Self {
        entry.text
    }
}

impl From<LogMarker> for LogEntry {
    fn from(marker: LogMarker) -> Self {
        Self {
            text: marker.to_string(),
            markers: vec![marker],
        }
    }
}

// ============================================================================
// Relationship fields
// ============================================================================

/// Every reference-list field on a gloss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationField {
    MorphologicallyRelated,
    Parts,
    HasSimilarMeaning,
    SoundsSimilar,
    UsageExamples,
    ToBeDifferentiatedFrom,
    Collocations,
    TypicalFollowUp,
    Children,
    Translations,
    Notes,
    Tags,
}

impl RelationField {
    pub const ALL: [RelationField; 12] = [
        Self::MorphologicallyRelated,
        Self::Parts,
        Self::HasSimilarMeaning,
        Self::SoundsSimilar,
        Self::UsageExamples,
        Self::ToBeDifferentiatedFrom,
        Self::Collocations,
        Self::TypicalFollowUp,
        Self::Children,
        Self::Translations,
        Self::Notes,
        Self::Tags,
    ];

    /// Symmetric relations are stored on both endpoints.
    pub fn is_symmetric(self) -> bool {
        matches!(
            self,
            Self::Translations
                | Self::MorphologicallyRelated
                | Self::HasSimilarMeaning
                | Self::SoundsSimilar
                | Self::ToBeDifferentiatedFrom
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MorphologicallyRelated => "morphologically_related",
            Self::Parts => "parts",
            Self::HasSimilarMeaning => "has_similar_meaning",
            Self::SoundsSimilar => "sounds_similar",
            Self::UsageExamples => "usage_examples",
            Self::ToBeDifferentiatedFrom => "to_be_differentiated_from",
            Self::Collocations => "collocations",
            Self::TypicalFollowUp => "typical_follow_up",
            Self::Children => "children",
            Self::Translations => "translations",
            Self::Notes => "notes",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for RelationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("unknown relationship field: {}", s))
    }
}

// ============================================================================
// Gloss
// ============================================================================

/// A single content unit in one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gloss {
    pub content: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub transcriptions: IndexMap<String, String>,

    /// ISO timestamp → free-form entry (possibly carrying a marker)
    #[serde(default)]
    pub logs: IndexMap<String, LogEntry>,

    #[serde(default)]
    pub morphologically_related: Vec<String>,

    #[serde(default)]
    pub parts: Vec<String>,

    #[serde(default)]
    pub has_similar_meaning: Vec<String>,

    #[serde(default)]
    pub sounds_similar: Vec<String>,

    #[serde(default)]
    pub usage_examples: Vec<String>,

    #[serde(default)]
    pub to_be_differentiated_from: Vec<String>,

    #[serde(default)]
    pub collocations: Vec<String>,

    #[serde(default)]
    pub typical_follow_up: Vec<String>,

    #[serde(default)]
    pub children: Vec<String>,

    #[serde(default)]
    pub translations: Vec<String>,

    #[serde(default)]
    pub notes: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(rename = "needsHumanCheck", default)]
    pub needs_human_check: bool,

    #[serde(rename = "excludeFromLearning", default)]
    pub exclude_from_learning: bool,

    /// Derived from the file name; never written into the file body.
    #[serde(skip)]
    pub slug: String,
}

fn default_language() -> String {
    "und".to_string()
}

impl Gloss {
    /// A fresh gloss with no relations. The slug is assigned on creation.
    pub fn new(language: &str, content: &str) -> Self {
        Self {
            content: content.to_string(),
            language: super::slug::normalize_language_code(language),
            ..Self::default()
        }
    }

    /// The `lang:slug` reference identifying this gloss.
    pub fn reference(&self) -> String {
        super::slug::make_reference(&self.language, &self.slug)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_paraphrase(&self) -> bool {
        self.has_tag(PARAPHRASE_TAG)
    }

    pub fn is_situation(&self) -> bool {
        self.has_tag(SITUATION_TAG)
    }

    /// Flagged glosses are rendered (struck through) but never exported.
    pub fn is_flagged(&self) -> bool {
        self.needs_human_check || self.exclude_from_learning
    }

    pub fn has_marker(&self, marker: &LogMarker) -> bool {
        self.logs
            .values()
            .any(|entry| entry.markers.contains(marker))
    }

    pub fn refs(&self, field: RelationField) -> &Vec<String> {
        match field {
            RelationField::MorphologicallyRelated => &self.morphologically_related,
            RelationField::Parts => &self.parts,
            RelationField::HasSimilarMeaning => &self.has_similar_meaning,
            RelationField::SoundsSimilar => &self.sounds_similar,
            RelationField::UsageExamples => &self.usage_examples,
            RelationField::ToBeDifferentiatedFrom => &self.to_be_differentiated_from,
            RelationField::Collocations => &self.collocations,
            RelationField::TypicalFollowUp => &self.typical_follow_up,
            RelationField::Children => &self.children,
            RelationField::Translations => &self.translations,
            RelationField::Notes => &self.notes,
            RelationField::Tags => &self.tags,
        }
    }

    pub fn refs_mut(&mut self, field: RelationField) -> &mut Vec<String> {
        match field {
            RelationField::MorphologicallyRelated => &mut self.morphologically_related,
            RelationField::Parts => &mut self.parts,
            RelationField::HasSimilarMeaning => &mut self.has_similar_meaning,
            RelationField::SoundsSimilar => &mut self.sounds_similar,
            RelationField::UsageExamples => &mut self.usage_examples,
            RelationField::ToBeDifferentiatedFrom => &mut self.to_be_differentiated_from,
            RelationField::Collocations => &mut self.collocations,
            RelationField::TypicalFollowUp => &mut self.typical_follow_up,
            RelationField::Children => &mut self.children,
            RelationField::Translations => &mut self.translations,
            RelationField::Notes => &mut self.notes,
            RelationField::Tags => &mut self.tags,
        }
    }

    /// Text shown in trees and lists; paraphrases are bracketed.
    pub fn display_text(&self) -> String {
        if self.is_paraphrase() {
            format!("[{}]", self.content)
        } else {
            self.content.clone()
        }
    }
}

// ============================================================================
// Language pair context
// ============================================================================

/// The active (native, target) pair. Threaded explicitly into every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub native: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(native: &str, target: &str) -> Self {
        Self {
            native: super::slug::normalize_language_code(native),
            target: super::slug::normalize_language_code(target),
        }
    }

    /// The language a gloss in `language` is translated into, if any.
    pub fn counterpart(&self, language: &str) -> Option<&str> {
        if language == self.native {
            Some(&self.target)
        } else if language == self.target {
            Some(&self.native)
        } else {
            None
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.native, self.target)
    }
}

// ============================================================================
// Goals
// ============================================================================

/// Goal kind relative to a language pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Something to say: a native-language paraphrase of an intent.
    Procedural,
    /// Something to comprehend: a target-language expression.
    Understanding,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procedural => write!(f, "procedural"),
            Self::Understanding => write!(f, "understanding"),
        }
    }
}

/// Readiness classification, ordered Red < Yellow < Green.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    #[default]
    Red,
    Yellow,
    Green,
}

impl fmt::Display for GoalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Yellow => write!(f, "yellow"),
            Self::Green => write!(f, "green"),
        }
    }
}

/// Result of evaluating one goal: the state plus its user-facing rationale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalEvaluation {
    pub state: GoalState,
    pub log: Vec<String>,
}

impl GoalEvaluation {
    /// The rationale as displayed to users, one condition per line.
    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}

// ============================================================================
// Tree nodes
// ============================================================================

/// Structural role of a node within a goal tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Root,
    Part,
    Translation,
    Usage,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Part => write!(f, "part"),
            Self::Translation => write!(f, "translation"),
            Self::Usage => write!(f, "usage"),
        }
    }
}

/// Missing-data warnings computed at a node's first occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeWarnings {
    /// A target-language gloss lacks a native translation.
    pub missing_native: bool,
    /// A native-language gloss lacks a target translation.
    pub missing_target: bool,
    pub missing_parts: bool,
    pub missing_usage: bool,
}

impl NodeWarnings {
    pub fn any(&self) -> bool {
        self.missing_native || self.missing_target || self.missing_parts || self.missing_usage
    }
}

/// Goal metadata carried only by root nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalInfo {
    pub kind: GoalKind,
    pub evaluation: GoalEvaluation,
}

/// Ephemeral view of one gloss occurrence in a goal tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub reference: String,
    pub gloss: Gloss,
    pub role: NodeRole,
    pub children: Vec<TreeNode>,
    pub warnings: NodeWarnings,
    /// Member of the learner's memorization set.
    pub bold: bool,
    /// A back-edge: the gloss was already expanded earlier in this goal.
    pub repeated: bool,
    pub goal: Option<GoalInfo>,
}

impl TreeNode {
    pub fn new(gloss: &Gloss, role: NodeRole) -> Self {
        Self {
            reference: gloss.reference(),
            gloss: gloss.clone(),
            role,
            children: Vec::new(),
            warnings: NodeWarnings::default(),
            bold: false,
            repeated: false,
            goal: None,
        }
    }

    /// Rendered with a strike-through and left out of exports.
    pub fn struck(&self) -> bool {
        self.gloss.is_flagged()
    }

    /// Goal state of a root node; non-roots default to red.
    pub fn state(&self) -> GoalState {
        self.goal
            .as_ref()
            .map(|g| g.evaluation.state)
            .unwrap_or_default()
    }

    /// Depth-first pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Total number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

// ============================================================================
// Tests
// ============================================================================
