//! GL-016: CLI subcommands: init, validate, tree, state, missing, export, and
//! the store mutation tools.

use crate::core::config::{self, GlossConfig};
use crate::core::evaluator::evaluate_goal_state;
use crate::core::relations;
use crate::core::store::{self, FsStore, GlossStore};
use crate::core::tree::{build_goal_nodes, render_tree_text};
use crate::core::types::{Gloss, LanguagePair, LogMarker, RelationField};
use crate::export::archive::save_situation_archive;
use crate::export::batch::{export_batch, write_situation_export, Manifest, NO_CONTENT};
use crate::export::payload::build_situation_export;
use crate::journal::eventlog::{self, MutationEvent};
use crate::maintenance;
use clap::{Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new glosstree project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate glosstree.yaml and the gloss directory
    Validate {
        /// Path to glosstree.yaml
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,
    },

    /// List situations with their goal states
    Situations {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Native language (overrides config)
        #[arg(long)]
        native: Option<String>,

        /// Target language (overrides config)
        #[arg(long)]
        target: Option<String>,
    },

    /// Print the goal trees of one situation
    Tree {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Situation reference (lang:slug)
        situation: String,

        #[arg(long)]
        native: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// Evaluate one goal, or every goal of a situation, with rationale
    State {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Goal or situation reference (lang:slug)
        reference: String,

        #[arg(long)]
        native: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// List glosses in a situation that lack data
    Missing {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// What to look for
        #[arg(value_enum)]
        kind: MissingKind,

        /// Situation reference (lang:slug)
        situation: String,

        #[arg(long)]
        native: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// Export learnable goals for one situation, or every situation with --all
    Export {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Situation reference (lang:slug)
        #[arg(required_unless_present = "all")]
        situation: Option<String>,

        /// Every situation for every ordered pair of configured languages
        #[arg(long, conflicts_with_all = ["situation", "archive"])]
        all: bool,

        /// Write a zip archive to this path instead of the output directory
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        native: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// Create a gloss
    Add {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Language code
        language: String,

        /// Content text
        content: String,

        /// Tag to attach (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Add a relationship (symmetric fields get the reverse edge)
    Attach {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Base gloss reference
        base: String,

        /// Relationship field, e.g. parts or translations
        field: RelationField,

        /// Target reference (or tag text for tags)
        target: String,
    },

    /// Create a translation gloss and link it, with an optional note
    Translate {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Source gloss reference
        source: String,

        /// Translation language code
        language: String,

        /// Translation text
        text: String,

        /// Note text attached to the translation
        #[arg(long)]
        note: Option<String>,

        /// Language of the note
        #[arg(long, default_value = "eng")]
        note_language: String,
    },

    /// Remove a relationship
    Detach {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        base: String,

        field: RelationField,

        target: String,
    },

    /// Delete a gloss and every reference to it
    Delete {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        reference: String,
    },

    /// Record that a gap was checked and accepted
    Mark {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        reference: String,

        #[arg(value_enum)]
        marker: MarkerKind,

        /// Language the marker applies to (translation and usage markers)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Set or clear a curation flag
    Flag {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        reference: String,

        #[arg(value_enum)]
        flag: FlagKind,

        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },

    /// Search glosses by content, tag, or language
    Search {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Case-insensitive content substring
        query: Option<String>,

        /// Restrict to one language
        #[arg(short, long)]
        language: Option<String>,

        /// Glosses carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Maximum results (overrides config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show recent store mutations and exports
    History {
        #[arg(short, long, default_value = "glosstree.yaml")]
        file: PathBuf,

        /// Number of events to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingKind {
    Parts,
    Translations,
    Usage,
    Siblings,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// SPLIT_CONSIDERED_UNNECESSARY
    Split,
    /// TRANSLATION_CONSIDERED_IMPOSSIBLE:<lang>
    NoTranslation,
    /// USAGE_EXAMPLE_CONSIDERED_IMPOSSIBLE:<lang>
    NoUsage,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagKind {
    NeedsHumanCheck,
    ExcludeFromLearning,
}

impl FlagKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::NeedsHumanCheck => "needsHumanCheck",
            Self::ExcludeFromLearning => "excludeFromLearning",
        }
    }
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Situations {
            file,
            native,
            target,
        } => cmd_situations(&file, native.as_deref(), target.as_deref()),
        Commands::Tree {
            file,
            situation,
            native,
            target,
        } => cmd_tree(&file, &situation, native.as_deref(), target.as_deref()),
        Commands::State {
            file,
            reference,
            native,
            target,
        } => cmd_state(&file, &reference, native.as_deref(), target.as_deref()),
        Commands::Missing {
            file,
            kind,
            situation,
            native,
            target,
        } => cmd_missing(&file, kind, &situation, native.as_deref(), target.as_deref()),
        Commands::Export {
            file,
            situation,
            all,
            archive,
            output,
            native,
            target,
        } => {
            if all {
                cmd_export_all(&file, output.as_deref())
            } else {
                let situation = situation.ok_or("a situation reference or --all is required")?;
                cmd_export(
                    &file,
                    &situation,
                    archive.as_deref(),
                    output.as_deref(),
                    native.as_deref(),
                    target.as_deref(),
                )
            }
        }
        Commands::Add {
            file,
            language,
            content,
            tag,
        } => cmd_add(&file, &language, &content, &tag),
        Commands::Attach {
            file,
            base,
            field,
            target,
        } => cmd_attach(&file, &base, field, &target),
        Commands::Translate {
            file,
            source,
            language,
            text,
            note,
            note_language,
        } => cmd_translate(&file, &source, &language, &text, note.as_deref(), &note_language),
        Commands::Detach {
            file,
            base,
            field,
            target,
        } => cmd_detach(&file, &base, field, &target),
        Commands::Delete { file, reference } => cmd_delete(&file, &reference),
        Commands::Mark {
            file,
            reference,
            marker,
            language,
        } => cmd_mark(&file, &reference, marker, language.as_deref()),
        Commands::Flag {
            file,
            reference,
            flag,
            clear,
        } => cmd_flag(&file, &reference, flag, !clear),
        Commands::Search {
            file,
            query,
            language,
            tag,
            limit,
        } => cmd_search(&file, query.as_deref(), language.as_deref(), tag.as_deref(), limit),
        Commands::History { file, limit } => cmd_history(&file, limit),
    }
}

// ============================================================================
// Project loading
// ============================================================================

/// A parsed, validated config plus its opened store.
struct Project {
    config: GlossConfig,
    store: FsStore,
}

impl Project {
    fn data_root(&self) -> &Path {
        self.store.data_root()
    }

    fn pair(&self, native: Option<&str>, target: Option<&str>) -> Result<LanguagePair, String> {
        self.config.language_pair(native, target)
    }

    /// Append to the journal. Journal failures are reported, not fatal.
    fn record(&self, event: MutationEvent) {
        if let Err(e) = eventlog::append_event(self.data_root(), event) {
            tracing::warn!(error = %e, "cannot append to event log");
        }
    }

    fn situation(&self, reference: &str) -> Result<Gloss, String> {
        let gloss = self
            .store
            .resolve_reference(reference)
            .ok_or_else(|| format!("situation not found: {}", reference))?;
        if !gloss.is_situation() {
            return Err(format!("{} is not tagged as a situation", reference));
        }
        Ok(gloss)
    }
}

fn parse_and_validate(file: &Path) -> Result<GlossConfig, String> {
    let config = config::parse_config_file(file)?;
    let errors = config::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

fn open_project(file: &Path) -> Result<Project, String> {
    let config = parse_and_validate(file)?;
    let store = FsStore::open(&config.data_root_from(file)).map_err(|e| e.to_string())?;
    Ok(Project { config, store })
}

// ============================================================================
// Project setup
// ============================================================================

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("glosstree.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let data_root = path.join("data");
    FsStore::init(&data_root).map_err(|e| e.to_string())?;

    let template = r#"version: "1.0"
name: my-course
description: "Gloss graph managed by glosstree"

data_root: data

# Default language pair; --native/--target override per command.
native: eng
target: deu

# Languages used by `export --all`. Empty means every language in the store.
languages: [eng, deu]

export:
  output_dir: situations

search_limit: 50
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized glosstree project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}/gloss/", data_root.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = config::parse_config_file(file)?;
    let errors = config::validate_config(&config);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(format!("{} validation error(s)", errors.len()));
    }

    let store = FsStore::open(&config.data_root_from(file)).map_err(|e| e.to_string())?;
    let languages = store.languages();
    let glosses = store.glosses().count();
    let situations = store.glosses().filter(Gloss::is_situation).count();
    println!(
        "OK: {} ({} glosses, {} situations, languages: {})",
        config.name,
        glosses,
        situations,
        if languages.is_empty() {
            "none".to_string()
        } else {
            languages.join(", ")
        }
    );
    Ok(())
}

// ============================================================================
// Read commands
// ============================================================================

fn cmd_situations(file: &Path, native: Option<&str>, target: Option<&str>) -> Result<(), String> {
    let project = open_project(file)?;
    let pair = project.pair(native, target)?;
    let situations = store::list_situations(&project.store, usize::MAX);
    if situations.is_empty() {
        println!("No situations found.");
        return Ok(());
    }

    println!("Situations ({}):", pair);
    for situation in &situations {
        let assessment = maintenance::assess_situation(situation, &project.store, &pair);
        println!(
            "  {}: {} goals ({} red, {} yellow, {} green)",
            situation.reference(),
            assessment.total_goals(),
            assessment.red.len(),
            assessment.yellow.len(),
            assessment.green.len()
        );
    }
    Ok(())
}

fn cmd_tree(file: &Path, situation: &str, native: Option<&str>, target: Option<&str>) -> Result<(), String> {
    let project = open_project(file)?;
    let pair = project.pair(native, target)?;
    let situation = project.situation(situation)?;
    let (nodes, stats) = build_goal_nodes(&situation, &project.store, &pair);

    println!("{} ({})", situation.display_text(), pair);
    if nodes.is_empty() {
        println!("  No goals for this language pair.");
        return Ok(());
    }
    println!("{}", render_tree_text(&nodes));
    println!();
    println!(
        "{} glosses, {} to learn, {} missing parts, {} missing usage, {} missing translations",
        stats.situation_glosses.len(),
        stats.glosses_to_learn.len(),
        stats.parts_missing().len(),
        stats.usage_missing().len(),
        stats.native_missing().len() + stats.target_missing().len()
    );
    Ok(())
}

fn cmd_state(file: &Path, reference: &str, native: Option<&str>, target: Option<&str>) -> Result<(), String> {
    let project = open_project(file)?;
    let pair = project.pair(native, target)?;
    let gloss = project
        .store
        .resolve_reference(reference)
        .ok_or_else(|| format!("gloss not found: {}", reference))?;

    if !gloss.is_situation() {
        let evaluation = evaluate_goal_state(&gloss, &project.store, &pair);
        println!("{}: {}", reference, evaluation.state);
        for line in &evaluation.log {
            println!("  {}", line);
        }
        return Ok(());
    }

    let assessment = maintenance::assess_situation(&gloss, &project.store, &pair);
    println!(
        "{} ({}): {} procedural, {} understanding",
        assessment.situation, pair, assessment.procedural_count, assessment.understanding_count
    );
    for (goal, evaluation) in &assessment.logs {
        println!();
        println!("{}: {}", goal, evaluation.state);
        for line in &evaluation.log {
            println!("  {}", line);
        }
    }
    println!();
    println!("{}", assessment.summary());
    Ok(())
}

fn print_refs(title: &str, refs: &std::collections::BTreeSet<String>) {
    println!("{} ({}):", title, refs.len());
    for r in refs {
        println!("  {}", r);
    }
}

fn cmd_missing(
    file: &Path,
    kind: MissingKind,
    situation: &str,
    native: Option<&str>,
    target: Option<&str>,
) -> Result<(), String> {
    let project = open_project(file)?;
    let pair = project.pair(native, target)?;
    let situation = project.situation(situation)?;
    let store = &project.store;

    match kind {
        MissingKind::Parts => print_refs("Missing parts", &maintenance::missing_parts(&situation, store, &pair)),
        MissingKind::Usage => print_refs(
            "Missing usage examples",
            &maintenance::missing_usage(&situation, store, &pair),
        ),
        MissingKind::Translations => {
            let missing = maintenance::missing_translations(&situation, store, &pair);
            print_refs(
                &format!("Missing {} translation", pair.native),
                &missing.native_missing,
            );
            print_refs(
                &format!("Missing {} translation", pair.target),
                &missing.target_missing,
            );
            print_refs(
                &format!("Paraphrases missing {} translation", pair.target),
                &missing.paraphrased_native_missing,
            );
        }
        MissingKind::Siblings => {
            let groups = maintenance::translation_siblings(&situation, store, &pair);
            println!("Translation siblings ({}):", groups.len());
            for group in &groups {
                println!("  {} ({})", group.native, group.content);
                for t in &group.translations {
                    let note = if t.has_note { "" } else { " [NO NOTE]" };
                    println!("    {}{}", t.reference, note);
                }
            }
        }
    }
    Ok(())
}

fn cmd_search(
    file: &Path,
    query: Option<&str>,
    language: Option<&str>,
    tag: Option<&str>,
    limit: Option<usize>,
) -> Result<(), String> {
    let project = open_project(file)?;
    let limit = limit.unwrap_or(project.config.search_limit);
    let glosses = &project.store;
    let results: Vec<Gloss> = match (query, tag, language) {
        (None, None, None) => return Err("give a query, --tag, or --language".to_string()),
        (Some(q), None, _) => store::find_by_content(glosses, q, language, limit),
        (None, Some(t), None) => store::find_by_tag(glosses, t, limit),
        (None, None, Some(l)) => store::find_by_language(glosses, l, limit),
        (q, Some(t), l) => {
            let needle = q.map(str::to_lowercase);
            let source = match l {
                Some(l) => glosses.glosses_in_language(l),
                None => glosses.glosses(),
            };
            source
                .filter(|g| g.has_tag(t))
                .filter(|g| {
                    needle
                        .as_deref()
                        .is_none_or(|n| g.content.to_lowercase().contains(n))
                })
                .take(limit)
                .collect()
        }
    };

    if results.is_empty() {
        println!("No matches.");
    }
    for g in &results {
        println!("  {}  {}", g.reference(), g.display_text());
    }
    Ok(())
}

fn cmd_history(file: &Path, limit: usize) -> Result<(), String> {
    let project = open_project(file)?;
    let events = eventlog::read_events(project.data_root(), limit)?;
    if events.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }
    for e in &events {
        let json = serde_json::to_string(&e.event).map_err(|e| format!("JSON serialize error: {}", e))?;
        println!("{}  {}", e.ts, json);
    }
    Ok(())
}

// ============================================================================
// Export
// ============================================================================

fn cmd_export(
    file: &Path,
    situation: &str,
    archive: Option<&Path>,
    output: Option<&Path>,
    native: Option<&str>,
    target: Option<&str>,
) -> Result<(), String> {
    let project = open_project(file)?;
    let pair = project.pair(native, target)?;
    let situation = project.situation(situation)?;
    let export = build_situation_export(&situation, &project.store, &pair);

    for skipped in &export.skipped_goals {
        println!("  skip {} ({})", skipped.reference, skipped.state);
    }
    if export.is_empty() {
        println!("Skipped {} ({}): {}", situation.reference(), pair, NO_CONTENT);
        return Ok(());
    }

    if let Some(path) = archive {
        save_situation_archive(&export, path)?;
        println!(
            "Exported {} goals, {} glosses to {}",
            export.goal_count(),
            export.glosses.len(),
            path.display()
        );
    } else {
        let output_root = output.map_or_else(|| project.config.output_dir_from(file), Path::to_path_buf);
        let mut manifest = Manifest::load(&output_root);
        let record = write_situation_export(&export, &output_root, &mut manifest)?;
        manifest.save(&output_root)?;
        let status = if record.unchanged { " (unchanged)" } else { "" };
        println!(
            "Exported {} goals, {} glosses ({} excluded){}",
            record.goal_count, record.gloss_count, record.excluded_count, status
        );
        println!("  {}", record.situation_json.display());
        println!("  {}", record.glosses_jsonl.display());
    }

    project.record(MutationEvent::SituationExported {
        situation: situation.reference(),
        native: pair.native.clone(),
        target: pair.target.clone(),
        goals: export.goal_count(),
    });
    Ok(())
}

fn cmd_export_all(file: &Path, output: Option<&Path>) -> Result<(), String> {
    let project = open_project(file)?;
    let languages = if project.config.languages.is_empty() {
        project.store.languages()
    } else {
        project.config.languages.clone()
    };
    let output_root = output.map_or_else(|| project.config.output_dir_from(file), Path::to_path_buf);
    let report = export_batch(&project.store, &languages, &output_root)?;

    if report.total_situations == 0 {
        println!("No situations found.");
        return Ok(());
    }
    for record in &report.exports {
        let status = if record.unchanged { "unchanged" } else { "written" };
        println!(
            "  {} {}→{}: {} goals, {} glosses [{}]",
            record.situation, record.native, record.target, record.goal_count, record.gloss_count, status
        );
    }
    println!();
    println!(
        "Batch export: {} written, {} unchanged, {} skipped ({} situations)",
        report.written(),
        report.unchanged(),
        report.skipped.len(),
        report.total_situations
    );

    project.record(MutationEvent::BatchExported {
        exported: report.exports.len(),
        skipped: report.skipped.len(),
        unchanged: report.unchanged(),
    });
    Ok(())
}

// ============================================================================
// Mutations
// ============================================================================

fn cmd_add(file: &Path, language: &str, content: &str, tags: &[String]) -> Result<(), String> {
    let mut project = open_project(file)?;
    let mut gloss = Gloss::new(language, content);
    for tag in tags {
        if !gloss.has_tag(tag) {
            gloss.tags.push(tag.clone());
        }
    }
    let gloss = project.store.create_gloss(gloss).map_err(|e| e.to_string())?;
    println!("Created {}", gloss.reference());
    project.record(MutationEvent::GlossCreated {
        reference: gloss.reference(),
    });
    Ok(())
}

fn cmd_attach(file: &Path, base: &str, field: RelationField, target: &str) -> Result<(), String> {
    let mut project = open_project(file)?;
    let changed = relations::attach_relation(&mut project.store, base, field, target).map_err(|e| e.to_string())?;
    if !changed {
        println!("Already attached: {} {} {}", base, field, target);
        return Ok(());
    }
    println!("Attached: {} {} {}", base, field, target);
    project.record(MutationEvent::RelationAttached {
        base: base.to_string(),
        field: field.to_string(),
        target: target.to_string(),
    });
    Ok(())
}

fn cmd_translate(
    file: &Path,
    source: &str,
    language: &str,
    text: &str,
    note: Option<&str>,
    note_language: &str,
) -> Result<(), String> {
    let mut project = open_project(file)?;
    let note = note.map(|n| (n, note_language));
    let translation = relations::attach_translation_with_note(&mut project.store, source, text, language, note)
        .map_err(|e| e.to_string())?;
    println!("Attached translation {} to {}", translation.reference(), source);
    for note_ref in &translation.notes {
        println!("  note: {}", note_ref);
    }
    project.record(MutationEvent::RelationAttached {
        base: source.to_string(),
        field: RelationField::Translations.to_string(),
        target: translation.reference(),
    });
    Ok(())
}

fn cmd_detach(file: &Path, base: &str, field: RelationField, target: &str) -> Result<(), String> {
    let mut project = open_project(file)?;
    let changed = relations::detach_relation(&mut project.store, base, field, target).map_err(|e| e.to_string())?;
    if !changed {
        println!("Not attached: {} {} {}", base, field, target);
        return Ok(());
    }
    println!("Detached: {} {} {}", base, field, target);
    project.record(MutationEvent::RelationDetached {
        base: base.to_string(),
        field: field.to_string(),
        target: target.to_string(),
    });
    Ok(())
}

fn cmd_delete(file: &Path, reference: &str) -> Result<(), String> {
    let mut project = open_project(file)?;
    let report = relations::delete_gloss_with_cleanup(&mut project.store, reference).map_err(|e| e.to_string())?;
    println!(
        "Deleted {} ({} references removed from {} glosses)",
        report.reference, report.refs_removed, report.glosses_updated
    );
    project.record(MutationEvent::GlossDeleted {
        reference: report.reference,
        refs_removed: report.refs_removed,
        glosses_updated: report.glosses_updated,
    });
    Ok(())
}

fn marker_for(kind: MarkerKind, language: Option<&str>) -> Result<LogMarker, String> {
    let language = || {
        language
            .map(crate::core::slug::normalize_language_code)
            .ok_or_else(|| "this marker needs --language".to_string())
    };
    Ok(match kind {
        MarkerKind::Split => LogMarker::SplitUnnecessary,
        MarkerKind::NoTranslation => LogMarker::TranslationImpossible(language()?),
        MarkerKind::NoUsage => LogMarker::UsageExampleImpossible(language()?),
    })
}

fn cmd_mark(file: &Path, reference: &str, kind: MarkerKind, language: Option<&str>) -> Result<(), String> {
    let marker = marker_for(kind, language)?;
    let mut project = open_project(file)?;
    let key = relations::mark_gloss_log(&mut project.store, reference, &marker).map_err(|e| e.to_string())?;
    println!("Marked {}: {} = {}", reference, key, marker);
    project.record(MutationEvent::MarkerLogged {
        reference: reference.to_string(),
        marker: marker.to_string(),
    });
    Ok(())
}

fn cmd_flag(file: &Path, reference: &str, flag: FlagKind, value: bool) -> Result<(), String> {
    let mut project = open_project(file)?;
    let gloss = match flag {
        FlagKind::NeedsHumanCheck => relations::set_needs_human_check(&mut project.store, reference, value),
        FlagKind::ExcludeFromLearning => relations::set_exclude_from_learning(&mut project.store, reference, value),
    }
    .map_err(|e| e.to_string())?;
    println!("{}: {} = {}", gloss.reference(), flag.as_str(), value);
    project.record(MutationEvent::FlagChanged {
        reference: gloss.reference(),
        flag: flag.as_str().to_string(),
        value,
    });
    Ok(())
}
