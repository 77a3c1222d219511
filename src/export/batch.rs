//! GL-013: Batch export over every situation and ordered language pair.
//!
//! Files land at `<output>/<native>/<target>/<situation-slug>.json|.jsonl`.
//! `<output>/manifest.json` maps each written file to its BLAKE3 hash; a file
//! whose new content matches both the manifest and the bytes on disk is left
//! untouched.

use super::payload::{build_situation_export, SituationExport};
use crate::core::store::GlossStore;
use crate::core::types::{Gloss, LanguagePair};
use crate::journal::hasher::{file_matches, hash_string};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MANIFEST_FILE: &str = "manifest.json";
pub const NO_CONTENT: &str = "No learnable content";

/// One written (or confirmed unchanged) situation export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub situation: String,
    pub native: String,
    pub target: String,
    pub situation_json: PathBuf,
    pub glosses_jsonl: PathBuf,
    pub goal_count: usize,
    pub gloss_count: usize,
    pub excluded_count: usize,
    /// Both files already matched.
    pub unchanged: bool,
}

/// A situation and pair that produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedExport {
    pub situation: String,
    pub native: String,
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_situations: usize,
    pub exports: Vec<ExportRecord>,
    pub skipped: Vec<SkippedExport>,
}

impl BatchReport {
    pub fn unchanged(&self) -> usize {
        self.exports.iter().filter(|e| e.unchanged).count()
    }

    pub fn written(&self) -> usize {
        self.exports.len() - self.unchanged()
    }
}

/// Relative path → content hash of every file the exporter owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Load the manifest; a missing or unreadable one is empty.
    pub fn load(output_root: &Path) -> Self {
        let path = output_root.join(MANIFEST_FILE);
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { entries }
    }

    pub fn save(&self, output_root: &Path) -> Result<(), String> {
        std::fs::create_dir_all(output_root)
            .map_err(|e| format!("cannot create {}: {}", output_root.display(), e))?;
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("JSON serialize error: {}", e))?;
        let path = output_root.join(MANIFEST_FILE);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| format!("cannot write {}: {}", tmp.display(), e))?;
        std::fs::rename(&tmp, &path).map_err(|e| format!("cannot rename manifest: {}", e))?;
        Ok(())
    }

    pub fn get(&self, relative: &str) -> Option<&str> {
        self.entries.get(relative).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write `content` to `<root>/<relative>` unless it is already there.
    /// Returns whether the file was written.
    fn write_if_changed(&mut self, root: &Path, relative: &str, content: &str) -> Result<bool, String> {
        let path = root.join(relative);
        let hash = hash_string(content);
        if self.get(relative) == Some(hash.as_str()) && file_matches(&path, content) {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create {}: {}", parent.display(), e))?;
        }
        std::fs::write(&path, content).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        self.entries.insert(relative.to_string(), hash);
        Ok(true)
    }
}

/// Write one situation export under `output_root`, consulting the manifest.
pub fn write_situation_export(
    export: &SituationExport,
    output_root: &Path,
    manifest: &mut Manifest,
) -> Result<ExportRecord, String> {
    let base = format!(
        "{}/{}/{}",
        export.pair.native, export.pair.target, export.situation.slug
    );
    let json_rel = format!("{}.json", base);
    let jsonl_rel = format!("{}.jsonl", base);
    let wrote_json = manifest.write_if_changed(output_root, &json_rel, &export.situation_json()?)?;
    let wrote_jsonl = manifest.write_if_changed(output_root, &jsonl_rel, &export.glosses_jsonl()?)?;

    Ok(ExportRecord {
        situation: export.situation.reference(),
        native: export.pair.native.clone(),
        target: export.pair.target.clone(),
        situation_json: output_root.join(json_rel),
        glosses_jsonl: output_root.join(jsonl_rel),
        goal_count: export.goal_count(),
        gloss_count: export.glosses.len(),
        excluded_count: export.excluded.len(),
        unchanged: !wrote_json && !wrote_jsonl,
    })
}

/// Every ordered pair of distinct languages.
pub fn ordered_pairs(languages: &[String]) -> Vec<LanguagePair> {
    let mut pairs = Vec::new();
    for native in languages {
        for target in languages {
            if native != target {
                pairs.push(LanguagePair::new(native, target));
            }
        }
    }
    pairs
}

/// Export every situation for every ordered pair of `languages`.
pub fn export_batch<S: GlossStore + ?Sized>(
    store: &S,
    languages: &[String],
    output_root: &Path,
) -> Result<BatchReport, String> {
    let situations: Vec<Gloss> = store.glosses().filter(Gloss::is_situation).collect();
    let mut report = BatchReport {
        total_situations: situations.len(),
        ..BatchReport::default()
    };
    if situations.is_empty() {
        return Ok(report);
    }
    if languages.len() < 2 {
        return Err(format!(
            "need at least 2 languages for batch export, have {}",
            languages.len()
        ));
    }

    let mut manifest = Manifest::load(output_root);
    let pairs = ordered_pairs(languages);
    for situation in &situations {
        for pair in &pairs {
            let export = build_situation_export(situation, store, pair);
            if export.is_empty() {
                debug!(situation = %situation.reference(), %pair, "nothing to export");
                report.skipped.push(SkippedExport {
                    situation: situation.reference(),
                    native: pair.native.clone(),
                    target: pair.target.clone(),
                    reason: NO_CONTENT.to_string(),
                });
                continue;
            }
            let record = write_situation_export(&export, output_root, &mut manifest)?;
            report.exports.push(record);
        }
    }
    manifest.save(output_root)?;

    info!(
        situations = report.total_situations,
        exported = report.exports.len(),
        unchanged = report.unchanged(),
        skipped = report.skipped.len(),
        "batch export finished"
    );
    Ok(report)
}
