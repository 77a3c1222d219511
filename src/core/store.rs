//! GL-003: Gloss store. The read interface the engine consumes, plus the
//! writes the relationship tools need.
//!
//! `FsStore` keeps one JSON file per gloss at `<data_root>/gloss/<lang>/<slug>.json`.
//! Every read is on demand: resolving a reference opens exactly one file, and
//! iteration streams files one at a time so callers can stop early.

use super::error::{GlossError, Result};
use super::slug::{derive_slug, is_valid_language_code, make_reference, normalize_language_code, parse_reference};
use super::types::Gloss;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage backend for glosses.
pub trait GlossStore {
    /// Load one gloss. `Ok(None)` when it does not exist.
    fn load_gloss(&self, language: &str, slug: &str) -> Result<Option<Gloss>>;

    /// Write a gloss under its current language and slug, replacing any previous version.
    fn write_gloss(&mut self, gloss: &Gloss) -> Result<()>;

    /// Remove a gloss. Returns whether anything was removed.
    fn remove_gloss(&mut self, language: &str, slug: &str) -> Result<bool>;

    /// Lazily iterate every gloss. Unreadable entries are skipped.
    fn glosses(&self) -> Box<dyn Iterator<Item = Gloss> + '_>;

    /// Language codes present in the store, sorted.
    fn languages(&self) -> Vec<String>;

    /// Lazily iterate glosses of one language.
    fn glosses_in_language(&self, language: &str) -> Box<dyn Iterator<Item = Gloss> + '_> {
        let language = normalize_language_code(language);
        Box::new(self.glosses().filter(move |g| g.language == language))
    }

    /// Resolve a `lang:slug` reference. Dangling, malformed, or unreadable
    /// references resolve to `None`.
    fn resolve_reference(&self, reference: &str) -> Option<Gloss> {
        let (language, slug) = parse_reference(reference)?;
        match self.load_gloss(&language, &slug) {
            Ok(found) => found,
            Err(e) => {
                warn!(reference, error = %e, "treating unreadable gloss as absent");
                None
            }
        }
    }

    /// Create a new gloss, deriving its slug from content.
    fn create_gloss(&mut self, mut gloss: Gloss) -> Result<Gloss> {
        let slug = derive_slug(&gloss.content).ok_or_else(|| GlossError::EmptySlug(gloss.content.clone()))?;
        let language = normalize_language_code(&gloss.language);
        if !is_valid_language_code(&language) {
            return Err(GlossError::InvalidLanguage(gloss.language.clone()));
        }
        if self.load_gloss(&language, &slug)?.is_some() {
            return Err(GlossError::AlreadyExists(make_reference(&language, &slug)));
        }
        gloss.slug = slug;
        gloss.language = language;
        self.write_gloss(&gloss)?;
        debug!(reference = %gloss.reference(), "created gloss");
        Ok(gloss)
    }

    /// Persist an existing gloss.
    fn save_gloss(&mut self, gloss: &Gloss) -> Result<()> {
        if gloss.slug.is_empty() || !is_valid_language_code(&gloss.language) {
            return Err(GlossError::InvalidReference(gloss.reference()));
        }
        self.write_gloss(gloss)
    }
}

/// A slug read back from a reference must be exactly what derivation produces,
/// which also rules out path traversal through crafted references.
fn is_canonical_slug(slug: &str) -> bool {
    derive_slug(slug).as_deref() == Some(slug)
}

// ============================================================================
// Filesystem store
// ============================================================================

/// File-per-gloss store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    data_root: PathBuf,
    gloss_root: PathBuf,
}

impl FsStore {
    /// Open an existing store. Fails when `<data_root>/gloss` is missing.
    pub fn open(data_root: &Path) -> Result<Self> {
        let gloss_root = data_root.join("gloss");
        if !gloss_root.is_dir() {
            return Err(GlossError::MissingRoot(gloss_root));
        }
        Ok(Self {
            data_root: data_root.to_path_buf(),
            gloss_root,
        })
    }

    /// Create the directory layout if needed, then open.
    pub fn init(data_root: &Path) -> Result<Self> {
        let gloss_root = data_root.join("gloss");
        std::fs::create_dir_all(&gloss_root).map_err(|source| GlossError::Io {
            path: gloss_root.clone(),
            source,
        })?;
        Self::open(data_root)
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Path of a gloss file.
    pub fn gloss_path(&self, language: &str, slug: &str) -> PathBuf {
        self.gloss_root
            .join(normalize_language_code(language))
            .join(format!("{}.json", slug))
    }

    fn read_gloss_file(path: &Path, language: &str, slug: &str) -> Result<Gloss> {
        let content = std::fs::read_to_string(path).map_err(|source| GlossError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut gloss: Gloss = serde_json::from_str(&content).map_err(|source| GlossError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // The path is authoritative for identity.
        gloss.language = normalize_language_code(language);
        gloss.slug = slug.to_string();
        Ok(gloss)
    }

    fn scan(&self, pattern: String) -> Box<dyn Iterator<Item = Gloss> + '_> {
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(pattern, error = %e, "invalid scan pattern");
                return Box::new(std::iter::empty());
            }
        };
        Box::new(paths.filter_map(|entry| {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    return None;
                }
            };
            let slug = path.file_stem()?.to_string_lossy().to_string();
            let language = path.parent()?.file_name()?.to_string_lossy().to_string();
            match Self::read_gloss_file(&path, &language, &slug) {
                Ok(gloss) => Some(gloss),
                Err(e) => {
                    warn!(error = %e, "skipping gloss file");
                    None
                }
            }
        }))
    }

    fn escaped_root(&self) -> String {
        glob::Pattern::escape(&self.gloss_root.to_string_lossy())
    }
}

impl GlossStore for FsStore {
    fn load_gloss(&self, language: &str, slug: &str) -> Result<Option<Gloss>> {
        let language = normalize_language_code(language);
        if !is_valid_language_code(&language) || !is_canonical_slug(slug) {
            return Ok(None);
        }
        let path = self.gloss_path(&language, slug);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_gloss_file(&path, &language, slug).map(Some)
    }

    fn write_gloss(&mut self, gloss: &Gloss) -> Result<()> {
        let path = self.gloss_path(&gloss.language, &gloss.slug);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GlossError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(gloss)?;

        // Atomic write: temp file + rename
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|source| GlossError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|source| GlossError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }

    fn remove_gloss(&mut self, language: &str, slug: &str) -> Result<bool> {
        if !is_canonical_slug(slug) {
            return Ok(false);
        }
        let path = self.gloss_path(language, slug);
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|source| GlossError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(true)
    }

    fn glosses(&self) -> Box<dyn Iterator<Item = Gloss> + '_> {
        self.scan(format!("{}/*/*.json", self.escaped_root()))
    }

    fn glosses_in_language(&self, language: &str) -> Box<dyn Iterator<Item = Gloss> + '_> {
        let language = normalize_language_code(language);
        if !is_valid_language_code(&language) {
            return Box::new(std::iter::empty());
        }
        self.scan(format!("{}/{}/*.json", self.escaped_root(), language))
    }

    fn languages(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.gloss_root) else {
            return Vec::new();
        };
        let mut languages: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| is_valid_language_code(name))
            .collect();
        languages.sort();
        languages
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Insertion-ordered store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    glosses: IndexMap<String, Gloss>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.glosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glosses.is_empty()
    }
}

impl GlossStore for MemoryStore {
    fn load_gloss(&self, language: &str, slug: &str) -> Result<Option<Gloss>> {
        Ok(self.glosses.get(&make_reference(language, slug)).cloned())
    }

    fn write_gloss(&mut self, gloss: &Gloss) -> Result<()> {
        self.glosses.insert(gloss.reference(), gloss.clone());
        Ok(())
    }

    fn remove_gloss(&mut self, language: &str, slug: &str) -> Result<bool> {
        Ok(self
            .glosses
            .shift_remove(&make_reference(language, slug))
            .is_some())
    }

    fn glosses(&self) -> Box<dyn Iterator<Item = Gloss> + '_> {
        Box::new(self.glosses.values().cloned())
    }

    fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.glosses.values().map(|g| g.language.clone()).collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

// ============================================================================
// Capped search
// ============================================================================

/// Glosses carrying a tag, stopping after `limit` matches.
pub fn find_by_tag<S: GlossStore + ?Sized>(store: &S, tag: &str, limit: usize) -> Vec<Gloss> {
    store.glosses().filter(|g| g.has_tag(tag)).take(limit).collect()
}

/// Glosses of one language, stopping after `limit`.
pub fn find_by_language<S: GlossStore + ?Sized>(store: &S, language: &str, limit: usize) -> Vec<Gloss> {
    store.glosses_in_language(language).take(limit).collect()
}

/// Case-insensitive content substring search, optionally within one language.
pub fn find_by_content<S: GlossStore + ?Sized>(
    store: &S,
    needle: &str,
    language: Option<&str>,
    limit: usize,
) -> Vec<Gloss> {
    let needle = needle.to_lowercase();
    let source = match language {
        Some(lang) => store.glosses_in_language(lang),
        None => store.glosses(),
    };
    source
        .filter(|g| g.content.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

/// Situation glosses, stopping after `limit`.
pub fn list_situations<S: GlossStore + ?Sized>(store: &S, limit: usize) -> Vec<Gloss> {
    store.glosses().filter(Gloss::is_situation).take(limit).collect()
}
