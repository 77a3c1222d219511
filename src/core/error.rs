//! Error type for store and mutation operations.
//!
//! Traversal never surfaces these: a gloss that cannot be read is treated as
//! absent by `resolve_reference`. Only creation, saving, and relationship
//! edits report them to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlossError {
    /// Content reduced to nothing after slug derivation
    #[error("content must produce a valid slug: {0:?}")]
    EmptySlug(String),

    #[error("invalid language code '{0}' (expected 3 lowercase letters)")]
    InvalidLanguage(String),

    #[error("invalid reference '{0}' (expected lang:slug)")]
    InvalidReference(String),

    #[error("gloss not found: {0}")]
    NotFound(String),

    #[error("gloss already exists: {0}")]
    AlreadyExists(String),

    #[error("gloss directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid gloss file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GlossError>;
