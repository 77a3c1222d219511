//! GL-010: Append-only JSONL mutation log at `<data_root>/events.jsonl`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A store mutation or export, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MutationEvent {
    GlossCreated {
        reference: String,
    },
    RelationAttached {
        base: String,
        field: String,
        target: String,
    },
    RelationDetached {
        base: String,
        field: String,
        target: String,
    },
    GlossDeleted {
        reference: String,
        refs_removed: usize,
        glosses_updated: usize,
    },
    MarkerLogged {
        reference: String,
        marker: String,
    },
    FlagChanged {
        reference: String,
        flag: String,
        value: bool,
    },
    SituationExported {
        situation: String,
        native: String,
        target: String,
        goals: usize,
    },
    BatchExported {
        exported: usize,
        skipped: usize,
        unchanged: usize,
    },
}

/// Event with its UTC timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: MutationEvent,
}

/// Current UTC time as ISO 8601 with a `Z` suffix.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Derive the event log path for a data root.
pub fn event_log_path(data_root: &Path) -> PathBuf {
    data_root.join("events.jsonl")
}

/// Append an event to the journal.
pub fn append_event(data_root: &Path, event: MutationEvent) -> Result<(), String> {
    let path = event_log_path(data_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("cannot create data dir: {}", e))?;
    }

    let te = TimestampedEvent {
        ts: now_iso8601(),
        event,
    };
    let json = serde_json::to_string(&te).map_err(|e| format!("JSON serialize error: {}", e))?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open event log {}: {}", path.display(), e))?;

    writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;

    Ok(())
}

/// Read the most recent `limit` events, oldest first. A missing journal is empty.
/// Lines that do not parse are skipped.
pub fn read_events(data_root: &Path, limit: usize) -> Result<Vec<TimestampedEvent>, String> {
    let path = event_log_path(data_root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read event log {}: {}", path.display(), e))?;
    let events: Vec<TimestampedEvent> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();
    let skip = events.len().saturating_sub(limit);
    Ok(events.into_iter().skip(skip).collect())
}
