use crate::error::Result;
use crate::io;
use crate::paths;
use crate::record::UnitKey;
use crate::verdict::Liability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DiagnosticEntry
// ---------------------------------------------------------------------------

/// One diagnosed incident. The ledger is append-only and entirely separate
/// from the directory: deleting a tenant never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub key: UnitKey,
    pub occupant: String,
    /// The agent's free-text description of the issue.
    pub note: String,
    pub liability: Liability,
    /// Model identifier that produced the verdict.
    pub model: String,
    /// Model reply with the trailing verdict tag stripped.
    pub response: String,
}

impl DiagnosticEntry {
    pub fn new(
        key: UnitKey,
        occupant: impl Into<String>,
        note: impl Into<String>,
        liability: Liability,
        model: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            key,
            occupant: occupant.into(),
            note: note.into(),
            liability,
            model: model.into(),
            response: response.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Append / list
// ---------------------------------------------------------------------------

/// Append one entry as a JSON line. Creates the file on first use.
pub fn append(root: &Path, entry: &DiagnosticEntry) -> Result<()> {
    let line = serde_json::to_string(entry)?;
    io::append_text(&paths::history_path(root), &format!("{line}\n"))
}

/// All entries in append order. Lines that fail to parse are skipped with a
/// warning rather than poisoning the whole history.
pub fn list(root: &Path) -> Result<Vec<DiagnosticEntry>> {
    let path = paths::history_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(&path)?;
    let mut entries = Vec::new();
    for line in data.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<DiagnosticEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!(error = %e, "skipping malformed history line"),
        }
    }
    Ok(entries)
}

/// The `limit` most recent entries, newest first.
pub fn recent(root: &Path, limit: usize) -> Result<Vec<DiagnosticEntry>> {
    let mut entries = list(root)?;
    entries.reverse();
    entries.truncate(limit);
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(unit: &str, liability: Liability) -> DiagnosticEntry {
        DiagnosticEntry::new(
            UnitKey::new("Canterane", Some("A".to_string()), unit),
            "Jean",
            "water stain on ceiling",
            liability,
            "gemini-test",
            "The stain comes from the upstairs joint.",
        )
    }

    #[test]
    fn append_then_list_round_trips() {
        let dir = TempDir::new().unwrap();
        append(dir.path(), &entry("10", Liability::Owner)).unwrap();
        append(dir.path(), &entry("11", Liability::Occupant)).unwrap();

        let entries = list(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.unit, "10");
        assert_eq!(entries[1].liability, Liability::Occupant);
    }

    #[test]
    fn list_without_history_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        append(dir.path(), &entry("10", Liability::Owner)).unwrap();
        io::append_text(&paths::history_path(dir.path()), "not json\n").unwrap();
        append(dir.path(), &entry("11", Liability::Contractor)).unwrap();

        let entries = list(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn recent_returns_newest_first() {
        let dir = TempDir::new().unwrap();
        for unit in ["1", "2", "3"] {
            append(dir.path(), &entry(unit, Liability::Owner)).unwrap();
        }
        let newest = recent(dir.path(), 2).unwrap();
        assert_eq!(newest.len(), 2);
        assert_eq!(newest[0].key.unit, "3");
        assert_eq!(newest[1].key.unit, "2");
    }
}
