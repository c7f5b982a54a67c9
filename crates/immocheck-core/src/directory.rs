use crate::error::{ImmoError, Result};
use crate::record::{DirectoryRecord, UnitKey};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DuplicatePolicy
// ---------------------------------------------------------------------------

/// Which record wins when duplicate keys exist in the table.
///
/// The legacy data contains duplicate keys, and lookups must pick one side
/// deliberately, so the tie-break is a configuration choice rather than an
/// implementation accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    First,
    #[default]
    Last,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::First => "first",
            DuplicatePolicy::Last => "last",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = ImmoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(DuplicatePolicy::First),
            "last" => Ok(DuplicatePolicy::Last),
            _ => Err(ImmoError::InvalidDuplicatePolicy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// The in-memory tenant table, in sheet row order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub records: Vec<DirectoryRecord>,
}

impl Directory {
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current occupant for a unit, resolved under the given duplicate
    /// policy. Returns `None` when no record matches the key.
    pub fn find_occupant(&self, key: &UnitKey, policy: DuplicatePolicy) -> Option<&str> {
        let mut matches = self.records.iter().filter(|r| &r.key == key);
        let found = match policy {
            DuplicatePolicy::First => matches.next(),
            DuplicatePolicy::Last => matches.last(),
        };
        found.map(|r| r.occupant.as_str())
    }

    /// Insert-or-update keyed by the unit. Every record sharing the key is
    /// overwritten, which collapses pre-existing duplicates toward a single
    /// current occupant; a fresh key is appended at the end.
    pub fn upsert(&mut self, key: UnitKey, occupant: impl Into<String>) {
        let occupant = occupant.into();
        let mut hit = false;
        for record in self.records.iter_mut().filter(|r| r.key == key) {
            record.occupant = occupant.clone();
            hit = true;
        }
        if !hit {
            self.records.push(DirectoryRecord::new(key, occupant));
        }
    }

    /// Remove every record whose occupant equals `name` exactly.
    ///
    /// Known defect carried over from the legacy tool: two different units
    /// occupied by the same name are both deleted. Kept because existing
    /// agent workflows select rows by displayed name; `remove_by_key` is the
    /// corrected path.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.occupant != name);
        before - self.records.len()
    }

    /// Remove every record for one unit. Returns the number removed
    /// (more than one when the table holds duplicate keys).
    pub fn remove_by_key(&mut self, key: &UnitKey) -> usize {
        let before = self.records.len();
        self.records.retain(|r| &r.key != key);
        before - self.records.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
