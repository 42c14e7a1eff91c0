use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::Repository;

/// Where a glossary stands for one language pair relative to its remote copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// The pair has no entries, nothing to upload
    NoRemoteNeeded,
    /// Entries exist but were never uploaded
    Unsynced,
    /// The remote copy mirrors the current entries
    Synced,
    /// Entries changed since the last upload
    Stale,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::NoRemoteNeeded => write!(f, "no_remote_needed"),
            SyncState::Unsynced => write!(f, "unsynced"),
            SyncState::Synced => write!(f, "synced"),
            SyncState::Stale => write!(f, "stale"),
        }
    }
}

/// Identity of one remote glossary: a local glossary and a language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub glossary_id: String,
    pub source_language: String,
    pub target_language: String,
}

impl SyncKey {
    /// Build a key with normalized language codes
    pub fn new(glossary_id: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            glossary_id: glossary_id.to_string(),
            source_language: Repository::normalize_code(source_language),
            target_language: Repository::normalize_code(target_language),
        }
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}->{})", self.glossary_id, self.source_language, self.target_language)
    }
}
