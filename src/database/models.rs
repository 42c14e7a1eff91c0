/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Sync status of a remote glossary mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Remote creation requested but not confirmed
    Pending,
    /// Remote glossary exists and mirrors the snapshot
    Synced,
    /// Last sync attempt failed
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "pending"),
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "error" => Ok(SyncStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid sync status: {}", s)),
        }
    }
}

/// A named collection of terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryRecord {
    /// Unique glossary identifier (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Game the glossary belongs to, `None` for a universal glossary
    pub game_code: Option<String>,
    /// Target language the glossary is restricted to, `None` for any
    pub target_language_code: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

impl GlossaryRecord {
    /// Create a new universal glossary
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            game_code: None,
            target_language_code: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Restrict the glossary to one game
    pub fn for_game(mut self, game_code: impl Into<String>) -> Self {
        self.game_code = Some(game_code.into());
        self
    }

    /// Restrict the glossary to one target language
    pub fn for_target_language(mut self, code: impl Into<String>) -> Self {
        self.target_language_code = Some(code.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One source/target term pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Unique entry identifier (UUID)
    pub id: String,
    /// Owning glossary
    pub glossary_id: String,
    /// Term as it appears in source text
    pub source_term: String,
    /// Mandated translation
    pub target_term: String,
    /// Language of `target_term`
    pub target_language_code: String,
    /// Whether matching respects letter case
    pub case_sensitive: bool,
    /// Context for the translator
    pub notes: Option<String>,
    /// Free-form grouping (faction, unit, place, ...)
    pub category: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

impl GlossaryEntry {
    /// Create a new case-insensitive entry
    pub fn new(
        glossary_id: impl Into<String>,
        source_term: impl Into<String>,
        target_term: impl Into<String>,
        target_language_code: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            glossary_id: glossary_id.into(),
            source_term: source_term.into(),
            target_term: target_term.into(),
            target_language_code: target_language_code.into(),
            case_sensitive: false,
            notes: None,
            category: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Set case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Attach translator notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Changes applied by an explicit entry update
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub source_term: Option<String>,
    pub target_term: Option<String>,
    pub case_sensitive: Option<bool>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
    /// `Some(None)` clears the category
    pub category: Option<Option<String>>,
}

/// Local record of a glossary materialized on DeepL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepLGlossaryMapping {
    /// Unique mapping identifier (UUID)
    pub id: String,
    /// Local glossary
    pub twmt_glossary_id: String,
    /// Source language of the remote glossary
    pub source_language_code: String,
    /// Target language of the remote glossary
    pub target_language_code: String,
    /// Opaque remote handle
    pub deepl_glossary_id: String,
    /// Name the remote glossary was created with
    pub deepl_glossary_name: String,
    /// Number of local entries at sync time
    pub entry_count: i64,
    /// SHA-256 over the synced entries
    pub content_hash: String,
    /// Sync status
    pub sync_status: SyncStatus,
    /// Sync timestamp (RFC 3339)
    pub synced_at: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

impl DeepLGlossaryMapping {
    /// Create a mapping for a freshly created remote glossary
    pub fn new(
        twmt_glossary_id: impl Into<String>,
        source_language_code: impl Into<String>,
        target_language_code: impl Into<String>,
        deepl_glossary_id: impl Into<String>,
        deepl_glossary_name: impl Into<String>,
        entry_count: i64,
        content_hash: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            twmt_glossary_id: twmt_glossary_id.into(),
            source_language_code: source_language_code.into(),
            target_language_code: target_language_code.into(),
            deepl_glossary_id: deepl_glossary_id.into(),
            deepl_glossary_name: deepl_glossary_name.into(),
            entry_count,
            content_hash: content_hash.into(),
            sync_status: SyncStatus::Synced,
            synced_at: now.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Aggregate figures for one glossary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlossaryStatistics {
    /// Total number of entries
    pub total_entries: usize,
    /// Entries per target language
    pub entries_by_language: HashMap<String, usize>,
    /// Entries per category, uncategorized entries excluded
    pub entries_by_category: HashMap<String, usize>,
    /// Number of case-sensitive entries
    pub case_sensitive_entries: usize,
    /// Number of entries carrying notes
    pub entries_with_notes: usize,
}

impl GlossaryStatistics {
    /// Compute statistics from a set of entries
    pub fn from_entries(entries: &[GlossaryEntry]) -> Self {
        let mut stats = Self {
            total_entries: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            *stats
                .entries_by_language
                .entry(entry.target_language_code.clone())
                .or_insert(0) += 1;

            if let Some(category) = entry.category.as_deref().filter(|c| !c.trim().is_empty()) {
                *stats.entries_by_category.entry(category.to_string()).or_insert(0) += 1;
            }

            if entry.case_sensitive {
                stats.case_sensitive_entries += 1;
            }

            if entry.notes.as_deref().is_some_and(|n| !n.trim().is_empty()) {
                stats.entries_with_notes += 1;
            }
        }

        stats
    }
}

impl fmt::Display for GlossaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<_> = self.entries_by_language.iter().collect();
        languages.sort();
        let languages = languages
            .iter()
            .map(|(lang, count)| format!("{}={}", lang, count))
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "Entries: {}, Languages: [{}], Case-sensitive: {}, With notes: {}, Categories: {}",
            self.total_entries,
            languages,
            self.case_sensitive_entries,
            self.entries_with_notes,
            self.entries_by_category.len()
        )
    }
}
