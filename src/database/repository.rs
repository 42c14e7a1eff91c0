/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for glossary, entry and remote
 * mapping persistence, abstracting away the SQL details.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{
    DeepLGlossaryMapping, EntryUpdate, GlossaryEntry, GlossaryRecord, GlossaryStatistics,
    SyncStatus,
};
use crate::glossary::models::LanguageScope;

const ENTRY_COLUMNS: &str = "id, glossary_id, source_term, target_term, target_language_code, \
     case_sensitive, notes, category, created_at, updated_at";

const MAPPING_COLUMNS: &str = "id, twmt_glossary_id, source_language_code, target_language_code, \
     deepl_glossary_id, deepl_glossary_name, entry_count, content_hash, sync_status, \
     synced_at, created_at, updated_at";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Row Mapping
    // =========================================================================

    fn parse_glossary_row(row: &Row) -> rusqlite::Result<GlossaryRecord> {
        Ok(GlossaryRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            game_code: row.get(3)?,
            target_language_code: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn parse_entry_row(row: &Row) -> rusqlite::Result<GlossaryEntry> {
        Ok(GlossaryEntry {
            id: row.get(0)?,
            glossary_id: row.get(1)?,
            source_term: row.get(2)?,
            target_term: row.get(3)?,
            target_language_code: row.get(4)?,
            case_sensitive: row.get::<_, i64>(5)? != 0,
            notes: row.get(6)?,
            category: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn parse_mapping_row(row: &Row) -> rusqlite::Result<DeepLGlossaryMapping> {
        Ok(DeepLGlossaryMapping {
            id: row.get(0)?,
            twmt_glossary_id: row.get(1)?,
            source_language_code: row.get(2)?,
            target_language_code: row.get(3)?,
            deepl_glossary_id: row.get(4)?,
            deepl_glossary_name: row.get(5)?,
            entry_count: row.get(6)?,
            content_hash: row.get(7)?,
            sync_status: row
                .get::<_, String>(8)?
                .parse()
                .unwrap_or(SyncStatus::Error),
            synced_at: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    /// Language codes are stored trimmed and lowercase
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_lowercase()
    }

    // =========================================================================
    // Glossary Operations
    // =========================================================================

    /// Create a new glossary
    pub async fn create_glossary(&self, glossary: &GlossaryRecord) -> Result<()> {
        let glossary = glossary.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO glossaries (
                        id, name, description, game_code, target_language_code, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        glossary.id,
                        glossary.name,
                        glossary.description,
                        glossary.game_code,
                        glossary.target_language_code.as_deref().map(Self::normalize_code),
                        glossary.created_at,
                        glossary.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a glossary by ID
    pub async fn get_glossary(&self, glossary_id: &str) -> Result<Option<GlossaryRecord>> {
        let glossary_id = glossary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, name, description, game_code, target_language_code, created_at, updated_at
                        FROM glossaries WHERE id = ?1
                        "#,
                        [&glossary_id],
                        Self::parse_glossary_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// List all glossaries ordered by name
    pub async fn list_glossaries(&self) -> Result<Vec<GlossaryRecord>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, name, description, game_code, target_language_code, created_at, updated_at
                    FROM glossaries
                    ORDER BY name, rowid
                    "#,
                )?;
                let glossaries = stmt
                    .query_map([], Self::parse_glossary_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(glossaries)
            })
            .await
    }

    /// Glossaries that apply to a scope: universal ones plus the scope's game,
    /// restricted to the scope's target language where a glossary declares one
    pub async fn get_applicable_glossaries(
        &self,
        scope: &LanguageScope,
    ) -> Result<Vec<GlossaryRecord>> {
        let game_code = scope.game_code.clone();
        let target_language = Self::normalize_code(&scope.target_language_code);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, name, description, game_code, target_language_code, created_at, updated_at
                    FROM glossaries
                    WHERE (game_code IS NULL OR game_code = ?1)
                      AND (target_language_code IS NULL OR target_language_code = ?2)
                    ORDER BY game_code IS NULL, name, rowid
                    "#,
                )?;
                let glossaries = stmt
                    .query_map(params![game_code, target_language], Self::parse_glossary_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(glossaries)
            })
            .await
    }

    /// Delete a glossary; entries and mapping rows cascade
    pub async fn delete_glossary(&self, glossary_id: &str) -> Result<bool> {
        let glossary_id = glossary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM glossaries WHERE id = ?1", [&glossary_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    fn insert_entry_sync(conn: &Connection, entry: &GlossaryEntry) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO glossary_entries (
                id, glossary_id, source_term, target_term, target_language_code,
                case_sensitive, notes, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                entry.id,
                entry.glossary_id,
                entry.source_term,
                entry.target_term,
                Self::normalize_code(&entry.target_language_code),
                entry.case_sensitive as i64,
                entry.notes,
                entry.category,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Insert a single entry
    pub async fn insert_entry(&self, entry: &GlossaryEntry) -> Result<()> {
        let entry = entry.clone();

        self.db
            .execute_async(move |conn| Self::insert_entry_sync(conn, &entry))
            .await
    }

    /// Insert entries in one transaction
    pub async fn insert_entries(&self, entries: Vec<GlossaryEntry>) -> Result<usize> {
        self.db
            .transaction_async(move |tx| {
                for entry in &entries {
                    Self::insert_entry_sync(tx, entry)?;
                }
                Ok(entries.len())
            })
            .await
    }

    /// Get an entry by ID
    pub async fn get_entry(&self, entry_id: &str) -> Result<Option<GlossaryEntry>> {
        let entry_id = entry_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!("SELECT {} FROM glossary_entries WHERE id = ?1", ENTRY_COLUMNS),
                        [&entry_id],
                        Self::parse_entry_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Apply an explicit update to an entry; returns the updated entry if it exists
    pub async fn update_entry(
        &self,
        entry_id: &str,
        update: EntryUpdate,
    ) -> Result<Option<GlossaryEntry>> {
        let entry_id = entry_id.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .transaction_async(move |tx| {
                let existing = tx
                    .query_row(
                        &format!("SELECT {} FROM glossary_entries WHERE id = ?1", ENTRY_COLUMNS),
                        [&entry_id],
                        Self::parse_entry_row,
                    )
                    .optional()?;

                let Some(mut entry) = existing else {
                    return Ok(None);
                };

                if let Some(source_term) = update.source_term {
                    entry.source_term = source_term;
                }
                if let Some(target_term) = update.target_term {
                    entry.target_term = target_term;
                }
                if let Some(case_sensitive) = update.case_sensitive {
                    entry.case_sensitive = case_sensitive;
                }
                if let Some(notes) = update.notes {
                    entry.notes = notes;
                }
                if let Some(category) = update.category {
                    entry.category = category;
                }
                entry.updated_at = now;

                tx.execute(
                    r#"
                    UPDATE glossary_entries
                    SET source_term = ?1, target_term = ?2, case_sensitive = ?3,
                        notes = ?4, category = ?5, updated_at = ?6
                    WHERE id = ?7
                    "#,
                    params![
                        entry.source_term,
                        entry.target_term,
                        entry.case_sensitive as i64,
                        entry.notes,
                        entry.category,
                        entry.updated_at,
                        entry.id,
                    ],
                )?;

                Ok(Some(entry))
            })
            .await
    }

    /// Delete an entry
    pub async fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let entry_id = entry_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM glossary_entries WHERE id = ?1", [&entry_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Get all entries of a glossary in insertion order
    pub async fn get_entries(&self, glossary_id: &str) -> Result<Vec<GlossaryEntry>> {
        let glossary_id = glossary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM glossary_entries WHERE glossary_id = ?1 ORDER BY rowid",
                    ENTRY_COLUMNS
                ))?;
                let entries = stmt
                    .query_map([&glossary_id], Self::parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
    }

    fn get_entries_for_language_sync(
        conn: &Connection,
        glossary_id: &str,
        target_language: &str,
    ) -> Result<Vec<GlossaryEntry>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM glossary_entries WHERE glossary_id = ?1 AND target_language_code = ?2 ORDER BY rowid",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![glossary_id, target_language], Self::parse_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Get the entries of a glossary for one target language
    pub async fn get_entries_for_language(
        &self,
        glossary_id: &str,
        target_language: &str,
    ) -> Result<Vec<GlossaryEntry>> {
        let glossary_id = glossary_id.to_string();
        let target_language = Self::normalize_code(target_language);

        self.db
            .execute_async(move |conn| {
                Self::get_entries_for_language_sync(conn, &glossary_id, &target_language)
            })
            .await
    }

    /// Get every entry applicable to a scope across all applicable glossaries
    pub async fn get_entries_for_scope(&self, scope: &LanguageScope) -> Result<Vec<GlossaryEntry>> {
        let game_code = scope.game_code.clone();
        let target_language = Self::normalize_code(&scope.target_language_code);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT e.id, e.glossary_id, e.source_term, e.target_term, e.target_language_code,
                           e.case_sensitive, e.notes, e.category, e.created_at, e.updated_at
                    FROM glossary_entries e
                    JOIN glossaries g ON g.id = e.glossary_id
                    WHERE e.target_language_code = ?1
                      AND (g.game_code IS NULL OR g.game_code = ?2)
                      AND (g.target_language_code IS NULL OR g.target_language_code = ?1)
                    ORDER BY g.game_code IS NULL, e.rowid
                    "#,
                )?;
                let entries = stmt
                    .query_map(params![target_language, game_code], Self::parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                debug!("Loaded {} glossary entries for scope", entries.len());
                Ok(entries)
            })
            .await
    }

    /// Count the entries of a glossary for one target language
    pub async fn get_entry_count_for_language(
        &self,
        glossary_id: &str,
        target_language: &str,
    ) -> Result<i64> {
        let glossary_id = glossary_id.to_string();
        let target_language = Self::normalize_code(target_language);

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM glossary_entries WHERE glossary_id = ?1 AND target_language_code = ?2",
                    params![glossary_id, target_language],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    /// Order-independent SHA256 over the term content of a set of entries
    pub fn hash_entries(entries: &[GlossaryEntry]) -> String {
        let mut triples: Vec<(&str, &str, bool)> = entries
            .iter()
            .map(|e| (e.source_term.as_str(), e.target_term.as_str(), e.case_sensitive))
            .collect();
        triples.sort_unstable();

        let mut hasher = Sha256::new();
        for (source, target, case_sensitive) in triples {
            hasher.update(source.as_bytes());
            hasher.update([0x1f_u8]);
            hasher.update(target.as_bytes());
            hasher.update([0x1f, case_sensitive as u8, 0x1e]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Content hash of a glossary's entries for one target language
    pub async fn compute_content_hash(
        &self,
        glossary_id: &str,
        target_language: &str,
    ) -> Result<String> {
        let entries = self.get_entries_for_language(glossary_id, target_language).await?;
        Ok(Self::hash_entries(&entries))
    }

    /// Statistics for one glossary
    pub async fn get_glossary_statistics(&self, glossary_id: &str) -> Result<GlossaryStatistics> {
        let entries = self.get_entries(glossary_id).await?;
        Ok(GlossaryStatistics::from_entries(&entries))
    }

    // =========================================================================
    // DeepL Mapping Operations
    // =========================================================================

    /// Get the mapping for a glossary and language pair
    pub async fn get_deepl_mapping(
        &self,
        glossary_id: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<DeepLGlossaryMapping>> {
        let glossary_id = glossary_id.to_string();
        let source_language = Self::normalize_code(source_language);
        let target_language = Self::normalize_code(target_language);

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM deepl_glossary_mappings
                             WHERE twmt_glossary_id = ?1 AND source_language_code = ?2 AND target_language_code = ?3",
                            MAPPING_COLUMNS
                        ),
                        params![glossary_id, source_language, target_language],
                        Self::parse_mapping_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Whether the remote glossary for a pair no longer mirrors local data.
    ///
    /// A missing mapping needs a sync; an existing one is stale when the entry
    /// count or the content hash of the pair's entries differs from its snapshot.
    pub async fn does_mapping_need_resync(
        &self,
        glossary_id: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<bool> {
        let Some(mapping) = self
            .get_deepl_mapping(glossary_id, source_language, target_language)
            .await?
        else {
            return Ok(true);
        };

        if mapping.sync_status != SyncStatus::Synced {
            return Ok(true);
        }

        let entries = self.get_entries_for_language(glossary_id, target_language).await?;
        if entries.len() as i64 != mapping.entry_count {
            debug!(
                "Mapping {} stale: entry count {} -> {}",
                mapping.id,
                mapping.entry_count,
                entries.len()
            );
            return Ok(true);
        }

        Ok(Self::hash_entries(&entries) != mapping.content_hash)
    }

    /// Insert a mapping row
    pub async fn insert_deepl_mapping(&self, mapping: &DeepLGlossaryMapping) -> Result<()> {
        let mapping = mapping.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO deepl_glossary_mappings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                        MAPPING_COLUMNS
                    ),
                    params![
                        mapping.id,
                        mapping.twmt_glossary_id,
                        Self::normalize_code(&mapping.source_language_code),
                        Self::normalize_code(&mapping.target_language_code),
                        mapping.deepl_glossary_id,
                        mapping.deepl_glossary_name,
                        mapping.entry_count,
                        mapping.content_hash,
                        mapping.sync_status.to_string(),
                        mapping.synced_at,
                        mapping.created_at,
                        mapping.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Delete a mapping row by ID
    pub async fn delete_deepl_mapping(&self, mapping_id: &str) -> Result<bool> {
        let mapping_id = mapping_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted =
                    conn.execute("DELETE FROM deepl_glossary_mappings WHERE id = ?1", [&mapping_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Get every mapping of a glossary across language pairs
    pub async fn get_deepl_mappings_for_glossary(
        &self,
        glossary_id: &str,
    ) -> Result<Vec<DeepLGlossaryMapping>> {
        let glossary_id = glossary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM deepl_glossary_mappings WHERE twmt_glossary_id = ?1 ORDER BY rowid",
                    MAPPING_COLUMNS
                ))?;
                let mappings = stmt
                    .query_map([&glossary_id], Self::parse_mapping_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(mappings)
            })
            .await
    }

    /// Delete every mapping row of a glossary
    pub async fn delete_deepl_mappings_for_glossary(&self, glossary_id: &str) -> Result<usize> {
        let glossary_id = glossary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM deepl_glossary_mappings WHERE twmt_glossary_id = ?1",
                    [&glossary_id],
                )?;
                Ok(deleted)
            })
            .await
    }

    /// Get all mappings
    pub async fn get_all_deepl_mappings(&self) -> Result<Vec<DeepLGlossaryMapping>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM deepl_glossary_mappings ORDER BY synced_at DESC, rowid",
                    MAPPING_COLUMNS
                ))?;
                let mappings = stmt
                    .query_map([], Self::parse_mapping_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(mappings)
            })
            .await
    }
}
