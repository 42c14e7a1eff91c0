/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for the glossary tables
 * and handles schema migrations for version upgrades.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Foreign keys are a per-connection setting
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS glossaries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            game_code TEXT,
            target_language_code TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_glossaries_game ON glossaries(game_code);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS glossary_entries (
            id TEXT PRIMARY KEY,
            glossary_id TEXT NOT NULL REFERENCES glossaries(id) ON DELETE CASCADE,
            source_term TEXT NOT NULL CHECK (length(source_term) > 0),
            target_term TEXT NOT NULL,
            target_language_code TEXT NOT NULL,
            case_sensitive INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            category TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_glossary_language
            ON glossary_entries(glossary_id, target_language_code);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS deepl_glossary_mappings (
            id TEXT PRIMARY KEY,
            twmt_glossary_id TEXT NOT NULL REFERENCES glossaries(id) ON DELETE CASCADE,
            source_language_code TEXT NOT NULL,
            target_language_code TEXT NOT NULL,
            deepl_glossary_id TEXT NOT NULL,
            deepl_glossary_name TEXT NOT NULL,
            entry_count INTEGER NOT NULL,
            content_hash TEXT NOT NULL,
            sync_status TEXT NOT NULL DEFAULT 'synced',
            synced_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(twmt_glossary_id, source_language_code, target_language_code)
        );

        CREATE INDEX IF NOT EXISTS idx_mappings_glossary ON deepl_glossary_mappings(twmt_glossary_id);
        "#,
    )?;

    info!("Database schema created successfully");
    Ok(())
}

/// Migrate the schema from one version to another
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    let current = from_version;

    if current < SCHEMA_VERSION {
        // No released version predates v1
        return Err(anyhow::anyhow!(
            "Unknown schema version: {}. Cannot migrate.",
            current
        ));
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    info!("Schema migration completed to v{}", SCHEMA_VERSION);
    Ok(())
}
