/*!
 * Remote glossary synchronization.
 *
 * Keeps one remote glossary per (glossary, source language, target language)
 * mirroring the local entries, replacing it when the entries change and
 * tearing it down with its glossary.
 */

pub mod manager;
pub mod models;

pub use manager::GlossarySyncManager;
pub use models::{SyncKey, SyncState};
