/*!
 * Common test utilities for the termguard test suite
 */

use std::sync::{Arc, Once};

use termguard::database::models::{GlossaryEntry, GlossaryRecord};
use termguard::database::Repository;
use termguard::providers::MockGlossaryProvider;
use termguard::sync::GlossarySyncManager;

static INIT_LOGGER: Once = Once::new();

/// Route log output through the test harness, once per process
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates an in-memory repository
pub fn create_repository() -> Repository {
    init_logger();
    Repository::new_in_memory().expect("Failed to create in-memory repository")
}

/// Creates a glossary holding the given (source, target, case_sensitive) terms
pub async fn seed_glossary(
    repo: &Repository,
    name: &str,
    language: &str,
    terms: &[(&str, &str, bool)],
) -> GlossaryRecord {
    let glossary = GlossaryRecord::new(name);
    repo.create_glossary(&glossary).await.expect("Failed to create glossary");

    let entries = terms
        .iter()
        .map(|(source, target, case_sensitive)| {
            GlossaryEntry::new(&glossary.id, *source, *target, language).case_sensitive(*case_sensitive)
        })
        .collect();
    repo.insert_entries(entries).await.expect("Failed to insert entries");

    glossary
}

/// Case-insensitive German entries for the given terms
pub fn entries(terms: &[(&str, &str)]) -> Vec<GlossaryEntry> {
    terms
        .iter()
        .map(|(source, target)| GlossaryEntry::new("test", *source, *target, "de"))
        .collect()
}

/// A sync manager over a fresh repository and mock provider
pub fn create_sync_manager() -> (GlossarySyncManager, Arc<MockGlossaryProvider>) {
    let mock = Arc::new(MockGlossaryProvider::new());
    let manager = GlossarySyncManager::new(create_repository(), mock.clone());
    (manager, mock)
}
