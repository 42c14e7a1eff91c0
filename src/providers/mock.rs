/*!
 * Mock glossary provider for testing.
 *
 * Keeps remote glossaries in memory, counts calls and can be told to fail
 * creations or deletions with a chosen error:
 * - `MockGlossaryProvider::new()` - always succeeds
 * - `MockGlossaryProvider::failing_creates(err)` - every create fails
 * - `MockGlossaryProvider::failing_deletes(err)` - every delete fails
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::RemoteError;
use crate::providers::{GlossaryProvider, RemoteGlossary};

/// A create call as the mock received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    pub entries_tsv: String,
}

/// In-memory glossary provider
#[derive(Debug, Default)]
pub struct MockGlossaryProvider {
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    next_id: AtomicUsize,
    /// Glossaries currently alive on the "remote", by id
    live: Mutex<BTreeMap<String, RemoteGlossary>>,
    creates: Mutex<Vec<CreateCall>>,
    create_failure: Mutex<Option<RemoteError>>,
    delete_failure: Mutex<Option<RemoteError>>,
    create_delay: Mutex<Option<Duration>>,
    delete_delay: Mutex<Option<Duration>>,
}

impl MockGlossaryProvider {
    /// Create a mock that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose creates fail with `error`
    pub fn failing_creates(error: RemoteError) -> Self {
        let mock = Self::new();
        mock.set_create_failure(Some(error));
        mock
    }

    /// Create a mock whose deletes fail with `error`
    pub fn failing_deletes(error: RemoteError) -> Self {
        let mock = Self::new();
        mock.set_delete_failure(Some(error));
        mock
    }

    /// Slow down creates, to widen race windows in concurrency tests
    pub fn with_create_delay(self, delay: Duration) -> Self {
        *self.create_delay.lock() = Some(delay);
        self
    }

    /// Slow down deletes, to widen teardown windows in concurrency tests
    pub fn with_delete_delay(self, delay: Duration) -> Self {
        *self.delete_delay.lock() = Some(delay);
        self
    }

    pub fn set_create_failure(&self, error: Option<RemoteError>) {
        *self.create_failure.lock() = error;
    }

    pub fn set_delete_failure(&self, error: Option<RemoteError>) {
        *self.delete_failure.lock() = error;
    }

    /// Number of create calls, failed ones included
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of delete calls, failed ones included
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Every create call received, in order
    pub fn recorded_creates(&self) -> Vec<CreateCall> {
        self.creates.lock().clone()
    }

    /// TSV payload of the most recent create call
    pub fn last_payload(&self) -> Option<String> {
        self.creates.lock().last().map(|c| c.entries_tsv.clone())
    }

    /// Ids of the glossaries created and not deleted since
    pub fn live_glossary_ids(&self) -> Vec<String> {
        self.live.lock().keys().cloned().collect()
    }

    pub fn is_live(&self, glossary_id: &str) -> bool {
        self.live.lock().contains_key(glossary_id)
    }
}

#[async_trait]
impl GlossaryProvider for MockGlossaryProvider {
    async fn create_glossary(
        &self,
        name: &str,
        source_language: &str,
        target_language: &str,
        entries_tsv: &str,
    ) -> Result<RemoteGlossary, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.creates.lock().push(CreateCall {
            name: name.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            entries_tsv: entries_tsv.to_string(),
        });

        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.create_failure.lock().clone() {
            return Err(error);
        }

        let id = format!("mock-glossary-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let glossary = RemoteGlossary {
            glossary_id: id.clone(),
            name: name.to_string(),
            entry_count: entries_tsv.lines().filter(|l| !l.is_empty()).count() as i64,
        };
        self.live.lock().insert(id, glossary.clone());
        Ok(glossary)
    }

    async fn delete_glossary(&self, glossary_id: &str) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delete_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.delete_failure.lock().clone() {
            return Err(error);
        }

        match self.live.lock().remove(glossary_id) {
            Some(_) => Ok(()),
            None => Err(RemoteError::NotFound(format!("Glossary {}", glossary_id))),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
