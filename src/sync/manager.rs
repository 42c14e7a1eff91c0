/*!
 * Sync manager for remote glossary lifecycle.
 *
 * This module handles:
 * - Creating a remote glossary the first time a language pair is needed
 * - Detecting stale remote copies and replacing them
 * - Forced resyncs
 * - Tearing remote copies down when their glossary is deleted
 *
 * Every read-check-write sequence for a key runs under that key's lock, so
 * two concurrent syncs of the same pair cannot both create a remote glossary.
 * Syncs also hold their glossary's lock shared, and teardown holds it
 * exclusively, so no pair can be mapped while its glossary is torn down.
 */

use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::models::{DeepLGlossaryMapping, GlossaryEntry};
use crate::database::Repository;
use crate::errors::{GlossaryError, RemoteError};
use crate::providers::{build_tsv_entries, GlossaryProvider};

use super::models::{SyncKey, SyncState};

fn sync_error(context: &str, error: anyhow::Error) -> GlossaryError {
    GlossaryError::Sync(format!("{}: {:#}", context, error))
}

/// Sync manager mirroring local glossaries onto a remote provider
pub struct GlossarySyncManager {
    /// Repository for database operations
    repo: Repository,
    /// Remote glossary provider
    provider: Arc<dyn GlossaryProvider>,
    /// Async locks, created on first use and pruned once unused
    locks: Mutex<LockRegistry>,
}

#[derive(Default)]
struct LockRegistry {
    glossaries: HashMap<String, Arc<RwLock<()>>>,
    pairs: HashMap<SyncKey, Arc<tokio::sync::Mutex<()>>>,
}

impl GlossarySyncManager {
    /// Create a new sync manager
    pub fn new(repo: Repository, provider: Arc<dyn GlossaryProvider>) -> Self {
        Self {
            repo,
            provider,
            locks: Mutex::new(LockRegistry::default()),
        }
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Name of the remote provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn glossary_lock(&self, glossary_id: &str) -> Arc<RwLock<()>> {
        self.locks
            .lock()
            .glossaries
            .entry(glossary_id.to_string())
            .or_default()
            .clone()
    }

    fn pair_lock(&self, key: &SyncKey) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().pairs.entry(key.clone()).or_default().clone()
    }

    /// Drop locks nobody holds or waits on; clones are only taken under the
    /// registry lock, so a count of one means the registry is the last owner
    fn prune_locks(&self) {
        let mut locks = self.locks.lock();
        locks.glossaries.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.pairs.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Remote glossary name for a key
    pub fn remote_glossary_name(glossary_name: &str, key: &SyncKey) -> String {
        format!(
            "{} ({}->{})",
            glossary_name,
            key.source_language.to_uppercase(),
            key.target_language.to_uppercase()
        )
    }

    // =========================================================================
    // Sync Operations
    // =========================================================================

    /// Make sure a fresh remote glossary exists for the pair.
    ///
    /// Returns `None` when the pair has no entries. A fresh mapping is returned
    /// without any remote call; a stale one is replaced.
    pub async fn ensure_glossary_synced(
        &self,
        glossary_id: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<DeepLGlossaryMapping>, GlossaryError> {
        let key = SyncKey::new(glossary_id, source_language, target_language);
        let result = {
            let glossary_lock = self.glossary_lock(&key.glossary_id);
            let _shared = glossary_lock.read().await;
            let pair_lock = self.pair_lock(&key);
            let _guard = pair_lock.lock().await;
            self.ensure_locked(&key).await
        };
        self.prune_locks();
        result
    }

    async fn ensure_locked(&self, key: &SyncKey) -> Result<Option<DeepLGlossaryMapping>, GlossaryError> {
        let entries = self.load_entries(key).await?;
        if entries.is_empty() {
            debug!("No entries for {}, no remote glossary needed", key);
            return Ok(None);
        }

        let existing = self
            .repo
            .get_deepl_mapping(&key.glossary_id, &key.source_language, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to load mapping", e))?;

        if let Some(mapping) = existing {
            let stale = self
                .repo
                .does_mapping_need_resync(&key.glossary_id, &key.source_language, &key.target_language)
                .await
                .map_err(|e| sync_error("Failed to check mapping freshness", e))?;

            if !stale {
                debug!("Remote glossary {} for {} is up to date", mapping.deepl_glossary_id, key);
                return Ok(Some(mapping));
            }

            info!("Remote glossary for {} is stale, replacing it", key);
            self.remove_mapping(&mapping).await?;
        }

        self.create_remote(key, &entries).await.map(Some)
    }

    /// Replace the remote glossary of a pair regardless of freshness.
    ///
    /// An existing remote glossary is always deleted; a new one is created
    /// only when the pair still has entries.
    pub async fn force_resync(
        &self,
        glossary_id: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<DeepLGlossaryMapping>, GlossaryError> {
        let key = SyncKey::new(glossary_id, source_language, target_language);
        let result = {
            let glossary_lock = self.glossary_lock(&key.glossary_id);
            let _shared = glossary_lock.read().await;
            let pair_lock = self.pair_lock(&key);
            let _guard = pair_lock.lock().await;
            self.force_locked(&key).await
        };
        self.prune_locks();
        result
    }

    async fn force_locked(&self, key: &SyncKey) -> Result<Option<DeepLGlossaryMapping>, GlossaryError> {
        let existing = self
            .repo
            .get_deepl_mapping(&key.glossary_id, &key.source_language, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to load mapping", e))?;
        if let Some(mapping) = existing {
            self.remove_mapping(&mapping).await?;
        }

        let entries = self.load_entries(key).await?;
        if entries.is_empty() {
            debug!("No entries for {} after forced resync", key);
            return Ok(None);
        }

        self.create_remote(key, &entries).await.map(Some)
    }

    /// Ensure several glossaries for one pair; failures are logged and skipped
    pub async fn sync_glossaries(
        &self,
        glossary_ids: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Vec<DeepLGlossaryMapping> {
        let mut mappings = Vec::new();

        for glossary_id in glossary_ids {
            match self
                .ensure_glossary_synced(glossary_id, source_language, target_language)
                .await
            {
                Ok(Some(mapping)) => mappings.push(mapping),
                Ok(None) => {}
                Err(e) => warn!("Failed to sync glossary {}: {}", glossary_id, e),
            }
        }

        mappings
    }

    /// Delete every remote glossary of a glossary, then its mapping rows.
    ///
    /// Runs with the glossary locked exclusively, so no sync of any pair can
    /// add a mapping in between. Remote failures are logged and do not stop
    /// the local cleanup. Returns the number of mapping rows deleted.
    pub async fn delete_glossary_mappings(&self, glossary_id: &str) -> Result<usize, GlossaryError> {
        let result = {
            let glossary_lock = self.glossary_lock(glossary_id);
            let _exclusive = glossary_lock.write().await;
            self.teardown_locked(glossary_id).await
        };
        self.prune_locks();
        result
    }

    /// Delete a glossary locally after tearing down its remote copies
    pub async fn delete_glossary(&self, glossary_id: &str) -> Result<(), GlossaryError> {
        let result = {
            let glossary_lock = self.glossary_lock(glossary_id);
            let _exclusive = glossary_lock.write().await;
            self.delete_glossary_locked(glossary_id).await
        };
        self.prune_locks();
        result
    }

    async fn delete_glossary_locked(&self, glossary_id: &str) -> Result<(), GlossaryError> {
        self.teardown_locked(glossary_id).await?;

        if !self.repo.delete_glossary(glossary_id).await? {
            return Err(GlossaryError::NotFound(format!("Glossary {}", glossary_id)));
        }
        Ok(())
    }

    async fn teardown_locked(&self, glossary_id: &str) -> Result<usize, GlossaryError> {
        let mappings = self
            .repo
            .get_deepl_mappings_for_glossary(glossary_id)
            .await
            .map_err(|e| sync_error("Failed to list mappings", e))?;

        join_all(
            mappings
                .iter()
                .map(|mapping| self.delete_remote(&mapping.deepl_glossary_id)),
        )
        .await;

        let deleted = self
            .repo
            .delete_deepl_mappings_for_glossary(glossary_id)
            .await
            .map_err(|e| sync_error("Failed to delete mappings", e))?;

        if deleted > 0 {
            info!("Removed {} remote glossaries of glossary {}", deleted, glossary_id);
        }
        Ok(deleted)
    }

    /// Where a pair stands, without touching the remote
    pub async fn sync_state(
        &self,
        glossary_id: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<SyncState, GlossaryError> {
        let key = SyncKey::new(glossary_id, source_language, target_language);

        let count = self
            .repo
            .get_entry_count_for_language(&key.glossary_id, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to count entries", e))?;
        if count == 0 {
            return Ok(SyncState::NoRemoteNeeded);
        }

        let mapping = self
            .repo
            .get_deepl_mapping(&key.glossary_id, &key.source_language, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to load mapping", e))?;
        if mapping.is_none() {
            return Ok(SyncState::Unsynced);
        }

        let stale = self
            .repo
            .does_mapping_need_resync(&key.glossary_id, &key.source_language, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to check mapping freshness", e))?;

        Ok(if stale { SyncState::Stale } else { SyncState::Synced })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load_entries(&self, key: &SyncKey) -> Result<Vec<GlossaryEntry>, GlossaryError> {
        self.repo
            .get_entries_for_language(&key.glossary_id, &key.target_language)
            .await
            .map_err(|e| sync_error("Failed to load entries", e))
    }

    /// Best-effort remote delete; a glossary already gone counts as deleted
    async fn delete_remote(&self, remote_id: &str) {
        match self.provider.delete_glossary(remote_id).await {
            Ok(()) => debug!("Deleted remote glossary {}", remote_id),
            Err(RemoteError::NotFound(_)) => {
                debug!("Remote glossary {} was already gone", remote_id)
            }
            Err(e) => warn!("Failed to delete remote glossary {}: {}", remote_id, e),
        }
    }

    /// Delete the remote glossary of a mapping, then the mapping row
    async fn remove_mapping(&self, mapping: &DeepLGlossaryMapping) -> Result<(), GlossaryError> {
        self.delete_remote(&mapping.deepl_glossary_id).await;

        self.repo
            .delete_deepl_mapping(&mapping.id)
            .await
            .map_err(|e| sync_error("Failed to delete mapping", e))?;
        Ok(())
    }

    /// Upload the entries and record the new mapping.
    ///
    /// Nothing is written when the create fails. If the row cannot be written
    /// after a successful create, the new remote glossary is deleted again.
    async fn create_remote(
        &self,
        key: &SyncKey,
        entries: &[GlossaryEntry],
    ) -> Result<DeepLGlossaryMapping, GlossaryError> {
        let glossary = self
            .repo
            .get_glossary(&key.glossary_id)
            .await
            .map_err(|e| sync_error("Failed to load glossary", e))?
            .ok_or_else(|| GlossaryError::NotFound(format!("Glossary {}", key.glossary_id)))?;

        let tsv = build_tsv_entries(entries);
        if tsv.is_empty() {
            return Err(GlossaryError::InvalidData(format!("No uploadable entries for {}", key)));
        }

        let name = Self::remote_glossary_name(&glossary.name, key);
        let remote = self
            .provider
            .create_glossary(&name, &key.source_language, &key.target_language, &tsv.content)
            .await?;

        let mapping = DeepLGlossaryMapping::new(
            &key.glossary_id,
            &key.source_language,
            &key.target_language,
            &remote.glossary_id,
            &remote.name,
            entries.len() as i64,
            Repository::hash_entries(entries),
        );

        if let Err(e) = self.repo.insert_deepl_mapping(&mapping).await {
            warn!("Failed to record remote glossary {}, deleting it", remote.glossary_id);
            self.delete_remote(&remote.glossary_id).await;
            return Err(sync_error("Failed to record mapping", e));
        }

        info!(
            "Synced {} entries of '{}' to {} glossary {}",
            tsv.entry_count,
            glossary.name,
            self.provider.name(),
            remote.glossary_id
        );
        Ok(mapping)
    }
}
