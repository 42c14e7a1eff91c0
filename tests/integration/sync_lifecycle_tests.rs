/*!
 * Lifecycle tests of remote glossaries against the mock provider
 */

use std::sync::Arc;
use std::time::Duration;

use termguard::database::models::{EntryUpdate, GlossaryEntry};
use termguard::errors::RemoteError;
use termguard::providers::MockGlossaryProvider;
use termguard::{GlossaryError, GlossaryProvider, GlossarySyncManager, SyncState};

use crate::common;

#[tokio::test]
async fn test_ensureTwice_withUnchangedEntries_shouldCreateOnce() {
    let (manager, mock) = common::create_sync_manager();
    let glossary = common::seed_glossary(
        manager.repository(),
        "Empire",
        "de",
        &[("Imperator", "Kaiser", false), ("Reikland", "Reikland", false)],
    )
    .await;

    let first = manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().unwrap();
    let second = manager.ensure_glossary_synced(&glossary.id, "EN", "de").await.unwrap().unwrap();

    assert_eq!(first.deepl_glossary_id, second.deepl_glossary_id);
    assert_eq!(mock.create_calls(), 1);
    assert_eq!(mock.delete_calls(), 0);
    assert_eq!(first.entry_count, 2);
    assert_eq!(first.deepl_glossary_name, "Empire (EN->DE)");
    let creates = mock.recorded_creates();
    assert_eq!(creates.len(), 1);
    assert_eq!((creates[0].source_language.as_str(), creates[0].target_language.as_str()), ("en", "de"));
    assert_eq!(
        manager.sync_state(&glossary.id, "en", "de").await.unwrap(),
        SyncState::Synced
    );
}

#[tokio::test]
async fn test_entryEdit_shouldReplaceRemoteGlossary() {
    let (manager, mock) = common::create_sync_manager();
    let repo = manager.repository().clone();
    let glossary = common::seed_glossary(&repo, "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    let first = manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().unwrap();

    let entry = repo.get_entries(&glossary.id).await.unwrap().remove(0);
    repo.update_entry(
        &entry.id,
        EntryUpdate {
            target_term: Some("Imperator".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(manager.sync_state(&glossary.id, "en", "de").await.unwrap(), SyncState::Stale);

    let second = manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().unwrap();

    assert_ne!(first.deepl_glossary_id, second.deepl_glossary_id);
    assert_eq!(mock.live_glossary_ids(), vec![second.deepl_glossary_id.clone()]);
    assert_eq!(mock.last_payload().as_deref(), Some("Imperator\tImperator\n"));
}

#[tokio::test]
async fn test_forceResync_shouldAlwaysDeleteThenCreate() {
    let (manager, mock) = common::create_sync_manager();
    let glossary = common::seed_glossary(manager.repository(), "Empire", "de", &[("Imperator", "Kaiser", false)]).await;

    let first = manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().unwrap();
    let forced = manager.force_resync(&glossary.id, "en", "de").await.unwrap().unwrap();

    assert_eq!((mock.create_calls(), mock.delete_calls()), (2, 1));
    assert!(!mock.is_live(&first.deepl_glossary_id));
    assert!(mock.is_live(&forced.deepl_glossary_id));

    let mappings = manager
        .repository()
        .get_deepl_mappings_for_glossary(&glossary.id)
        .await
        .unwrap();
    assert_eq!(mappings.len(), 1);
}

#[tokio::test]
async fn test_forceResync_afterLastEntryDeleted_shouldTearDown() {
    let (manager, mock) = common::create_sync_manager();
    let repo = manager.repository().clone();
    let glossary = common::seed_glossary(&repo, "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap();

    let entry = repo.get_entries(&glossary.id).await.unwrap().remove(0);
    repo.delete_entry(&entry.id).await.unwrap();

    let result = manager.force_resync(&glossary.id, "en", "de").await.unwrap();

    assert!(result.is_none());
    assert!(mock.live_glossary_ids().is_empty());
    assert!(repo.get_all_deepl_mappings().await.unwrap().is_empty());
    assert_eq!(
        manager.sync_state(&glossary.id, "en", "de").await.unwrap(),
        SyncState::NoRemoteNeeded
    );
}

#[tokio::test]
async fn test_concurrentEnsure_shouldShareOneRemoteGlossary() {
    let mock = Arc::new(MockGlossaryProvider::new().with_create_delay(Duration::from_millis(20)));
    let manager = GlossarySyncManager::new(common::create_repository(), mock.clone());
    let glossary = common::seed_glossary(manager.repository(), "Empire", "de", &[("Imperator", "Kaiser", false)]).await;

    let (a, b, c) = tokio::join!(
        manager.ensure_glossary_synced(&glossary.id, "en", "de"),
        manager.ensure_glossary_synced(&glossary.id, "en", "de"),
        manager.ensure_glossary_synced(&glossary.id, "en", "de"),
    );

    let ids: Vec<String> = [a, b, c]
        .into_iter()
        .map(|r| r.unwrap().unwrap().deepl_glossary_id)
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(mock.create_calls(), 1);
}

#[tokio::test]
async fn test_remoteCreateFailure_shouldLeaveNoMapping() {
    let mock = Arc::new(MockGlossaryProvider::failing_creates(RemoteError::QuotaExceeded(
        "Character limit reached".into(),
    )));
    let manager = GlossarySyncManager::new(common::create_repository(), mock.clone());
    let glossary = common::seed_glossary(manager.repository(), "Empire", "de", &[("Imperator", "Kaiser", false)]).await;

    let result = manager.ensure_glossary_synced(&glossary.id, "en", "de").await;

    let err = result.unwrap_err();
    assert!(err.remote().map(RemoteError::requires_user_action).unwrap_or(false));
    assert_eq!(
        manager.sync_state(&glossary.id, "en", "de").await.unwrap(),
        SyncState::Unsynced
    );

    mock.set_create_failure(None);
    assert!(manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleteGlossary_shouldRemoveEveryRemoteCopy() {
    let (manager, mock) = common::create_sync_manager();
    let repo = manager.repository().clone();
    let glossary = common::seed_glossary(&repo, "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    repo.insert_entry(&GlossaryEntry::new(&glossary.id, "Imperator", "Empereur", "fr"))
        .await
        .unwrap();

    manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap();
    manager.ensure_glossary_synced(&glossary.id, "en", "fr").await.unwrap();
    assert_eq!(mock.live_glossary_ids().len(), 2);

    manager.delete_glossary(&glossary.id).await.unwrap();

    assert!(mock.live_glossary_ids().is_empty());
    assert!(repo.get_glossary(&glossary.id).await.unwrap().is_none());
    assert!(repo.get_all_deepl_mappings().await.unwrap().is_empty());

    let again = manager.delete_glossary(&glossary.id).await;
    assert!(matches!(again, Err(GlossaryError::NotFound(_))));
}

#[tokio::test]
async fn test_deleteMappings_withRemoteAlreadyGone_shouldStillCleanUp() {
    let (manager, mock) = common::create_sync_manager();
    let glossary = common::seed_glossary(manager.repository(), "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    let mapping = manager.ensure_glossary_synced(&glossary.id, "en", "de").await.unwrap().unwrap();

    mock.delete_glossary(&mapping.deepl_glossary_id).await.unwrap();

    assert_eq!(manager.delete_glossary_mappings(&glossary.id).await.unwrap(), 1);
    assert!(manager.repository().get_all_deepl_mappings().await.unwrap().is_empty());
}

/// Every live remote glossary has a mapping row and every row points at a live glossary
async fn assert_remote_matches_mappings(manager: &GlossarySyncManager, mock: &MockGlossaryProvider) {
    let mut mapped: Vec<String> = manager
        .repository()
        .get_all_deepl_mappings()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.deepl_glossary_id)
        .collect();
    mapped.sort();
    assert_eq!(mock.live_glossary_ids(), mapped);
}

async fn seed_two_languages(manager: &GlossarySyncManager) -> String {
    let repo = manager.repository();
    let glossary = common::seed_glossary(repo, "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    repo.insert_entry(&GlossaryEntry::new(&glossary.id, "Imperator", "Imperatore", "it"))
        .await
        .unwrap();
    glossary.id
}

#[tokio::test]
async fn test_deleteMappings_withConcurrentEnsureOfNewPair_shouldNotOrphanRemote() {
    let mock = Arc::new(MockGlossaryProvider::new().with_delete_delay(Duration::from_millis(100)));
    let manager = GlossarySyncManager::new(common::create_repository(), mock.clone());
    let glossary = seed_two_languages(&manager).await;
    manager.ensure_glossary_synced(&glossary, "en", "de").await.unwrap();

    let late_ensure = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        manager.ensure_glossary_synced(&glossary, "en", "it").await
    };
    let (deleted, italian) = tokio::join!(manager.delete_glossary_mappings(&glossary), late_ensure);

    assert_eq!(deleted.unwrap(), 1);
    let italian = italian.unwrap().unwrap();
    assert!(mock.is_live(&italian.deepl_glossary_id));
    assert_remote_matches_mappings(&manager, &mock).await;
}

#[tokio::test]
async fn test_deleteGlossary_withConcurrentEnsure_shouldLeaveNothingBehind() {
    let mock = Arc::new(MockGlossaryProvider::new().with_delete_delay(Duration::from_millis(100)));
    let manager = GlossarySyncManager::new(common::create_repository(), mock.clone());
    let glossary = seed_two_languages(&manager).await;
    manager.ensure_glossary_synced(&glossary, "en", "de").await.unwrap();

    let late_ensure = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        manager.ensure_glossary_synced(&glossary, "en", "it").await
    };
    let (deleted, italian) = tokio::join!(manager.delete_glossary(&glossary), late_ensure);

    deleted.unwrap();
    assert!(italian.unwrap().is_none());
    assert!(mock.live_glossary_ids().is_empty());
    assert_remote_matches_mappings(&manager, &mock).await;
}

#[tokio::test]
async fn test_deleteGlossary_withFailingRemoteDeletes_shouldStillRemoveLocalState() {
    let mock = Arc::new(MockGlossaryProvider::failing_deletes(RemoteError::Server {
        status_code: 503,
        message: "Service unavailable".into(),
    }));
    let manager = GlossarySyncManager::new(common::create_repository(), mock.clone());
    let glossary = seed_two_languages(&manager).await;
    manager.ensure_glossary_synced(&glossary, "en", "de").await.unwrap();
    manager.ensure_glossary_synced(&glossary, "en", "it").await.unwrap();

    manager.delete_glossary(&glossary).await.unwrap();

    assert_eq!(mock.delete_calls(), 2);
    assert!(manager.repository().get_all_deepl_mappings().await.unwrap().is_empty());
    assert!(manager.repository().get_glossary(&glossary).await.unwrap().is_none());
}
