/*!
 * Tests for on-disk persistence of glossaries, mappings and configuration
 */

use tempfile::tempdir;

use termguard::app_config::Config;
use termguard::database::connection::DatabaseConnection;
use termguard::database::models::{DeepLGlossaryMapping, GlossaryEntry, GlossaryRecord};
use termguard::database::Repository;

use crate::common;

#[tokio::test]
async fn test_fileDatabase_shouldSurviveReopen() {
    common::init_logger();
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("glossary.db");

    let glossary = GlossaryRecord::new("Empire").for_target_language("de");
    {
        let repo = Repository::new(DatabaseConnection::new(&db_path).unwrap());
        repo.create_glossary(&glossary).await.unwrap();
        repo.insert_entry(&GlossaryEntry::new(&glossary.id, "Imperator", "Kaiser", "de"))
            .await
            .unwrap();
        let entries = repo.get_entries(&glossary.id).await.unwrap();
        repo.insert_deepl_mapping(&DeepLGlossaryMapping::new(
            &glossary.id,
            "en",
            "de",
            "remote-1",
            "Empire (EN->DE)",
            1,
            Repository::hash_entries(&entries),
        ))
        .await
        .unwrap();
    }

    let repo = Repository::new(DatabaseConnection::new(&db_path).unwrap());

    assert_eq!(repo.get_glossary(&glossary.id).await.unwrap(), Some(glossary.clone()));
    assert_eq!(repo.get_entries(&glossary.id).await.unwrap().len(), 1);
    let mapping = repo.get_deepl_mapping(&glossary.id, "en", "de").await.unwrap().unwrap();
    assert_eq!(mapping.deepl_glossary_id, "remote-1");
    assert!(!repo.does_mapping_need_resync(&glossary.id, "en", "de").await.unwrap());
}

#[tokio::test]
async fn test_deleteGlossary_shouldCascadeToEntriesAndMappings() {
    let repo = common::create_repository();
    let glossary = common::seed_glossary(&repo, "Empire", "de", &[("Imperator", "Kaiser", false)]).await;
    repo.insert_deepl_mapping(&DeepLGlossaryMapping::new(
        &glossary.id,
        "en",
        "de",
        "remote-1",
        "Empire (EN->DE)",
        1,
        "hash",
    ))
    .await
    .unwrap();

    assert!(repo.delete_glossary(&glossary.id).await.unwrap());

    assert!(repo.get_entries(&glossary.id).await.unwrap().is_empty());
    assert!(repo.get_all_deepl_mappings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_databaseStats_shouldCountEveryTable() {
    let repo = common::create_repository();
    let empire = common::seed_glossary(&repo, "Empire", "de", &[("Imperator", "Kaiser", false), ("Reikland", "Reikland", false)]).await;
    common::seed_glossary(&repo, "Dwarfs", "de", &[("Karak", "Karak", true)]).await;
    repo.insert_deepl_mapping(&DeepLGlossaryMapping::new(
        &empire.id,
        "en",
        "de",
        "remote-1",
        "Empire (EN->DE)",
        2,
        "hash",
    ))
    .await
    .unwrap();

    let stats = repo.connection().stats().await.unwrap();

    assert_eq!((stats.glossary_count, stats.entry_count, stats.mapping_count), (2, 3, 1));
    assert_eq!(stats.to_string(), "Glossaries: 2, Entries: 3, Remote mappings: 1");
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    common::init_logger();
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.source_language, created.source_language);
    assert_eq!(reloaded.matching, created.matching);
    assert!(reloaded.validate().is_ok());
}

#[test]
fn test_databasePath_fromConfig_shouldOverrideDefault() {
    let mut config = Config::default();
    config.database_path = Some("/tmp/termguard/custom.db".to_string());

    assert_eq!(
        config.database_path().unwrap(),
        std::path::PathBuf::from("/tmp/termguard/custom.db")
    );
}
