/*!
 * End-to-end tests of the glossary side of a translation batch:
 * filter terms for the prompt, check the translation, force missing terms
 */

use termguard::app_config::MatchingConfig;
use termguard::database::models::{GlossaryEntry, GlossaryRecord};
use termguard::{GlossaryError, GlossaryService, LanguageScope};

use crate::common;

async fn create_service() -> GlossaryService {
    let repo = common::create_repository();
    common::seed_glossary(
        &repo,
        "Empire",
        "de",
        &[
            ("Imperator", "Kaiser", false),
            ("Reikland", "Reikland", false),
            ("Emperor Karl Franz", "Imperator Karl Franz", false),
        ],
    )
    .await;
    GlossaryService::new(repo, MatchingConfig::default())
}

#[tokio::test]
async fn test_batchWorkflow_withUntranslatedTerm_shouldEndWithoutViolations() {
    let service = create_service().await;
    let scope = LanguageScope::new("de");
    let source = "The Imperator rides to Reikland.";
    let translation = "Der Imperator reitet nach Reikland.";

    let violations = service.check_consistency(source, translation, &scope).await.unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].contains("'Kaiser'"));

    let matches = service.find_matches(source, &scope).await.unwrap();
    let fixed = service.apply_substitutions(source, translation, &matches);
    assert_eq!(fixed, "Der Kaiser reitet nach Reikland.");

    let violations = service.check_consistency(source, &fixed, &scope).await.unwrap();
    assert!(violations.is_empty(), "unexpected violations: {:?}", violations);
}

#[tokio::test]
async fn test_applyGlossary_shouldMatchApplySubstitutions() {
    let service = create_service().await;
    let scope = LanguageScope::new("de");
    let source = "Hail the imperator!";
    let translation = "Heil dem imperator!";

    let matches = service.find_matches(source, &scope).await.unwrap();
    let manual = service.apply_substitutions(source, translation, &matches);
    let direct = service.apply_glossary(source, translation, &scope).await.unwrap();

    assert_eq!(manual, direct);
    assert_eq!(direct, "Heil dem Kaiser!");
}

#[tokio::test]
async fn test_findMatches_withNestedTerms_shouldPreferLongestMatch() {
    let service = create_service().await;
    let scope = LanguageScope::new("de");

    let matches = service
        .find_matches("Emperor Karl Franz and the Imperator", &scope)
        .await
        .unwrap();

    let found: Vec<(&str, usize, usize)> = matches
        .iter()
        .map(|m| (m.entry.source_term.as_str(), m.start_index, m.end_index))
        .collect();
    assert_eq!(found, vec![("Emperor Karl Franz", 0, 18), ("Imperator", 27, 36)]);
}

#[tokio::test]
async fn test_buildPromptBlock_shouldOnlyListTermsOfTheBatch() {
    let service = create_service().await;
    let scope = LanguageScope::new("de");

    let block = service
        .build_prompt_block(&["Banners over Reikland", "A quiet night"], &scope)
        .await
        .unwrap();

    assert!(block.contains("Reikland"));
    assert!(!block.contains("Kaiser"));

    let empty = service
        .build_prompt_block(&["Nothing relevant here"], &scope)
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_gameScopedGlossary_shouldOnlyApplyToItsGame() {
    let service = create_service().await;
    let game_glossary = service
        .create_glossary(GlossaryRecord::new("Vampires").for_game("wh3"))
        .await
        .unwrap();
    service
        .add_entry(GlossaryEntry::new(&game_glossary.id, "Vampire Count", "Vampirfürst", "de"))
        .await
        .unwrap();

    let text = ["The Vampire Count marches on the Imperator"];
    let universal = service
        .filter_relevant_terms(&text, &LanguageScope::new("de"))
        .await
        .unwrap();
    let in_game = service
        .filter_relevant_terms(&text, &LanguageScope::new("de").for_game("wh3"))
        .await
        .unwrap();
    let other_game = service
        .filter_relevant_terms(&text, &LanguageScope::new("de").for_game("wh2"))
        .await
        .unwrap();

    assert_eq!(universal.len(), 1);
    assert_eq!(in_game.len(), 2);
    assert_eq!(other_game.len(), 1);
}

#[tokio::test]
async fn test_otherTargetLanguage_shouldSeeNoTerms() {
    let service = create_service().await;

    let terms = service
        .filter_relevant_terms(&["The Imperator"], &LanguageScope::new("fr"))
        .await
        .unwrap();

    assert!(terms.is_empty());
}

#[tokio::test]
async fn test_importTsv_thenMatch_shouldUseImportedTerms() {
    let service = create_service().await;
    let glossary = service.create_glossary(GlossaryRecord::new("Imported")).await.unwrap();

    let imported = service
        .import_tsv(&glossary.id, "# source\ttarget\nGreenskin\tGrünhaut\nWaaagh\tWaaagh\tbattle cry\n", "de", true)
        .await
        .unwrap();
    assert_eq!(imported, 2);

    let scope = LanguageScope::new("de");
    let matches = service.find_matches("A Greenskin horde", &scope).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].entry.target_term, "Grünhaut");

    // Imported as case-sensitive
    let matches = service.find_matches("a greenskin horde", &scope).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_importTsv_withMalformedLine_shouldInsertNothing() {
    let service = create_service().await;
    let glossary = service.create_glossary(GlossaryRecord::new("Broken")).await.unwrap();

    let result = service
        .import_tsv(&glossary.id, "Greenskin\tGrünhaut\nno tab on this line\n", "de", false)
        .await;

    assert!(matches!(result, Err(GlossaryError::InvalidData(ref m)) if m.contains("Line 2")));
    let stats = service.statistics(&glossary.id).await.unwrap();
    assert_eq!(stats.total_entries, 0);
}
