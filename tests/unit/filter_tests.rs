/*!
 * Tests for relevance filtering, grouping and the prompt payload
 */

use std::collections::HashSet;

use termguard::glossary::filter::{
    estimate_token_count, filter_relevant_entries, filter_relevant_terms, format_terms_for_prompt,
    truncate_to_budget, PROMPT_HEADER_TOKENS, TOKENS_PER_TERM,
};
use termguard::GlossaryEntry;

use crate::common;

fn glossary() -> Vec<GlossaryEntry> {
    vec![
        GlossaryEntry::new("g", "Skaven", "Skaven", "de"),
        GlossaryEntry::new("g", "skaven", "Rattenmenschen", "de").with_notes("informal"),
        GlossaryEntry::new("g", "Warpstone", "Warpstein", "de"),
        GlossaryEntry::new("g", "Dwarf", "Zwerg", "de"),
        GlossaryEntry::new("g", "Chaos", "Chaos", "de").case_sensitive(true),
    ]
}

#[test]
fn test_filterRelevantEntries_shouldKeepDuplicatesOfMatchedTerm() {
    let entries = glossary();

    let relevant = filter_relevant_entries(&["The SKAVEN want warpstone."], &entries, true);

    let sources: Vec<&str> = relevant.iter().map(|e| e.source_term.as_str()).collect();
    assert_eq!(sources, vec!["Skaven", "skaven", "Warpstone"]);
}

#[test]
fn test_filterRelevantTerms_shouldGroupVariantsUnderFirstDisplayForm() {
    let entries = glossary();

    let terms = filter_relevant_terms(&["skaven everywhere"], &entries, true);

    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].source_term, "Skaven");
    assert_eq!(terms[0].target_terms().collect::<Vec<_>>(), vec!["Skaven", "Rattenmenschen"]);
}

#[test]
fn test_filterRelevantTerms_withSameBatch_shouldBeIdempotent() {
    let entries = glossary();
    let batch = ["Dwarf and Skaven", "Chaos rises", "chaos ignored"];

    let first: HashSet<String> =
        filter_relevant_terms(&batch, &entries, true).iter().map(|t| t.key()).collect();
    let second: HashSet<String> =
        filter_relevant_terms(&batch, &entries, true).iter().map(|t| t.key()).collect();

    assert_eq!(first, second);
    assert_eq!(first, HashSet::from(["dwarf".to_string(), "skaven".to_string(), "chaos".to_string()]));
}

#[test]
fn test_filterRelevantTerms_withEmptyBatch_shouldReturnNothing() {
    let entries = glossary();
    let empty: [&str; 0] = [];

    assert!(filter_relevant_terms(&empty, &entries, true).is_empty());
    assert!(filter_relevant_terms(&["nothing relevant"], &entries, true).is_empty());
}

#[test]
fn test_truncateToBudget_shouldProduceBlockWithinEstimate() {
    let entries = common::entries(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
    let terms = filter_relevant_terms(&["a b c d"], &entries, true);
    assert_eq!(estimate_token_count(&terms), PROMPT_HEADER_TOKENS + 4 * TOKENS_PER_TERM);

    let budget = PROMPT_HEADER_TOKENS + 2 * TOKENS_PER_TERM + 1;
    let kept = truncate_to_budget(terms, budget);

    assert_eq!(kept.len(), 2);
    let block = format_terms_for_prompt(&kept);
    assert!(block.contains("\"a\" -> \"1\""));
    assert!(!block.contains("\"c\""));
}
