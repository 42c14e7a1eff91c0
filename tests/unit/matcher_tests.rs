/*!
 * Tests for glossary term matching properties
 */

use termguard::glossary::matcher::{find_matches, has_word_boundaries};
use termguard::GlossaryEntry;

use crate::common;

/// Matches never overlap, whatever the term set
#[test]
fn test_findMatches_withOverlappingTerms_shouldReturnDisjointSortedSpans() {
    let entries = common::entries(&[
        ("New", "Neu"),
        ("New World", "Neue Welt"),
        ("World Order", "Weltordnung"),
        ("Order", "Orden"),
        ("w", "x"),
    ]);
    let texts = [
        "The New World Order is new.",
        "new world order, NEW WORLD ORDER",
        "Order! New orders for the New World.",
    ];

    for text in texts {
        for whole_word in [true, false] {
            let matches = find_matches(text, &entries, whole_word);
            for pair in matches.windows(2) {
                assert!(pair[0].end_index <= pair[1].start_index, "overlap in {:?}", text);
            }
            for m in &matches {
                assert_eq!(&text[m.start_index..m.end_index], m.matched_text);
            }
        }
    }
}

/// "category" beats "cat" at the same position
#[test]
fn test_findMatches_withSharedStart_shouldKeepLongestTerm() {
    let entries = common::entries(&[("cat", "Katze"), ("category", "Kategorie")]);

    let matches = find_matches("category", &entries, false);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].entry.source_term, "category");
    assert_eq!((matches[0].start_index, matches[0].end_index), (0, 8));
}

#[test]
fn test_findMatches_wholeWordOnly_shouldRejectPartialWords() {
    let entries = common::entries(&[("cat", "Katze")]);

    assert!(find_matches("concatenate", &entries, true).is_empty());
    assert_eq!(find_matches("the cat sat", &entries, true).len(), 1);
    assert_eq!(find_matches("concatenate", &entries, false).len(), 1);
}

#[test]
fn test_findMatches_caseSensitivity_shouldFollowEntryFlag() {
    let sensitive = vec![GlossaryEntry::new("g", "Empire", "Reich", "de").case_sensitive(true)];
    let insensitive = vec![GlossaryEntry::new("g", "Empire", "Reich", "de")];

    assert!(find_matches("the empire falls", &sensitive, true).is_empty());
    assert_eq!(find_matches("the empire falls", &insensitive, true).len(), 1);
    assert_eq!(find_matches("the Empire falls", &sensitive, true).len(), 1);
}

#[test]
fn test_findMatches_withDegenerateInput_shouldReturnNothing() {
    let entries = common::entries(&[("cat", "Katze")]);

    assert!(find_matches("", &entries, true).is_empty());
    assert!(find_matches("cat", &[], true).is_empty());
    assert!(find_matches("cat", &common::entries(&[("", "leer")]), false).is_empty());
}

#[test]
fn test_findMatches_withNonAsciiText_shouldReturnCharBoundaryOffsets() {
    let entries = common::entries(&[("Ärger", "trouble"), ("Straße", "street")]);
    let text = "Viel ärger in der STRASSE und Straße.";

    let matches = find_matches(text, &entries, true);

    let found: Vec<&str> = matches.iter().map(|m| m.matched_text.as_str()).collect();
    assert_eq!(found, vec!["ärger", "Straße"]);
    for m in &matches {
        assert!(text.is_char_boundary(m.start_index) && text.is_char_boundary(m.end_index));
    }
}

#[test]
fn test_findMatches_withPunctuation_shouldTreatItAsBoundary() {
    let entries = common::entries(&[("Karl Franz", "Karl-Franz")]);

    let matches = find_matches("(Karl Franz), Karl Franz's sword", &entries, true);

    assert_eq!(matches.len(), 2);
}

#[test]
fn test_hasWordBoundaries_shouldTreatUnderscoreAndDigitsAsWordChars() {
    assert!(has_word_boundaries("a cat.", 2, 5));
    assert!(!has_word_boundaries("_cat", 1, 4));
    assert!(!has_word_boundaries("cat9", 0, 3));
    assert!(has_word_boundaries("cat", 0, 3));
}
