/*!
 * Terminology consistency checking.
 *
 * A presence check: every term matched in the source must have one of its
 * mandated translations somewhere in the target, compared case-insensitively.
 * Translations reorder words, so no attempt is made to locate the aligned
 * span in the target; a term that appears elsewhere in the target counts as
 * honored.
 */

use std::fmt;

use super::filter::filter_relevant_terms;
use super::matcher::contains_ignore_case;
use crate::database::models::GlossaryEntry;

/// A required term that the translation does not honor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermViolation {
    /// Source term as displayed in the glossary
    pub source_term: String,
    /// Admissible translations, none of which was found
    pub expected: Vec<String>,
}

impl fmt::Display for TermViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected.as_slice() {
            [single] => write!(
                f,
                "Term '{}' should be translated as '{}' but was not found in target",
                self.source_term, single
            ),
            many => write!(
                f,
                "Term '{}' should be translated as one of '{}' but none was found in target",
                self.source_term,
                many.join("', '")
            ),
        }
    }
}

/// Check a translation against the glossary terms found in its source
pub fn check_consistency(
    source_text: &str,
    target_text: &str,
    entries: &[GlossaryEntry],
    whole_word_only: bool,
) -> Vec<TermViolation> {
    filter_relevant_terms(&[source_text], entries, whole_word_only)
        .into_iter()
        .filter(|term| !term.target_terms().any(|t| contains_ignore_case(target_text, t)))
        .map(|term| TermViolation {
            expected: term.target_terms().map(str::to_string).collect(),
            source_term: term.source_term,
        })
        .collect()
}
