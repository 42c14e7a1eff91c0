/*!
 * Ephemeral glossary views built per request.
 *
 * None of these types are persisted: matches and grouped terms are derived
 * from `GlossaryEntry` rows every time a batch is processed.
 */

use serde::{Deserialize, Serialize};

use crate::database::models::GlossaryEntry;

/// Which glossaries and entries apply to a translation request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageScope {
    /// Game whose glossaries apply in addition to universal ones
    pub game_code: Option<String>,
    /// Target language of the translation
    pub target_language_code: String,
}

impl LanguageScope {
    /// Scope covering universal glossaries only
    pub fn new(target_language_code: impl Into<String>) -> Self {
        Self {
            game_code: None,
            target_language_code: target_language_code.into(),
        }
    }

    /// Add the glossaries of one game
    pub fn for_game(mut self, game_code: impl Into<String>) -> Self {
        self.game_code = Some(game_code.into());
        self
    }
}

/// A located occurrence of a glossary term in a text.
///
/// Offsets are byte offsets into the searched text, always on `char`
/// boundaries; the span is half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryMatch<'a> {
    pub entry: &'a GlossaryEntry,
    pub start_index: usize,
    pub end_index: usize,
    /// Verbatim text of the span, original casing preserved
    pub matched_text: String,
}

impl GlossaryMatch<'_> {
    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &GlossaryMatch<'_>) -> bool {
        self.start_index < other.end_index && other.start_index < self.end_index
    }
}

/// A match detached from the entry slice it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTerm {
    pub entry: GlossaryEntry,
    pub start_index: usize,
    pub end_index: usize,
    pub matched_text: String,
}

impl From<&GlossaryMatch<'_>> for MatchedTerm {
    fn from(m: &GlossaryMatch<'_>) -> Self {
        Self {
            entry: m.entry.clone(),
            start_index: m.start_index,
            end_index: m.end_index,
            matched_text: m.matched_text.clone(),
        }
    }
}

impl MatchedTerm {
    /// Borrow back as a match over the owned entry
    pub fn as_match(&self) -> GlossaryMatch<'_> {
        GlossaryMatch {
            entry: &self.entry,
            start_index: self.start_index,
            end_index: self.end_index,
            matched_text: self.matched_text.clone(),
        }
    }
}

/// One admissible translation of a grouped term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlossaryVariant {
    pub target_term: String,
    pub notes: Option<String>,
    /// Entry the variant comes from
    pub entry_id: String,
}

/// Entries sharing a source term, folded into one prompt line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTermWithVariants {
    /// Display form, taken from the first contributing entry
    pub source_term: String,
    /// True if any contributing entry is case-sensitive
    pub case_sensitive: bool,
    pub variants: Vec<GlossaryVariant>,
}

impl GlossaryTermWithVariants {
    /// Case-folded grouping key
    pub fn key(&self) -> String {
        super::matcher::fold_case(&self.source_term)
    }

    /// Whether the term has more than one admissible translation
    pub fn has_multiple_variants(&self) -> bool {
        self.variants.len() > 1
    }

    /// Target terms in variant order
    pub fn target_terms(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.target_term.as_str())
    }
}
