/*!
 * Glossary term matching.
 *
 * Finds glossary terms inside arbitrary Unicode text with whole-word and
 * case-sensitivity rules, then resolves overlapping hits so that the
 * result is a single left-to-right, non-overlapping set where longer
 * terms win ties at the same position.
 *
 * All functions here are pure and hold no state.
 */

use log::trace;

use super::models::GlossaryMatch;
use crate::database::models::GlossaryEntry;

/// Case-fold a string one `char` at a time.
///
/// Both haystack and needle go through this so their foldings agree
/// (`str::to_lowercase` treats a final sigma contextually).
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// ASCII letters, digits, underscore and any Unicode letter or number
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Whether the span `[start, end)` of `text` is delimited by non-word characters.
/// The start and end of the text count as boundaries. Offsets that are out of
/// range or not on a char boundary never have word boundaries.
pub fn has_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let (Some(before), Some(after)) = (text.get(..start), text.get(end..)) else {
        return false;
    };
    let before_ok = before.chars().next_back().is_none_or(|c| !is_word_char(c));
    let after_ok = after.chars().next().is_none_or(|c| !is_word_char(c));
    before_ok && after_ok
}

/// Non-overlapping occurrences of `needle` in `haystack`, scanning left to right
pub(crate) fn occurrences(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    if needle.is_empty() {
        return spans;
    }

    let mut cursor = 0;
    while let Some(pos) = haystack[cursor..].find(needle) {
        let start = cursor + pos;
        let end = start + needle.len();
        spans.push((start, end));
        cursor = end;
    }
    spans
}

/// A text together with its case-folded form.
///
/// Folding can change byte lengths (`'İ'` folds to two chars), so every
/// folded byte offset that starts the expansion of an original char keeps
/// the original offset it came from. Offsets inside an expansion have no
/// counterpart and spans touching them are discarded.
pub(crate) struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    origin: Vec<Option<usize>>,
}

impl<'a> FoldedText<'a> {
    pub(crate) fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len() + 1);

        for (idx, ch) in original.char_indices() {
            origin.push(Some(idx));
            folded.extend(ch.to_lowercase());
            origin.resize(folded.len(), None);
        }
        origin.push(Some(original.len()));

        Self { original, folded, origin }
    }

    pub(crate) fn original(&self) -> &'a str {
        self.original
    }

    /// Occurrences of an already folded needle, in original byte offsets
    pub(crate) fn occurrences(&self, folded_needle: &str) -> Vec<(usize, usize)> {
        occurrences(&self.folded, folded_needle)
            .into_iter()
            .filter_map(|(start, end)| Some((self.origin[start]?, self.origin[end]?)))
            .collect()
    }
}

/// Find all glossary terms in `text`.
///
/// Returns a non-overlapping list sorted by `start_index`. Entries with an
/// empty source term are ignored; empty text or no entries yield no matches.
pub fn find_matches<'a>(
    text: &str,
    entries: &'a [GlossaryEntry],
    whole_word_only: bool,
) -> Vec<GlossaryMatch<'a>> {
    if text.is_empty() || entries.is_empty() {
        return Vec::new();
    }

    // Longer terms first; the sort is stable so equal lengths keep input order
    let mut ordered: Vec<&'a GlossaryEntry> = entries
        .iter()
        .filter(|e| !e.source_term.is_empty())
        .collect();
    ordered.sort_by(|a, b| {
        b.source_term
            .chars()
            .count()
            .cmp(&a.source_term.chars().count())
    });

    let mut folded: Option<FoldedText> = None;
    let mut candidates = Vec::new();

    for entry in ordered {
        let spans = if entry.case_sensitive {
            occurrences(text, &entry.source_term)
        } else {
            folded
                .get_or_insert_with(|| FoldedText::new(text))
                .occurrences(&fold_case(&entry.source_term))
        };

        for (start, end) in spans {
            if whole_word_only && !has_word_boundaries(text, start, end) {
                continue;
            }
            candidates.push(GlossaryMatch {
                entry,
                start_index: start,
                end_index: end,
                matched_text: text[start..end].to_string(),
            });
        }
    }

    let candidate_count = candidates.len();
    let matches = resolve_overlaps(candidates);
    trace!(
        "Matched {} of {} candidate occurrences in {} bytes of text",
        matches.len(),
        candidate_count,
        text.len()
    );
    matches
}

/// Keep the leftmost, then longest, candidate of every overlapping group.
///
/// Candidates are ordered by start ascending and length descending, then
/// accepted greedily while they do not overlap the last accepted one.
pub fn resolve_overlaps(mut candidates: Vec<GlossaryMatch<'_>>) -> Vec<GlossaryMatch<'_>> {
    candidates.sort_by(|a, b| {
        a.start_index
            .cmp(&b.start_index)
            .then_with(|| b.len().cmp(&a.len()))
    });

    let mut accepted: Vec<GlossaryMatch<'_>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.last().is_none_or(|last| !last.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Case-insensitive substring test using the same folding as the matcher
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold_case(haystack).contains(&fold_case(needle))
}
