/*!
 * Forced glossary substitution in translated text.
 *
 * Best-effort correction: for every term matched in the source, literal
 * occurrences of the matched source text inside the translation are
 * replaced with the mandated target term. This only helps when the source
 * term survived translation verbatim (proper nouns, invented names); terms
 * the translator already rendered some other way are left untouched.
 * Positions are never transferred from source to target.
 */

use std::collections::HashSet;

use log::debug;

use super::matcher::{fold_case, FoldedText};
use super::models::GlossaryMatch;

/// Replace matched source terms inside `target_text` with their target terms.
///
/// `matches` must come from matching `source_text`; matches whose span does
/// not hold their text in `source_text` are ignored. Never fails.
pub fn apply_substitutions(
    source_text: &str,
    target_text: &str,
    matches: &[GlossaryMatch<'_>],
) -> String {
    let mut ordered: Vec<&GlossaryMatch<'_>> = matches
        .iter()
        .filter(|m| source_text.get(m.start_index..m.end_index) == Some(m.matched_text.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.start_index.cmp(&a.start_index));

    // One pass per term, otherwise a target that contains its source is rewritten twice
    let mut applied: HashSet<(String, &str)> = HashSet::new();
    let mut result = target_text.to_string();
    let mut replaced = 0;

    for m in ordered {
        let key = if m.entry.case_sensitive {
            m.matched_text.clone()
        } else {
            fold_case(&m.matched_text)
        };
        if !applied.insert((key, m.entry.id.as_str())) {
            continue;
        }

        let (next, count) = replace_term(
            &result,
            &m.matched_text,
            &m.entry.target_term,
            m.entry.case_sensitive,
        );
        result = next;
        replaced += count;
    }

    if replaced > 0 {
        debug!("Applied {} glossary substitutions", replaced);
    }
    result
}

/// Replace every non-overlapping occurrence of `needle`; returns the new
/// text and the number of replacements
pub fn replace_term(
    text: &str,
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> (String, usize) {
    if needle.is_empty() {
        return (text.to_string(), 0);
    }

    if case_sensitive {
        let count = text.matches(needle).count();
        return (text.replace(needle, replacement), count);
    }

    let folded = FoldedText::new(text);
    let spans = folded.occurrences(&fold_case(needle));
    let original = folded.original();

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for &(start, end) in &spans {
        result.push_str(&original[last..start]);
        result.push_str(replacement);
        last = end;
    }
    result.push_str(&original[last..]);

    (result, spans.len())
}
