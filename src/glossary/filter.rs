/*!
 * Relevance filtering and grouping of glossary terms.
 *
 * Shipping a whole glossary with every translation request wastes the
 * model's context. This module reduces the applicable entries to the ones
 * that actually occur in a batch, groups entries sharing a source term into
 * one line with several admissible translations, and estimates what the
 * resulting prompt block costs in tokens.
 */

use std::collections::{HashMap, HashSet};

use log::debug;

use super::matcher::{find_matches, fold_case};
use super::models::{GlossaryTermWithVariants, GlossaryVariant};
use crate::database::models::GlossaryEntry;

/// Joins batch texts so that no term can match across two texts
pub const BATCH_SEPARATOR: &str = "\n\n";

/// Fixed cost of the glossary block header
pub const PROMPT_HEADER_TOKENS: usize = 50;

/// Cost of one term line with a single translation
pub const TOKENS_PER_TERM: usize = 15;

/// Extra cost of every translation beyond the first
pub const TOKENS_PER_EXTRA_VARIANT: usize = 5;

/// Entries whose term occurs in at least one of the source texts.
///
/// An entry is kept when it produced a match, or when it shares its source
/// term with a matched entry: duplicates of a term lose the overlap
/// resolution to each other but still describe valid translations. A
/// case-sensitive duplicate is only kept when the matched text has its
/// exact casing.
pub fn filter_relevant_entries<'a, S: AsRef<str>>(
    source_texts: &[S],
    entries: &'a [GlossaryEntry],
    whole_word_only: bool,
) -> Vec<&'a GlossaryEntry> {
    if source_texts.is_empty() || entries.is_empty() {
        return Vec::new();
    }

    let combined = source_texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(BATCH_SEPARATOR);

    let matches = find_matches(&combined, entries, whole_word_only);

    let mut matched_ids: HashSet<&str> = HashSet::new();
    let mut folded_texts: HashSet<String> = HashSet::new();
    let mut exact_texts: HashSet<&str> = HashSet::new();
    for m in &matches {
        matched_ids.insert(m.entry.id.as_str());
        folded_texts.insert(fold_case(&m.matched_text));
        exact_texts.insert(m.matched_text.as_str());
    }

    let relevant: Vec<&GlossaryEntry> = entries
        .iter()
        .filter(|e| {
            matched_ids.contains(e.id.as_str())
                || if e.case_sensitive {
                    exact_texts.contains(e.source_term.as_str())
                } else {
                    folded_texts.contains(&fold_case(&e.source_term))
                }
        })
        .collect();

    debug!(
        "Glossary filter kept {} of {} entries ({} matches in {} texts)",
        relevant.len(),
        entries.len(),
        matches.len(),
        source_texts.len()
    );
    relevant
}

/// Filter entries to the batch and group them by source term
pub fn filter_relevant_terms<S: AsRef<str>>(
    source_texts: &[S],
    entries: &[GlossaryEntry],
    whole_word_only: bool,
) -> Vec<GlossaryTermWithVariants> {
    group_entries(filter_relevant_entries(source_texts, entries, whole_word_only))
}

/// Group entries by case-folded source term, keeping first-seen order.
///
/// The display form comes from the first entry of each group and the group
/// is case-sensitive if any of its entries is.
pub fn group_entries<'a, I>(entries: I) -> Vec<GlossaryTermWithVariants>
where
    I: IntoIterator<Item = &'a GlossaryEntry>,
{
    let mut groups: Vec<GlossaryTermWithVariants> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = fold_case(&entry.source_term);
        let variant = GlossaryVariant {
            target_term: entry.target_term.clone(),
            notes: entry.notes.clone(),
            entry_id: entry.id.clone(),
        };

        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                group.case_sensitive |= entry.case_sensitive;
                group.variants.push(variant);
            }
            None => {
                index.insert(key, groups.len());
                groups.push(GlossaryTermWithVariants {
                    source_term: entry.source_term.clone(),
                    case_sensitive: entry.case_sensitive,
                    variants: vec![variant],
                });
            }
        }
    }

    groups
}

/// Estimated prompt tokens needed to include `terms`; nothing is shipped for
/// an empty set, so it costs nothing
pub fn estimate_token_count(terms: &[GlossaryTermWithVariants]) -> usize {
    if terms.is_empty() {
        return 0;
    }

    PROMPT_HEADER_TOKENS
        + terms
            .iter()
            .map(|t| TOKENS_PER_TERM + t.variants.len().saturating_sub(1) * TOKENS_PER_EXTRA_VARIANT)
            .sum::<usize>()
}

/// Longest prefix of `terms` whose estimate fits `max_tokens`
pub fn truncate_to_budget(
    terms: Vec<GlossaryTermWithVariants>,
    max_tokens: usize,
) -> Vec<GlossaryTermWithVariants> {
    let mut used = PROMPT_HEADER_TOKENS;
    let mut kept = Vec::with_capacity(terms.len());
    let total = terms.len();

    for term in terms {
        let cost = estimate_token_count(std::slice::from_ref(&term)) - PROMPT_HEADER_TOKENS;
        if used + cost > max_tokens {
            break;
        }
        used += cost;
        kept.push(term);
    }

    if kept.len() < total {
        debug!(
            "Glossary block truncated to {} of {} terms for a budget of {} tokens",
            kept.len(),
            total,
            max_tokens
        );
    }
    kept
}

/// Render terms as the glossary block of a translation prompt
pub fn format_terms_for_prompt(terms: &[GlossaryTermWithVariants]) -> String {
    if terms.is_empty() {
        return String::new();
    }

    let mut block = String::from("GLOSSARY (always use these translations):\n");
    for term in terms {
        let targets = term
            .target_terms()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" | ");
        block.push_str(&format!("- \"{}\" -> {}", term.source_term, targets));

        if term.case_sensitive {
            block.push_str(" [case-sensitive]");
        }

        let notes: Vec<&str> = term
            .variants
            .iter()
            .filter_map(|v| v.notes.as_deref())
            .filter(|n| !n.trim().is_empty())
            .collect();
        if !notes.is_empty() {
            block.push_str(&format!(" ({})", notes.join("; ")));
        }
        block.push('\n');
    }
    block
}
