/*!
 * Glossary term matching and enforcement.
 *
 * - `matcher`: locating terms in text with word and case rules
 * - `filter`: reducing a glossary to the terms a batch needs
 * - `consistency`: verifying translations honor the glossary
 * - `substitution`: forcing untranslated terms into their mandated form
 * - `service`: the same operations over repository-backed entries
 */

pub mod consistency;
pub mod filter;
pub mod matcher;
pub mod models;
pub mod service;
pub mod substitution;

pub use consistency::{check_consistency, TermViolation};
pub use filter::{
    estimate_token_count, filter_relevant_entries, filter_relevant_terms, format_terms_for_prompt,
    group_entries, truncate_to_budget,
};
pub use matcher::{find_matches, resolve_overlaps};
pub use models::{GlossaryMatch, GlossaryTermWithVariants, GlossaryVariant, LanguageScope, MatchedTerm};
pub use service::GlossaryService;
pub use substitution::apply_substitutions;
