/*!
 * # termguard - glossary term matching and remote sync
 *
 * A Rust library that enforces consistent terminology when translating
 * large text corpora with machine or LLM translators.
 *
 * ## Features
 *
 * - Find glossary terms in text with whole-word and case rules,
 *   longest match first, without overlaps
 * - Reduce a glossary to the terms a batch needs, within a token budget
 * - Check that a translation honors the mandated terms
 * - Force untranslated terms into their mandated form
 * - Mirror glossaries onto DeepL, with staleness detection and teardown
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: SQLite persistence of glossaries, entries and remote mappings
 * - `glossary`: Term matching and enforcement:
 *   - `glossary::matcher`: Term location in text
 *   - `glossary::filter`: Relevance filtering, grouping and prompt payload
 *   - `glossary::consistency`: Translation checks
 *   - `glossary::substitution`: Forced substitutions
 *   - `glossary::service`: Repository-backed matching service
 * - `providers`: Remote glossary providers:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::mock`: In-memory provider for tests
 * - `sync`: Remote glossary lifecycle
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod glossary;
pub mod language_utils;
pub mod providers;
pub mod sync;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::models::{DeepLGlossaryMapping, GlossaryEntry, GlossaryRecord, SyncStatus};
pub use database::Repository;
pub use errors::{GlossaryError, RemoteError};
pub use glossary::{GlossaryMatch, GlossaryService, GlossaryTermWithVariants, LanguageScope};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use providers::{GlossaryProvider, RemoteGlossary};
pub use sync::{GlossarySyncManager, SyncState};
