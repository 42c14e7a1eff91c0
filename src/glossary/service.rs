/*!
 * Glossary matching service.
 *
 * Binds the pure matching functions to the repository: loads the entries
 * applicable to a language scope and runs filtering, consistency checks and
 * substitutions over them. This is the API batch translation consumes.
 */

use log::{debug, info};

use super::consistency;
use super::filter;
use super::matcher;
use super::models::{GlossaryMatch, GlossaryTermWithVariants, LanguageScope, MatchedTerm};
use super::substitution;
use crate::app_config::MatchingConfig;
use crate::database::models::{EntryUpdate, GlossaryEntry, GlossaryRecord, GlossaryStatistics};
use crate::database::Repository;
use crate::errors::GlossaryError;

/// Service for glossary maintenance and term matching
#[derive(Clone)]
pub struct GlossaryService {
    repo: Repository,
    matching: MatchingConfig,
}

impl GlossaryService {
    /// Create a new service over a repository
    pub fn new(repo: Repository, matching: MatchingConfig) -> Self {
        Self { repo, matching }
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Matching options in use
    pub fn matching(&self) -> &MatchingConfig {
        &self.matching
    }

    // =========================================================================
    // Glossary and Entry Maintenance
    // =========================================================================

    /// Create a glossary
    pub async fn create_glossary(&self, glossary: GlossaryRecord) -> Result<GlossaryRecord, GlossaryError> {
        if glossary.name.trim().is_empty() {
            return Err(GlossaryError::InvalidData("Glossary name must not be empty".to_string()));
        }

        self.repo.create_glossary(&glossary).await?;
        info!("Created glossary '{}' ({})", glossary.name, glossary.id);
        Ok(glossary)
    }

    /// Get a glossary or fail with `NotFound`
    pub async fn require_glossary(&self, glossary_id: &str) -> Result<GlossaryRecord, GlossaryError> {
        self.repo
            .get_glossary(glossary_id)
            .await?
            .ok_or_else(|| GlossaryError::NotFound(format!("Glossary {}", glossary_id)))
    }

    fn validate_terms(source_term: &str, target_term: &str) -> Result<(), GlossaryError> {
        if source_term.trim().is_empty() {
            return Err(GlossaryError::InvalidData("Source term must not be empty".to_string()));
        }
        if target_term.trim().is_empty() {
            return Err(GlossaryError::InvalidData(format!(
                "Target term for '{}' must not be empty",
                source_term
            )));
        }
        Ok(())
    }

    /// Add one entry to an existing glossary
    pub async fn add_entry(&self, entry: GlossaryEntry) -> Result<GlossaryEntry, GlossaryError> {
        Self::validate_terms(&entry.source_term, &entry.target_term)?;
        self.require_glossary(&entry.glossary_id).await?;

        self.repo.insert_entry(&entry).await?;
        debug!("Added entry '{}' -> '{}'", entry.source_term, entry.target_term);
        Ok(entry)
    }

    /// Add entries in one transaction; nothing is written if any entry is invalid
    pub async fn add_entries(&self, entries: Vec<GlossaryEntry>) -> Result<usize, GlossaryError> {
        let mut checked_glossaries: Vec<&str> = Vec::new();
        for entry in &entries {
            Self::validate_terms(&entry.source_term, &entry.target_term)?;
            if !checked_glossaries.contains(&entry.glossary_id.as_str()) {
                self.require_glossary(&entry.glossary_id).await?;
                checked_glossaries.push(&entry.glossary_id);
            }
        }

        let count = self.repo.insert_entries(entries).await?;
        info!("Imported {} glossary entries", count);
        Ok(count)
    }

    /// Import `source\ttarget[\tnotes]` lines into a glossary.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line without a
    /// tab rejects the whole import.
    pub async fn import_tsv(
        &self,
        glossary_id: &str,
        content: &str,
        target_language_code: &str,
        case_sensitive: bool,
    ) -> Result<usize, GlossaryError> {
        let entries = parse_tsv(glossary_id, content, target_language_code, case_sensitive)?;
        if entries.is_empty() {
            return Err(GlossaryError::InvalidData("No entries to import".to_string()));
        }
        self.add_entries(entries).await
    }

    /// Update an entry's terms, notes or flags
    pub async fn update_entry(
        &self,
        entry_id: &str,
        update: EntryUpdate,
    ) -> Result<GlossaryEntry, GlossaryError> {
        let current = self
            .repo
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| GlossaryError::NotFound(format!("Entry {}", entry_id)))?;

        Self::validate_terms(
            update.source_term.as_deref().unwrap_or(&current.source_term),
            update.target_term.as_deref().unwrap_or(&current.target_term),
        )?;

        self.repo
            .update_entry(entry_id, update)
            .await?
            .ok_or_else(|| GlossaryError::NotFound(format!("Entry {}", entry_id)))
    }

    /// Delete an entry
    pub async fn delete_entry(&self, entry_id: &str) -> Result<(), GlossaryError> {
        if !self.repo.delete_entry(entry_id).await? {
            return Err(GlossaryError::NotFound(format!("Entry {}", entry_id)));
        }
        Ok(())
    }

    /// Statistics for one glossary
    pub async fn statistics(&self, glossary_id: &str) -> Result<GlossaryStatistics, GlossaryError> {
        self.require_glossary(glossary_id).await?;
        Ok(self.repo.get_glossary_statistics(glossary_id).await?)
    }

    // =========================================================================
    // Matching
    // =========================================================================

    /// Every entry applicable to a scope
    pub async fn load_entries(&self, scope: &LanguageScope) -> Result<Vec<GlossaryEntry>, GlossaryError> {
        Ok(self.repo.get_entries_for_scope(scope).await?)
    }

    /// All applicable terms, grouped, without filtering against any text
    pub async fn load_all_terms(
        &self,
        scope: &LanguageScope,
    ) -> Result<Vec<GlossaryTermWithVariants>, GlossaryError> {
        let entries = self.load_entries(scope).await?;
        Ok(filter::group_entries(&entries))
    }

    /// Applicable terms that occur in a batch of source texts, grouped
    pub async fn filter_relevant_terms<S: AsRef<str>>(
        &self,
        source_texts: &[S],
        scope: &LanguageScope,
    ) -> Result<Vec<GlossaryTermWithVariants>, GlossaryError> {
        let entries = self.load_entries(scope).await?;
        Ok(filter::filter_relevant_terms(
            source_texts,
            &entries,
            self.matching.whole_word_only,
        ))
    }

    /// Glossary block for a batch's prompt, cut to the configured token budget
    pub async fn build_prompt_block<S: AsRef<str>>(
        &self,
        source_texts: &[S],
        scope: &LanguageScope,
    ) -> Result<String, GlossaryError> {
        let terms = self.filter_relevant_terms(source_texts, scope).await?;
        let terms = filter::truncate_to_budget(terms, self.matching.prompt_token_budget);
        Ok(filter::format_terms_for_prompt(&terms))
    }

    /// Human-readable violations of the glossary in a translation
    pub async fn check_consistency(
        &self,
        source_text: &str,
        target_text: &str,
        scope: &LanguageScope,
    ) -> Result<Vec<String>, GlossaryError> {
        let entries = self.load_entries(scope).await?;
        let violations = consistency::check_consistency(
            source_text,
            target_text,
            &entries,
            self.matching.whole_word_only,
        );
        Ok(violations.iter().map(ToString::to_string).collect())
    }

    /// Resolved, non-overlapping glossary matches in a text
    pub async fn find_matches(
        &self,
        text: &str,
        scope: &LanguageScope,
    ) -> Result<Vec<MatchedTerm>, GlossaryError> {
        let entries = self.load_entries(scope).await?;
        let matches = matcher::find_matches(text, &entries, self.matching.whole_word_only);
        Ok(matches.iter().map(MatchedTerm::from).collect())
    }

    /// Force glossary terms into a translation using matches found earlier
    pub fn apply_substitutions(
        &self,
        source_text: &str,
        target_text: &str,
        matches: &[MatchedTerm],
    ) -> String {
        let borrowed: Vec<GlossaryMatch<'_>> = matches.iter().map(MatchedTerm::as_match).collect();
        substitution::apply_substitutions(source_text, target_text, &borrowed)
    }

    /// Match the source and force glossary terms into the translation
    pub async fn apply_glossary(
        &self,
        source_text: &str,
        target_text: &str,
        scope: &LanguageScope,
    ) -> Result<String, GlossaryError> {
        let entries = self.load_entries(scope).await?;
        let matches = matcher::find_matches(source_text, &entries, self.matching.whole_word_only);
        Ok(substitution::apply_substitutions(source_text, target_text, &matches))
    }
}

/// Parse tab-separated glossary rows into entries
pub fn parse_tsv(
    glossary_id: &str,
    content: &str,
    target_language_code: &str,
    case_sensitive: bool,
) -> Result<Vec<GlossaryEntry>, GlossaryError> {
    let mut entries = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.split('\t');
        let source = columns.next().unwrap_or_default().trim();
        let target = columns
            .next()
            .ok_or_else(|| {
                GlossaryError::InvalidData(format!("Line {}: expected source<TAB>target", index + 1))
            })?
            .trim();

        let mut entry = GlossaryEntry::new(glossary_id, source, target, target_language_code)
            .case_sensitive(case_sensitive);
        if let Some(notes) = columns.next().map(str::trim).filter(|n| !n.is_empty()) {
            entry = entry.with_notes(notes);
        }
        entries.push(entry);
    }

    Ok(entries)
}
