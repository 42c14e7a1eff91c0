/*!
 * Remote glossary providers.
 *
 * A provider hosts server-side glossaries that its translation endpoint
 * applies on its own. Only creation and deletion are needed: remote
 * glossaries are immutable, so an edited local glossary is replaced.
 * - DeepL: DeepL API v2 glossaries
 * - Mock: in-memory provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

use crate::database::models::GlossaryEntry;
use crate::errors::RemoteError;

/// A glossary as the remote provider reports it after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGlossary {
    /// Opaque remote handle
    pub glossary_id: String,
    pub name: String,
    pub entry_count: i64,
}

/// Common trait for remote glossary providers
///
/// Language codes passed in are the local ISO codes of the mapping; each
/// provider converts them to its own code set.
#[async_trait]
pub trait GlossaryProvider: Send + Sync + Debug {
    /// Create a glossary from tab-separated `source\ttarget` lines
    async fn create_glossary(
        &self,
        name: &str,
        source_language: &str,
        target_language: &str,
        entries_tsv: &str,
    ) -> Result<RemoteGlossary, RemoteError>;

    /// Delete a glossary by its remote handle
    async fn delete_glossary(&self, glossary_id: &str) -> Result<(), RemoteError>;

    /// Display name of the provider
    fn name(&self) -> &str;
}

/// Entries serialized for upload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlossaryTsv {
    pub content: String,
    /// Number of lines in `content`
    pub entry_count: usize,
}

impl GlossaryTsv {
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

/// Tabs and line breaks would break the row format
fn sanitize_tsv_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Serialize entries as tab-separated rows.
///
/// Rows left empty on either side are dropped, and only the first entry of a
/// source term is kept since remote glossaries reject duplicate keys.
pub fn build_tsv_entries(entries: &[GlossaryEntry]) -> GlossaryTsv {
    let mut seen: HashSet<String> = HashSet::new();
    let mut tsv = GlossaryTsv::default();

    for entry in entries {
        let source = sanitize_tsv_field(&entry.source_term);
        let target = sanitize_tsv_field(&entry.target_term);
        if source.is_empty() || target.is_empty() || !seen.insert(source.clone()) {
            continue;
        }

        tsv.content.push_str(&source);
        tsv.content.push('\t');
        tsv.content.push_str(&target);
        tsv.content.push('\n');
        tsv.entry_count += 1;
    }

    tsv
}

pub mod deepl;
pub mod mock;

pub use deepl::DeepL;
pub use mock::MockGlossaryProvider;
