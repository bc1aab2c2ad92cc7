use crate::taxonomy::SectionName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type SectionMap = BTreeMap<SectionName, String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeRecord {
    pub file_name: String,
    pub file_path: String,
    pub processed_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub total_text_length: usize,
    pub sections: SectionMap,
    pub full_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub section: SectionName,
    pub source: String,
    pub score: f64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KnowledgeSummary {
    pub total_entries: usize,
    pub section_counts: BTreeMap<SectionName, usize>,
}

impl KnowledgeSummary {
    pub fn non_empty_sections(&self) -> impl Iterator<Item = (&SectionName, usize)> {
        self.section_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(section, count)| (section, *count))
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub full_text_max_chars: usize,
    pub min_sentence_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            full_text_max_chars: 5_000,
            min_sentence_chars: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub min_score: f64,
    pub snippet_max_chars: usize,
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            snippet_max_chars: 500,
            limit: None,
        }
    }
}
