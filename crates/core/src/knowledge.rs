use crate::models::{KnowledgeEntry, KnowledgeRecord, KnowledgeSummary};
use crate::store::KnowledgeStore;
use crate::taxonomy::{KeywordTaxonomy, SectionName};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Section-indexed view over every loaded record.
///
/// Built once per load and treated as immutable afterwards; a reload produces
/// a new value rather than mutating this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    sections: Vec<(SectionName, Vec<KnowledgeEntry>)>,
}

impl KnowledgeBase {
    pub fn new(taxonomy: &KeywordTaxonomy) -> Self {
        Self {
            sections: taxonomy
                .sections()
                .map(|section| (section.clone(), Vec::new()))
                .collect(),
        }
    }

    pub fn from_sections<I>(sections: I) -> Self
    where
        I: IntoIterator<Item = (SectionName, Vec<KnowledgeEntry>)>,
    {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    pub(crate) fn fold_record(&mut self, record: &KnowledgeRecord) {
        for (section, content) in &record.sections {
            let content = content.trim();
            if content.is_empty() {
                continue;
            }

            if let Some((_, entries)) = self.sections.iter_mut().find(|(name, _)| name == section) {
                entries.push(KnowledgeEntry {
                    source: record.file_name.clone(),
                    content: content.to_string(),
                });
            }
        }
    }

    pub fn entries(&self, section: &str) -> &[KnowledgeEntry] {
        self.sections
            .iter()
            .find(|(name, _)| name.as_str() == section)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionName, &[KnowledgeEntry])> {
        self.sections
            .iter()
            .map(|(section, entries)| (section, entries.as_slice()))
    }

    pub fn total_entries(&self) -> usize {
        self.sections.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    pub fn summary(&self) -> KnowledgeSummary {
        KnowledgeSummary {
            total_entries: self.total_entries(),
            section_counts: self
                .sections
                .iter()
                .map(|(section, entries)| (section.clone(), entries.len()))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct KnowledgeHandle {
    current: RwLock<Arc<KnowledgeBase>>,
}

impl KnowledgeHandle {
    pub fn new(base: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(base)),
        }
    }

    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, base: KnowledgeBase) -> Arc<KnowledgeBase> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(base))
    }

    pub fn reload(&self, store: &KnowledgeStore, taxonomy: &KeywordTaxonomy) -> KnowledgeSummary {
        let base = store.load_all(taxonomy);
        let summary = base.summary();
        self.replace(base);
        info!(total_entries = summary.total_entries, "knowledge base reloaded");
        summary
    }
}
