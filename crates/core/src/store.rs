use crate::error::PersistenceError;
use crate::knowledge::KnowledgeBase;
use crate::models::{KnowledgeRecord, KnowledgeSummary};
use crate::taxonomy::{KeywordTaxonomy, SectionName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const RECORD_SUFFIX: &str = "_knowledge.json";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed_files: usize,
    pub total_entries: usize,
    pub sections: BTreeMap<SectionName, usize>,
    pub files: Vec<String>,
}

impl BatchSummary {
    pub fn new(files: Vec<String>, knowledge: &KnowledgeSummary) -> Self {
        Self {
            processed_files: files.len(),
            total_entries: knowledge.total_entries,
            sections: knowledge
                .non_empty_sections()
                .map(|(section, count)| (section.clone(), count))
                .collect(),
            files,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dir: PathBuf,
}

impl KnowledgeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, file_name: &str) -> Result<PathBuf, PersistenceError> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| PersistenceError::MissingFileName(file_name.to_string()))?;

        Ok(self.dir.join(format!("{stem}{RECORD_SUFFIX}")))
    }

    pub fn persist(&self, record: &KnowledgeRecord) -> Result<PathBuf, PersistenceError> {
        let path = self.record_path(&record.file_name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        info!(path = %path.display(), "saved knowledge record");
        Ok(path)
    }

    pub fn load_record(path: &Path) -> Result<KnowledgeRecord, PersistenceError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    // Directory enumeration order, unsorted.
    pub fn record_paths(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|item| match item {
                Ok(entry) => Some(entry),
                Err(error) => {
                    warn!(dir = %self.dir.display(), %error, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(RECORD_SUFFIX))
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    pub fn load_all(&self, taxonomy: &KeywordTaxonomy) -> KnowledgeBase {
        let mut base = KnowledgeBase::new(taxonomy);

        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "knowledge directory missing, starting empty");
            return base;
        }

        for path in self.record_paths() {
            match Self::load_record(&path) {
                Ok(record) => base.fold_record(&record),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable knowledge record");
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            total_entries = base.total_entries(),
            "knowledge base loaded"
        );
        base
    }

    pub fn write_summary(&self, summary: &BatchSummary) -> Result<PathBuf, PersistenceError> {
        let path = self.dir.join(SUMMARY_FILE);
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(path)
    }
}
