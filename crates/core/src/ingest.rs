use crate::classifier::{extract_sections, KeywordClassifier};
use crate::cleaning::TextCleaner;
use crate::error::{IngestError, TaxonomyError};
use crate::extractor::{DocumentExtractor, DocumentKind};
use crate::models::{IngestionOptions, KnowledgeRecord};
use crate::store::KnowledgeStore;
use crate::taxonomy::KeywordTaxonomy;
use crate::traits::{SectionClassifier, TextExtractor};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub fn discover_documents(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| DocumentKind::from_path(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedDocument {
    pub file_name: String,
    pub saved_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    pub processed: Vec<IngestedDocument>,
    pub skipped: Vec<SkippedDocument>,
}

impl IngestionReport {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.processed
            .iter()
            .map(|document| document.file_name.clone())
            .collect()
    }
}

pub struct IngestionPipeline<E = DocumentExtractor, C = KeywordClassifier> {
    extractor: E,
    classifier: C,
    cleaner: TextCleaner,
    options: IngestionOptions,
}

impl IngestionPipeline {
    pub fn new(taxonomy: &KeywordTaxonomy, options: IngestionOptions) -> Result<Self, TaxonomyError> {
        Ok(Self {
            extractor: DocumentExtractor,
            classifier: KeywordClassifier::new(taxonomy)?,
            cleaner: TextCleaner::new()?,
            options,
        })
    }
}

impl<E, C> IngestionPipeline<E, C>
where
    E: TextExtractor,
    C: SectionClassifier,
{
    pub fn with_components(
        extractor: E,
        classifier: C,
        options: IngestionOptions,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            extractor,
            classifier,
            cleaner: TextCleaner::new()?,
            options,
        })
    }

    pub fn options(&self) -> &IngestionOptions {
        &self.options
    }

    pub fn process_file(&self, path: &Path) -> Result<KnowledgeRecord, IngestError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?
            .to_string();

        let raw_text = self.extractor.extract(path)?;
        let cleaned = self.cleaner.clean(&raw_text);
        let sections = extract_sections(
            &cleaned,
            &self.cleaner,
            &self.classifier,
            self.options.min_sentence_chars,
        );

        let modified_at = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(KnowledgeRecord {
            file_name,
            file_path: path.to_string_lossy().to_string(),
            processed_at: Utc::now(),
            modified_at,
            checksum: digest_file(path)?,
            total_text_length: cleaned.chars().count(),
            sections,
            full_text: cleaned
                .chars()
                .take(self.options.full_text_max_chars)
                .collect(),
        })
    }

    // A file that fails to extract or persist, or whose record name was
    // already taken earlier in the batch, lands in `skipped`.
    pub fn ingest_directory(
        &self,
        folder: &Path,
        store: &KnowledgeStore,
    ) -> Result<IngestionReport, IngestError> {
        if !folder.is_dir() {
            return Err(IngestError::MissingDirectory(folder.display().to_string()));
        }

        let files = discover_documents(folder);
        let mut report = IngestionReport::default();

        if files.is_empty() {
            warn!(folder = %folder.display(), "no pdf or txt files found");
            return Ok(report);
        }

        let mut written: HashSet<PathBuf> = HashSet::new();

        for path in files {
            let outcome = self.process_file(&path).and_then(|record| {
                let target = store.record_path(&record.file_name)?;
                if written.contains(&target) {
                    return Err(IngestError::RecordCollision {
                        file_name: record.file_name,
                        record: target.display().to_string(),
                    });
                }
                let saved_path = store.persist(&record)?;
                written.insert(saved_path.clone());
                Ok(IngestedDocument {
                    file_name: record.file_name,
                    saved_path,
                })
            });

            match outcome {
                Ok(document) => report.processed.push(document),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping document");
                    report.skipped.push(SkippedDocument {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            folder = %folder.display(),
            processed = report.processed_count(),
            skipped = report.skipped.len(),
            "ingestion finished"
        );
        Ok(report)
    }
}
