pub mod classifier;
pub mod cleaning;
pub mod context;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod knowledge;
pub mod models;
pub mod search;
pub mod store;
pub mod taxonomy;
pub mod traits;

pub use classifier::{extract_sections, KeywordClassifier};
pub use cleaning::{normalize_whitespace, TextCleaner};
pub use context::{best_excerpt, build_context, Language};
pub use error::{ExtractionError, IngestError, PersistenceError, TaxonomyError};
pub use extractor::{extract_pdf_text, extract_plain_text, DocumentExtractor, DocumentKind};
pub use ingest::{
    discover_documents, digest_file, IngestedDocument, IngestionPipeline, IngestionReport,
    SkippedDocument,
};
pub use knowledge::{KnowledgeBase, KnowledgeHandle};
pub use models::{
    IngestionOptions, KnowledgeEntry, KnowledgeRecord, KnowledgeSummary, SearchOptions,
    SearchResult, SectionMap,
};
pub use search::{truncate_snippet, KnowledgeSearcher, ParsedQuery};
pub use store::{BatchSummary, KnowledgeStore, RECORD_SUFFIX, SUMMARY_FILE};
pub use taxonomy::{KeywordTaxonomy, SectionName};
pub use traits::{SectionClassifier, TextExtractor};
