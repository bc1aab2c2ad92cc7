use crate::error::ExtractionError;
use crate::taxonomy::SectionName;
use std::path::Path;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

pub trait SectionClassifier {
    fn sections(&self) -> &[SectionName];

    fn classify(&self, sentence: &str) -> Vec<SectionName>;
}
