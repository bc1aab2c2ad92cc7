use crate::error::ExtractionError;
use crate::traits::TextExtractor;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;
        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("txt") {
            Some(Self::Text)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let text = match DocumentKind::from_path(path) {
            Some(DocumentKind::Pdf) => extract_pdf_text(path)?,
            Some(DocumentKind::Text) => extract_plain_text(path)?,
            None => {
                return Err(ExtractionError::UnsupportedFormat(
                    path.display().to_string(),
                ))
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::Empty(path.display().to_string()));
        }

        Ok(text.to_string())
    }
}

pub fn extract_plain_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding(path.display().to_string()))
}

pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed font and encoding tables.
    let primary = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)));
    let primary_error = match primary {
        Ok(Ok(text)) if !text.trim().is_empty() => return Ok(text),
        Ok(Ok(_)) => "no readable text".to_string(),
        Ok(Err(error)) => error.to_string(),
        Err(_) => "pdf-extract panicked".to_string(),
    };

    debug!(
        path = %path.display(),
        error = %primary_error,
        "pdf-extract failed, falling back to lopdf"
    );

    extract_pdf_pages(path).map_err(|fallback_error| {
        ExtractionError::Pdf(format!(
            "{}: {primary_error}; lopdf fallback failed: {fallback_error}",
            path.display()
        ))
    })
}

fn extract_pdf_pages(path: &Path) -> Result<String, String> {
    let document = Document::load(path).map_err(|error| error.to_string())?;

    let mut pages = Vec::new();
    for (page_no, _page_id) in document.get_pages() {
        match document.extract_text(&[page_no]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text),
            Ok(_) => {}
            Err(error) => {
                debug!(path = %path.display(), page = page_no, %error, "skipping unreadable page");
            }
        }
    }

    if pages.is_empty() {
        return Err("pdf had no readable page text".to_string());
    }

    Ok(pages.join("\n"))
}
