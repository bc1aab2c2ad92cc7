use agri_knowledge_core::{
    DocumentExtractor, IngestionOptions, IngestionPipeline, KeywordTaxonomy, KnowledgeBase,
    KnowledgeHandle, KnowledgeSearcher, KnowledgeStore, SectionName, TextExtractor,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn taxonomy() -> KeywordTaxonomy {
    KeywordTaxonomy::from_json_str(r#"{"fertilizer": ["fertilizer"], "pest": ["pest"], "irrigation": ["drip"]}"#)
        .expect("valid taxonomy")
}

fn pipeline(taxonomy: &KeywordTaxonomy) -> IngestionPipeline {
    IngestionPipeline::new(taxonomy, IngestionOptions::default()).expect("pipeline builds")
}

// Single-page PDF drawing `phrase` in Helvetica, with correct xref offsets.
fn minimal_pdf(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 72 700 Td ({phrase}) Tj ET");
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{stream}\nendstream endobj\n",
            stream.len()
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n");
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{xref_start}\n").as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

#[test]
fn text_file_is_split_into_sections() -> TestResult {
    let docs = tempdir()?;
    let kb = tempdir()?;
    fs::write(
        docs.path().join("paddy.txt"),
        "Apply fertilizer in three splits. Control pests with neem oil.",
    )?;

    let taxonomy = taxonomy();
    let store = KnowledgeStore::new(kb.path());
    let report = pipeline(&taxonomy).ingest_directory(docs.path(), &store)?;
    let record = KnowledgeStore::load_record(&report.processed[0].saved_path)?;

    assert_eq!(record.sections["fertilizer"], "Apply fertilizer in three splits. ");
    assert_eq!(record.sections["pest"], "Control pests with neem oil. ");
    assert_eq!(record.sections["irrigation"], "");

    let keys: BTreeSet<&SectionName> = record.sections.keys().collect();
    let expected: BTreeSet<&SectionName> = taxonomy.sections().collect();
    assert_eq!(keys, expected);
    Ok(())
}

#[test]
fn reingesting_overwrites_instead_of_duplicating() -> TestResult {
    let docs = tempdir()?;
    let kb = tempdir()?;
    fs::write(
        docs.path().join("coconut.txt"),
        "Apply fertilizer before the monsoon. Drip irrigation saves water.",
    )?;

    let taxonomy = taxonomy();
    let store = KnowledgeStore::new(kb.path());
    let pipeline = pipeline(&taxonomy);

    let first = pipeline.ingest_directory(docs.path(), &store)?;
    let first_record = KnowledgeStore::load_record(&first.processed[0].saved_path)?;
    let second = pipeline.ingest_directory(docs.path(), &store)?;
    let second_record = KnowledgeStore::load_record(&second.processed[0].saved_path)?;

    assert_eq!(store.record_paths().len(), 1);
    assert_eq!(first_record.sections, second_record.sections);
    assert_eq!(first_record.checksum, second_record.checksum);
    Ok(())
}

#[test]
fn corrupt_pdf_does_not_abort_the_batch() -> TestResult {
    let docs = tempdir()?;
    let kb = tempdir()?;
    fs::write(docs.path().join("corrupt.pdf"), b"%PDF-1.4\n%broken")?;
    fs::write(docs.path().join("banana.txt"), "Mulch banana with fertilizer rich compost.")?;

    let report = pipeline(&taxonomy()).ingest_directory(docs.path(), &KnowledgeStore::new(kb.path()))?;

    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.file_names(), vec!["banana.txt".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    Ok(())
}

#[test]
fn valid_pdf_text_is_extracted() -> TestResult {
    let docs = tempdir()?;
    let path = docs.path().join("guide.pdf");
    fs::write(&path, minimal_pdf("Apply fertilizer in three splits"))?;

    let text = DocumentExtractor.extract(&path)?;
    assert!(text.contains("fertilizer"));
    Ok(())
}

#[test]
fn identical_sections_from_two_sources_are_scored_separately() -> TestResult {
    let docs = tempdir()?;
    let kb = tempdir()?;
    let body = "Control pest attack with neem oil spray.";
    fs::write(docs.path().join("a.txt"), body)?;
    fs::write(docs.path().join("b.txt"), body)?;

    let taxonomy = taxonomy();
    let store = KnowledgeStore::new(kb.path());
    pipeline(&taxonomy).ingest_directory(docs.path(), &store)?;

    let base = store.load_all(&taxonomy);
    let results = KnowledgeSearcher::default().search("neem oil", &base);

    let mut sources: Vec<&str> = results.iter().map(|result| result.source.as_str()).collect();
    sources.sort_unstable();
    assert_eq!(sources, vec!["a.txt", "b.txt"]);
    assert!(results.iter().all(|result| result.score == 4.0));
    Ok(())
}

#[test]
fn search_over_loaded_store() -> TestResult {
    let docs = tempdir()?;
    let kb = tempdir()?;
    fs::write(docs.path().join("a.txt"), "Apply fertilizer in three splits.")?;

    let taxonomy = taxonomy();
    let store = KnowledgeStore::new(kb.path());
    pipeline(&taxonomy).ingest_directory(docs.path(), &store)?;
    let base = store.load_all(&taxonomy);

    let results = KnowledgeSearcher::default().search("fertilizer splits", &base);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 2.0);
    assert_eq!(results[0].content, "Apply fertilizer in three splits.");

    assert!(KnowledgeSearcher::default().search("", &base).is_empty());
    Ok(())
}

#[test]
fn phrase_matches_score_at_least_two_and_never_above_four() {
    let base = KnowledgeBase::from_sections([(
        SectionName::parse("pest").expect("valid"),
        vec![agri_knowledge_core::KnowledgeEntry {
            source: "a.txt".to_string(),
            content: "Yellow sticky traps catch whiteflies in brinjal.".to_string(),
        }],
    )]);

    for query in ["sticky traps", "WHITEFLIES IN BRINJAL", "traps", "catch whiteflies"] {
        let results = KnowledgeSearcher::default().search(query, &base);
        assert_eq!(results.len(), 1, "query {query:?}");
        assert!(results[0].score >= 2.0 && results[0].score <= 4.0, "query {query:?}");
    }
}

#[test]
fn missing_store_reloads_to_empty_snapshot() {
    let taxonomy = taxonomy();
    let store = KnowledgeStore::new(Path::new("/nonexistent/agri-knowledge"));
    let handle = KnowledgeHandle::default();

    let summary = handle.reload(&store, &taxonomy);

    assert_eq!(summary.total_entries, 0);
    assert!(handle.snapshot().is_empty());
    assert!(KnowledgeSearcher::default()
        .search("fertilizer", &handle.snapshot())
        .is_empty());
}
