use agri_knowledge_core::{
    best_excerpt, build_context, BatchSummary, IngestionOptions, IngestionPipeline,
    KeywordTaxonomy, KnowledgeHandle, KnowledgeSearcher, KnowledgeStore, Language, SearchOptions,
};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NO_INFORMATION: &str = "No information found in the knowledge base for this question.";

#[derive(Parser)]
#[command(name = "agri-knowledge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the classified knowledge records
    #[arg(long, env = "AGRI_KNOWLEDGE_DIR", default_value = "knowledge_base")]
    knowledge_dir: PathBuf,

    /// JSON file mapping section names to keyword lists
    #[arg(long, env = "AGRI_KEYWORDS_FILE", default_value = "keywords_config.json")]
    keywords: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, classify and store every PDF/TXT file in a folder.
    Ingest {
        /// Folder that contains the documents (not scanned recursively).
        #[arg(long)]
        folder: PathBuf,
        /// Characters of cleaned full text kept per record.
        #[arg(long, default_value = "5000")]
        full_text_max_chars: usize,
    },
    /// Rank stored snippets against a question.
    Search {
        #[arg(long)]
        query: String,
        /// Minimum relevance score for a snippet to be returned.
        #[arg(long, default_value = "0.1")]
        min_score: f64,
        /// Maximum number of snippets to print.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print per-section entry counts of the stored knowledge.
    Stats,
    /// Print the context text a prompt would be built from.
    Context {
        #[arg(long)]
        query: String,
        /// Locale tag of the question, e.g. en-US or ml-IN.
        #[arg(long, default_value = "en-US")]
        language: String,
    },
    /// Answer from stored knowledge alone.
    Answer {
        #[arg(long)]
        query: String,
    },
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "agri-knowledge boot"
    );

    let taxonomy = KeywordTaxonomy::load_or_default(&cli.keywords);
    let store = KnowledgeStore::new(&cli.knowledge_dir);

    match cli.command {
        Command::Ingest {
            folder,
            full_text_max_chars,
        } => ingest(&folder, &taxonomy, &store, full_text_max_chars)?,
        Command::Search {
            query,
            min_score,
            limit,
        } => {
            let handle = KnowledgeHandle::default();
            handle.reload(&store, &taxonomy);
            let searcher = KnowledgeSearcher::new(SearchOptions {
                min_score,
                limit,
                ..SearchOptions::default()
            });

            let results = searcher.search(&query, &handle.snapshot());
            println!("query: {query}");
            if results.is_empty() {
                println!("{NO_INFORMATION}");
            }
            for result in results {
                println!(
                    "[{}] score={:.3} source={}",
                    result.section, result.score, result.source
                );
                println!("  {}", result.content);
            }
        }
        Command::Stats => {
            let summary = store.load_all(&taxonomy).summary();
            for (section, count) in &summary.section_counts {
                println!("{section}: {count}");
            }
            println!("total_entries: {}", summary.total_entries);
        }
        Command::Context { query, language } => {
            let base = store.load_all(&taxonomy);
            let results = KnowledgeSearcher::default().search(&query, &base);
            let context = build_context(&results, Language::from_tag(&language));
            info!(context_chars = context.chars().count(), "context built");
            println!("{context}");
        }
        Command::Answer { query } => {
            let base = store.load_all(&taxonomy);
            let results = KnowledgeSearcher::default().search(&query, &base);
            match best_excerpt(&query, &results)? {
                Some(excerpt) => println!("Based on our agricultural knowledge base: {excerpt}"),
                None => println!("{NO_INFORMATION}"),
            }
        }
    }

    Ok(())
}

fn ingest(
    folder: &Path,
    taxonomy: &KeywordTaxonomy,
    store: &KnowledgeStore,
    full_text_max_chars: usize,
) -> anyhow::Result<()> {
    let options = IngestionOptions {
        full_text_max_chars,
        ..IngestionOptions::default()
    };
    let pipeline = IngestionPipeline::new(taxonomy, options)
        .context("failed to compile keyword taxonomy")?;

    let report = pipeline
        .ingest_directory(folder, store)
        .with_context(|| format!("failed to ingest {}", folder.display()))?;

    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
    }

    if report.processed.is_empty() {
        println!("0 documents ingested");
        return Ok(());
    }

    let knowledge = store.load_all(taxonomy).summary();
    let summary = BatchSummary::new(report.file_names(), &knowledge);
    let summary_path = store
        .write_summary(&summary)
        .context("failed to write ingestion summary")?;

    for (section, count) in knowledge.non_empty_sections() {
        println!("  {section}: {count} entries");
    }
    println!(
        "{} documents ingested, {} knowledge entries, summary at {}",
        report.processed_count(),
        knowledge.total_entries,
        summary_path.display()
    );

    Ok(())
}
