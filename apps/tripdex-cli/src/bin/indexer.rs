use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tripdex_core::config::{resolve_with_base, Settings};
use tripdex_core::corpus::load_corpus;
use tripdex_core::traits::Embedder;
use tripdex_llm::{ActivityExtractor, OpenAiClient};
use tripdex_text::TravelIndexer;
use tripdex_vector::LanceIndexer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut skip_vector = false;
    let mut extract_activities = false;
    let mut positional = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "--skip-vector" => skip_vector = true,
            "--extract-activities" => extract_activities = true,
            _ if !arg.starts_with('-') => positional.push(PathBuf::from(arg)),
            other => {
                eprintln!("Unknown flag: {other}");
                std::process::exit(1);
            }
        }
    }
    let [destinations, guides] = positional.as_slice() else {
        eprintln!("Usage: tripdex-indexer [--skip-vector] [--extract-activities] <destinations.json> <guides.json>");
        std::process::exit(1);
    };

    println!("Travel Corpus Indexer\n=====================");
    let mut docs = load_corpus(destinations, guides)?;
    println!("Loaded {} documents", docs.len());

    let base = env::current_dir()?;
    let llm_available = settings.llm.has_api_key();

    if extract_activities {
        if llm_available {
            let client = Arc::new(OpenAiClient::new(&settings.llm)?);
            let extractor = ActivityExtractor::new(client);
            let mut tagged = 0usize;
            for doc in &mut docs {
                if doc.activities.is_empty() && !doc.description.is_empty() {
                    doc.activities = extractor.extract(&doc.description).await;
                    if !doc.activities.is_empty() {
                        tagged += 1;
                    }
                }
            }
            println!("Tagged {tagged} documents with extracted activities");
        } else {
            println!("Skipping activity extraction (no API key configured)");
        }
    }

    let text_dir = resolve_with_base(&base, &settings.index.text_dir);
    let text_indexer = TravelIndexer::create(&text_dir)?;
    let count = text_indexer.index(&docs)?;
    println!("Indexed {count} documents into the text index at {}", text_dir.display());

    if skip_vector {
        println!("Skipping vector indexing (--skip-vector flag)");
    } else if !llm_available {
        println!("Skipping vector indexing (no API key configured for embeddings)");
    } else {
        let client = OpenAiClient::new(&settings.llm)?;
        let texts: Vec<String> = docs.iter().map(|d| d.embedding_text()).collect();
        let vectors = client.embed_batch(&texts).await?;

        let vector_dir = resolve_with_base(&base, &settings.index.vector_dir);
        let dim = i32::try_from(settings.llm.embed_dim)?;
        let writer = LanceIndexer::create(&vector_dir, &settings.index.vector_table, dim).await?;
        let written = writer.index(&docs, &vectors).await?;
        println!(
            "Indexed {written} documents into the vector store at {}",
            vector_dir.display()
        );
    }

    println!("\nIndexing completed. Try: cargo run --bin tripdex-search hybrid \"wine tasting in tuscany\"");
    Ok(())
}
