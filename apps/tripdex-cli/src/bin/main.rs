use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tripdex_core::config::{resolve_with_base, Settings};
use tripdex_core::traits::{Embedder, LanguageModel, VectorBackend};
use tripdex_core::types::{SearchMode, SearchRequest, SearchResponse};
use tripdex_llm::{DisabledLlm, OpenAiClient};
use tripdex_retrieval::Retriever;
use tripdex_text::TravelSearchEngine;
use tripdex_vector::LanceSearchEngine;

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
    let (mode, query, limit) = match args.as_slice() {
        [mode, query] => (mode.clone(), query.clone(), settings.search.default_limit),
        [mode, query, limit] => (mode.clone(), query.clone(), limit.parse()?),
        _ => {
            eprintln!("Usage: tripdex-search <text|structured|vector|hybrid> \"<query>\" [limit]");
            std::process::exit(1);
        }
    };
    let mode: SearchMode = mode.parse()?;

    let base = env::current_dir()?;
    let text_dir = resolve_with_base(&base, &settings.index.text_dir);
    let text = Arc::new(TravelSearchEngine::open(&text_dir)?);

    let (vector, embedder, llm) = if settings.llm.has_api_key() {
        let client = Arc::new(OpenAiClient::new(&settings.llm)?);
        let vector_dir = resolve_with_base(&base, &settings.index.vector_dir);
        let vector: Option<Arc<dyn VectorBackend>> = if vector_dir.exists() {
            let engine =
                LanceSearchEngine::open(&vector_dir, &settings.index.vector_table).await?;
            Some(Arc::new(engine))
        } else {
            None
        };
        (
            vector,
            Some(client.clone() as Arc<dyn Embedder>),
            client as Arc<dyn LanguageModel>,
        )
    } else {
        let disabled = Arc::new(DisabledLlm::new(settings.llm.embed_dim));
        (None, None, disabled as Arc<dyn LanguageModel>)
    };

    let retriever = Retriever::new(text, vector, embedder, llm, settings.search.rrf_k);
    let response = retriever
        .search(&SearchRequest::new(query, mode, limit))
        .await?;
    print_response(&response);
    Ok(())
}

fn print_response(response: &SearchResponse) {
    println!("Query: {}", response.original_query);
    if let Some(filter) = &response.rewritten_query {
        println!(
            "Interpreted as: city={:?} country={:?} activities={:?}",
            filter.city, filter.country, filter.activities
        );
    }
    if response.degraded {
        println!("(vector leg unavailable, text-only results)");
    }
    if let (Some(text_count), Some(vector_count)) = (response.text_count, response.vector_count) {
        println!("Fused {text_count} text hits with {vector_count} vector hits");
    }
    println!("{} results\n", response.count);

    for (rank, result) in response.results.iter().enumerate() {
        let doc = &result.doc;
        println!(
            "{:>2}. [{}] {} ({})",
            rank + 1,
            doc.doc_type.as_str(),
            doc.name,
            doc.region
        );
        match &result.fusion {
            Some(scores) => {
                println!(
                    "    rrf={:.5} (text={:.5}, vector={:.5}) bm25={:?} sim={:?}",
                    scores.rrf_score,
                    scores.text_rrf,
                    scores.vector_rrf,
                    scores.text_score,
                    scores.vector_score
                );
            }
            None => println!("    score={:.4}", doc.score),
        }
    }
}
