#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! The retrieval facade: one entry point dispatching a request to the
//! text, structured, vector, or hybrid pipeline over shared backend
//! handles.

use std::sync::Arc;

use tracing::{debug, warn};

use tripdex_core::query::{FieldFilter, TextQuery};
use tripdex_core::traits::{Embedder, LanguageModel, TextBackend, VectorBackend};
use tripdex_core::types::{
    RankedResult, ScoredDocument, SearchMode, SearchRequest, SearchResponse,
};
use tripdex_core::{Error, Result};
use tripdex_query::{
    reciprocal_rank_fusion, ActivityExpander, QueryRewriter, StructuredQueryBuilder,
};

pub struct Retriever {
    text: Arc<dyn TextBackend>,
    vector: Option<Arc<dyn VectorBackend>>,
    embedder: Option<Arc<dyn Embedder>>,
    rewriter: QueryRewriter,
    builder: StructuredQueryBuilder,
    rrf_k: u32,
}

impl Retriever {
    pub fn new(
        text: Arc<dyn TextBackend>,
        vector: Option<Arc<dyn VectorBackend>>,
        embedder: Option<Arc<dyn Embedder>>,
        llm: Arc<dyn LanguageModel>,
        rrf_k: u32,
    ) -> Self {
        let expander = Arc::new(ActivityExpander::new());
        Self {
            text,
            vector,
            embedder,
            rewriter: QueryRewriter::new(llm),
            builder: StructuredQueryBuilder::new(expander),
            rrf_k,
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        match request.mode {
            SearchMode::Text => self.search_text(request).await,
            SearchMode::Structured => self.search_structured(request).await,
            SearchMode::Vector => self.search_vector(request).await,
            SearchMode::Hybrid => self.search_hybrid(request).await,
        }
    }

    /// Plain BM25 over the combined content field.
    async fn search_text(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = TextQuery::Content(request.query.clone());
        let hits = self.text.search(&query, request.limit).await?;
        Ok(SearchResponse::new(
            SearchMode::Text,
            &request.query,
            plain(hits),
        ))
    }

    /// Rewrite the query into a structured filter, then run the layered
    /// strict/relaxed text search over it.
    async fn search_structured(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let filter = self.rewriter.rewrite(&request.query).await;
        debug!(?filter, "rewrote query");
        let hits = self
            .builder
            .search(self.text.as_ref(), &request.query, &filter, request.limit)
            .await?;
        let mut response = SearchResponse::new(SearchMode::Structured, &request.query, plain(hits));
        response.rewritten_query = Some(filter);
        Ok(response)
    }

    /// Pure similarity search with optional flat-field equality filters.
    /// Embedding failures surface here; there is no text leg to fall
    /// back on.
    async fn search_vector(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let vector_backend = self
            .vector
            .as_ref()
            .ok_or_else(|| Error::BackendUnavailable("vector store not configured".to_string()))?;
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| Error::BackendUnavailable("embedder not configured".to_string()))?;

        let vector = embedder.embed(&request.query).await?;
        let filters = request_filters(request);
        let hits = vector_backend
            .search(&vector, &filters, request.limit)
            .await?;
        Ok(SearchResponse::new(
            SearchMode::Vector,
            &request.query,
            plain(hits),
        ))
    }

    /// Both legs run concurrently; their lists are fused with RRF. A dead
    /// vector leg degrades the response to text-only instead of failing it.
    async fn search_hybrid(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let filter = self.rewriter.rewrite(&request.query).await;
        debug!(?filter, "rewrote query");

        let text_leg = self
            .builder
            .search(self.text.as_ref(), &request.query, &filter, request.limit);
        let vector_leg = self.vector_leg(&request.query, request.limit);
        let (text_hits, vector_hits) = tokio::join!(text_leg, vector_leg);
        let text_hits = text_hits?;

        let mut response = match vector_hits {
            Some(vector_hits) => {
                let mut fused = reciprocal_rank_fusion(&text_hits, &vector_hits, self.rrf_k);
                fused.truncate(request.limit);
                let mut response = SearchResponse::new(SearchMode::Hybrid, &request.query, fused);
                response.text_count = Some(text_hits.len());
                response.vector_count = Some(vector_hits.len());
                response
            }
            None => {
                let mut response =
                    SearchResponse::new(SearchMode::Hybrid, &request.query, plain(text_hits));
                response.degraded = true;
                response
            }
        };
        response.rewritten_query = Some(filter);
        Ok(response)
    }

    /// Vector half of the hybrid pipeline. `None` means the leg is out of
    /// play, whether unconfigured or broken at call time.
    async fn vector_leg(&self, query: &str, limit: usize) -> Option<Vec<ScoredDocument>> {
        let vector_backend = self.vector.as_ref()?;
        let embedder = self.embedder.as_ref()?;
        let vector = match embedder.embed(query).await {
            Ok(vector) => vector,
            Err(error) => {
                warn!(%error, "embedding failed, degrading to text-only");
                return None;
            }
        };
        match vector_backend.search(&vector, &[], limit).await {
            Ok(hits) => Some(hits),
            Err(error) => {
                warn!(%error, "vector search failed, degrading to text-only");
                None
            }
        }
    }
}

fn plain(hits: Vec<ScoredDocument>) -> Vec<RankedResult> {
    hits.into_iter().map(RankedResult::plain).collect()
}

fn request_filters(request: &SearchRequest) -> Vec<FieldFilter> {
    let mut filters = Vec::new();
    if let Some(doc_type) = request.doc_type {
        filters.push(FieldFilter::new("doc_type", doc_type.as_str()));
    }
    if let Some(country) = &request.country {
        filters.push(FieldFilter::new("country", country.as_str()));
    }
    filters
}
