//! Collaborator seams. The core pipeline only ever talks to these traits,
//! so every component is testable with in-process fakes.
//!
//! Implementations are long-lived: handles are opened once at process start
//! and shared across requests, and must be safe for concurrent reads.

use async_trait::async_trait;

use crate::query::{FieldFilter, TextQuery};
use crate::types::ScoredDocument;
use crate::Result;

/// Full-text search backend (BM25-style relevance plus exact-match clauses
/// on the structured activities field). Results come back in descending
/// score order with their stored payloads.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredDocument>>;
}

/// Vector similarity backend. `filters` are flat-field equality constraints
/// applied by the backend; results come back in descending similarity order.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn search(
        &self,
        vector: &[f32],
        filters: &[FieldFilter],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>>;
}

/// External embedding collaborator.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;

    /// Embed one query. Unlike the batch path there is no fallback vector
    /// here, so failures surface to the caller.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts. The output always has exactly `texts.len()`
    /// entries: a text that fails to embed yields a zero vector of `dim()`,
    /// never a shorter list.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// External language-model collaborator. Returns free text that callers
/// expect to parse as strict JSON; a malformed reply is the caller's
/// problem to recover from, a transport failure is a typed error.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
