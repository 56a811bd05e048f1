//! Domain types shared by the text and vector retrieval paths.

use serde::{Deserialize, Serialize};

pub type DocId = String;

/// Kind of travel document in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Destination,
    Guide,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Destination => "destination",
            DocType::Guide => "guide",
        }
    }
}

impl std::str::FromStr for DocType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "destination" => Ok(DocType::Destination),
            "guide" => Ok(DocType::Guide),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown doc_type '{other}'"
            ))),
        }
    }
}

/// One indexable travel record, created at index-build time and immutable
/// afterwards. `doc_id` follows the `{type}_{index}` convention and is
/// unique per corpus. `payload` keeps the full original JSON record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelDocument {
    pub doc_id: DocId,
    pub doc_type: DocType,
    pub name: String,
    pub country: String,
    pub region: String,
    pub description: String,
    pub activities: Vec<String>,
    pub payload: serde_json::Value,
}

impl TravelDocument {
    /// Combined free-text field indexed for BM25 relevance.
    pub fn content(&self) -> String {
        [
            self.name.as_str(),
            self.country.as_str(),
            self.region.as_str(),
            self.description.as_str(),
        ]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Text handed to the embedding collaborator. Adds the activity list on
    /// top of the combined field so semantically tagged documents embed
    /// close to activity-flavored queries.
    pub fn embedding_text(&self) -> String {
        let mut text = self.content();
        if !self.activities.is_empty() {
            text.push(' ');
            text.push_str(&self.activities.join(", "));
        }
        text
    }
}

/// The structured interpretation of a free-text query.
///
/// `activities` entries are lower-cased, whitespace-normalized tokens.
/// `city`/`country` are `None` or non-empty normalized strings, never the
/// literal text "null".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFilter {
    pub city: Option<String>,
    pub country: Option<String>,
    pub activities: Vec<String>,
    pub original_query: String,
}

impl StructuredFilter {
    /// Deterministic filter used when query rewriting is unavailable or
    /// returns garbage: no structured constraints, text search only.
    pub fn fallback(query: &str) -> Self {
        Self {
            city: None,
            country: None,
            activities: Vec::new(),
            original_query: query.to_string(),
        }
    }

    pub fn has_activities(&self) -> bool {
        !self.activities.is_empty()
    }
}

/// A document as returned by one backend, carrying that backend's own
/// relevance score (BM25 or vector similarity; higher is always better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub doc_type: DocType,
    pub name: String,
    pub country: String,
    pub region: String,
    pub activities: Vec<String>,
    pub score: f32,
    pub payload: serde_json::Value,
}

/// Per-source score breakdown attached to fused results. The original
/// backend scores are preserved next to the RRF contributions so nothing is
/// lost between fusion and the response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub rrf_score: f64,
    pub text_rrf: f64,
    pub vector_rrf: f64,
    pub text_score: Option<f32>,
    pub vector_score: Option<f32>,
}

/// A result in its final response position. `fusion` is set only for
/// hybrid-mode results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub doc: ScoredDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion: Option<ComponentScores>,
}

impl RankedResult {
    pub fn plain(doc: ScoredDocument) -> Self {
        Self { doc, fusion: None }
    }
}

/// Which composition of backends serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Text,
    Structured,
    Vector,
    Hybrid,
}

impl std::str::FromStr for SearchMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SearchMode::Text),
            "structured" => Ok(SearchMode::Structured),
            "vector" => Ok(SearchMode::Vector),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown search mode '{other}'"
            ))),
        }
    }
}

/// An inbound search request, independent of any other request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub mode: SearchMode,
    pub limit: usize,
    /// Direct equality filter for vector mode; not derived from rewriting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, mode: SearchMode, limit: usize) -> Self {
        Self {
            query: query.into(),
            mode,
            limit,
            doc_type: None,
            country: None,
        }
    }
}

/// The response shape shared by all four modes.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub mode: SearchMode,
    pub original_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewritten_query: Option<StructuredFilter>,
    pub results: Vec<RankedResult>,
    pub count: usize,
    /// True when hybrid mode fell back to text-only output because the
    /// vector leg was unavailable.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_count: Option<usize>,
}

impl SearchResponse {
    pub fn new(mode: SearchMode, query: &str, results: Vec<RankedResult>) -> Self {
        let count = results.len();
        Self {
            mode,
            original_query: query.to_string(),
            rewritten_query: None,
            results,
            count,
            degraded: false,
            text_count: None,
            vector_count: None,
        }
    }
}
