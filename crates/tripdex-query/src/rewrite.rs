//! LLM-backed query rewriting: free text in, structured filter out.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use tripdex_core::llm::strip_code_fence;
use tripdex_core::traits::LanguageModel;
use tripdex_core::types::StructuredFilter;
use tripdex_core::{Error, Result};

/// Rewrites a natural-language travel query into a [`StructuredFilter`]
/// via the language-model collaborator.
///
/// The model is asked to expand category phrases into specific activities
/// itself; that is a second expansion path independent of
/// [`crate::ActivityExpander`] and is not deduplicated against it.
pub struct QueryRewriter {
    llm: Arc<dyn LanguageModel>,
}

impl QueryRewriter {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Infallible by contract: any transport or parse failure falls back
    /// to the deterministic empty filter instead of surfacing.
    pub async fn rewrite(&self, query: &str) -> StructuredFilter {
        match self.try_rewrite(query).await {
            Ok(filter) => {
                debug!(?filter, "query rewritten");
                filter
            }
            Err(err) => {
                warn!(error = %err, query, "query rewrite failed, using fallback filter");
                StructuredFilter::fallback(query)
            }
        }
    }

    async fn try_rewrite(&self, query: &str) -> Result<StructuredFilter> {
        let reply = self.llm.complete(&extraction_prompt(query)).await?;
        let body = strip_code_fence(&reply);
        let raw: RawRewrite = serde_json::from_str(body)
            .map_err(|e| Error::LanguageModel(format!("unparseable rewrite reply: {e}")))?;
        Ok(raw.into_filter(query))
    }
}

fn extraction_prompt(query: &str) -> String {
    format!(
        r#"Convert the following user query about travel into a structured filter query.

Extract:
1. City/destination name (if mentioned)
2. Country (if mentioned)
3. Activities/services requested (e.g., snorkeling, wine tasting, city tours)
4. Activity categories (e.g., "outdoor activities", "wellness", "adventure", "cultural", "culinary")

IMPORTANT: If the query mentions a category like "outdoor activities", "adventure", "wellness", etc.,
expand it to include specific activities:
- "outdoor activities" or "adventure" -> include: hiking, snorkeling, diving, kayaking, etc.
- "wellness" -> include: yoga, spa treatments, meditation, etc.
- "cultural" -> include: museums, temple visits, historical tours, etc.
- "culinary" or "food" -> include: culinary tours, cooking classes, wine tasting, etc.

User query: "{query}"

Return ONLY a JSON object with this exact structure:
{{
  "city": "city_name_or_null",
  "country": "country_name_or_null",
  "activities": ["activity1", "activity2", "activity3"],
  "original_query": "{query}"
}}

If a field is not mentioned, use null. Activities should be normalized (lowercase, singular forms preferred).
If a category is mentioned, expand it to specific activities in the activities array.
"#
    )
}

/// The reply shape as the model actually produces it: fields may be
/// missing, JSON null, the literal string "null", or (for activities)
/// non-string scalars.
#[derive(Debug, Deserialize)]
struct RawRewrite {
    #[serde(default)]
    city: Option<serde_json::Value>,
    #[serde(default)]
    country: Option<serde_json::Value>,
    #[serde(default)]
    activities: Option<Vec<serde_json::Value>>,
}

impl RawRewrite {
    fn into_filter(self, query: &str) -> StructuredFilter {
        StructuredFilter {
            city: normalize_place(self.city),
            country: normalize_place(self.country),
            activities: self
                .activities
                .unwrap_or_default()
                .into_iter()
                .filter_map(activity_text)
                .collect(),
            original_query: query.to_string(),
        }
    }
}

fn normalize_place(value: Option<serde_json::Value>) -> Option<String> {
    let text = match value? {
        serde_json::Value::String(s) => s,
        _ => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn activity_text(value: serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => return None,
        other => other.to_string(),
    };
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
