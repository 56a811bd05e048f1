use std::sync::Arc;

use async_trait::async_trait;
use tripdex_core::traits::LanguageModel;
use tripdex_core::types::StructuredFilter;
use tripdex_core::{Error, Result};
use tripdex_query::QueryRewriter;

struct CannedLlm {
    reply: Option<String>,
}

impl CannedLlm {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl LanguageModel for CannedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(Error::LanguageModel("connection refused".to_string())),
        }
    }
}

#[tokio::test]
async fn well_formed_reply_becomes_a_filter() {
    let rewriter = QueryRewriter::new(CannedLlm::replying(
        r#"{"city": "Tuscany", "country": null, "activities": ["Wine Tasting"], "original_query": "Wine tasting in Tuscany"}"#,
    ));
    let filter = rewriter.rewrite("Wine tasting in Tuscany").await;
    assert_eq!(filter.city.as_deref(), Some("Tuscany"));
    assert_eq!(filter.country, None);
    assert_eq!(filter.activities, vec!["wine tasting"]);
    assert_eq!(filter.original_query, "Wine tasting in Tuscany");
}

#[tokio::test]
async fn fenced_reply_is_unwrapped() {
    let rewriter = QueryRewriter::new(CannedLlm::replying(
        "```json\n{\"city\": \"Paris\", \"country\": \"France\", \"activities\": [\"city tours\"]}\n```",
    ));
    let filter = rewriter.rewrite("City tours in Paris").await;
    assert_eq!(filter.city.as_deref(), Some("Paris"));
    assert_eq!(filter.country.as_deref(), Some("France"));
    assert_eq!(filter.activities, vec!["city tours"]);
}

#[tokio::test]
async fn literal_null_strings_become_none() {
    let rewriter = QueryRewriter::new(CannedLlm::replying(
        r#"{"city": "null", "country": "NULL", "activities": []}"#,
    ));
    let filter = rewriter.rewrite("hiking somewhere").await;
    assert_eq!(filter.city, None);
    assert_eq!(filter.country, None);
}

#[tokio::test]
async fn activities_are_normalized_and_cleaned() {
    let rewriter = QueryRewriter::new(CannedLlm::replying(
        r#"{"city": null, "country": null, "activities": ["  Snorkeling ", "", 42, null]}"#,
    ));
    let filter = rewriter.rewrite("snorkeling").await;
    assert_eq!(filter.activities, vec!["snorkeling", "42"]);
}

#[tokio::test]
async fn malformed_reply_falls_back() {
    let rewriter = QueryRewriter::new(CannedLlm::replying("sorry, I can't help with that"));
    let filter = rewriter.rewrite("Snorkeling near Lisbon").await;
    assert_eq!(filter, StructuredFilter::fallback("Snorkeling near Lisbon"));
}

#[tokio::test]
async fn transport_failure_falls_back() {
    let rewriter = QueryRewriter::new(CannedLlm::failing());
    let filter = rewriter.rewrite("Snorkeling near Lisbon").await;
    assert_eq!(filter, StructuredFilter::fallback("Snorkeling near Lisbon"));
}
