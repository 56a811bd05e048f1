use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tripdex_core::query::TextQuery;
use tripdex_core::traits::TextBackend;
use tripdex_core::types::{DocType, ScoredDocument, StructuredFilter};
use tripdex_core::Result;
use tripdex_query::builder::TEXT_BACKSTOP_TERM_CAP;
use tripdex_query::{ActivityExpander, StructuredQueryBuilder};

/// Records every query it receives and pops canned responses in order.
struct RecordingBackend {
    queries: Mutex<Vec<TextQuery>>,
    responses: Mutex<Vec<Vec<ScoredDocument>>>,
}

impl RecordingBackend {
    fn new(responses: Vec<Vec<ScoredDocument>>) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
        }
    }

    fn recorded(&self) -> Vec<TextQuery> {
        self.queries.lock().expect("lock").clone()
    }
}

#[async_trait]
impl TextBackend for RecordingBackend {
    async fn search(&self, query: &TextQuery, _limit: usize) -> Result<Vec<ScoredDocument>> {
        self.queries.lock().expect("lock").push(query.clone());
        let mut responses = self.responses.lock().expect("lock");
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(responses.remove(0))
        }
    }
}

fn sample_doc(id: &str) -> ScoredDocument {
    ScoredDocument {
        doc_id: id.to_string(),
        doc_type: DocType::Destination,
        name: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        region: "Lisbon, Portugal".to_string(),
        activities: vec!["snorkeling".to_string()],
        score: 1.0,
        payload: serde_json::Value::Null,
    }
}

fn builder() -> StructuredQueryBuilder {
    StructuredQueryBuilder::new(Arc::new(ActivityExpander::new()))
}

fn filter(city: Option<&str>, country: Option<&str>, activities: &[&str]) -> StructuredFilter {
    StructuredFilter {
        city: city.map(str::to_string),
        country: country.map(str::to_string),
        activities: activities.iter().map(|s| (*s).to_string()).collect(),
        original_query: "q".to_string(),
    }
}

/// Depth-first scan for a predicate anywhere in the tree.
fn any_node(query: &TextQuery, pred: &dyn Fn(&TextQuery) -> bool) -> bool {
    if pred(query) {
        return true;
    }
    match query {
        TextQuery::And(clauses) | TextQuery::Or(clauses) => {
            clauses.iter().any(|c| any_node(c, pred))
        }
        _ => false,
    }
}

fn count_nodes(query: &TextQuery, pred: &dyn Fn(&TextQuery) -> bool) -> usize {
    let mut count = usize::from(pred(query));
    if let TextQuery::And(clauses) | TextQuery::Or(clauses) = query {
        count += clauses.iter().map(|c| count_nodes(c, pred)).sum::<usize>();
    }
    count
}

#[tokio::test]
async fn empty_text_and_empty_filter_never_hit_the_backend() {
    let backend = RecordingBackend::new(vec![]);
    let hits = builder()
        .search(&backend, "  ", &filter(None, None, &[]), 10)
        .await
        .expect("search");
    assert!(hits.is_empty());
    assert!(backend.recorded().is_empty());
}

#[tokio::test]
async fn strict_hit_skips_the_relaxed_pass() {
    let backend = RecordingBackend::new(vec![vec![sample_doc("destination_0")]]);
    let hits = builder()
        .search(
            &backend,
            "snorkeling near lisbon",
            &filter(Some("Lisbon"), None, &["snorkeling"]),
            10,
        )
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(backend.recorded().len(), 1);
}

#[tokio::test]
async fn empty_strict_pass_triggers_the_relaxed_pass() {
    // Strict pass returns nothing, relaxed pass returns one hit; both
    // passes must reach the backend.
    let backend = RecordingBackend::new(vec![vec![], vec![sample_doc("guide_3")]]);
    let hits = builder()
        .search(
            &backend,
            "anything",
            &filter(None, None, &["nonexistent_xyz"]),
            10,
        )
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);

    let recorded = backend.recorded();
    assert_eq!(recorded.len(), 2);
    // The relaxed pass carries no structured activity clause.
    assert!(!any_node(&recorded[1], &|q| matches!(
        q,
        TextQuery::Activity(_)
    )));
}

#[tokio::test]
async fn no_relaxed_pass_without_activity_filters() {
    let backend = RecordingBackend::new(vec![vec![]]);
    let hits = builder()
        .search(&backend, "unmatched text", &filter(Some("Paris"), None, &[]), 10)
        .await
        .expect("search");
    assert!(hits.is_empty());
    assert_eq!(backend.recorded().len(), 1);
}

#[tokio::test]
async fn relaxed_pass_preserves_location_clauses() {
    let backend = RecordingBackend::new(vec![vec![], vec![]]);
    builder()
        .search(
            &backend,
            "q",
            &filter(Some("Lisbon"), Some("Portugal"), &["nonexistent_xyz"]),
            10,
        )
        .await
        .expect("search");

    let recorded = backend.recorded();
    assert_eq!(recorded.len(), 2);
    for pass in &recorded {
        assert!(any_node(pass, &|q| q == &TextQuery::Content("lisbon".to_string())));
        assert!(any_node(pass, &|q| q
            == &TextQuery::Content("portugal".to_string())));
    }
}

#[test]
fn strict_query_contains_structured_terms_and_variants() {
    let query = builder()
        .strict_query("tours in paris", &filter(None, None, &["tour"]))
        .expect("query");

    for term in ["tour", "tours"] {
        assert!(
            any_node(&query, &|q| q == &TextQuery::Activity(term.to_string())),
            "missing structured term {term}"
        );
    }
    // Synonyms from expansion reach the structured field too.
    assert!(any_node(&query, &|q| q
        == &TextQuery::Activity("guided tour".to_string())));
}

#[test]
fn strict_query_backstop_is_capped() {
    // A category term expands well past the cap; the free-text backstop
    // must stay bounded while the structured clause may grow freely.
    let query = builder()
        .strict_query("", &filter(None, None, &["outdoor activities"]))
        .expect("query");
    let content_terms = count_nodes(&query, &|q| matches!(q, TextQuery::Content(_)));
    assert!(content_terms <= TEXT_BACKSTOP_TERM_CAP);
    let structured_terms = count_nodes(&query, &|q| matches!(q, TextQuery::Activity(_)));
    assert!(structured_terms > TEXT_BACKSTOP_TERM_CAP);
}

#[test]
fn relaxed_query_is_free_text_only() {
    let query = builder()
        .relaxed_query(&filter(None, None, &["snorkeling"]))
        .expect("query");
    assert!(!any_node(&query, &|q| matches!(q, TextQuery::Activity(_))));
    assert!(any_node(&query, &|q| q
        == &TextQuery::Content("snorkeling".to_string())));
}
