use tempfile::TempDir;
use tripdex_core::query::TextQuery;
use tripdex_core::traits::TextBackend;
use tripdex_core::types::{DocType, TravelDocument};
use tripdex_text::{TravelIndexer, TravelSearchEngine};

fn doc(id: &str, name: &str, country: &str, description: &str, activities: &[&str]) -> TravelDocument {
    TravelDocument {
        doc_id: id.to_string(),
        doc_type: if id.starts_with("guide") {
            DocType::Guide
        } else {
            DocType::Destination
        },
        name: name.to_string(),
        country: country.to_string(),
        region: format!("{name}, {country}"),
        description: description.to_string(),
        activities: activities.iter().map(|s| (*s).to_string()).collect(),
        payload: serde_json::json!({ "name": name, "country": country }),
    }
}

fn corpus() -> Vec<TravelDocument> {
    vec![
        doc(
            "destination_0",
            "Lisbon",
            "Portugal",
            "Coastal capital known for historic trams and nearby beaches",
            &["surfing", "city tours", "food tours"],
        ),
        doc(
            "destination_1",
            "Tuscany",
            "Italy",
            "Rolling vineyards, hilltop towns and renaissance art",
            &["wine tasting", "cycling", "cooking classes"],
        ),
        doc(
            "guide_0",
            "Alpine Hiking Guide",
            "Switzerland",
            "Trail guide covering the best alpine hiking routes",
            &["hiking", "mountain climbing"],
        ),
    ]
}

fn build(tmp: &TempDir) -> TravelSearchEngine {
    let index_dir = tmp.path().join("text");
    let indexer = TravelIndexer::create(&index_dir).expect("create index");
    let count = indexer.index(&corpus()).expect("index corpus");
    assert_eq!(count, 3);
    TravelSearchEngine::open(&index_dir).expect("open engine")
}

#[tokio::test]
async fn content_query_ranks_by_relevance() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let hits = engine
        .search(&TextQuery::Content("vineyards wine tuscany".to_string()), 10)
        .await
        .expect("search");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].doc_id, "destination_1");
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn activity_terms_match_exactly_only() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let hits = engine
        .search(&TextQuery::Activity("wine tasting".to_string()), 10)
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "destination_1");

    // Prefixes and analyzed fragments do not hit the raw-tokenized field.
    let hits = engine
        .search(&TextQuery::Activity("wine".to_string()), 10)
        .await
        .expect("search");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn conjunction_requires_every_clause() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let both = TextQuery::And(vec![
        TextQuery::Content("lisbon".to_string()),
        TextQuery::Activity("surfing".to_string()),
    ]);
    let hits = engine.search(&both, 10).await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "destination_0");

    let contradictory = TextQuery::And(vec![
        TextQuery::Content("lisbon".to_string()),
        TextQuery::Activity("wine tasting".to_string()),
    ]);
    let hits = engine.search(&contradictory, 10).await.expect("search");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn disjunction_unions_clauses() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let either = TextQuery::Or(vec![
        TextQuery::Activity("surfing".to_string()),
        TextQuery::Activity("hiking".to_string()),
    ]);
    let mut ids: Vec<String> = engine
        .search(&either, 10)
        .await
        .expect("search")
        .into_iter()
        .map(|h| h.doc_id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["destination_0", "guide_0"]);
}

#[tokio::test]
async fn stopwords_do_not_poison_free_text() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let hits = engine
        .search(
            &TextQuery::Content("the beaches and the trams".to_string()),
            10,
        )
        .await
        .expect("search");
    assert!(hits.iter().any(|h| h.doc_id == "destination_0"));
}

#[tokio::test]
async fn zero_limit_yields_no_hits() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let hits = engine
        .search(&TextQuery::Content("lisbon".to_string()), 0)
        .await
        .expect("search");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn malformed_query_syntax_is_tolerated() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    // Unbalanced quotes and dangling operators must not error out.
    let hits = engine
        .search(&TextQuery::Content("\"lisbon AND (".to_string()), 10)
        .await
        .expect("search");
    let _ = hits;
}

#[tokio::test]
async fn stored_fields_round_trip() {
    let tmp = TempDir::new().expect("tempdir");
    let engine = build(&tmp);

    let hits = engine
        .search(&TextQuery::Activity("hiking".to_string()), 10)
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.doc_type, DocType::Guide);
    assert_eq!(hit.name, "Alpine Hiking Guide");
    assert_eq!(hit.region, "Alpine Hiking Guide, Switzerland");
    assert_eq!(hit.activities, vec!["hiking", "mountain climbing"]);
    assert_eq!(hit.payload["country"], "Switzerland");
}
