//! Reciprocal Rank Fusion of the text and vector result lists.

use std::collections::{HashMap, HashSet};

use tripdex_core::types::{ComponentScores, RankedResult, ScoredDocument};

/// Merge two independently ranked lists by document id. Each list
/// contributes `1/(k + rank)` for the documents it contains (1-based rank,
/// zero when absent); a document present in both lists only gains score.
///
/// Ordering is a descending stable sort over the combined score, so ties
/// keep the order in which documents were first encountered iterating the
/// text list then the vector list. The original per-source scores ride
/// along in [`ComponentScores`]; fusion loses no metadata.
pub fn reciprocal_rank_fusion(
    text_hits: &[ScoredDocument],
    vector_hits: &[ScoredDocument],
    k: u32,
) -> Vec<RankedResult> {
    let k = f64::from(k);

    let mut text_scores: HashMap<&str, (f64, f32)> = HashMap::new();
    for (i, doc) in text_hits.iter().enumerate() {
        text_scores
            .entry(doc.doc_id.as_str())
            .or_insert((1.0 / (k + (i + 1) as f64), doc.score));
    }
    let mut vector_scores: HashMap<&str, (f64, f32)> = HashMap::new();
    for (i, doc) in vector_hits.iter().enumerate() {
        vector_scores
            .entry(doc.doc_id.as_str())
            .or_insert((1.0 / (k + (i + 1) as f64), doc.score));
    }

    // First-encountered order is the tie-break order.
    let mut fused: Vec<(ScoredDocument, ComponentScores)> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for doc in text_hits.iter().chain(vector_hits.iter()) {
        if !seen.insert(doc.doc_id.as_str()) {
            continue;
        }
        let text = text_scores.get(doc.doc_id.as_str());
        let vector = vector_scores.get(doc.doc_id.as_str());
        let text_rrf = text.map_or(0.0, |(rrf, _)| *rrf);
        let vector_rrf = vector.map_or(0.0, |(rrf, _)| *rrf);
        fused.push((
            doc.clone(),
            ComponentScores {
                rrf_score: text_rrf + vector_rrf,
                text_rrf,
                vector_rrf,
                text_score: text.map(|(_, score)| *score),
                vector_score: vector.map(|(_, score)| *score),
            },
        ));
    }

    // sort_by is stable; equal scores keep first-encountered order.
    fused.sort_by(|a, b| {
        b.1.rrf_score
            .partial_cmp(&a.1.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    fused
        .into_iter()
        .map(|(doc, scores)| RankedResult {
            doc,
            fusion: Some(scores),
        })
        .collect()
}
