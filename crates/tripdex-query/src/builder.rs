//! Layered structured query construction: a strict pass (text AND location
//! AND OR-expanded activities) with a relaxed free-text retry when the
//! strict pass comes back empty.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use tripdex_core::query::TextQuery;
use tripdex_core::traits::TextBackend;
use tripdex_core::types::{ScoredDocument, StructuredFilter};
use tripdex_core::Result;

use crate::activity::ActivityExpander;

/// Cap on the free-text backstop clause so an aggressively expanded
/// activity list cannot blow up query size.
pub const TEXT_BACKSTOP_TERM_CAP: usize = 10;

pub struct StructuredQueryBuilder {
    expander: Arc<ActivityExpander>,
}

impl StructuredQueryBuilder {
    pub fn new(expander: Arc<ActivityExpander>) -> Self {
        Self { expander }
    }

    /// Build and run the layered query. Strict structured matching is
    /// brittle against extraction noise, so a strict pass with activity
    /// filters that yields nothing is retried with the activity terms as
    /// free text before an empty result is reported. Location clauses are
    /// preserved in the relaxed pass; only the structured activity clause
    /// is dropped.
    pub async fn search(
        &self,
        backend: &dyn TextBackend,
        text: &str,
        filter: &StructuredFilter,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let Some(strict) = self.strict_query(text, filter) else {
            // Blank text and an empty filter: match nothing, explicitly.
            debug!("no query clauses, returning empty result");
            return Ok(Vec::new());
        };

        let hits = backend.search(&strict, limit).await?;
        if !hits.is_empty() || !filter.has_activities() {
            return Ok(hits);
        }

        let Some(relaxed) = self.relaxed_query(filter) else {
            return Ok(hits);
        };
        debug!(
            query = filter.original_query,
            "strict pass empty, retrying activities as free text"
        );
        backend.search(&relaxed, limit).await
    }

    /// The strict pass: free text AND city AND country AND (structured
    /// activity terms OR a capped free-text backstop over the same terms).
    pub fn strict_query(&self, text: &str, filter: &StructuredFilter) -> Option<TextQuery> {
        let mut clauses = Vec::new();
        if !text.trim().is_empty() {
            clauses.push(TextQuery::Content(text.trim().to_string()));
        }
        // City and country are folded into the combined text field; they
        // are not separately indexed structured fields.
        if let Some(city) = &filter.city {
            clauses.push(TextQuery::Content(city.to_lowercase()));
        }
        if let Some(country) = &filter.country {
            clauses.push(TextQuery::Content(country.to_lowercase()));
        }
        if filter.has_activities() {
            let expanded = self.expander.expand_all(&filter.activities);
            clauses.push(activity_clause(&expanded));
        }
        TextQuery::and(clauses)
    }

    /// The relaxed pass: every expanded activity term as free text (no
    /// variant padding; free text tokenizes independently), still ANDed
    /// with the location clauses.
    pub fn relaxed_query(&self, filter: &StructuredFilter) -> Option<TextQuery> {
        let expanded = self.expander.expand_all(&filter.activities);
        let backstop = TextQuery::or(
            expanded
                .into_iter()
                .map(TextQuery::Content)
                .collect::<Vec<_>>(),
        )?;
        let mut clauses = vec![backstop];
        if let Some(city) = &filter.city {
            clauses.push(TextQuery::Content(city.to_lowercase()));
        }
        if let Some(country) = &filter.country {
            clauses.push(TextQuery::Content(country.to_lowercase()));
        }
        TextQuery::and(clauses)
    }
}

/// One OR clause covering the structured activities field (every expanded
/// term plus its plural/singular variants, to absorb tokenization
/// mismatches) and a capped free-text backstop for documents whose
/// structured field is missing or incomplete.
fn activity_clause(expanded: &BTreeSet<String>) -> TextQuery {
    let mut structured_terms: BTreeSet<String> = BTreeSet::new();
    for term in expanded {
        structured_terms.insert(term.clone());
        structured_terms.extend(plural_variants(term));
    }
    let structured = TextQuery::Or(
        structured_terms
            .into_iter()
            .map(TextQuery::Activity)
            .collect(),
    );
    let backstop = TextQuery::Or(
        expanded
            .iter()
            .take(TEXT_BACKSTOP_TERM_CAP)
            .cloned()
            .map(TextQuery::Content)
            .collect(),
    );
    TextQuery::Or(vec![structured, backstop])
}

/// `+s`, `-s`, `+es`, `-es` variants of a term, as applicable.
fn plural_variants(term: &str) -> Vec<String> {
    let mut variants = Vec::new();
    if term.len() > 1 && term.ends_with('s') {
        variants.push(term[..term.len() - 1].to_string());
    } else if !term.ends_with('s') {
        variants.push(format!("{term}s"));
    }
    if let Some(base) = term.strip_suffix("es") {
        variants.push(base.to_string());
    } else if term.ends_with('s') {
        variants.push(format!("{term}es"));
    }
    variants
}
