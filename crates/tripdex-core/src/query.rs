//! Boolean query AST handed to the text backend.
//!
//! Each search pass builds its tree functionally and never mutates it
//! afterwards; the strict and relaxed passes of the structured builder are
//! two separate trees, not an edited clause list.

/// A query against the text backend.
///
/// `Content` is a relevance (BM25) sub-query over the combined free-text
/// field; `Activity` is an exact term match on the structured activities
/// field. There is deliberately no "match all" node: a pass with nothing to
/// ask produces no query at all, so "match nothing" is explicit rather than
/// a backend parser default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    Content(String),
    Activity(String),
    And(Vec<TextQuery>),
    Or(Vec<TextQuery>),
}

impl TextQuery {
    /// AND of the given clauses, collapsing the single-clause case.
    pub fn and(mut clauses: Vec<TextQuery>) -> Option<TextQuery> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(TextQuery::And(clauses)),
        }
    }

    /// OR of the given clauses, collapsing the single-clause case.
    pub fn or(mut clauses: Vec<TextQuery>) -> Option<TextQuery> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(TextQuery::Or(clauses)),
        }
    }
}

/// Equality constraint on a flat payload field, used by the vector backend
/// for filter pushdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}
