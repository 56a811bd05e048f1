use std::path::Path;

use async_trait::async_trait;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{Index, IndexReader, TantivyDocument, Term};

use tripdex_core::query::TextQuery;
use tripdex_core::traits::TextBackend;
use tripdex_core::types::{DocType, ScoredDocument};
use tripdex_core::Result;

use crate::tantivy_utils::register_tokenizer;

/// Read side of the text index. Holds a long-lived reader; each search
/// grabs a fresh searcher from it.
pub struct TravelSearchEngine {
    index: Index,
    reader: IndexReader,
    doc_id_field: Field,
    doc_type_field: Field,
    name_field: Field,
    country_field: Field,
    region_field: Field,
    content_field: Field,
    activities_field: Field,
    payload_field: Field,
}

impl TravelSearchEngine {
    pub fn open(index_dir: &Path) -> anyhow::Result<Self> {
        let index = Index::open_in_dir(index_dir)?;
        register_tokenizer(&index);
        let reader = index.reader()?;
        let schema = index.schema();
        Ok(Self {
            doc_id_field: schema.get_field("doc_id")?,
            doc_type_field: schema.get_field("doc_type")?,
            name_field: schema.get_field("name")?,
            country_field: schema.get_field("country")?,
            region_field: schema.get_field("region")?,
            content_field: schema.get_field("content")?,
            activities_field: schema.get_field("activities")?,
            payload_field: schema.get_field("payload")?,
            reader,
            index,
        })
    }

    /// Lowers the backend-neutral query tree onto tantivy's query types.
    /// Free-text nodes go through the lenient parser (user text must never
    /// abort a search over syntax), activity nodes become exact term
    /// queries against the raw-tokenized field.
    fn lower(&self, query: &TextQuery) -> Box<dyn Query> {
        match query {
            TextQuery::Content(text) => {
                let parser = QueryParser::for_index(&self.index, vec![self.content_field]);
                let (parsed, _errors) = parser.parse_query_lenient(text);
                parsed
            }
            TextQuery::Activity(term) => Box::new(TermQuery::new(
                Term::from_field_text(self.activities_field, term),
                IndexRecordOption::Basic,
            )),
            TextQuery::And(clauses) => Box::new(BooleanQuery::new(
                clauses
                    .iter()
                    .map(|c| (Occur::Must, self.lower(c)))
                    .collect(),
            )),
            TextQuery::Or(clauses) => Box::new(BooleanQuery::new(
                clauses
                    .iter()
                    .map(|c| (Occur::Should, self.lower(c)))
                    .collect(),
            )),
        }
    }

    fn run(&self, query: &TextQuery, limit: usize) -> anyhow::Result<Vec<ScoredDocument>> {
        // tantivy's top-docs collector rejects a zero limit outright; a
        // request for zero results is simply empty.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let searcher = self.reader.searcher();
        let lowered = self.lower(query);
        let top_docs = searcher.search(&lowered, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            hits.push(self.to_scored(&doc, score)?);
        }
        Ok(hits)
    }

    fn to_scored(&self, doc: &TantivyDocument, score: f32) -> anyhow::Result<ScoredDocument> {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let doc_type: DocType = text(self.doc_type_field).parse()?;
        let activities = doc
            .get_all(self.activities_field)
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
        let payload = match doc.get_first(self.payload_field).and_then(|v| v.as_str()) {
            Some(raw) => serde_json::from_str(raw)?,
            None => serde_json::Value::Null,
        };
        Ok(ScoredDocument {
            doc_id: text(self.doc_id_field),
            doc_type,
            name: text(self.name_field),
            country: text(self.country_field),
            region: text(self.region_field),
            activities,
            score,
            payload,
        })
    }
}

#[async_trait]
impl TextBackend for TravelSearchEngine {
    async fn search(&self, query: &TextQuery, limit: usize) -> Result<Vec<ScoredDocument>> {
        Ok(self.run(query, limit)?)
    }
}
