use std::path::Path;

use anyhow::Result;
use tantivy::schema::Field;
use tantivy::{Index, TantivyDocument};

use tripdex_core::types::TravelDocument;

use crate::tantivy_utils::{build_schema, register_tokenizer};

pub struct TravelIndexer {
    index: Index,
    doc_id_field: Field,
    doc_type_field: Field,
    name_field: Field,
    country_field: Field,
    region_field: Field,
    content_field: Field,
    activities_field: Field,
    payload_field: Field,
}

impl TravelIndexer {
    /// Creates a fresh index at `index_dir`, wiping any previous one.
    pub fn create(index_dir: &Path) -> Result<Self> {
        let schema = build_schema();
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)?;
        }
        std::fs::create_dir_all(index_dir)?;
        let index = Index::create_in_dir(index_dir, schema.clone())?;
        register_tokenizer(&index);
        Ok(Self {
            doc_id_field: schema.get_field("doc_id")?,
            doc_type_field: schema.get_field("doc_type")?,
            name_field: schema.get_field("name")?,
            country_field: schema.get_field("country")?,
            region_field: schema.get_field("region")?,
            content_field: schema.get_field("content")?,
            activities_field: schema.get_field("activities")?,
            payload_field: schema.get_field("payload")?,
            index,
        })
    }

    /// Indexes the whole corpus in one commit and returns the document count.
    pub fn index(&self, docs: &[TravelDocument]) -> Result<usize> {
        let mut writer = self.index.writer(50_000_000)?;
        for doc in docs {
            let mut tdoc = TantivyDocument::new();
            tdoc.add_text(self.doc_id_field, &doc.doc_id);
            tdoc.add_text(self.doc_type_field, doc.doc_type.as_str());
            tdoc.add_text(self.name_field, &doc.name);
            tdoc.add_text(self.country_field, &doc.country);
            tdoc.add_text(self.region_field, &doc.region);
            tdoc.add_text(self.content_field, doc.content());
            for activity in &doc.activities {
                tdoc.add_text(self.activities_field, activity);
            }
            tdoc.add_text(self.payload_field, serde_json::to_string(&doc.payload)?);
            writer.add_document(tdoc)?;
        }
        writer.commit()?;
        Ok(docs.len())
    }
}
