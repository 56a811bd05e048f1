use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::{connect, Connection};

use tripdex_core::types::TravelDocument;

use crate::schema::build_arrow_schema;

const WRITE_BATCH_SIZE: usize = 256;

pub struct LanceIndexer {
    db: Connection,
    table_name: String,
    dim: i32,
}

impl LanceIndexer {
    /// Connects to a fresh store at `db_path`, wiping any previous one so a
    /// rebuild never appends onto stale rows.
    pub async fn create(db_path: &Path, table_name: &str, dim: i32) -> Result<Self> {
        if db_path.exists() {
            std::fs::remove_dir_all(db_path)?;
        }
        std::fs::create_dir_all(db_path)?;
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            dim,
        })
    }

    /// Writes documents and their precomputed vectors. Both slices must be
    /// the same length; every vector must match the configured dimension.
    pub async fn index(&self, docs: &[TravelDocument], vectors: &[Vec<f32>]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        if docs.len() != vectors.len() {
            bail!(
                "document/vector count mismatch: {} docs, {} vectors",
                docs.len(),
                vectors.len()
            );
        }

        let pb = ProgressBar::new(docs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")?
                .progress_chars("#>-"),
        );
        for (chunk_docs, chunk_vecs) in docs
            .chunks(WRITE_BATCH_SIZE)
            .zip(vectors.chunks(WRITE_BATCH_SIZE))
        {
            self.insert_batch(chunk_docs, chunk_vecs).await?;
            pb.inc(chunk_docs.len() as u64);
        }
        pb.finish_with_message("done");
        Ok(docs.len())
    }

    async fn insert_batch(&self, docs: &[TravelDocument], vectors: &[Vec<f32>]) -> Result<()> {
        let batch = self.to_record_batch(docs, vectors)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if self
            .db
            .table_names()
            .execute()
            .await?
            .contains(&self.table_name)
        {
            self.db
                .open_table(&self.table_name)
                .execute()
                .await?
                .add(reader)
                .execute()
                .await?;
        } else {
            self.db
                .create_table(&self.table_name, reader)
                .execute()
                .await?;
        }
        Ok(())
    }

    fn to_record_batch(&self, docs: &[TravelDocument], vectors: &[Vec<f32>]) -> Result<RecordBatch> {
        let mut doc_ids = Vec::with_capacity(docs.len());
        let mut doc_types = Vec::with_capacity(docs.len());
        let mut names = Vec::with_capacity(docs.len());
        let mut countries = Vec::with_capacity(docs.len());
        let mut regions = Vec::with_capacity(docs.len());
        let mut activities = Vec::with_capacity(docs.len());
        let mut payloads = Vec::with_capacity(docs.len());
        let mut cells: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(docs.len());

        for (doc, vector) in docs.iter().zip(vectors.iter()) {
            if vector.len() != self.dim as usize {
                bail!(
                    "vector for {} has dimension {}, table expects {}",
                    doc.doc_id,
                    vector.len(),
                    self.dim
                );
            }
            doc_ids.push(doc.doc_id.clone());
            doc_types.push(doc.doc_type.as_str().to_string());
            names.push(doc.name.clone());
            countries.push(doc.country.clone());
            regions.push(doc.region.clone());
            activities.push(serde_json::to_string(&doc.activities)?);
            payloads.push(serde_json::to_string(&doc.payload)?);
            cells.push(Some(vector.iter().map(|&x| Some(x)).collect()));
        }

        let batch = RecordBatch::try_new(
            build_arrow_schema(self.dim),
            vec![
                Arc::new(StringArray::from(doc_ids)),
                Arc::new(StringArray::from(doc_types)),
                Arc::new(StringArray::from(names)),
                Arc::new(StringArray::from(countries)),
                Arc::new(StringArray::from(regions)),
                Arc::new(StringArray::from(activities)),
                Arc::new(StringArray::from(payloads)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(cells.into_iter(), self.dim)),
            ],
        )?;
        Ok(batch)
    }
}
