use std::path::Path;

use anyhow::{anyhow, Result};
use arrow_array::{Float32Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};

use tripdex_core::query::FieldFilter;
use tripdex_core::traits::VectorBackend;
use tripdex_core::types::{DocType, ScoredDocument};

pub struct LanceSearchEngine {
    db: Connection,
    table_name: String,
}

impl LanceSearchEngine {
    pub async fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
        })
    }

    async fn run(
        &self,
        vector: &[f32],
        filters: &[FieldFilter],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut query = table.vector_search(vector.to_vec())?.limit(limit);
        if let Some(predicate) = build_predicate(filters) {
            query = query.only_if(predicate);
        }
        let mut stream = query.execute().await?;

        let mut hits = Vec::new();
        while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
            for row in 0..batch.num_rows() {
                hits.push(to_scored(&batch, row)?);
            }
        }
        Ok(hits)
    }
}

#[async_trait]
impl VectorBackend for LanceSearchEngine {
    async fn search(
        &self,
        vector: &[f32],
        filters: &[FieldFilter],
        limit: usize,
    ) -> tripdex_core::Result<Vec<ScoredDocument>> {
        Ok(self.run(vector, filters, limit).await?)
    }
}

/// AND-joined equality predicate for pushdown, or `None` when unfiltered.
/// Single quotes in values are doubled so user-supplied strings cannot
/// break out of the literal.
fn build_predicate(filters: &[FieldFilter]) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    let clauses: Vec<String> = filters
        .iter()
        .map(|f| format!("{} = '{}'", f.field, f.value.replace('\'', "''")))
        .collect();
    Some(clauses.join(" AND "))
}

fn str_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("result batch missing column '{name}'"))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow!("column '{name}' is not a string array"))
}

/// Similarity score for the row. LanceDB reports an L2 `_distance` column
/// (lower is better); flip it so higher is better like every other
/// backend. Older result shapes are tolerated via the fallback chain.
fn row_score(batch: &RecordBatch, row: usize) -> f32 {
    let float_value = |name: &str| {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
            .map(|c| c.value(row))
    };
    if let Some(distance) = float_value("_distance") {
        1.0 - distance
    } else if let Some(distance) = float_value("distance") {
        1.0 - distance
    } else if let Some(score) = float_value("_score") {
        score
    } else {
        0.5
    }
}

fn to_scored(batch: &RecordBatch, row: usize) -> Result<ScoredDocument> {
    let doc_type: DocType = str_column(batch, "doc_type")?.value(row).parse()?;
    let activities: Vec<String> = serde_json::from_str(str_column(batch, "activities")?.value(row))?;
    let payload: serde_json::Value = serde_json::from_str(str_column(batch, "payload")?.value(row))?;
    Ok(ScoredDocument {
        doc_id: str_column(batch, "doc_id")?.value(row).to_string(),
        doc_type,
        name: str_column(batch, "name")?.value(row).to_string(),
        country: str_column(batch, "country")?.value(row).to_string(),
        region: str_column(batch, "region")?.value(row).to_string(),
        activities,
        score: row_score(batch, row),
        payload,
    })
}
