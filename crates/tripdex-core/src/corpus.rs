//! Corpus loading: the two sample-data JSON files (destinations, guides)
//! become [`TravelDocument`]s with stable `{type}_{index}` ids.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::types::{DocType, TravelDocument};

/// Load both corpus files. Destinations get `region = "{name}, {country}"`
/// (they carry no region of their own); guides carry a region but usually
/// no country. Activities are normalized to lower-cased trimmed tokens at
/// load time so the structured activities field matches exact queries.
pub fn load_corpus(destinations_path: &Path, guides_path: &Path) -> Result<Vec<TravelDocument>> {
    let mut documents = Vec::new();

    let destinations = read_records(destinations_path)?;
    for (i, record) in destinations.into_iter().enumerate() {
        let name = str_field(&record, "name");
        let country = str_field(&record, "country");
        let region = format!("{name}, {country}");
        documents.push(build_document(
            DocType::Destination,
            i,
            name,
            country,
            region,
            record,
        ));
    }

    let guides = read_records(guides_path)?;
    for (i, record) in guides.into_iter().enumerate() {
        let name = str_field(&record, "name");
        let country = str_field(&record, "country");
        let region = str_field(&record, "region");
        documents.push(build_document(
            DocType::Guide,
            i,
            name,
            country,
            region,
            record,
        ));
    }

    Ok(documents)
}

fn read_records(path: &Path) -> Result<Vec<serde_json::Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading corpus file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing corpus file {}", path.display()))
}

fn build_document(
    doc_type: DocType,
    index: usize,
    name: String,
    country: String,
    region: String,
    record: serde_json::Value,
) -> TravelDocument {
    let activities = record
        .get("activities")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|a| a.as_str())
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect()
        })
        .unwrap_or_default();

    TravelDocument {
        doc_id: format!("{}_{index}", doc_type.as_str()),
        doc_type,
        name,
        country,
        region,
        description: str_field(&record, "description"),
        activities,
        payload: record,
    }
}

fn str_field(record: &serde_json::Value, key: &str) -> String {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
