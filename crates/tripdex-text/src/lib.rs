#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Tantivy-based text indexing and search over the travel corpus. The
//! `index` module builds the on-disk index, `search` serves BM25 queries
//! against it through the [`tripdex_core::traits::TextBackend`] trait.

pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use index::TravelIndexer;
pub use search::TravelSearchEngine;
