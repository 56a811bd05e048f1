#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! LanceDB-backed vector storage and similarity search for travel
//! documents. The writer embeds nothing itself; callers hand it
//! precomputed vectors alongside the documents.

pub mod schema;
pub mod search;
pub mod writer;

pub use search::LanceSearchEngine;
pub use writer::LanceIndexer;
