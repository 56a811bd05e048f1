#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Query understanding and rank fusion: activity expansion, LLM-backed
//! query rewriting, layered structured query construction, and Reciprocal
//! Rank Fusion of heterogeneous result lists.

pub mod activity;
pub mod builder;
pub mod fusion;
pub mod rewrite;

pub use activity::ActivityExpander;
pub use builder::StructuredQueryBuilder;
pub use fusion::reciprocal_rank_fusion;
pub use rewrite::QueryRewriter;
