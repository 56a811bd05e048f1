use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Arrow layout of the vector table. Scalar fields stay flat so equality
/// predicates can push down into the store; `activities` and `payload`
/// travel as JSON strings because neither needs predicate support.
pub fn build_arrow_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("doc_id", DataType::Utf8, false),
        Field::new("doc_type", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("activities", DataType::Utf8, false),
        Field::new("payload", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
