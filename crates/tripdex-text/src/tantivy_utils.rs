use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

/// Field layout shared by the indexer and the search engine.
///
/// `content` is the relevance field: the document's name, country, region
/// and description joined into one analyzed blob. `activities` keeps each
/// activity term as a single raw token so structured queries can hit it
/// with exact term matches instead of analyzed text.
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let _doc_id = schema_builder.add_text_field("doc_id", STRING | STORED);
    let _doc_type = schema_builder.add_text_field("doc_type", STRING | STORED);
    let _name = schema_builder.add_text_field("name", STORED);
    let _country = schema_builder.add_text_field("country", STRING | STORED);
    let _region = schema_builder.add_text_field("region", STORED);

    let content_indexing = TextFieldIndexing::default()
        .set_tokenizer("text_with_stopwords")
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let content_options = TextOptions::default().set_indexing_options(content_indexing);
    let _content = schema_builder.add_text_field("content", content_options);

    let activity_indexing = TextFieldIndexing::default()
        .set_tokenizer("raw")
        .set_index_option(IndexRecordOption::Basic);
    let activity_options = TextOptions::default()
        .set_indexing_options(activity_indexing)
        .set_stored();
    let _activities = schema_builder.add_text_field("activities", activity_options);

    let _payload = schema_builder.add_text_field("payload", STORED);
    schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
    let stop_words = vec![
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not",
        "this", "these", "they", "them", "their", "there", "then", "than", "so", "if", "when",
        "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could", "should",
        "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
    ];
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            stop_words.into_iter().map(|s| s.to_string()),
        ))
        .build();
    index.tokenizers().register("text_with_stopwords", tokenizer);
}
