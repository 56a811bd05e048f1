use std::sync::Arc;

use tracing::warn;

use tripdex_core::llm::strip_code_fence;
use tripdex_core::traits::LanguageModel;

/// Pulls activity tags out of free text at index time, so documents that
/// never list activities explicitly still land in the structured field.
/// Extraction is best-effort: any failure yields an empty list and the
/// document is indexed without extra tags.
pub struct ActivityExtractor {
    llm: Arc<dyn LanguageModel>,
}

impl ActivityExtractor {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str) -> Vec<String> {
        let prompt = extraction_prompt(text);
        let reply = match self.llm.complete(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "activity extraction failed");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(strip_code_fence(&reply)) {
            Ok(values) => values
                .into_iter()
                .filter_map(|v| v.as_str().map(|s| s.trim().to_lowercase()))
                .filter(|s| !s.is_empty())
                .collect(),
            Err(error) => {
                warn!(%error, "activity extraction reply was not a JSON array");
                Vec::new()
            }
        }
    }
}

fn extraction_prompt(text: &str) -> String {
    format!(
        r#"List the travel activities mentioned in the following text.

Text: "{text}"

Return ONLY a JSON array of short lowercase activity names, for example:
["hiking", "wine tasting"]

Return [] if no activities are mentioned."#
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tripdex_core::traits::LanguageModel;
    use tripdex_core::{Error, Result};

    use super::ActivityExtractor;

    struct Canned(Option<&'static str>);

    #[async_trait]
    impl LanguageModel for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            match self.0 {
                Some(reply) => Ok(reply.to_string()),
                None => Err(Error::LanguageModel("offline".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn parses_and_normalizes_the_array() {
        let extractor = ActivityExtractor::new(Arc::new(Canned(Some(
            "```json\n[\" Hiking \", \"WINE TASTING\", \"\"]\n```",
        ))));
        let tags = extractor.extract("rolling vineyards and trails").await;
        assert_eq!(tags, vec!["hiking", "wine tasting"]);
    }

    #[tokio::test]
    async fn non_array_reply_yields_nothing() {
        let extractor = ActivityExtractor::new(Arc::new(Canned(Some("no activities here"))));
        assert!(extractor.extract("plain text").await.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_yields_nothing() {
        let extractor = ActivityExtractor::new(Arc::new(Canned(None)));
        assert!(extractor.extract("plain text").await.is_empty());
    }
}
