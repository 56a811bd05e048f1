use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tripdex_core::config::LlmSettings;
use tripdex_core::traits::{Embedder, LanguageModel};
use tripdex_core::{Error, Result};

/// How many texts go into one embeddings request. A failed batch is
/// retried one text at a time before any zero-vector fallback kicks in.
const EMBED_BATCH_SIZE: usize = 100;

const CHAT_TEMPERATURE: f64 = 0.1;
const CHAT_MAX_TOKENS: u32 = 200;

/// Client for an OpenAI-compatible HTTP API, serving both the completion
/// and the embedding collaborator seams.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embed_model: String,
    embed_dim: usize,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        if !settings.has_api_key() {
            return Err(Error::InvalidConfig(
                "llm.api_key is required for the HTTP client".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            chat_model: settings.chat_model.clone(),
            embed_model: settings.embed_model.clone(),
            embed_dim: settings.embed_dim,
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<R, String> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("{url} returned {status}: {detail}"));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| format!("decoding reply from {url} failed: {e}"))
    }

    async fn embed_texts(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, String> {
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };
        let reply: EmbeddingsResponse = self.post_json("/embeddings", &request).await?;
        if reply.data.len() != texts.len() {
            return Err(format!(
                "embeddings reply has {} entries for {} inputs",
                reply.data.len(),
                texts.len()
            ));
        }
        let mut vectors: Vec<(usize, Vec<f32>)> = reply
            .data
            .into_iter()
            .map(|d| (d.index, d.embedding))
            .collect();
        vectors.sort_by_key(|(index, _)| *index);
        Ok(vectors.into_iter().map(|(_, v)| v).collect())
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };
        let reply: ChatResponse = self
            .post_json("/chat/completions", &request)
            .await
            .map_err(Error::LanguageModel)?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::LanguageModel("reply contained no choices".to_string()))?;
        Ok(choice.message.content)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    fn dim(&self) -> usize {
        self.embed_dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .embed_texts(&[text.to_string()])
            .await
            .map_err(Error::Embedding)?;
        Ok(vectors.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(embed_with_fallback(self, self.embed_dim, texts).await)
    }
}

/// The raw embedding call underneath the batch fallback logic, so the
/// fallback contract is testable without a live endpoint.
#[async_trait]
trait EmbedTexts: Sync {
    async fn embed_texts(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, String>;
}

#[async_trait]
impl EmbedTexts for OpenAiClient {
    async fn embed_texts(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, String> {
        OpenAiClient::embed_texts(self, texts).await
    }
}

/// Batch embedding with the fallback contract: the output has exactly
/// `texts.len()` entries. A failed batch is retried one text at a time,
/// and a text that still fails yields a zero vector of `dim`.
async fn embed_with_fallback(
    source: &dyn EmbedTexts,
    dim: usize,
    texts: &[String],
) -> Vec<Vec<f32>> {
    let mut all = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH_SIZE) {
        match source.embed_texts(batch).await {
            Ok(vectors) => all.extend(vectors),
            Err(batch_error) => {
                // One bad text must not sink the batch: retry each text
                // alone and zero-fill the ones that still fail.
                warn!(error = %batch_error, size = batch.len(), "embedding batch failed, retrying per text");
                for text in batch {
                    match source.embed_texts(std::slice::from_ref(text)).await {
                        Ok(mut vectors) => all.push(vectors.remove(0)),
                        Err(item_error) => {
                            warn!(error = %item_error, "embedding failed, using zero vector");
                            all.push(vec![0.0; dim]);
                        }
                    }
                }
            }
        }
    }
    all
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{embed_with_fallback, EmbedTexts, EMBED_BATCH_SIZE};

    const DIM: usize = 4;

    /// Fails any multi-text request containing "bad", and "bad" on its own;
    /// everything else embeds to a constant non-zero vector.
    struct Flaky;

    #[async_trait]
    impl EmbedTexts for Flaky {
        async fn embed_texts(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, String> {
            if texts.iter().any(|t| t == "bad") {
                return Err("boom".to_string());
            }
            Ok(texts.iter().map(|_| vec![0.5; DIM]).collect())
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn clean_batch_passes_through() {
        let out = embed_with_fallback(&Flaky, DIM, &texts(&["a", "b"])).await;
        assert_eq!(out, vec![vec![0.5; DIM], vec![0.5; DIM]]);
    }

    #[tokio::test]
    async fn failing_text_becomes_a_zero_vector_without_shrinking() {
        let input = texts(&["good1", "bad", "good2"]);
        let out = embed_with_fallback(&Flaky, DIM, &input).await;
        assert_eq!(out.len(), input.len());
        assert_eq!(out[0], vec![0.5; DIM]);
        assert_eq!(out[1], vec![0.0; DIM]);
        assert_eq!(out[2], vec![0.5; DIM]);
    }

    #[tokio::test]
    async fn only_the_broken_chunk_falls_back() {
        // More texts than one request carries: the first chunk is clean,
        // the second chunk holds the bad text.
        let mut input = texts(&["good"; EMBED_BATCH_SIZE]);
        input.push("bad".to_string());
        input.push("tail".to_string());

        let out = embed_with_fallback(&Flaky, DIM, &input).await;
        assert_eq!(out.len(), input.len());
        assert!(out[..EMBED_BATCH_SIZE].iter().all(|v| v == &vec![0.5; DIM]));
        assert_eq!(out[EMBED_BATCH_SIZE], vec![0.0; DIM]);
        assert_eq!(out[EMBED_BATCH_SIZE + 1], vec![0.5; DIM]);
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}
