use async_trait::async_trait;

use tripdex_core::traits::{Embedder, LanguageModel};
use tripdex_core::{Error, Result};

/// Stand-in wired up when no API key is configured. Every call fails with
/// a typed error naming the missing configuration, so callers degrade the
/// same way they would on a network outage.
pub struct DisabledLlm {
    dim: usize,
}

impl DisabledLlm {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait]
impl LanguageModel for DisabledLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::LanguageModel(
            "language model disabled: no API key configured".to_string(),
        ))
    }
}

#[async_trait]
impl Embedder for DisabledLlm {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding(
            "embeddings disabled: no API key configured".to_string(),
        ))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::Embedding(
            "embeddings disabled: no API key configured".to_string(),
        ))
    }
}
