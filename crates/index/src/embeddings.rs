use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use resolve::{Embedder, truncate_chars};

/// Output width of the embedding model, and of the fallback zero vector, so
/// disabled runs still satisfy the knn mapping.
pub const EMBEDDING_DIMENSION: usize = 1536;

/// Longest input the provider accepts; longer chunk text is cut before
/// submission. The stored chunk text is never cut.
pub const EMBEDDING_MAX_CHARS: usize = 8000;

const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// What to do when chunk text exceeds the embedding input limit.
///
/// `Silent` drops the tail without a trace, which matches the reference
/// behavior but means the embedding covers less text than the document
/// claims. `Warn` keeps the cut and logs one line per oversize chunk;
/// `Fail` aborts the run instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    Silent,
    Warn,
    Fail,
}

impl std::str::FromStr for TruncationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            other => Err(anyhow::anyhow!("Unknown truncation policy: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings client.
///
/// Without an API key the client runs disabled: every chunk embeds to an
/// all-zero vector, which keeps documents indexable (the knn field must be
/// present and well-formed) while making them unreachable by vector
/// similarity. Text search over those documents still works.
#[derive(Clone)]
pub struct EmbeddingClient {
    api_key: Option<String>,
    base_url: String,
    truncation: TruncationPolicy,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(api_key: Option<String>, truncation: TruncationPolicy) -> Self {
        Self {
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            truncation,
            client: reqwest::Client::new(),
        }
    }

    /// Client with no provider configured; embeds everything as zeros.
    pub fn disabled() -> Self {
        Self::new(None, TruncationPolicy::Silent)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Embed one chunk of text.
    ///
    /// Provider errors are not retried or swallowed; the caller is expected
    /// to abort the run on the first failure.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let Some(api_key) = &self.api_key else {
            return Ok(vec![0.0; EMBEDDING_DIMENSION]);
        };

        let input = truncate_chars(text, EMBEDDING_MAX_CHARS);
        if input.len() < text.len() {
            match self.truncation {
                TruncationPolicy::Silent => {}
                TruncationPolicy::Warn => tracing::warn!(
                    chars = text.chars().count(),
                    limit = EMBEDDING_MAX_CHARS,
                    "Chunk text exceeds embedding input limit, tail dropped"
                ),
                TruncationPolicy::Fail => anyhow::bail!(
                    "Chunk text exceeds the embedding input limit of {} characters",
                    EMBEDDING_MAX_CHARS
                ),
            }
        }

        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL.to_string(),
            input: input.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send embedding request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding request failed ({}): {}", status, error_text);
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse embedding response")?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow::anyhow!("Embedding response contained no vectors"))
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_returns_zero_vector() {
        let client = EmbeddingClient::disabled();
        let vector = client.embed_text("anything at all").await.unwrap();

        assert_eq!(vector.len(), EMBEDDING_DIMENSION);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_disabled_client_ignores_input_length() {
        let client = EmbeddingClient::disabled();
        let long_text = "x".repeat(EMBEDDING_MAX_CHARS * 2);
        let vector = client.embed_text(&long_text).await.unwrap();
        assert_eq!(vector.len(), EMBEDDING_DIMENSION);
    }

    #[tokio::test]
    async fn test_fail_policy_rejects_oversize_input_before_sending() {
        // A key is set but no request goes out: the length check runs first
        let client = EmbeddingClient::new(Some("test-key".to_string()), TruncationPolicy::Fail);
        let long_text = "x".repeat(EMBEDDING_MAX_CHARS + 1);

        let result = client.embed_text(&long_text).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_truncation_policy_parsing() {
        assert_eq!("silent".parse::<TruncationPolicy>().unwrap(), TruncationPolicy::Silent);
        assert_eq!("WARN".parse::<TruncationPolicy>().unwrap(), TruncationPolicy::Warn);
        assert_eq!("Fail".parse::<TruncationPolicy>().unwrap(), TruncationPolicy::Fail);
        assert!("loud".parse::<TruncationPolicy>().is_err());
    }
}
