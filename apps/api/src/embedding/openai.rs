/// OpenAI-compatible embeddings client.
///
/// Wraps `POST {base_url}/embeddings` with bearer auth, batching and retry on
/// 429 / 5xx with exponential backoff.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::embedding::EmbeddingProvider;
use crate::errors::EngineError;

const MAX_RETRIES: u32 = 3;
const MAX_BATCH: usize = 64;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum EmbeddingApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Expected {expected} embeddings, got {got}")]
    CountMismatch { expected: usize, got: usize },

    #[error("Expected dimension {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

impl From<EmbeddingApiError> for EngineError {
    fn from(err: EmbeddingApiError) -> Self {
        EngineError::Embedding(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        dimension: usize,
    ) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            dimension,
        })
    }

    /// Sends one request of at most `MAX_BATCH` inputs, retrying transient failures.
    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingApiError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: Some(self.dimension),
        };

        let mut last_error: Option<EmbeddingApiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s, 2s ...
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingApiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, message);
                last_error = Some(EmbeddingApiError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                    .map(|e| e.error.message)
                    .unwrap_or(raw);
                return Err(EmbeddingApiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let mut parsed: EmbeddingResponse = response.json().await?;
            parsed.data.sort_by_key(|d| d.index);

            if parsed.data.len() != inputs.len() {
                return Err(EmbeddingApiError::CountMismatch {
                    expected: inputs.len(),
                    got: parsed.data.len(),
                });
            }
            if let Some(bad) = parsed.data.iter().find(|d| d.embedding.len() != self.dimension) {
                return Err(EmbeddingApiError::DimensionMismatch {
                    expected: self.dimension,
                    got: bad.embedding.len(),
                });
            }

            debug!("Embedding call succeeded: {} inputs", inputs.len());
            return Ok(parsed.data.into_iter().map(|d| d.embedding).collect());
        }

        Err(last_error.unwrap_or(EmbeddingApiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EngineError::Embedding("Embedding API returned no vectors".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH) {
            vectors.extend(self.request(chunk).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let embedder = OpenAiEmbedder::new(
            "key".to_string(),
            "http://localhost:8000/v1/",
            "m".to_string(),
            8,
        )
        .unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:8000/v1/embeddings");
        assert_eq!(embedder.dimension(), 8);
    }

    #[test]
    fn test_request_serializes_dimensions() {
        let inputs = vec!["hello".to_string()];
        let body = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &inputs,
            dimensions: Some(384),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["dimensions"], 384);
        assert_eq!(json["input"][0], "hello");
    }

    #[test]
    fn test_response_deserializes_out_of_order_indices() {
        let raw = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn test_api_error_converts_to_embedding_error() {
        let err: EngineError = EmbeddingApiError::RateLimited { retries: 3 }.into();
        assert!(matches!(err, EngineError::Embedding(_)));
    }
}
