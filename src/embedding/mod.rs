//! Embedding backends that turn sentences into fixed-dimension vectors.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, EmbeddingProvider, get_config};

const USER_AGENT: &str = "rusty-summ/0.2";

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// HTTP transport failure while talking to the provider.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status code.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Status code returned by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
}

/// Interface implemented by embedding backends.
///
/// Implementations return one vector per input text, in input order, all
/// with the same dimensionality. A failed call reports the error without
/// retrying; the caller decides whether to abort or try again.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied sentence.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Offline hashing embedder for tests and air-gapped deployments.
///
/// Vectors are derived from byte content alone, so identical sentences map
/// to identical embeddings across runs and machines.
pub struct DeterministicClient;

impl DeterministicClient {
    /// Construct a new deterministic embedding client instance.
    pub const fn new() -> Self {
        Self
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = idx % dimension;
            // Basic hashing of content into the vector slot
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

impl Default for DeterministicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingClient for DeterministicClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let config = get_config();
        let dimension = config.embedding_dimension;

        tracing::debug!(
            provider = ?config.embedding_provider,
            dimension,
            count = texts.len(),
            "Generating deterministic embeddings"
        );

        if dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        let embeddings = texts
            .into_iter()
            .map(|text| Self::encode(&text, dimension))
            .collect();

        Ok(embeddings)
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding client backed by a local Ollama server.
pub struct OllamaEmbeddingClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) model: String,
}

impl OllamaEmbeddingClient {
    /// Construct a client targeting the configured Ollama endpoint.
    pub fn new(config: &Config) -> Result<Self, EmbeddingClientError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: config.ollama_url.clone(),
            model: config.embedding_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.model,
            count = texts.len(),
            "Generating embeddings via Ollama"
        );

        let url = format!("{}/api/embed", self.base_url.trim_end_matches('/'));
        let body = OllamaEmbedRequest {
            model: &self.model,
            input: &texts,
        };
        let response = self.client.post(url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(model = %self.model, error = %error, "Ollama embedding request failed");
            return Err(error);
        }

        let payload: OllamaEmbedResponse = response.json().await?;
        if payload.embeddings.len() != texts.len() {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                texts.len()
            )));
        }

        Ok(payload.embeddings)
    }
}

#[derive(Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingRow>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding client backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddingClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) api_key: String,
}

impl OpenAiEmbeddingClient {
    /// Construct a client targeting the configured OpenAI-compatible endpoint.
    pub fn new(config: &Config) -> Result<Self, EmbeddingClientError> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            EmbeddingClientError::GenerationFailed("OPENAI_API_KEY is not set".to_string())
        })?;
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.clone(),
            model: config.embedding_model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.model,
            count = texts.len(),
            "Generating embeddings via OpenAI"
        );

        let url = format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'));
        let body = OpenAiEmbeddingRequest {
            model: &self.model,
            input: &texts,
        };
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(model = %self.model, error = %error, "OpenAI embedding request failed");
            return Err(error);
        }

        let payload: OpenAiEmbeddingResponse = response.json().await?;
        if payload.data.len() != texts.len() {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "OpenAI returned {} embeddings for {} inputs",
                payload.data.len(),
                texts.len()
            )));
        }

        let mut rows = payload.data;
        rows.sort_by_key(|row| row.index);
        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client()
-> Result<Box<dyn EmbeddingClient + Send + Sync>, EmbeddingClientError> {
    let config = get_config();
    match config.embedding_provider {
        EmbeddingProvider::Ollama => Ok(Box::new(OllamaEmbeddingClient::new(config)?)),
        EmbeddingProvider::OpenAI => Ok(Box::new(OpenAiEmbeddingClient::new(config)?)),
        EmbeddingProvider::Deterministic => Ok(Box::new(DeterministicClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn ollama_client(base_url: String) -> OllamaEmbeddingClient {
        OllamaEmbeddingClient {
            client: Client::builder()
                .user_agent("rusty-summ-test")
                .build()
                .expect("client"),
            base_url,
            model: "nomic-embed-text".to_string(),
        }
    }

    #[test]
    fn encode_is_stable_and_normalized() {
        let first = DeterministicClient::encode("the same sentence", 8);
        let second = DeterministicClient::encode("the same sentence", 8);
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);

        let norm = first.iter().map(|value| value * value).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn encode_maps_empty_text_to_zero_vector() {
        let embedding = DeterministicClient::encode("", 4);
        assert_eq!(embedding, vec![0.0; 4]);
    }

    #[tokio::test]
    async fn ollama_client_posts_expected_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed").json_body(json!({
                    "model": "nomic-embed-text",
                    "input": ["alpha", "beta"],
                }));
                then.status(200).json_body(json!({
                    "model": "nomic-embed-text",
                    "embeddings": [[0.1, 0.2], [0.3, 0.4]],
                }));
            })
            .await;

        let client = ollama_client(server.base_url());
        let embeddings = client
            .generate_embeddings(vec!["alpha".to_string(), "beta".to_string()])
            .await
            .expect("embeddings");

        mock.assert();
        assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn ollama_client_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(500).body("model not found");
            })
            .await;

        let client = ollama_client(server.base_url());
        let error = client
            .generate_embeddings(vec!["alpha".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            EmbeddingClientError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn ollama_client_rejects_count_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200)
                    .json_body(json!({ "embeddings": [[0.5, 0.5]] }));
            })
            .await;

        let client = ollama_client(server.base_url());
        let error = client
            .generate_embeddings(vec!["alpha".to_string(), "beta".to_string()])
            .await
            .unwrap_err();

        match error {
            EmbeddingClientError::GenerationFailed(message) => {
                assert!(message.contains("1 embeddings for 2 inputs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn openai_client_sends_bearer_and_restores_input_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "data": [
                        { "index": 1, "embedding": [0.3, 0.4] },
                        { "index": 0, "embedding": [0.1, 0.2] },
                    ],
                }));
            })
            .await;

        let client = OpenAiEmbeddingClient {
            client: Client::builder()
                .user_agent("rusty-summ-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            model: "text-embedding-3-small".to_string(),
            api_key: "test-key".to_string(),
        };
        let embeddings = client
            .generate_embeddings(vec!["alpha".to_string(), "beta".to_string()])
            .await
            .expect("embeddings");

        mock.assert();
        assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn clients_reject_empty_input() {
        let client = ollama_client("http://127.0.0.1:1".to_string());
        let error = client.generate_embeddings(Vec::new()).await.unwrap_err();
        assert!(matches!(error, EmbeddingClientError::GenerationFailed(_)));
    }
}
