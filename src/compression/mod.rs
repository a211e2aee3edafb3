//! Abstractive compression of extracted sentences via LLM providers.
//!
//! The pipeline hands each chunk's representative sentences to one of these
//! clients to be rewritten as a fluent paragraph. The Ollama-backed client
//! mirrors the embedding adapter by issuing HTTP requests directly to the
//! runtime; the OpenAI client targets the hosted chat completions API.

use crate::config::{CompressionProvider, get_config};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while attempting abstractive compression.
#[derive(Debug, Error)]
pub enum CompressionClientError {
    /// Provider was misconfigured or unreachable.
    #[error("Compression provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate compressed summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the compression provider.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    /// Fully qualified model identifier understood by the provider.
    pub model: String,
    /// Extracted sentences assembled by the processing pipeline.
    pub text: String,
    /// Minimum word budget requested from the model.
    pub min_length: usize,
    /// Maximum word budget enforced on the output.
    pub max_length: usize,
}

/// Interface implemented by abstractive compression providers.
#[async_trait]
pub trait CompressionClient: Send + Sync {
    /// Rewrite the extracted text as a summary within the word bounds.
    async fn compress(&self, request: CompressionRequest)
    -> Result<String, CompressionClientError>;
}

/// Build a compression client based on configuration.
pub fn get_compression_client()
-> Result<Box<dyn CompressionClient + Send + Sync>, CompressionClientError> {
    let config = get_config();
    match config.compression_provider {
        CompressionProvider::Ollama => Ok(Box::new(OllamaCompressionClient::new(
            config.ollama_url.clone(),
        ))),
        CompressionProvider::OpenAI => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                CompressionClientError::ProviderUnavailable("OPENAI_API_KEY is not set".into())
            })?;
            Ok(Box::new(OpenAiCompressionClient::new(
                config.openai_base_url.clone(),
                api_key,
            )))
        }
    }
}

/// Build the rewrite prompt handed to the provider.
fn build_compression_prompt(text: &str, min_length: usize, max_length: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "System: You rewrite extracted sentences into a concise, factual summary. Prefer neutral tone. Avoid speculation. Do not add information that is not present. Return between {min_length} and {max_length} words. Output a single paragraph.\n\n"
    ));
    prompt.push_str("Rewrite the following extracted sentences as one coherent summary:\n\n");
    prompt.push_str(text);
    prompt.push('\n');
    prompt
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Hard cap on the word count; providers occasionally overrun the prompt budget.
fn enforce_word_cap(text: &str, max_words: usize) -> String {
    if count_words(text) <= max_words {
        return text.to_string();
    }
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

struct OllamaCompressionClient {
    http: Client,
    base_url: String,
}

impl OllamaCompressionClient {
    fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("rusty-summ/compression")
            .build()
            .expect("Failed to construct reqwest::Client for compression");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl CompressionClient for OllamaCompressionClient {
    async fn compress(
        &self,
        request: CompressionRequest,
    ) -> Result<String, CompressionClientError> {
        let prompt = build_compression_prompt(&request.text, request.min_length, request.max_length);
        let payload = json!({
            "model": request.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                // Lower temperature for reproducible summaries.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompressionClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CompressionClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompressionClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            CompressionClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(CompressionClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(enforce_word_cap(body.response.trim(), request.max_length))
    }
}

struct OpenAiCompressionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompressionClient {
    fn new(base_url: String, api_key: String) -> Self {
        let http = Client::builder()
            .user_agent("rusty-summ/compression")
            .build()
            .expect("Failed to construct reqwest::Client for compression");
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompressionClient for OpenAiCompressionClient {
    async fn compress(
        &self,
        request: CompressionRequest,
    ) -> Result<String, CompressionClientError> {
        let prompt = build_compression_prompt(&request.text, request.min_length, request.max_length);
        let payload = json!({
            "model": request.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.1,
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompressionClientError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompressionClientError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            CompressionClientError::InvalidResponse(format!(
                "failed to decode OpenAI response: {error}"
            ))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                CompressionClientError::InvalidResponse("OpenAI returned no choices".into())
            })?;

        Ok(enforce_word_cap(content.trim(), request.max_length))
    }
}
