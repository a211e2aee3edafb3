//! HTTP surface for Rusty Summarizer.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summarize` – Run the two-stage pipeline (extractive clustering, then
//!   abstractive compression) over raw text. Accepts optional overrides
//!   (`compression_ratio`, `min_length`, `max_length`, `max_chunk_size`,
//!   `clustering_seed`) and returns the summary plus its metadata.
//! - `POST /summarize/source` – Acquire a document from a URL or file path, then
//!   summarize it. Returns the same payload plus the resolved source kind.
//! - `POST /keywords` – Rank the highest-scoring TF-IDF terms of a document.
//! - `GET /metrics` – Observe summarization counters.
//! - `GET /health` – Report the configured providers and their reachability.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface shares the same pipeline with the MCP server, so behavior is
//! identical across interfaces.

use crate::acquisition::AcquisitionError;
use crate::config::get_config;
use crate::keywords::{DEFAULT_TOP_TERMS, TermScore};
use crate::processing::{
    ProviderHealthSnapshot, SourceSummarizeError, SummarizeError, SummarizeOptions, SummarizerApi,
    SummaryOutcome,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizerApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/summarize/source", post(summarize_source::<S>))
        .route("/keywords", post(extract_keywords::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/health", get(get_health::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Optional pipeline overrides shared by the summarize endpoints.
///
/// Every field falls back to the configured default when omitted.
#[derive(Clone, Copy, Default, Deserialize)]
struct SummarizeOverrides {
    /// Fraction of sentences to keep per chunk, in `(0, 1]`.
    #[serde(default)]
    compression_ratio: Option<f64>,
    /// Lower word bound passed to the compression model.
    #[serde(default)]
    min_length: Option<usize>,
    /// Upper word bound passed to the compression model.
    #[serde(default)]
    max_length: Option<usize>,
    /// Character budget per chunk.
    #[serde(default)]
    max_chunk_size: Option<usize>,
    /// Seed for the clustering stage.
    #[serde(default)]
    clustering_seed: Option<u64>,
}

impl SummarizeOverrides {
    fn into_options(self) -> SummarizeOptions {
        let mut options = SummarizeOptions::from_config(get_config());
        if let Some(ratio) = self.compression_ratio {
            options.compression_ratio = ratio;
        }
        if let Some(min_length) = self.min_length {
            options.min_length = min_length;
        }
        if let Some(max_length) = self.max_length {
            options.max_length = max_length;
        }
        if let Some(max_chunk_size) = self.max_chunk_size {
            options.max_chunk_size = max_chunk_size;
        }
        if let Some(seed) = self.clustering_seed {
            options.clustering_seed = seed;
        }
        options
    }
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Raw document contents to summarize.
    text: String,
    #[serde(flatten)]
    overrides: SummarizeOverrides,
}

/// Metadata block attached to every summary response.
#[derive(Serialize)]
struct SummaryMetadataResponse {
    /// Character count of the input document.
    original_length: usize,
    /// Character count of the produced summary.
    summary_length: usize,
    /// Ratio of summary length to original length.
    compression_ratio_achieved: f64,
    /// Number of chunks the document was split into.
    num_chunks: usize,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Final composed summary.
    summary: String,
    /// Accounting for the run.
    metadata: SummaryMetadataResponse,
}

impl From<SummaryOutcome> for SummarizeResponse {
    fn from(outcome: SummaryOutcome) -> Self {
        Self {
            summary: outcome.summary,
            metadata: SummaryMetadataResponse {
                original_length: outcome.metadata.original_length,
                summary_length: outcome.metadata.summary_length,
                compression_ratio_achieved: outcome.metadata.compression_ratio_achieved,
                num_chunks: outcome.metadata.num_chunks,
            },
        }
    }
}

/// Summarize a raw document.
///
/// This handler accepts raw text and optional pipeline overrides, chunks the
/// document, selects representative sentences per chunk, compresses them, and
/// returns the composed summary with its metadata.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizerApi,
{
    let options = request.overrides.into_options();
    let outcome = service
        .summarize_with_options(&request.text, options)
        .await?;
    tracing::info!(
        chunks = outcome.metadata.num_chunks,
        summary_length = outcome.metadata.summary_length,
        "Summarize request completed"
    );
    Ok(Json(outcome.into()))
}

/// Request body for the `POST /summarize/source` endpoint.
#[derive(Deserialize)]
struct SummarizeSourceRequest {
    /// URL or file path to acquire and summarize.
    uri: String,
    #[serde(flatten)]
    overrides: SummarizeOverrides,
}

/// Success response for the `POST /summarize/source` endpoint.
#[derive(Serialize)]
struct SummarizeSourceResponse {
    /// Resolved source kind (`url`, `json`, or `text`).
    source: String,
    /// Document title, when the source carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Final composed summary.
    summary: String,
    /// Accounting for the run.
    metadata: SummaryMetadataResponse,
}

/// Acquire a document from a URI and summarize it.
async fn summarize_source<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeSourceRequest>,
) -> Result<Json<SummarizeSourceResponse>, AppError>
where
    S: SummarizerApi,
{
    let options = request.overrides.into_options();
    let outcome = service.summarize_source(&request.uri, options).await?;
    tracing::info!(
        source = outcome.source,
        chunks = outcome.outcome.metadata.num_chunks,
        "Source summarize request completed"
    );
    let summary: SummarizeResponse = outcome.outcome.into();
    Ok(Json(SummarizeSourceResponse {
        source: outcome.source,
        title: outcome.title,
        summary: summary.summary,
        metadata: summary.metadata,
    }))
}

/// Request body for the `POST /keywords` endpoint.
#[derive(Deserialize)]
struct KeywordsRequest {
    /// Document to rank terms for.
    text: String,
    /// Number of terms to return (defaults to 5).
    #[serde(default)]
    top_n: Option<usize>,
}

/// Response body for `POST /keywords`.
#[derive(Serialize)]
struct KeywordsResponse {
    keywords: Vec<TermScore>,
}

/// Rank the document's highest-scoring TF-IDF terms.
async fn extract_keywords<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<KeywordsRequest>,
) -> Json<KeywordsResponse>
where
    S: SummarizerApi,
{
    let top_n = request.top_n.unwrap_or(DEFAULT_TOP_TERMS);
    let keywords = service.extract_keywords(&request.text, top_n);
    Json(KeywordsResponse { keywords })
}

/// Return a concise metrics snapshot with pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Result<Json<MetricsResponse>, AppError>
where
    S: SummarizerApi,
{
    let snapshot = service.metrics_snapshot();
    Ok(Json(MetricsResponse {
        documents_summarized: snapshot.documents_summarized,
        chunks_summarized: snapshot.chunks_summarized,
        sentences_clustered: snapshot.sentences_clustered,
        keywords_extracted: snapshot.keywords_extracted,
    }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    documents_summarized: u64,
    chunks_summarized: u64,
    sentences_clustered: u64,
    keywords_extracted: u64,
}

/// Report the configured providers and their reachability.
async fn get_health<S>(State(service): State<Arc<S>>) -> Json<ProviderHealthSnapshot>
where
    S: SummarizerApi,
{
    Json(service.provider_health().await)
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize raw text with the two-stage pipeline. Response returns { \"summary\": string, \"metadata\": object }.",
                request_example: Some(json!({
                    "text": "Document contents",
                    "compression_ratio": 0.3,
                    "min_length": 30,
                    "max_length": 130,
                    "max_chunk_size": 512,
                    "clustering_seed": 42
                })),
            },
            CommandDescriptor {
                name: "summarize_source",
                method: "POST",
                path: "/summarize/source",
                description: "Acquire a document from a URL, JSON file, or text file, then summarize it.",
                request_example: Some(json!({
                    "uri": "https://example.org/post",
                    "compression_ratio": 0.3
                })),
            },
            CommandDescriptor {
                name: "keywords",
                method: "POST",
                path: "/keywords",
                description: "Rank the highest-scoring TF-IDF terms of a document.",
                request_example: Some(json!({
                    "text": "Document contents",
                    "top_n": 5
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters useful for observability dashboards.",
                request_example: None,
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Report the configured embedding and compression providers and their reachability.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Summarize(SummarizeError),
    Source(SourceSummarizeError),
}

impl AppError {
    /// Caller mistakes answer with 400, pipeline failures with 500.
    fn status(&self) -> StatusCode {
        match self {
            Self::Summarize(error) if error.is_validation() => StatusCode::BAD_REQUEST,
            Self::Source(SourceSummarizeError::Summarize(error)) if error.is_validation() => {
                StatusCode::BAD_REQUEST
            }
            Self::Source(SourceSummarizeError::Acquisition(
                AcquisitionError::UnsupportedSource(_),
            )) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Summarize(error) => error.to_string(),
            Self::Source(error) => error.to_string(),
        };
        (status, message).into_response()
    }
}

impl From<SummarizeError> for AppError {
    fn from(inner: SummarizeError) -> Self {
        Self::Summarize(inner)
    }
}

impl From<SourceSummarizeError> for AppError {
    fn from(inner: SourceSummarizeError) -> Self {
        Self::Source(inner)
    }
}
