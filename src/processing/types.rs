//! Core data types and error definitions for the summarization pipeline.

use std::time::Duration;

use crate::config::Config;
use anyhow::Error as TokenizerError;
use thiserror::Error;

/// Errors produced while segmenting a document into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Caller configured an impossible chunk budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Tokenizer resources were unavailable for the configured model.
    #[error("failed to initialize tokenizer for model '{model}': {source}")]
    Tokenizer {
        /// Embedding model we attempted to load.
        model: String,
        /// Underlying error raised by the tokenizer library.
        #[source]
        source: TokenizerError,
    },
}

/// Errors raised by the extractive selection stage.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// Caller requested zero clusters for a non-empty sentence set.
    #[error("target representative count must be greater than zero")]
    InvalidTargetCount,
    /// Sentence and embedding sequences differ in length.
    #[error("sentence/embedding length mismatch: {sentences} sentences, {embeddings} embeddings")]
    LengthMismatch {
        /// Number of sentences supplied.
        sentences: usize,
        /// Number of embedding vectors supplied.
        embeddings: usize,
    },
    /// Embedding vectors disagree on dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the first embedding vector.
        expected: usize,
        /// Conflicting dimension encountered later in the sequence.
        actual: usize,
    },
    /// An embedding vector was empty.
    #[error("embedding vectors must not be empty")]
    EmptyEmbedding,
    /// An embedding vector contained NaN or infinite components.
    #[error("embedding for sentence {index} contains non-finite values")]
    NonFinite {
        /// Index of the offending sentence.
        index: usize,
    },
}

/// Errors emitted by the summarization pipeline.
///
/// Any stage failure aborts the whole call; the orchestrator logs the error at
/// error severity and returns it unchanged, never a partial summary.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Compression ratio fell outside the half-open interval `(0, 1]`.
    #[error("invalid compression ratio {value}; expected a value in (0, 1]")]
    InvalidCompressionRatio {
        /// Ratio supplied by the caller.
        value: f64,
    },
    /// Requested minimum summary length exceeds the maximum.
    #[error("invalid length bounds: min {min} exceeds max {max}")]
    InvalidLengthBounds {
        /// Lower bound supplied by the caller.
        min: usize,
        /// Upper bound supplied by the caller.
        max: usize,
    },
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce vectors for a chunk's sentences.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] crate::embedding::EmbeddingClientError),
    /// Clustering failed during representative selection.
    #[error("Failed to select representative sentences: {0}")]
    Clustering(#[from] ClusteringError),
    /// Abstractive compression provider failed.
    #[error("Failed to compress extractive summary: {0}")]
    Compression(#[from] crate::compression::CompressionClientError),
    /// The per-call deadline elapsed before the pipeline finished.
    #[error("summarization exceeded the {budget_ms} ms deadline")]
    DeadlineExceeded {
        /// Deadline that was exceeded, in milliseconds.
        budget_ms: u64,
    },
}

impl SummarizeError {
    /// Whether the error names invalid caller input rather than a backend fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCompressionRatio { .. }
                | Self::InvalidLengthBounds { .. }
                | Self::Chunking(ChunkingError::InvalidChunkSize)
        )
    }
}

/// Tunable parameters for a single summarize call.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Target fraction of sentences retained per chunk, in `(0, 1]`.
    pub compression_ratio: f64,
    /// Lower bound (words) requested from the compression stage.
    pub min_length: usize,
    /// Upper bound (words) enforced on the compression stage.
    pub max_length: usize,
    /// Chunker budget in characters.
    pub max_chunk_size: usize,
    /// Seed driving the clustering stage.
    pub clustering_seed: u64,
    /// Optional deadline for the whole call.
    pub deadline: Option<Duration>,
}

impl SummarizeOptions {
    /// Build options for the given ratio with the crate's stock defaults.
    pub fn new(compression_ratio: f64) -> Self {
        Self {
            compression_ratio,
            min_length: crate::config::DEFAULT_MIN_LENGTH,
            max_length: crate::config::DEFAULT_MAX_LENGTH,
            max_chunk_size: crate::config::DEFAULT_MAX_CHUNK_SIZE,
            clustering_seed: crate::config::DEFAULT_CLUSTERING_SEED,
            deadline: None,
        }
    }

    /// Build options from the loaded configuration's defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            compression_ratio: config.summary_compression_ratio,
            min_length: config.summary_min_length,
            max_length: config.summary_max_length,
            max_chunk_size: config.summary_max_chunk_size,
            clustering_seed: config.summary_clustering_seed,
            deadline: config.summary_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Errors emitted when summarizing an acquired document.
#[derive(Debug, Error)]
pub enum SourceSummarizeError {
    /// Document could not be fetched or parsed.
    #[error("Failed to acquire document: {0}")]
    Acquisition(#[from] crate::acquisition::AcquisitionError),
    /// Pipeline failed after acquisition succeeded.
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

/// Successful result of a summarize call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SummaryOutcome {
    /// Final composed summary, empty for empty input.
    pub summary: String,
    /// Measurements describing the run.
    pub metadata: SummaryMetadata,
}

/// Measurements attached to a successful summary.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SummaryMetadata {
    /// Character length of the input document.
    pub original_length: usize,
    /// Character length of the final summary.
    pub summary_length: usize,
    /// `summary_length / original_length`, or zero for empty input.
    pub compression_ratio_achieved: f64,
    /// Number of chunks the document was split into.
    pub num_chunks: usize,
}

/// Summary produced from an acquired document.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceSummaryOutcome {
    /// How the document was acquired (`url`, `json`, or `text`).
    pub source: String,
    /// Document title when the source carried one.
    pub title: Option<String>,
    /// Summary and measurements for the acquired text.
    pub outcome: SummaryOutcome,
}

/// Reachability snapshot for the configured capability providers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderHealthSnapshot {
    /// Status of the embedding backend.
    pub embedding: ProviderStatus,
    /// Status of the compression backend.
    pub compression: ProviderStatus,
}

/// Status of a single capability provider.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderStatus {
    /// Provider label (`ollama`, `openai`, `deterministic`).
    pub provider: String,
    /// Model identifier the provider is configured with.
    pub model: String,
    /// Probe result; `None` when the backend is not probed (hosted APIs).
    pub reachable: Option<bool>,
    /// Diagnostic captured when a probe fails.
    pub error: Option<String>,
}
