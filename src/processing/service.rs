//! Summarization service coordinating chunking, embedding, selection, and compression.

use crate::{
    acquisition,
    compression::{CompressionClient, CompressionRequest, get_compression_client},
    config::{CompressionProvider, EmbeddingProvider, get_config},
    embedding::{EmbeddingClient, get_embedding_client},
    keywords::{DEFAULT_MAX_FEATURES, KeywordExtractor, TermScore},
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        chunking::{
            TokenCounter, build_token_counter, chunk_text, split_sentences,
            truncate_to_token_budget,
        },
        selection::select_representatives,
        types::{
            ProviderHealthSnapshot, ProviderStatus, SourceSummarizeError, SourceSummaryOutcome,
            SummarizeError, SummarizeOptions, SummaryMetadata, SummaryOutcome,
        },
    },
};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::Client;
use std::sync::Arc;

/// Coordinates the two-stage summarization pipeline: chunking, sentence
/// embedding, cluster-based selection, and abstractive compression.
///
/// The service owns long-lived handles to the embedding and compression
/// clients plus the metrics registry so that the HTTP surface, the MCP tools,
/// and the batch CLI reuse the same components. Construct the service once
/// near process start and share it through an `Arc`.
pub struct SummarizerService {
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    compression_client: Box<dyn CompressionClient + Send + Sync>,
    metrics: Arc<PipelineMetrics>,
    probe_client: Client,
}

/// Abstraction over the summarization pipeline used by external surfaces (HTTP, MCP).
#[async_trait]
pub trait SummarizerApi: Send + Sync {
    /// Summarize raw text at the given compression ratio with stock options.
    async fn summarize(
        &self,
        text: &str,
        compression_ratio: f64,
    ) -> Result<SummaryOutcome, SummarizeError>;

    /// Summarize raw text with fully specified options.
    async fn summarize_with_options(
        &self,
        text: &str,
        options: SummarizeOptions,
    ) -> Result<SummaryOutcome, SummarizeError>;

    /// Acquire a document from a URI or path and summarize its text.
    async fn summarize_source(
        &self,
        uri: &str,
        options: SummarizeOptions,
    ) -> Result<SourceSummaryOutcome, SourceSummarizeError>;

    /// Rank the highest-scoring terms of a document.
    fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<TermScore>;

    /// Report the configured providers and their reachability.
    async fn provider_health(&self) -> ProviderHealthSnapshot;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummarizerService {
    /// Build a service from explicit capability clients.
    pub fn new(
        embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
        compression_client: Box<dyn CompressionClient + Send + Sync>,
    ) -> Self {
        let probe_client = Client::builder()
            .user_agent("rusty-summ/0.2")
            .build()
            .expect("Failed to construct reqwest::Client for health probes");
        Self {
            embedding_client,
            compression_client,
            metrics: Arc::new(PipelineMetrics::new()),
            probe_client,
        }
    }

    /// Build a service wired to the providers named in the configuration.
    pub fn from_config() -> anyhow::Result<Self> {
        tracing::info!("Initializing embedding client");
        let embedding_client = get_embedding_client()?;
        tracing::info!("Initializing compression client");
        let compression_client = get_compression_client()?;
        Ok(Self::new(embedding_client, compression_client))
    }

    /// Summarize `text`, keeping roughly `compression_ratio` of each chunk's sentences.
    pub async fn summarize(
        &self,
        text: &str,
        compression_ratio: f64,
    ) -> Result<SummaryOutcome, SummarizeError> {
        let mut options = SummarizeOptions::from_config(get_config());
        options.compression_ratio = compression_ratio;
        self.summarize_with_options(text, options).await
    }

    /// Summarize `text` with fully specified options.
    ///
    /// The call is all-or-nothing: any stage failure in any chunk aborts the
    /// whole document and no partial summary is returned. Failures are logged
    /// here at error severity before being handed back to the caller.
    pub async fn summarize_with_options(
        &self,
        text: &str,
        options: SummarizeOptions,
    ) -> Result<SummaryOutcome, SummarizeError> {
        let result = match options.deadline {
            Some(budget) => {
                match tokio::time::timeout(budget, self.run_pipeline(text, &options)).await {
                    Ok(inner) => inner,
                    Err(_) => Err(SummarizeError::DeadlineExceeded {
                        budget_ms: budget.as_millis() as u64,
                    }),
                }
            }
            None => self.run_pipeline(text, &options).await,
        };

        match result {
            Ok(outcome) => {
                tracing::info!(
                    chunks = outcome.metadata.num_chunks,
                    original_length = outcome.metadata.original_length,
                    summary_length = outcome.metadata.summary_length,
                    "Document summarized"
                );
                Ok(outcome)
            }
            Err(error) => {
                tracing::error!(error = %error, "Summarization failed");
                Err(error)
            }
        }
    }

    async fn run_pipeline(
        &self,
        text: &str,
        options: &SummarizeOptions,
    ) -> Result<SummaryOutcome, SummarizeError> {
        validate_options(options)?;

        let original_length = text.chars().count();
        let chunks = chunk_text(text, options.max_chunk_size)?;
        if chunks.is_empty() {
            tracing::debug!("Empty document; returning empty summary");
            return Ok(SummaryOutcome {
                summary: String::new(),
                metadata: SummaryMetadata {
                    original_length,
                    summary_length: 0,
                    compression_ratio_achieved: 0.0,
                    num_chunks: 0,
                },
            });
        }

        let config = get_config();
        let token_counter = build_token_counter(config.embedding_provider, &config.embedding_model)?;
        tracing::debug!(
            chunks = chunks.len(),
            max_chunk_size = options.max_chunk_size,
            ratio = options.compression_ratio,
            "Summarizing chunks"
        );

        let results = try_join_all(
            chunks
                .iter()
                .map(|chunk| self.summarize_chunk(chunk, options, &token_counter)),
        )
        .await?;

        let sentence_count: u64 = results.iter().map(|(_, count)| *count as u64).sum();
        let chunk_summaries: Vec<String> =
            results.into_iter().map(|(summary, _)| summary).collect();
        let summary = chunk_summaries.join(" ");

        let summary_length = summary.chars().count();
        let compression_ratio_achieved = if original_length == 0 {
            0.0
        } else {
            summary_length as f64 / original_length as f64
        };

        self.metrics
            .record_summary(chunks.len() as u64, sentence_count);

        Ok(SummaryOutcome {
            summary,
            metadata: SummaryMetadata {
                original_length,
                summary_length,
                compression_ratio_achieved,
                num_chunks: chunks.len(),
            },
        })
    }

    /// Run the extract-then-compress stages for a single chunk.
    ///
    /// Returns the chunk summary together with the number of sentences that
    /// entered the clustering stage. Sentences are truncated to the embedding
    /// token budget before vectorization, but representatives are emitted in
    /// their original form.
    async fn summarize_chunk(
        &self,
        chunk: &str,
        options: &SummarizeOptions,
        token_counter: &TokenCounter,
    ) -> Result<(String, usize), SummarizeError> {
        let config = get_config();
        let sentences = split_sentences(chunk);
        let sentence_count = sentences.len();

        let inputs: Vec<String> = sentences
            .iter()
            .map(|sentence| {
                truncate_to_token_budget(sentence, config.embedding_max_tokens, token_counter)
            })
            .collect();
        let embeddings = self.embedding_client.generate_embeddings(inputs).await?;

        let target = representative_target(sentence_count, options.compression_ratio);
        let representatives =
            select_representatives(&sentences, &embeddings, target, options.clustering_seed)?;
        let extracted = representatives.join(" ");

        let summary = self
            .compression_client
            .compress(CompressionRequest {
                model: config.compression_model.clone(),
                text: extracted,
                min_length: options.min_length,
                max_length: options.max_length,
            })
            .await?;

        Ok((summary, sentence_count))
    }

    /// Acquire a document from `uri` and summarize its extracted text.
    pub async fn summarize_source(
        &self,
        uri: &str,
        options: SummarizeOptions,
    ) -> Result<SourceSummaryOutcome, SourceSummarizeError> {
        let document = acquisition::acquire(uri).await?;
        tracing::info!(
            source = %document.source,
            length = document.text.len(),
            "Document acquired"
        );
        let outcome = self.summarize_with_options(&document.text, options).await?;
        Ok(SourceSummaryOutcome {
            source: document.source.to_string(),
            title: document.title,
            outcome,
        })
    }

    /// Rank the document's highest-scoring terms by TF-IDF.
    ///
    /// The vocabulary is fitted on the document's own sentences, so scores
    /// reward terms that dominate some sentences but not all of them.
    pub fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<TermScore> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }
        let mut extractor = KeywordExtractor::new(DEFAULT_MAX_FEATURES);
        extractor.fit(&sentences);
        let terms = extractor.top_terms(text, top_n);
        self.metrics.record_keywords(terms.len() as u64);
        tracing::debug!(
            requested = top_n,
            returned = terms.len(),
            "Keywords extracted"
        );
        terms
    }

    /// Probe the configured providers and report their reachability.
    ///
    /// Ollama backends answer a lightweight `GET /api/tags`; hosted OpenAI
    /// backends are reported as configured without a probe.
    pub async fn provider_health(&self) -> ProviderHealthSnapshot {
        let config = get_config();
        let needs_probe = matches!(config.embedding_provider, EmbeddingProvider::Ollama)
            || matches!(config.compression_provider, CompressionProvider::Ollama);
        let ollama_probe = if needs_probe {
            Some(self.probe_ollama(&config.ollama_url).await)
        } else {
            None
        };

        let ollama_status = |model: &str| {
            let (reachable, error) = match &ollama_probe {
                Some(Ok(())) => (Some(true), None),
                Some(Err(message)) => (Some(false), Some(message.clone())),
                None => (None, None),
            };
            ProviderStatus {
                provider: "ollama".to_string(),
                model: model.to_string(),
                reachable,
                error,
            }
        };

        let embedding = match config.embedding_provider {
            EmbeddingProvider::Ollama => ollama_status(&config.embedding_model),
            EmbeddingProvider::OpenAI => ProviderStatus {
                provider: "openai".to_string(),
                model: config.embedding_model.clone(),
                reachable: None,
                error: None,
            },
            EmbeddingProvider::Deterministic => ProviderStatus {
                provider: "deterministic".to_string(),
                model: config.embedding_model.clone(),
                reachable: Some(true),
                error: None,
            },
        };

        let compression = match config.compression_provider {
            CompressionProvider::Ollama => ollama_status(&config.compression_model),
            CompressionProvider::OpenAI => ProviderStatus {
                provider: "openai".to_string(),
                model: config.compression_model.clone(),
                reachable: None,
                error: None,
            },
        };

        ProviderHealthSnapshot {
            embedding,
            compression,
        }
    }

    async fn probe_ollama(&self, base_url: &str) -> Result<(), String> {
        let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
        match self.probe_client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                let status = response.status();
                tracing::warn!(url = %url, status = %status, "Ollama health probe failed");
                Err(format!("Ollama returned {status}"))
            }
            Err(error) => {
                tracing::warn!(url = %url, error = %error, "Ollama health probe failed");
                Err(error.to_string())
            }
        }
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Number of representatives to keep for a chunk: `max(1, floor(n * ratio))`.
fn representative_target(sentence_count: usize, ratio: f64) -> usize {
    let scaled = (sentence_count as f64 * ratio).floor() as usize;
    scaled.max(1)
}

fn validate_options(options: &SummarizeOptions) -> Result<(), SummarizeError> {
    if !(options.compression_ratio > 0.0 && options.compression_ratio <= 1.0) {
        return Err(SummarizeError::InvalidCompressionRatio {
            value: options.compression_ratio,
        });
    }
    if options.min_length > options.max_length {
        return Err(SummarizeError::InvalidLengthBounds {
            min: options.min_length,
            max: options.max_length,
        });
    }
    Ok(())
}

#[async_trait]
impl SummarizerApi for SummarizerService {
    async fn summarize(
        &self,
        text: &str,
        compression_ratio: f64,
    ) -> Result<SummaryOutcome, SummarizeError> {
        SummarizerService::summarize(self, text, compression_ratio).await
    }

    async fn summarize_with_options(
        &self,
        text: &str,
        options: SummarizeOptions,
    ) -> Result<SummaryOutcome, SummarizeError> {
        SummarizerService::summarize_with_options(self, text, options).await
    }

    async fn summarize_source(
        &self,
        uri: &str,
        options: SummarizeOptions,
    ) -> Result<SourceSummaryOutcome, SourceSummarizeError> {
        SummarizerService::summarize_source(self, uri, options).await
    }

    fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<TermScore> {
        SummarizerService::extract_keywords(self, text, top_n)
    }

    async fn provider_health(&self) -> ProviderHealthSnapshot {
        SummarizerService::provider_health(self).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummarizerService::metrics_snapshot(self)
    }
}
