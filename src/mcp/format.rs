//! Formatting helpers shared across MCP handlers and resources.

use crate::{
    keywords::TermScore,
    metrics::MetricsSnapshot,
    processing::{ProviderHealthSnapshot, ProviderStatus, SourceSummaryOutcome, SummaryOutcome},
};
use rmcp::model::ResourceContents;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value, json};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Build the health payload describing both configured providers.
pub(crate) fn health_payload(snapshot: &ProviderHealthSnapshot) -> String {
    let payload = json!({
        "embedding": provider_status_value(&snapshot.embedding),
        "compression": provider_status_value(&snapshot.compression),
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}

/// Render a single provider status, omitting fields that were not probed.
pub(crate) fn provider_status_value(status: &ProviderStatus) -> Value {
    let mut map = Map::new();
    map.insert("provider".into(), Value::String(status.provider.clone()));
    map.insert("model".into(), Value::String(status.model.clone()));
    if let Some(reachable) = status.reachable {
        map.insert("reachable".into(), Value::Bool(reachable));
    }
    if let Some(error) = status.error.as_ref() {
        map.insert("error".into(), Value::String(error.clone()));
    }
    Value::Object(map)
}

/// Build the structured payload for a completed summary.
pub(crate) fn summary_payload(outcome: &SummaryOutcome) -> Value {
    json!({
        "summary": outcome.summary,
        "originalLength": outcome.metadata.original_length,
        "summaryLength": outcome.metadata.summary_length,
        "compressionRatioAchieved": outcome.metadata.compression_ratio_achieved,
        "numChunks": outcome.metadata.num_chunks,
    })
}

/// Build the structured payload for a source summary, adding provenance.
pub(crate) fn source_summary_payload(outcome: &SourceSummaryOutcome) -> Value {
    let mut payload = summary_payload(&outcome.outcome);
    if let Some(map) = payload.as_object_mut() {
        map.insert("source".into(), Value::String(outcome.source.clone()));
        if let Some(title) = outcome.title.as_ref() {
            map.insert("title".into(), Value::String(title.clone()));
        }
    }
    payload
}

/// Build the structured payload listing ranked keywords.
pub(crate) fn keywords_payload(terms: &[TermScore]) -> Value {
    let keywords: Vec<Value> = terms
        .iter()
        .map(|entry| json!({ "term": entry.term, "score": entry.score }))
        .collect();
    json!({ "keywords": keywords })
}

/// Build the structured payload for the pipeline counters.
pub(crate) fn metrics_payload(snapshot: &MetricsSnapshot) -> Value {
    json!({
        "documentsSummarized": snapshot.documents_summarized,
        "chunksSummarized": snapshot.chunks_summarized,
        "sentencesClustered": snapshot.sentences_clustered,
        "keywordsExtracted": snapshot.keywords_extracted,
    })
}

/// Serialize a value to JSON, falling back to compact formatting on error.
pub(crate) fn serialize_json<T: Serialize>(value: &T, context_uri: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        tracing::warn!(uri = context_uri, %error, "Failed to serialize JSON prettily");
        serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
    })
}

/// Build JSON resource contents for MCP resource responses.
pub(crate) fn json_resource_contents(uri: &str, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: uri.to_string(),
        mime_type: Some(APPLICATION_JSON.into()),
        text,
        meta: None,
    }
}

/// Top-level settings snapshot describing summarization defaults.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SettingsSnapshot {
    /// Summarization-specific defaults.
    pub(crate) summary: SummarySettingsSnapshot,
}

/// Structure describing summarization defaults for clients.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SummarySettingsSnapshot {
    /// Default fraction of sentences kept per chunk.
    pub(crate) compression_ratio: f64,
    /// Default lower word bound for compressed chunk summaries.
    pub(crate) min_length: usize,
    /// Default upper word bound for compressed chunk summaries.
    pub(crate) max_length: usize,
    /// Default character budget per chunk.
    pub(crate) max_chunk_size: usize,
    /// Default clustering seed.
    pub(crate) clustering_seed: u64,
    /// Optional per-call deadline in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::SummaryMetadata;

    #[test]
    fn health_payload_omits_unprobed_fields() {
        let snapshot = ProviderHealthSnapshot {
            embedding: ProviderStatus {
                provider: "ollama".into(),
                model: "nomic-embed-text".into(),
                reachable: Some(false),
                error: Some("connection refused".into()),
            },
            compression: ProviderStatus {
                provider: "openai".into(),
                model: "gpt-4o-mini".into(),
                reachable: None,
                error: None,
            },
        };

        let body = health_payload(&snapshot);

        let value: Value = serde_json::from_str(&body).expect("health payload must be valid JSON");
        assert_eq!(value["embedding"]["provider"], "ollama");
        assert_eq!(value["embedding"]["reachable"], false);
        assert_eq!(value["embedding"]["error"], "connection refused");
        assert_eq!(value["compression"]["provider"], "openai");
        assert!(value["compression"].get("reachable").is_none());
    }

    #[test]
    fn summary_payload_uses_camel_case_keys() {
        let outcome = SummaryOutcome {
            summary: "A digest.".into(),
            metadata: SummaryMetadata {
                original_length: 100,
                summary_length: 9,
                compression_ratio_achieved: 0.09,
                num_chunks: 2,
            },
        };

        let payload = summary_payload(&outcome);

        assert_eq!(payload["summary"], "A digest.");
        assert_eq!(payload["originalLength"], 100);
        assert_eq!(payload["numChunks"], 2);
    }

    #[test]
    fn source_summary_payload_adds_provenance() {
        let outcome = SourceSummaryOutcome {
            source: "url".into(),
            title: Some("Example Post".into()),
            outcome: SummaryOutcome {
                summary: "A digest.".into(),
                metadata: SummaryMetadata {
                    original_length: 100,
                    summary_length: 9,
                    compression_ratio_achieved: 0.09,
                    num_chunks: 1,
                },
            },
        };

        let payload = source_summary_payload(&outcome);

        assert_eq!(payload["source"], "url");
        assert_eq!(payload["title"], "Example Post");
        assert_eq!(payload["summary"], "A digest.");
    }

    #[test]
    fn keywords_payload_preserves_ranking_order() {
        let terms = vec![
            TermScore {
                term: "clustering".into(),
                score: 0.91,
            },
            TermScore {
                term: "embedding".into(),
                score: 0.40,
            },
        ];

        let payload = keywords_payload(&terms);

        assert_eq!(payload["keywords"][0]["term"], "clustering");
        assert_eq!(payload["keywords"][1]["term"], "embedding");
    }
}
