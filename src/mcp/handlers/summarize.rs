//! Handler for the `summarize` MCP tool.

use std::sync::Arc;

use crate::{
    mcp::format::summary_payload,
    processing::{SummarizeError, SummarizerService},
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{ToolOptionOverrides, parse_arguments};

/// Request payload accepted by the `summarize` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct SummarizeToolRequest {
    /// Raw document text to summarize.
    pub(crate) text: String,
    /// Optional fraction of sentences kept per chunk.
    #[serde(default)]
    pub(crate) compression_ratio: Option<f64>,
    /// Optional lower bound (words) for the compression stage.
    #[serde(default)]
    pub(crate) min_length: Option<usize>,
    /// Optional upper bound (words) for the compression stage.
    #[serde(default)]
    pub(crate) max_length: Option<usize>,
    /// Optional chunk budget override in characters.
    #[serde(default)]
    pub(crate) max_chunk_size: Option<usize>,
    /// Optional seed for the clustering stage.
    #[serde(default)]
    pub(crate) clustering_seed: Option<u64>,
}

/// Handle the `summarize` tool by running the two-stage pipeline on the supplied text.
pub(crate) async fn handle_summarize(
    summarizer: &Arc<SummarizerService>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: SummarizeToolRequest = parse_arguments(arguments)?;

    let SummarizeToolRequest {
        text,
        compression_ratio,
        min_length,
        max_length,
        max_chunk_size,
        clustering_seed,
    } = args;

    let options = ToolOptionOverrides {
        compression_ratio,
        min_length,
        max_length,
        max_chunk_size,
        clustering_seed,
    }
    .into_summarize_options();

    let outcome = summarizer
        .summarize_with_options(&text, options)
        .await
        .map_err(map_summarize_error)?;

    Ok(CallToolResult::structured(summary_payload(&outcome)))
}

/// Map pipeline failures onto MCP error codes.
///
/// Caller mistakes surface as invalid params; provider and deadline failures
/// surface as internal errors.
pub(crate) fn map_summarize_error(error: SummarizeError) -> McpError {
    if error.is_validation() {
        McpError::invalid_params(error.to_string(), None)
    } else {
        McpError::internal_error(error.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CONFIG, CompressionProvider, Config, EmbeddingProvider},
        embedding::EmbeddingClientError,
    };
    use rmcp::model::ErrorCode;
    use serde_json::json;
    use std::sync::Once;

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                embedding_provider: EmbeddingProvider::Deterministic,
                embedding_model: "test-embed".to_string(),
                embedding_dimension: 8,
                embedding_max_tokens: 64,
                compression_provider: CompressionProvider::OpenAI,
                compression_model: "test-compress".to_string(),
                ollama_url: "http://127.0.0.1:11434".to_string(),
                openai_base_url: "https://api.openai.com".to_string(),
                openai_api_key: Some("test-key".to_string()),
                summary_compression_ratio: 0.3,
                summary_min_length: 30,
                summary_max_length: 130,
                summary_max_chunk_size: 512,
                summary_clustering_seed: 42,
                summary_timeout_ms: None,
                server_port: None,
            });
        });
    }

    fn parse(value: serde_json::Value) -> Result<SummarizeToolRequest, McpError> {
        parse_arguments(Some(value.as_object().expect("object payload").clone()))
    }

    #[test]
    fn accepts_camel_case_overrides() {
        let request = parse(json!({
            "text": "First finding. Second finding.",
            "compressionRatio": 0.5,
            "maxChunkSize": 256,
            "clusteringSeed": 7
        }))
        .expect("valid arguments");

        assert_eq!(request.text, "First finding. Second finding.");
        assert_eq!(request.compression_ratio, Some(0.5));
        assert_eq!(request.max_chunk_size, Some(256));
        assert_eq!(request.clustering_seed, Some(7));
        assert_eq!(request.min_length, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        let error = parse(json!({
            "text": "Hello",
            "compression_ratio": 0.5
        }))
        .expect_err("snake_case key should be rejected");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn rejects_missing_text() {
        let error = parse(json!({ "compressionRatio": 0.5 })).expect_err("text is required");
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn overrides_fall_back_to_configured_defaults() {
        ensure_test_config();

        let options = ToolOptionOverrides {
            compression_ratio: Some(0.6),
            clustering_seed: Some(9),
            ..ToolOptionOverrides::default()
        }
        .into_summarize_options();

        assert_eq!(options.compression_ratio, 0.6);
        assert_eq!(options.clustering_seed, 9);
        assert_eq!(options.min_length, 30);
        assert_eq!(options.max_length, 130);
        assert_eq!(options.max_chunk_size, 512);
    }

    #[test]
    fn validation_failures_map_to_invalid_params() {
        let error = map_summarize_error(SummarizeError::InvalidCompressionRatio { value: 5.0 });
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn backend_failures_map_to_internal_errors() {
        let error = map_summarize_error(SummarizeError::Embedding(
            EmbeddingClientError::GenerationFailed("provider offline".to_string()),
        ));
        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
    }
}
