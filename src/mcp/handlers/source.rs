//! Handler for the `summarize-source` MCP tool.

use std::sync::Arc;

use crate::{
    acquisition::AcquisitionError,
    mcp::format::source_summary_payload,
    processing::{SourceSummarizeError, SummarizerService},
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{ToolOptionOverrides, parse_arguments, summarize::map_summarize_error};

/// Request payload accepted by the `summarize-source` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct SummarizeSourceToolRequest {
    /// Location of the document: an HTTP URL or a local file path.
    pub(crate) uri: String,
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

/// Handle the `summarize-source` tool by acquiring the document and summarizing it.
pub(crate) async fn handle_summarize_source(
    summarizer: &Arc<SummarizerService>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: SummarizeSourceToolRequest = parse_arguments(arguments)?;
    if args.uri.trim().is_empty() {
        return Err(McpError::invalid_params("`uri` must not be empty", None));
    }

    let SummarizeSourceToolRequest {
        uri,
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
        .summarize_source(uri.trim(), options)
        .await
        .map_err(map_source_error)?;

    Ok(CallToolResult::structured(source_summary_payload(&outcome)))
}

/// Map acquisition and pipeline failures onto MCP error codes.
fn map_source_error(error: SourceSummarizeError) -> McpError {
    match error {
        SourceSummarizeError::Summarize(inner) => map_summarize_error(inner),
        SourceSummarizeError::Acquisition(AcquisitionError::UnsupportedSource(_)) => {
            McpError::invalid_params(error.to_string(), None)
        }
        SourceSummarizeError::Acquisition(_) => McpError::internal_error(error.to_string(), None),
    }
}
