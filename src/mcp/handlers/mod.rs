//! Tool handlers for the MCP server.

use rmcp::{ErrorData as McpError, model::JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{config::get_config, processing::SummarizeOptions};

pub mod keywords;
pub mod source;
pub mod stats;
pub mod summarize;

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    parse_arguments_value(value)
}

/// Deserialize arguments represented as a JSON value into the target type.
pub(crate) fn parse_arguments_value<T: DeserializeOwned>(value: Value) -> Result<T, McpError> {
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Pipeline overrides shared by the summarization tools.
///
/// Unset fields fall back to the configured defaults.
#[derive(Debug, Default)]
pub(crate) struct ToolOptionOverrides {
    pub(crate) compression_ratio: Option<f64>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) max_chunk_size: Option<usize>,
    pub(crate) clustering_seed: Option<u64>,
}

impl ToolOptionOverrides {
    pub(crate) fn into_summarize_options(self) -> SummarizeOptions {
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
        if let Some(size) = self.max_chunk_size {
            options.max_chunk_size = size;
        }
        if let Some(seed) = self.clustering_seed {
            options.clustering_seed = seed;
        }
        options
    }
}
