//! Handler for the `stats` MCP tool.

use std::sync::Arc;

use crate::{mcp::format::metrics_payload, processing::SummarizerService};
use rmcp::{ErrorData as McpError, model::CallToolResult};

/// Handle the `stats` tool by reporting pipeline usage counters.
pub(crate) async fn handle_stats(
    summarizer: &Arc<SummarizerService>,
) -> Result<CallToolResult, McpError> {
    let snapshot = summarizer.metrics_snapshot();
    Ok(CallToolResult::structured(metrics_payload(&snapshot)))
}
