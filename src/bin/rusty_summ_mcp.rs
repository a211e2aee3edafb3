//! MCP server entrypoint (stdio transport).
//!
//! Launches an MCP server that exposes Rusty Summarizer's tools and resources over stdio. This
//! mode is designed for editor/agent integrations and shares all runtime configuration with the
//! HTTP binary.
use anyhow::{Context, Result};
use rmcp::{service::ServiceExt, transport::stdio};
use rustysumm::{config, logging, mcp::RustySummMcpServer, processing};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();

    let summarizer = Arc::new(
        processing::SummarizerService::from_config()
            .context("failed to construct summarizer service")?,
    );
    let server = RustySummMcpServer::new(summarizer);

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
