//! Dispatch tables mapping resource URIs and tool names to handlers.

use std::{collections::HashMap, future::Future, pin::Pin};

use rmcp::ErrorData as McpError;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ReadResourceRequestParam, ReadResourceResult,
};

use super::server::RustySummMcpServer;

pub type ResourceFuture =
    Pin<Box<dyn Future<Output = Result<ReadResourceResult, McpError>> + Send>>;
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;

pub type ResourceHandler = fn(&RustySummMcpServer, ReadResourceRequestParam) -> ResourceFuture;
pub type ToolHandler = fn(&RustySummMcpServer, CallToolRequestParam) -> ToolFuture;

/// Dispatch table consulted by `read_resource` and `call_tool`.
#[derive(Default)]
pub struct Registry {
    pub resources: HashMap<&'static str, ResourceHandler>,
    pub tools: HashMap<&'static str, ToolHandler>,
}

impl Registry {
    pub fn resource(mut self, uri: &'static str, handler: ResourceHandler) -> Self {
        self.resources.insert(uri, handler);
        self
    }

    pub fn tool(mut self, name: &'static str, handler: ToolHandler) -> Self {
        self.tools.insert(name, handler);
        self
    }
}
