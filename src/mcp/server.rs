//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    config::{CompressionProvider, Config, EmbeddingProvider, get_config},
    mcp::{
        format::{
            APPLICATION_JSON, SettingsSnapshot, SummarySettingsSnapshot, health_payload,
            json_resource_contents, metrics_payload, serialize_json,
        },
        handlers::{
            keywords::handle_keywords, source::handle_summarize_source, stats::handle_stats,
            summarize::handle_summarize,
        },
        registry, schemas,
    },
    processing::SummarizerService,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, ListResourceTemplatesResult,
        ListResourcesResult, ListToolsResult, RawResource, RawResourceTemplate,
        ReadResourceRequestParam, ReadResourceResult, Resource, ResourceTemplate,
        ServerCapabilities, ServerInfo, Tool, ToolAnnotations,
    },
};
use serde_json::{Map, Value};

const HEALTH_URI: &str = "summarizer://health";
const SETTINGS_URI: &str = "summarizer://settings";
const METRICS_URI: &str = "summarizer://metrics";
const PROVIDERS_URI: &str = "summarizer://providers";
const PROVIDER_TEMPLATE_URI: &str = "summarizer://providers/{provider}";
const PROVIDER_PREFIX: &str = "summarizer://providers/";

/// MCP server implementation exposing Rusty Summarizer operations.
#[derive(Clone)]
pub struct RustySummMcpServer {
    summarizer: Arc<SummarizerService>,
    registry: Arc<registry::Registry>,
}

impl RustySummMcpServer {
    /// Create a new MCP server using the supplied summarization pipeline.
    pub fn new(summarizer: Arc<SummarizerService>) -> Self {
        let registry = registry::Registry::default()
            .resource(HEALTH_URI, resource_health)
            .resource(SETTINGS_URI, resource_settings)
            .resource(METRICS_URI, resource_metrics)
            .resource(PROVIDERS_URI, resource_providers)
            .tool("summarize", tool_summarize)
            .tool("summarize-source", tool_summarize_source)
            .tool("keywords", tool_keywords)
            .tool("stats", tool_stats);

        Self {
            summarizer,
            registry: Arc::new(registry),
        }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        let summarize_schema = Arc::new(schemas::summarize_input_schema());
        let source_schema = Arc::new(schemas::summarize_source_input_schema());
        let keywords_schema = Arc::new(schemas::keywords_input_schema());
        vec![
            Tool {
                name: Cow::Borrowed("summarize"),
                title: Some("Summarize Text".to_string()),
                description: Some(Cow::Borrowed(
                    "Condense long text into a short summary instead of pasting whole documents into chats.",
                )),
                input_schema: summarize_schema.clone(),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Summarize Text")
                        .destructive(false)
                        .idempotent(true)
                        .open_world(false),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed("summarize-source"),
                title: Some("Summarize Source".to_string()),
                description: Some(Cow::Borrowed(
                    "Fetch a URL, JSON document, or local text file and return its summary with provenance.",
                )),
                input_schema: source_schema.clone(),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Summarize Source")
                        .destructive(false)
                        .idempotent(true)
                        .open_world(true),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed("keywords"),
                title: Some("Extract Keywords".to_string()),
                description: Some(Cow::Borrowed(
                    "Rank the most distinctive terms in a document before deciding what to read.",
                )),
                input_schema: keywords_schema.clone(),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Extract Keywords")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(false),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed("stats"),
                title: Some("Usage Counters".to_string()),
                description: Some(Cow::Borrowed(
                    "Check how many documents, chunks, and sentences this server has processed.",
                )),
                input_schema: Arc::new(schemas::empty_object_schema()),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Usage Counters")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(false),
                ),
                icons: None,
            },
        ]
    }

    fn describe_resources(&self) -> Vec<Resource> {
        let mut health = RawResource::new(HEALTH_URI, "health");
        health.description = Some("Configured providers and live backend reachability".into());

        let mut settings = RawResource::new(SETTINGS_URI, "settings");
        settings.description = Some("Effective defaults for the summarization pipeline".into());

        let mut metrics = RawResource::new(METRICS_URI, "metrics");
        metrics.description = Some("Pipeline usage counters since process start".into());

        let mut providers = RawResource::new(PROVIDERS_URI, "providers");
        providers.description = Some("Embedding and compression provider configuration".into());

        vec![
            health.no_annotation(),
            settings.no_annotation(),
            metrics.no_annotation(),
            providers.no_annotation(),
        ]
    }

    fn describe_resource_templates(&self) -> Vec<ResourceTemplate> {
        let provider_template = RawResourceTemplate {
            uri_template: PROVIDER_TEMPLATE_URI.into(),
            name: "provider".into(),
            title: Some("Provider Detail".into()),
            description: Some(
                "Inspect one provider role: replace {provider} with embedding or compression and call readResource"
                    .into(),
            ),
            mime_type: Some(APPLICATION_JSON.into()),
        };

        vec![provider_template.no_annotation()]
    }
}

fn resource_health(
    server: &RustySummMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move {
        let snapshot = summarizer.provider_health().await;
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(HEALTH_URI, health_payload(&snapshot))],
        })
    })
}

fn resource_settings(
    _server: &RustySummMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    Box::pin(async move {
        let config = get_config();
        let payload = SettingsSnapshot {
            summary: SummarySettingsSnapshot {
                compression_ratio: config.summary_compression_ratio,
                min_length: config.summary_min_length,
                max_length: config.summary_max_length,
                max_chunk_size: config.summary_max_chunk_size,
                clustering_seed: config.summary_clustering_seed,
                timeout_ms: config.summary_timeout_ms,
            },
        };
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                SETTINGS_URI,
                serialize_json(&payload, SETTINGS_URI),
            )],
        })
    })
}

fn resource_metrics(
    server: &RustySummMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move {
        let payload = metrics_payload(&summarizer.metrics_snapshot());
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                METRICS_URI,
                serialize_json(&payload, METRICS_URI),
            )],
        })
    })
}

fn resource_providers(
    _server: &RustySummMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    Box::pin(async move {
        let config = get_config();
        let mut payload = Map::new();
        payload.insert("embedding".into(), embedding_provider_entry(config));
        payload.insert("compression".into(), compression_provider_entry(config));
        let payload = Value::Object(payload);
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                PROVIDERS_URI,
                serialize_json(&payload, PROVIDERS_URI),
            )],
        })
    })
}

fn embedding_provider_entry(config: &Config) -> Value {
    let label = match config.embedding_provider {
        EmbeddingProvider::Ollama => "ollama",
        EmbeddingProvider::OpenAI => "openai",
        EmbeddingProvider::Deterministic => "deterministic",
    };
    let endpoint = match config.embedding_provider {
        EmbeddingProvider::Ollama => Some(config.ollama_url.as_str()),
        EmbeddingProvider::OpenAI => Some(config.openai_base_url.as_str()),
        EmbeddingProvider::Deterministic => None,
    };

    let mut entry = Map::new();
    entry.insert("provider".into(), Value::String(label.to_string()));
    entry.insert(
        "model".into(),
        Value::String(config.embedding_model.clone()),
    );
    entry.insert(
        "dimension".into(),
        Value::from(config.embedding_dimension as u64),
    );
    entry.insert(
        "maxTokens".into(),
        Value::from(config.embedding_max_tokens as u64),
    );
    if let Some(url) = endpoint {
        entry.insert("url".into(), Value::String(url.to_string()));
    }
    Value::Object(entry)
}

fn compression_provider_entry(config: &Config) -> Value {
    let (label, endpoint) = match config.compression_provider {
        CompressionProvider::Ollama => ("ollama", config.ollama_url.as_str()),
        CompressionProvider::OpenAI => ("openai", config.openai_base_url.as_str()),
    };

    let mut entry = Map::new();
    entry.insert("provider".into(), Value::String(label.to_string()));
    entry.insert(
        "model".into(),
        Value::String(config.compression_model.clone()),
    );
    entry.insert("url".into(), Value::String(endpoint.to_string()));
    Value::Object(entry)
}

fn tool_summarize(
    server: &RustySummMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move { handle_summarize(&summarizer, request.arguments).await })
}

fn tool_summarize_source(
    server: &RustySummMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move { handle_summarize_source(&summarizer, request.arguments).await })
}

fn tool_keywords(
    server: &RustySummMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move { handle_keywords(&summarizer, request.arguments).await })
}

fn tool_stats(server: &RustySummMcpServer, _request: CallToolRequestParam) -> registry::ToolFuture {
    let summarizer = server.summarizer.clone();
    Box::pin(async move { handle_stats(&summarizer).await })
}

impl ServerHandler for RustySummMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "rusty-summ".to_string();
        implementation.title = Some("Rusty Summarizer MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to condense documents instead of pasting them into chats. Summarize raw text with summarize, fetch and summarize URLs or local files with summarize-source, rank key terms with keywords, and check usage counters with stats.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self.describe_resources();
        std::future::ready(Ok(ListResourcesResult::with_all_items(resources)))
    }

    fn list_resource_templates(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourceTemplatesResult, McpError>> + Send + '_
    {
        let templates = self.describe_resource_templates();
        std::future::ready(Ok(ListResourceTemplatesResult::with_all_items(templates)))
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = request.uri.clone();
            if let Some(role) = uri.strip_prefix(PROVIDER_PREFIX) {
                if role.is_empty() {
                    return Err(McpError::invalid_params(
                        "Provider role missing in resource URI",
                        None,
                    ));
                }
                let config = get_config();
                let payload = match role {
                    "embedding" => embedding_provider_entry(config),
                    "compression" => compression_provider_entry(config),
                    other => {
                        return Err(McpError::invalid_params(
                            format!("Unknown provider role: {other}"),
                            None,
                        ));
                    }
                };
                return Ok(ReadResourceResult {
                    contents: vec![json_resource_contents(&uri, serialize_json(&payload, &uri))],
                });
            }

            if let Some(handler) = self.registry.resources.get(uri.as_str()) {
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown resource URI: {uri}"),
                None,
            ))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if let Some(handler) = self.registry.tools.get(request.name.as_ref()) {
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ))
        }
    }
}
