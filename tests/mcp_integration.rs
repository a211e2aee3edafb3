use std::sync::Arc;

use httpmock::{Method::GET, Method::POST, Mock, MockServer};
use rmcp::{
    handler::client::ClientHandler,
    model::{
        self, CallToolRequestParam, ClientInfo, PaginatedRequestParam, ReadResourceRequestParam,
        ResourceContents,
    },
    service::{RoleClient, RoleServer, RunningService, Service, serve_directly},
    transport::async_rw::AsyncRwTransport,
};
use rustysumm::{config, logging, mcp::RustySummMcpServer, processing::SummarizerService};
use serde_json::json;
use tokio::{io::split, sync::OnceCell};

static INIT: OnceCell<()> = OnceCell::const_new();
static MOCK_SERVER: OnceCell<&'static MockServer> = OnceCell::const_new();
static MOCK_HANDLES: OnceCell<Vec<Mock<'static>>> = OnceCell::const_new();

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

#[derive(Clone, Default)]
struct DummyClientHandler;

impl ClientHandler for DummyClientHandler {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

struct TestHarness {
    service: RunningService<RoleClient, DummyClientHandler>,
    server: RunningService<RoleServer, RustySummMcpServer>,
}

impl TestHarness {
    async fn new() -> Self {
        eprintln!("[harness] init start");
        INIT.get_or_init(|| async {
            eprintln!("[harness:init] starting mock server");
            let mock_server_owned = MockServer::start_async().await;
            let mock_server = Box::leak(Box::new(mock_server_owned));
            let base_url = mock_server.base_url();

            eprintln!("[harness:init] configuring environment");
            set_env("EMBEDDING_PROVIDER", "deterministic");
            set_env("EMBEDDING_MODEL", "test-embed");
            set_env("EMBEDDING_DIMENSION", "16");
            set_env("COMPRESSION_PROVIDER", "ollama");
            set_env("COMPRESSION_MODEL", "test-compress");
            set_env("OLLAMA_URL", &base_url);

            MOCK_SERVER.set(mock_server).ok();

            let server = MOCK_SERVER.get().expect("mock server initialized");

            eprintln!("[harness:init] registering http mocks");
            let mocks: Vec<Mock<'static>> = vec![
                server
                    .mock_async(|when, then| {
                        when.method(POST).path("/api/generate");
                        then.status(200).json_body(json!({
                            "response": "Condensed overview of the findings.",
                            "done": true
                        }));
                    })
                    .await,
                server
                    .mock_async(|when, then| {
                        when.method(GET).path("/api/tags");
                        then.status(200).json_body(json!({
                            "models": [{ "name": "test-compress" }]
                        }));
                    })
                    .await,
            ];

            MOCK_HANDLES.set(mocks).ok();

            eprintln!("[harness:init] initializing config & logging");
            config::init_config();
            logging::init_tracing();
            eprintln!("[harness:init] ready");
        })
        .await;

        eprintln!("[harness] building summarizer service");
        let summarizer =
            Arc::new(SummarizerService::from_config().expect("summarizer service should build"));
        eprintln!("[harness] summarizer ready");
        let server = RustySummMcpServer::new(summarizer);

        let (client_stream, server_stream) = tokio::io::duplex(16 * 1024);
        let (client_read, client_write) = split(client_stream);
        let (server_read, server_write) = split(server_stream);

        let client_transport = AsyncRwTransport::new_client(client_read, client_write);
        let server_transport = AsyncRwTransport::new_server(server_read, server_write);

        let server_info = server.get_info();
        let client_handler = DummyClientHandler;
        let client_info = ClientHandler::get_info(&client_handler);

        let server =
            serve_directly::<RoleServer, _, _, _, _>(server, server_transport, Some(client_info));

        eprintln!("[harness] starting client service");
        let service = serve_directly::<RoleClient, _, _, _, _>(
            client_handler,
            client_transport,
            Some(server_info),
        );
        eprintln!("[harness] client service ready");

        Self { service, server }
    }

    async fn shutdown(self) {
        eprintln!("[harness] shutdown start");
        let Self { service, server } = self;
        let _ = service.cancel().await;
        let _ = server.cancel().await;
        eprintln!("[harness] shutdown complete");
    }
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let info = service
        .peer_info()
        .expect("server info should be initialized");
    assert_eq!(info.server_info.name, "rusty-summ");
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.resources.is_some());

    let tools_result = service
        .list_tools(Some(PaginatedRequestParam { cursor: None }))
        .await
        .expect("list_tools");

    let names: Vec<_> = tools_result
        .tools
        .iter()
        .map(|tool| tool.name.as_ref())
        .collect();

    assert!(names.contains(&"summarize"));
    assert!(names.contains(&"summarize-source"));
    assert!(names.contains(&"keywords"));
    assert!(names.contains(&"stats"));

    harness.shutdown().await;
}

#[tokio::test]
async fn summarize_tool_runs_pipeline() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let response = service
        .call_tool(CallToolRequestParam {
            name: "summarize".into(),
            arguments: Some(
                json!({
                    "text": "Rust services stay fast under load. \
                        Memory safety comes without garbage collection. \
                        Builds catch mistakes before deploys. \
                        Teams ship with confidence.",
                    "compressionRatio": 0.5
                })
                .as_object()
                .unwrap()
                .clone(),
            ),
        })
        .await
        .expect("summarize tool call");

    assert_eq!(response.is_error, Some(false));
    let payload = response.structured_content.expect("structured payload");
    assert_eq!(payload["summary"], "Condensed overview of the findings.");
    assert_eq!(payload["numChunks"], 1);
    assert!(payload["originalLength"].as_u64().is_some());
    assert!(payload["summaryLength"].as_u64().is_some());
    assert!(payload["compressionRatioAchieved"].as_f64().is_some());

    let stats_response = service
        .call_tool(CallToolRequestParam {
            name: "stats".into(),
            arguments: Some(json!({}).as_object().unwrap().clone()),
        })
        .await
        .expect("stats tool call");
    assert_eq!(stats_response.is_error, Some(false));
    let stats_payload = stats_response
        .structured_content
        .expect("structured stats payload");
    assert!(stats_payload["documentsSummarized"].as_u64().unwrap_or(0) >= 1);
    assert!(stats_payload["chunksSummarized"].as_u64().unwrap_or(0) >= 1);

    harness.shutdown().await;
}

#[tokio::test]
async fn keywords_tool_ranks_terms() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let response = service
        .call_tool(CallToolRequestParam {
            name: "keywords".into(),
            arguments: Some(
                json!({
                    "text": "Compilers parse tokens. Compilers emit machine code.",
                    "topN": 2
                })
                .as_object()
                .unwrap()
                .clone(),
            ),
        })
        .await
        .expect("keywords tool call");

    assert_eq!(response.is_error, Some(false));
    let payload = response.structured_content.expect("structured payload");
    let keywords = payload["keywords"].as_array().expect("keywords array");
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0]["term"], "compilers");
    assert!(keywords[0]["score"].as_f64().unwrap_or(0.0) > 0.0);

    harness.shutdown().await;
}

#[tokio::test]
async fn invalid_payload_returns_error() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let err = service
        .call_tool(CallToolRequestParam {
            name: "summarize".into(),
            arguments: Some(
                json!({ "text": "Valid text.", "compressionRatio": 5.0 })
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
        })
        .await
        .expect_err("out-of-range ratio should fail");

    match err {
        rmcp::service::ServiceError::McpError(data) => {
            assert_eq!(data.code, model::ErrorCode::INVALID_PARAMS);
        }
        other => panic!("expected MCP error, got {other:?}"),
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn resources_report_settings_and_health() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let resources = service
        .list_resources(Some(PaginatedRequestParam { cursor: None }))
        .await
        .expect("list_resources");
    let uris: Vec<_> = resources
        .resources
        .iter()
        .map(|resource| resource.uri.as_str())
        .collect();
    assert!(uris.contains(&"summarizer://settings"));
    assert!(uris.contains(&"summarizer://health"));
    assert!(uris.contains(&"summarizer://metrics"));
    assert!(uris.contains(&"summarizer://providers"));

    let settings = service
        .read_resource(ReadResourceRequestParam {
            uri: "summarizer://settings".into(),
        })
        .await
        .expect("read settings resource");
    let ResourceContents::TextResourceContents { text, .. } = &settings.contents[0] else {
        panic!("expected text resource contents");
    };
    let parsed: serde_json::Value = serde_json::from_str(text).expect("settings JSON");
    assert_eq!(parsed["summary"]["compression_ratio"].as_f64(), Some(0.3));
    assert_eq!(parsed["summary"]["max_chunk_size"].as_u64(), Some(512));

    let health = service
        .read_resource(ReadResourceRequestParam {
            uri: "summarizer://health".into(),
        })
        .await
        .expect("read health resource");
    let ResourceContents::TextResourceContents { text, .. } = &health.contents[0] else {
        panic!("expected text resource contents");
    };
    let parsed: serde_json::Value = serde_json::from_str(text).expect("health JSON");
    assert_eq!(parsed["embedding"]["provider"], "deterministic");
    assert_eq!(parsed["compression"]["reachable"], true);

    let provider_detail = service
        .read_resource(ReadResourceRequestParam {
            uri: "summarizer://providers/embedding".into(),
        })
        .await
        .expect("read provider template resource");
    let ResourceContents::TextResourceContents { text, .. } = &provider_detail.contents[0] else {
        panic!("expected text resource contents");
    };
    let parsed: serde_json::Value = serde_json::from_str(text).expect("provider JSON");
    assert_eq!(parsed["provider"], "deterministic");
    assert_eq!(parsed["dimension"].as_u64(), Some(16));

    harness.shutdown().await;
}
