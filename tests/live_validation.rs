use std::{env, sync::Once};

use rustysumm::{config, embedding, processing::SummarizerService};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() {
    INIT.call_once(|| {
        set_default_env("EMBEDDING_PROVIDER", "ollama");
        set_default_env("EMBEDDING_MODEL", "nomic-embed-text");
        set_default_env("EMBEDDING_DIMENSION", "768");
        set_default_env("COMPRESSION_PROVIDER", "ollama");
        set_default_env("COMPRESSION_MODEL", "llama3.2");
        set_default_env("OLLAMA_URL", "http://127.0.0.1:11434");
        config::init_config();
    });
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_provider_health_snapshot() {
    init_config_once();
    let service = SummarizerService::from_config().expect("service should construct");
    let snapshot = service.provider_health().await;
    assert_eq!(
        snapshot.embedding.reachable,
        Some(true),
        "embedding backend should be reachable: {snapshot:?}"
    );
    assert_eq!(
        snapshot.compression.reachable,
        Some(true),
        "compression backend should be reachable: {snapshot:?}"
    );
}

#[tokio::test]
#[ignore = "Requires live Ollama embeddings"]
async fn live_ollama_embedding_roundtrip() {
    init_config_once();
    let client = embedding::get_embedding_client().expect("embedding client should construct");
    let vectors = client
        .generate_embeddings(vec!["rusty-summ live embedding".to_string()])
        .await
        .expect("failed to request embeddings from provider");
    assert_eq!(vectors.len(), 1, "expected embedding per input sentence");
    let dimension = config::get_config().embedding_dimension;
    assert_eq!(vectors[0].len(), dimension, "embedding dimension mismatch");
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_summarize_roundtrip() {
    init_config_once();
    let service = SummarizerService::from_config().expect("service should construct");
    let text = "Rust has become a popular language for systems programming. \
        Its ownership model prevents whole classes of memory bugs. \
        The compiler enforces these rules at build time. \
        Many companies now ship production services written in Rust. \
        Tooling such as cargo and clippy keeps projects consistent.";

    let outcome = service
        .summarize(text, 0.4)
        .await
        .expect("live pipeline should produce a summary");
    assert!(!outcome.summary.is_empty(), "summary must not be empty");
    assert!(
        outcome.metadata.num_chunks >= 1,
        "expected at least one chunk: {:?}",
        outcome.metadata
    );
}
