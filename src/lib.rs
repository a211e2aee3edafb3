#![deny(missing_docs)]

//! Core library for the Rusty Summarizer server.

/// Document acquisition connectors (URL, JSON, plain text).
pub mod acquisition;
/// HTTP routing and REST handlers.
pub mod api;
/// Abstractive compression client abstraction and adapters.
pub mod compression;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// TF-IDF keyword extraction.
pub mod keywords;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Summarization metrics helpers.
pub mod metrics;
/// Summarization pipeline: chunking, selection, orchestration.
pub mod processing;
