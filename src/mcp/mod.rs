//! Model Context Protocol (MCP) integration for Rusty Summarizer.
//!
//! This module wires the summarization pipeline into an MCP server so editors and agent hosts can
//! condense documents over stdio. The surface area consists of:
//!
//! - Tools: `summarize`, `summarize-source`, `keywords`, and `stats`.
//! - Resources: `summarizer://health`, `summarizer://settings`, `summarizer://metrics`,
//!   `summarizer://providers`, and a templated `summarizer://providers/{provider}`.
//!
//! Handlers, schemas, and formatting helpers are kept in focused submodules to make tests and
//! reviews small and targeted.

mod format;
pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use server::RustySummMcpServer;
