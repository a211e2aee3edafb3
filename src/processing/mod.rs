//! Summarization pipeline: chunking, sentence selection, and orchestration.

pub mod chunking;
pub mod selection;
mod service;
pub mod types;

pub use service::{SummarizerApi, SummarizerService};
pub use types::{
    ChunkingError, ClusteringError, ProviderHealthSnapshot, ProviderStatus, SourceSummarizeError,
    SourceSummaryOutcome, SummarizeError, SummarizeOptions, SummaryMetadata, SummaryOutcome,
};
