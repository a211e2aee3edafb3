use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_summarized: AtomicU64,
    chunks_summarized: AtomicU64,
    sentences_clustered: AtomicU64,
    keywords_extracted: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed summarization and the chunk and sentence counts behind it.
    pub fn record_summary(&self, chunk_count: u64, sentence_count: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.sentences_clustered
            .fetch_add(sentence_count, Ordering::Relaxed);
    }

    /// Record a completed keyword extraction.
    pub fn record_keywords(&self, term_count: u64) {
        self.keywords_extracted
            .fetch_add(term_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            sentences_clustered: self.sentences_clustered.load(Ordering::Relaxed),
            keywords_extracted: self.keywords_extracted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents summarized successfully since startup.
    pub documents_summarized: u64,
    /// Total chunk count processed across all summarized documents.
    pub chunks_summarized: u64,
    /// Total sentences that passed through the selection stage.
    pub sentences_clustered: u64,
    /// Total terms returned by keyword extraction calls.
    pub keywords_extracted: u64,
}
