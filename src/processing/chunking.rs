//! Sentence splitting, chunk assembly, and token budgets.
//!
//! This module encapsulates how Rusty Summarizer segments a document before the
//! pipeline runs. Highlights:
//!
//! - Sentence boundaries follow a simple delimiter heuristic (`". "`); no
//!   language-specific detection is attempted.
//! - Chunks accumulate whole sentences greedily against a character budget, so
//!   no sentence is split across chunks. A single sentence larger than the
//!   budget becomes its own oversized chunk rather than an error.
//! - Token counting: prefer `tiktoken-rs` for OpenAI/known encodings; fall back
//!   to a whitespace counter when the model's tokenizer is unavailable (common
//!   for Ollama models and the deterministic embedder).

use crate::config::EmbeddingProvider;
use anyhow::Error as TokenizerError;
use std::sync::Arc;
use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model, o200k_base, p50k_base, p50k_edit, r50k_base};

use super::types::ChunkingError;

pub(crate) type TokenCounter = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Delimiter that separates sentences in the input document.
pub(crate) const SENTENCE_DELIMITER: &str = ". ";

/// Split text into sentences on the delimiter, dropping empty fragments.
///
/// Fragments keep their original spelling (no trimming); consecutive delimiters
/// produce fragments that are all whitespace, and those are skipped so no
/// downstream stage ever sees an empty sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    text.split(SENTENCE_DELIMITER)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| fragment.to_string())
        .collect()
}

/// Assemble sentences into ordered chunks bounded by `max_chunk_size` characters.
///
/// Sentences accumulate into a buffer until adding the next one would exceed the
/// budget; the buffer is then flushed as one chunk and the pending sentence
/// starts the next buffer. A sentence that alone exceeds the budget while the
/// buffer is empty is emitted immediately as its own chunk. Flushed chunks are
/// rendered with the delimiter restored and a terminal period appended.
///
/// Returns an empty vector for empty or whitespace-only input; never emits an
/// empty chunk. A zero budget is rejected.
pub(crate) fn chunk_text(text: &str, max_chunk_size: usize) -> Result<Vec<String>, ChunkingError> {
    if max_chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let sentences = split_sentences(text);
    let mut chunks = Vec::new();
    let mut current_chunk: Vec<&str> = Vec::new();
    let mut current_length = 0usize;

    for sentence in &sentences {
        let sentence_length = sentence.chars().count();

        if current_length + sentence_length > max_chunk_size {
            if current_chunk.is_empty() {
                chunks.push(render_chunk(&[sentence.as_str()]));
            } else {
                chunks.push(render_chunk(&current_chunk));
                current_chunk = vec![sentence.as_str()];
                current_length = sentence_length;
            }
        } else {
            current_chunk.push(sentence.as_str());
            current_length += sentence_length;
        }
    }

    if !current_chunk.is_empty() {
        chunks.push(render_chunk(&current_chunk));
    }

    Ok(chunks)
}

fn render_chunk(sentences: &[&str]) -> String {
    let mut chunk = sentences.join(SENTENCE_DELIMITER);
    chunk.push('.');
    chunk
}

/// Build a token counter for the given provider/model.
///
/// Uses OpenAI encodings when possible and gracefully falls back to whitespace
/// tokenization for unknown or locally aliased models (typical with Ollama).
/// The fallback is logged at `warn` level to aid diagnosis while keeping the
/// pipeline flowing. The deterministic embedder always counts whitespace.
pub(crate) fn build_token_counter(
    provider: EmbeddingProvider,
    model: &str,
) -> Result<TokenCounter, ChunkingError> {
    match provider {
        EmbeddingProvider::OpenAI => build_tiktoken_counter(model),
        EmbeddingProvider::Ollama => match build_tiktoken_counter(model) {
            Ok(counter) => Ok(counter),
            Err(error) => {
                tracing::warn!(
                    model,
                    error = %error,
                    "Tokenizer unavailable for Ollama model; falling back to whitespace counter"
                );
                Ok(default_token_counter())
            }
        },
        EmbeddingProvider::Deterministic => Ok(default_token_counter()),
    }
}

fn build_tiktoken_counter(model: &str) -> Result<TokenCounter, ChunkingError> {
    let normalized = model.trim();
    let target = if normalized.is_empty() {
        "cl100k_base"
    } else {
        normalized
    };
    let encoding = resolve_encoding(target).map_err(|source| ChunkingError::Tokenizer {
        model: target.to_string(),
        source,
    })?;
    let encoding = Arc::new(encoding);

    Ok(Arc::new(move |segment: &str| {
        encoding.encode_ordinary(segment).len()
    }))
}

fn resolve_encoding(model: &str) -> Result<CoreBPE, TokenizerError> {
    match get_bpe_from_model(model) {
        Ok(encoding) => Ok(encoding),
        Err(model_err) => {
            tracing::debug!(
                model,
                error = %model_err,
                "Tokenizer model lookup failed; trying encoding name"
            );
            if let Some(candidate) = encoding_from_name(model) {
                candidate
            } else {
                tracing::warn!(
                    model,
                    "Falling back to 'cl100k_base' encoding for token counting"
                );
                cl100k_base()
            }
        }
    }
}

fn encoding_from_name(name: &str) -> Option<Result<CoreBPE, TokenizerError>> {
    match name {
        "cl100k_base" => Some(cl100k_base()),
        "o200k_base" => Some(o200k_base()),
        "p50k_base" => Some(p50k_base()),
        "p50k_edit" => Some(p50k_edit()),
        "r50k_base" | "gpt2" => Some(r50k_base()),
        _ => None,
    }
}

fn default_token_counter() -> TokenCounter {
    Arc::new(|segment: &str| {
        let tokens = segment.split_whitespace().count();
        if tokens == 0 && !segment.is_empty() {
            1
        } else {
            tokens
        }
    })
}

/// Truncate text to the longest prefix that fits the token budget.
///
/// Sentences longer than the embedding backend's input window are cut silently;
/// the prefix always ends on a character boundary. Binary search keeps the
/// number of counter invocations logarithmic in the text length.
pub(crate) fn truncate_to_token_budget(
    text: &str,
    budget: usize,
    counter: &TokenCounter,
) -> String {
    if budget == 0 {
        return String::new();
    }
    if counter.as_ref()(text) <= budget {
        return text.to_string();
    }

    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .skip(1)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut best = None;
    let (mut low, mut high) = (0usize, offsets.len());
    while low < high {
        let mid = (low + high) / 2;
        if counter.as_ref()(&text[..offsets[mid]]) <= budget {
            best = Some(offsets[mid]);
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    match best {
        Some(end) => text[..end].to_string(),
        None => String::new(),
    }
}
