use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Rusty Summarizer server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Embedding provider used to generate sentence vectors.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Token budget applied to each sentence before embedding.
    pub embedding_max_tokens: usize,
    /// Provider used for the abstractive compression stage.
    pub compression_provider: CompressionProvider,
    /// Generation model identifier for abstractive compression.
    pub compression_model: String,
    /// Base URL of the local Ollama runtime.
    pub ollama_url: String,
    /// Base URL for OpenAI-compatible endpoints.
    pub openai_base_url: String,
    /// API key for OpenAI-backed providers.
    pub openai_api_key: Option<String>,
    /// Default target fraction of sentences retained per chunk.
    pub summary_compression_ratio: f64,
    /// Default lower bound (words) for compressed chunk summaries.
    pub summary_min_length: usize,
    /// Default upper bound (words) for compressed chunk summaries.
    pub summary_max_length: usize,
    /// Default chunker budget in characters.
    pub summary_max_chunk_size: usize,
    /// Default seed for the clustering stage.
    pub summary_clustering_seed: u64,
    /// Optional default deadline for a summarize call, in milliseconds.
    pub summary_timeout_ms: Option<u64>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported embedding backends for the summarization pipeline.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Hosted OpenAI embeddings API.
    OpenAI,
    /// Offline content-hashing embedder, selected explicitly.
    Deterministic,
}

/// Supported abstractive compression backends.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Hosted OpenAI chat completions API.
    OpenAI,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let embedding_provider: EmbeddingProvider =
            load_env("EMBEDDING_PROVIDER")?.parse().map_err(|()| {
                ConfigError::InvalidValue("Invalid EMBEDDING_PROVIDER".to_string())
            })?;
        let compression_provider: CompressionProvider =
            load_env("COMPRESSION_PROVIDER")?.parse().map_err(|()| {
                ConfigError::InvalidValue("Invalid COMPRESSION_PROVIDER".to_string())
            })?;
        let openai_api_key = load_env_optional("OPENAI_API_KEY");

        if openai_api_key.is_none()
            && (matches!(embedding_provider, EmbeddingProvider::OpenAI)
                || matches!(compression_provider, CompressionProvider::OpenAI))
        {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".to_string()));
        }

        let summary_compression_ratio =
            parse_or_default("SUMMARY_COMPRESSION_RATIO", DEFAULT_COMPRESSION_RATIO)?;
        if !(summary_compression_ratio > 0.0 && summary_compression_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue(
                "SUMMARY_COMPRESSION_RATIO".to_string(),
            ));
        }

        Ok(Self {
            embedding_provider,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: load_env("EMBEDDING_DIMENSION")?
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))?,
            embedding_max_tokens: parse_or_default(
                "EMBEDDING_MAX_TOKENS",
                DEFAULT_EMBEDDING_MAX_TOKENS,
            )?,
            compression_provider,
            compression_model: load_env("COMPRESSION_MODEL")?,
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_api_key,
            summary_compression_ratio,
            summary_min_length: parse_or_default("SUMMARY_MIN_LENGTH", DEFAULT_MIN_LENGTH)?,
            summary_max_length: parse_or_default("SUMMARY_MAX_LENGTH", DEFAULT_MAX_LENGTH)?,
            summary_max_chunk_size: parse_or_default(
                "SUMMARY_MAX_CHUNK_SIZE",
                DEFAULT_MAX_CHUNK_SIZE,
            )?,
            summary_clustering_seed: parse_or_default(
                "SUMMARY_CLUSTERING_SEED",
                DEFAULT_CLUSTERING_SEED,
            )?,
            summary_timeout_ms: parse_optional("SUMMARY_TIMEOUT_MS")?,
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

/// Default compression ratio applied when a caller omits one.
pub const DEFAULT_COMPRESSION_RATIO: f64 = 0.3;
/// Default lower word bound for compressed chunk summaries.
pub const DEFAULT_MIN_LENGTH: usize = 30;
/// Default upper word bound for compressed chunk summaries.
pub const DEFAULT_MAX_LENGTH: usize = 130;
/// Default chunker budget in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 512;
/// Default clustering seed.
pub const DEFAULT_CLUSTERING_SEED: u64 = 42;
/// Default per-sentence token budget before embedding.
pub const DEFAULT_EMBEDDING_MAX_TOKENS: usize = 512;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn parse_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional(key)?.unwrap_or(default))
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "deterministic" => Ok(Self::Deterministic),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for CompressionProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        compression_provider = ?config.compression_provider,
        compression_model = %config.compression_model,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_provider_parses_case_insensitively() {
        assert_eq!(
            "Ollama".parse::<EmbeddingProvider>(),
            Ok(EmbeddingProvider::Ollama)
        );
        assert_eq!(
            "OPENAI".parse::<EmbeddingProvider>(),
            Ok(EmbeddingProvider::OpenAI)
        );
        assert_eq!(
            "deterministic".parse::<EmbeddingProvider>(),
            Ok(EmbeddingProvider::Deterministic)
        );
        assert!("bert".parse::<EmbeddingProvider>().is_err());
    }

    #[test]
    fn compression_provider_rejects_unknown_values() {
        assert_eq!(
            "ollama".parse::<CompressionProvider>(),
            Ok(CompressionProvider::Ollama)
        );
        assert!("bart".parse::<CompressionProvider>().is_err());
    }
}
