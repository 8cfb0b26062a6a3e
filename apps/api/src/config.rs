use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which embedding backend the service computes role and resume vectors with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Deterministic feature hashing, no network access.
    Hash,
    /// Any OpenAI-compatible `/embeddings` endpoint.
    OpenAi,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hash" => Ok(EmbeddingBackend::Hash),
            "openai" => Ok(EmbeddingBackend::OpenAi),
            other => bail!("EMBEDDING_PROVIDER must be 'hash' or 'openai', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub datasets_dir: PathBuf,
    pub top_k_roles: usize,
    pub max_upload_mb: usize,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_dim: usize,
    pub embedding_api_key: Option<String>,
    pub embedding_base_url: String,
    pub embedding_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            datasets_dir: std::env::var("DATASETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("datasets")),
            top_k_roles: parse_env("TOP_K_ROLES", 5)?,
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 10)?,
            embedding_backend: parse_env("EMBEDDING_PROVIDER", EmbeddingBackend::Hash)?,
            embedding_dim: parse_env("EMBEDDING_DIM", 384)?,
            embedding_api_key: std::env::var("EMBEDDING_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            embedding_base_url: std::env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
        };

        if config.embedding_backend == EmbeddingBackend::OpenAi
            && config.embedding_api_key.is_none()
        {
            bail!("EMBEDDING_API_KEY is required when EMBEDDING_PROVIDER=openai");
        }
        if config.embedding_dim == 0 {
            bail!("EMBEDDING_DIM must be greater than zero");
        }

        Ok(config)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            datasets_dir: PathBuf::from("datasets"),
            top_k_roles: 5,
            max_upload_mb: 10,
            embedding_backend: EmbeddingBackend::Hash,
            embedding_dim: 384,
            embedding_api_key: None,
            embedding_base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_backend_parses_case_insensitively() {
        assert_eq!(
            "OpenAI".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::OpenAi
        );
        assert_eq!(" hash ".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Hash);
    }

    #[test]
    fn test_embedding_backend_rejects_unknown() {
        assert!("faiss".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: usize = parse_env("ROLEFIT_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
