//! Configuration management for scoperag
//!
//! TOML configuration with defaults and validation.
//! Location: ~/.scoperag/config.toml (override with `--config`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::index::LoaderConfig;
use crate::policy::PolicyConfig;
use crate::providers::{EmbeddingProvider, HashEmbedder, OllamaEmbedder};
use crate::retrieval::ContextConfig;

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: PolicyConfig,
    pub embedding: EmbeddingConfig,
    pub loader: LoaderConfig,
    pub context: ContextConfig,
    pub logging: LoggingConfig,
}

/// Which embedding provider to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Deterministic FNV hash vectors
    Hash,
    /// Local Ollama server
    Ollama,
}

/// Embedding provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingBackend,
    pub dimension: usize,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub request_timeout_secs: u64,
}

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Hash,
            dimension: 2,
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: "nomic-embed-text".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EmbeddingConfig {
    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Instantiate the configured embedding provider
    pub fn build_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        match self.provider {
            EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::with_dimension(self.dimension))),
            EmbeddingBackend::Ollama => Ok(Arc::new(OllamaEmbedder::new(
                self.ollama_url(),
                self.model.clone(),
                self.dimension,
                Duration::from_secs(self.request_timeout_secs),
            )?)),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".scoperag").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;

        if self.embedding.dimension == 0 {
            return Err(RagError::ConfigError(
                "embedding.dimension must be greater than 0".to_string(),
            ));
        }

        if self.embedding.provider == EmbeddingBackend::Ollama && self.embedding.model.is_empty() {
            return Err(RagError::ConfigError(
                "embedding.model is required for the ollama provider".to_string(),
            ));
        }

        if self.loader.concurrency == 0 {
            return Err(RagError::ConfigError(
                "loader.concurrency must be greater than 0".to_string(),
            ));
        }

        if self.loader.provider_timeout_ms == 0 {
            return Err(RagError::ConfigError(
                "loader.provider_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.context.max_context_tokens == 0 {
            return Err(RagError::ConfigError(
                "context.max_context_tokens must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(RagError::ConfigError(format!(
                    "Invalid log level: {}",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RagError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML for display
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MissingAttribute;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.embedding.provider, EmbeddingBackend::Hash);
        assert_eq!(config.embedding.dimension, 2);
        assert_eq!(config.policy.privileged_identities, vec!["123"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_dimension() {
        let mut config = Config::default();
        config.embedding.dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_concurrency() {
        let mut config = Config::default();
        config.loader.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert_eq!(config.embedding.ollama_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[policy]
missing_attribute = "deny"

[loader]
concurrency = 3
"#,
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.policy.missing_attribute, MissingAttribute::Deny);
        assert_eq!(config.policy.identity_key, "user_id");
        assert_eq!(config.loader.concurrency, 3);
        assert_eq!(config.loader.provider_timeout_ms, 5_000);
        assert_eq!(config.embedding.dimension, 2);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.embedding.provider = EmbeddingBackend::Ollama;
        config.embedding.dimension = 768;
        config.save(&path).unwrap();

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_build_hash_provider() {
        let config = Config::default();
        let provider = config.embedding.build_provider().unwrap();
        assert_eq!(provider.name(), "hash");
        assert_eq!(provider.dimension(), 2);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "policy = [").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(RagError::ConfigError(_))
        ));
    }
}
