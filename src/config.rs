// Service configuration loaded from a TOML file with environment overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RECAP_CONFIG";

/// Environment variable overriding the model-fetch auth token. Credentials
/// never live in source or in the checked-in configuration file.
pub const MODEL_AUTH_TOKEN_ENV: &str = "RECAP_MODEL_AUTH_TOKEN";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub models: ModelsConfig,
    pub transcriber: TranscriberConfig,
    pub diarization: DiarizationConfig,
    pub summarizer: SummarizerConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Filesystem layout: transient audio goes to `work_dir`, downloaded model
/// artifacts persist in `models_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub work_dir: PathBuf,
    pub models_dir: Option<PathBuf>,
}

/// Model fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelsConfig {
    /// Bearer token sent when fetching gated model artifacts.
    /// Prefer setting RECAP_MODEL_AUTH_TOKEN over writing it here.
    pub auth_token: Option<String>,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Whisper model size, e.g. "base.en", "medium", "large-v3".
    pub model: String,
    /// Spoken language hint; None lets Whisper auto-detect.
    pub language: Option<String>,
}

/// Speaker diarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiarizationConfig {
    pub enabled: bool,
    pub max_speakers: usize,
    /// Embedding similarity threshold for clustering segments into speakers.
    pub similarity_threshold: f32,
}

/// Abstractive summarization model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerConfig {
    /// HuggingFace repository containing the quantized T5 artifacts.
    pub hf_repo: String,
    /// GGUF model filename within the repository.
    pub model_file: String,
    /// JSON config filename within the repository.
    pub config_file: String,
    /// Tokenizer filename within the repository.
    pub tokenizer_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp_audio"),
            models_dir: None,
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model: "medium".to_string(),
            language: None,
        }
    }
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_speakers: 10,
            similarity_threshold: 0.5,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            hf_repo: "lmz/candle-quantized-t5".to_string(),
            model_file: "model.gguf".to_string(),
            config_file: "config.json".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it is missing.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Apply environment overrides on top of the file-based configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(MODEL_AUTH_TOKEN_ENV) {
            self.override_auth_token(Some(token));
        }
        self
    }

    /// Replace the model-fetch token; empty values clear it.
    pub fn override_auth_token(&mut self, token: Option<String>) {
        self.models.auth_token = token.filter(|t| !t.trim().is_empty());
    }

    /// Configuration file path: $RECAP_CONFIG if set, otherwise ./recap.toml
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("recap.toml"))
    }

    /// Model artifact directory: the configured one, or a per-user data dir.
    pub fn models_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.models_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("recap").join("models"))
            .unwrap_or_else(|| PathBuf::from("models"))
    }

    pub fn work_dir(&self) -> &Path {
        &self.storage.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.transcriber.model, "medium");
        assert!(!config.diarization.enabled);
        assert_eq!(config.diarization.max_speakers, 10);
        assert!(config.models.auth_token.is_none());
    }

    #[test]
    fn load_from_toml_file() {
        let toml_content = r#"
            [server]
            port = 9090

            [transcriber]
            model = "base.en"
            language = "en"

            [diarization]
            enabled = true
            max_speakers = 4
        "#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.transcriber.model, "base.en");
        assert_eq!(config.transcriber.language.as_deref(), Some("en"));
        assert!(config.diarization.enabled);
        assert_eq!(config.diarization.max_speakers, 4);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server\nport = not_a_number").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_returns_defaults() {
        let path = Path::new("/tmp/nonexistent_recap_config_48151623.toml");
        let config = Config::load_or_default(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn auth_token_override() {
        let mut config = Config::default();
        config.override_auth_token(Some("hf_secret".to_string()));
        assert_eq!(config.models.auth_token.as_deref(), Some("hf_secret"));

        config.override_auth_token(Some("   ".to_string()));
        assert!(config.models.auth_token.is_none());
    }
}
