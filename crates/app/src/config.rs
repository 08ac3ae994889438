//! Settings file plus credentials taken from the environment.
//!
//! The YAML file names the database, the index and the embedding model. Secrets never
//! live in it: they come from `DOCUMENT_STORE_URI`, `PINECONE_API_KEY` and `HF_TOKEN`,
//! optionally loaded from a `.env` file first.

use anyhow::{bail, Context};
use k12_ingest_core::{DEFAULT_CONTROLLER_URL, DEFAULT_HF_ENDPOINT, DEFAULT_HF_MODEL};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_LOG_FILE: &str = "logs/logs.log";

pub const DOCUMENT_STORE_URI_VAR: &str = "DOCUMENT_STORE_URI";
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";
pub const HF_TOKEN_VAR: &str = "HF_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub document_store: DocumentStoreSettings,
    pub vector_index: VectorIndexSettings,
    #[serde(default)]
    pub embeddings: EmbeddingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreSettings {
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexSettings {
    pub index_name: String,
    #[serde(default = "default_controller_url")]
    pub controller_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Huggingface,
    Ngram,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_controller_url() -> String {
    DEFAULT_CONTROLLER_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_HF_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_HF_ENDPOINT.to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;

        if settings.document_store.database.trim().is_empty() {
            bail!("document_store.database must not be empty");
        }
        if settings.vector_index.index_name.trim().is_empty() {
            bail!("vector_index.index_name must not be empty");
        }
        if settings.embeddings.model.trim().is_empty() {
            bail!("embeddings.model must not be empty");
        }

        Ok(settings)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub document_store_uri: String,
    pub pinecone_api_key: String,
    pub hf_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("document_store_uri", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        tolerate_missing_env_file(dotenvy::dotenv().map(|_| ()))?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            document_store_uri: read(DOCUMENT_STORE_URI_VAR)
                .with_context(|| format!("{DOCUMENT_STORE_URI_VAR} is not set"))?,
            pinecone_api_key: read(PINECONE_API_KEY_VAR)
                .with_context(|| format!("{PINECONE_API_KEY_VAR} is not set"))?,
            hf_token: read(HF_TOKEN_VAR),
        })
    }

    pub fn require_hf_token(&self) -> anyhow::Result<String> {
        self.hf_token
            .clone()
            .with_context(|| format!("{HF_TOKEN_VAR} is required by the huggingface embedding provider"))
    }
}

// A missing `.env` is fine; one that exists but does not parse is not.
fn tolerate_missing_env_file(result: Result<(), dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Err(dotenvy::Error::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(()),
        other => other.context("loading .env file"),
    }
}
