use crate::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;
pub const DEFAULT_HF_ENDPOINT: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction";
pub const DEFAULT_HF_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

// Callers await each call on its own and never overlap requests.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for Box<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }
}

pub struct HuggingFaceEmbedder {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HuggingFaceEmbedder {
    pub fn new(endpoint: &str, model: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                model.trim_matches('/')
            ),
            token,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&json!({ "inputs": text, "options": { "wait_for_model": true } }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::BackendResponse {
                status: status.as_u16(),
                details,
            });
        }

        let payload: Value = response.json().await?;
        parse_feature_vector(&payload)
    }
}

/// Accepts `[f32]` or a single-row `[[f32]]`.
pub(crate) fn parse_feature_vector(payload: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| EmbeddingError::Malformed("response is not an array".to_string()))?;

    let flat = match rows.first() {
        Some(Value::Array(inner)) if rows.len() == 1 => inner,
        Some(Value::Array(_)) => {
            return Err(EmbeddingError::Malformed(format!(
                "expected one embedding row, got {}",
                rows.len()
            )))
        }
        Some(_) => rows,
        None => return Err(EmbeddingError::Malformed("empty embedding".to_string())),
    };

    flat.iter()
        .map(|value| {
            value
                .as_f64()
                .map(|number| number as f32)
                .ok_or_else(|| EmbeddingError::Malformed(format!("non-numeric component {value}")))
        })
        .collect()
}

/// Offline embedder selected by `provider: ngram`; hashes character trigrams into buckets.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let buckets = self.dimensions.max(1);
        let mut vector = vec![0f32; buckets];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        for trigram in chars.windows(3) {
            vector[trigram_bucket(trigram, buckets)] += 1.0;
        }

        let norm = vector.iter().map(|component| component * component).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|component| *component /= norm);
        }

        vector
    }
}

// FNV-1a over the trigram's UTF-8 bytes.
fn trigram_bucket(trigram: &[char], buckets: usize) -> usize {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    let hash = trigram
        .iter()
        .collect::<String>()
        .bytes()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME));

    (hash % buckets as u64) as usize
}

#[async_trait]
impl Embedder for CharacterNgramEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}
