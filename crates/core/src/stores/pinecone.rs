use super::exists_from_status;
use crate::models::VectorRecord;
use crate::traits::VectorIndex;
use crate::StoreError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CONTROLLER_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

pub struct PineconeIndex {
    controller_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IndexDescription {
    pub(crate) host: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

impl PineconeIndex {
    pub fn new(controller_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            controller_url: controller_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn describe_index(&self, index: &str) -> Result<Option<IndexDescription>, StoreError> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", self.controller_url, index))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        if exists_from_status("pinecone", index, response.status())? {
            Ok(Some(response.json().await?))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self.describe_index(index).await?.is_some())
    }

    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        vectors: &[VectorRecord],
    ) -> Result<(), StoreError> {
        let description = self
            .describe_index(index)
            .await?
            .ok_or_else(|| StoreError::NotReady(format!("pinecone index {index}")))?;

        let response = self
            .client
            .post(upsert_url(&description.host)?)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&UpsertRequest { vectors, namespace })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::BackendResponse {
                backend: "pinecone".to_string(),
                details: format!("{status}: {body}"),
            });
        }

        Ok(())
    }
}

/// The describe call returns a bare host name; data-plane calls go over https.
pub(crate) fn upsert_url(host: &str) -> Result<Url, StoreError> {
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("https://{host}"))?
    };
    Ok(base.join("/vectors/upsert")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    #[test]
    fn upsert_url_defaults_to_https() {
        let url = upsert_url("k12bot-abc123.svc.aped-4627-b74a.pinecone.io").unwrap();
        assert_eq!(
            url.as_str(),
            "https://k12bot-abc123.svc.aped-4627-b74a.pinecone.io/vectors/upsert"
        );
    }

    #[test]
    fn upsert_url_keeps_explicit_scheme() {
        let url = upsert_url("http://localhost:5081").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5081/vectors/upsert");
    }

    #[test]
    fn describe_payload_yields_host() {
        let description: IndexDescription = serde_json::from_value(json!({
            "name": "k12bot",
            "dimension": 384,
            "metric": "cosine",
            "host": "k12bot-abc123.svc.pinecone.io",
            "status": { "ready": true, "state": "Ready" }
        }))
        .unwrap();
        assert_eq!(description.host, "k12bot-abc123.svc.pinecone.io");
    }

    #[test]
    fn upsert_body_carries_namespace_and_vectors() {
        let mut metadata = Map::new();
        metadata.insert("board".to_string(), Value::from("CBSE"));
        let vectors = vec![VectorRecord {
            id: "CBSE_ENGLISH_5_MATH_1_0_2024-06-01 09:00:00".to_string(),
            values: vec![0.5, 0.25],
            metadata,
        }];

        let body = serde_json::to_value(UpsertRequest {
            vectors: &vectors,
            namespace: "MATH_BOOK",
        })
        .unwrap();

        assert_eq!(body["namespace"], "MATH_BOOK");
        assert_eq!(body["vectors"][0]["id"], "CBSE_ENGLISH_5_MATH_1_0_2024-06-01 09:00:00");
        assert_eq!(body["vectors"][0]["values"], json!([0.5, 0.25]));
        assert_eq!(body["vectors"][0]["metadata"]["board"], "CBSE");
    }

    #[test]
    fn controller_url_trailing_slash_is_dropped() {
        let index = PineconeIndex::new("https://api.pinecone.io/", "key");
        assert_eq!(index.controller_url, DEFAULT_CONTROLLER_URL);
    }
}
