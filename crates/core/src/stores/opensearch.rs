use super::exists_from_status;
use crate::models::StructuredRecord;
use crate::traits::DocumentStore;
use crate::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// A collection lives in the index `{database}-{collection}`, lower-cased as
/// OpenSearch requires.
pub struct OpenSearchDocumentStore {
    endpoint: String,
    database: String,
    username: Option<String>,
    password: Option<String>,
}

impl OpenSearchDocumentStore {
    pub fn new(uri: &str, database: impl Into<String>) -> Result<Self, StoreError> {
        let mut parsed = Url::parse(uri)?;

        let username = Some(parsed.username().to_string()).filter(|name| !name.is_empty());
        let password = parsed.password().map(str::to_string);
        parsed
            .set_username("")
            .and_then(|_| parsed.set_password(None))
            .map_err(|_| StoreError::Request(format!("cannot strip credentials from {uri}")))?;

        Ok(Self {
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            database: database.into(),
            username,
            password,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn index_for(&self, collection: &str) -> String {
        format!("{}-{}", self.database, collection).to_lowercase()
    }

    // One client per call; it is dropped, and its connections closed, when the call returns.
    fn connect(&self) -> Result<Client, StoreError> {
        Ok(Client::builder().pool_max_idle_per_host(0).build()?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for OpenSearchDocumentStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError> {
        let client = self.connect()?;
        let index = self.index_for(collection);
        let response = self
            .authorize(client.head(format!("{}/{}", self.endpoint, index)))
            .send()
            .await?;

        exists_from_status("opensearch", &index, response.status())
    }

    async fn insert_many(
        &self,
        collection: &str,
        records: &[StructuredRecord],
    ) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let index = self.index_for(collection);
        let payload = bulk_index_payload(&index, records)?;

        let client = self.connect()?;
        debug!(index = %index, records = records.len(), "opened document store connection");
        let response = self
            .authorize(client.post(format!("{}/_bulk", self.endpoint)))
            .header("Content-Type", "application/x-ndjson")
            .body(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "opensearch".to_string(),
                details: response.status().to_string(),
            });
        }

        let summary: Value = response.json().await?;
        drop(client);
        debug!(index = %index, "closed document store connection");

        check_bulk_summary(&summary)
    }
}

/// NDJSON body of `index` actions. No `_id` is set, so every call adds new documents.
pub(crate) fn bulk_index_payload(
    index: &str,
    records: &[StructuredRecord],
) -> Result<String, StoreError> {
    let mut lines = Vec::with_capacity(records.len() * 2);

    for record in records {
        lines.push(serde_json::to_string(&json!({ "index": { "_index": index } }))?);
        lines.push(serde_json::to_string(record)?);
    }

    Ok(lines.join("\n") + "\n")
}

// A 200 from `_bulk` can still carry per-item failures.
pub(crate) fn check_bulk_summary(summary: &Value) -> Result<(), StoreError> {
    if !summary.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(());
    }

    Err(StoreError::BackendResponse {
        backend: "opensearch".to_string(),
        details: first_bulk_error(summary)
            .unwrap_or_else(|| "bulk insert reported errors".to_string()),
    })
}

fn first_bulk_error(summary: &Value) -> Option<String> {
    summary
        .pointer("/items")
        .and_then(Value::as_array)?
        .iter()
        .find_map(|item| item.pointer("/index/error"))
        .map(Value::to_string)
}
