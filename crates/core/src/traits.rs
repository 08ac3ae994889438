use crate::models::{StructuredRecord, VectorRecord};
use crate::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError>;

    async fn insert_many(
        &self,
        collection: &str,
        records: &[StructuredRecord],
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        vectors: &[VectorRecord],
    ) -> Result<(), StoreError>;
}
