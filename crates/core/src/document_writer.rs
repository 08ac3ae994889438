use crate::error::IngestError;
use crate::models::{StructuredRecord, WriteOutcome};
use crate::traits::DocumentStore;
use tracing::info;

pub struct DocumentStoreWriter<D: DocumentStore> {
    store: D,
}

impl<D: DocumentStore> DocumentStoreWriter<D> {
    pub fn new(store: D) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// A missing collection is reported as [`WriteOutcome::StoreUnavailable`] and is
    /// never created here.
    pub async fn upload(
        &self,
        records: &[StructuredRecord],
        collection: &str,
    ) -> Result<WriteOutcome, IngestError> {
        if !self.store.collection_exists(collection).await? {
            info!(collection = %collection, "collection not found; it must be created before ingesting");
            return Ok(WriteOutcome::StoreUnavailable {
                name: collection.to_string(),
            });
        }

        if records.is_empty() {
            info!(collection = %collection, "no records to upload");
            return Ok(WriteOutcome::Written { count: 0 });
        }

        self.store.insert_many(collection, records).await?;

        info!(collection = %collection, records = records.len(), "uploaded records to document store");
        Ok(WriteOutcome::Written {
            count: records.len(),
        })
    }
}
