use crate::clock::{date_stamp, id_timestamp, time_stamp, Clock};
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::models::{StructuredRecord, VectorRecord, WriteOutcome};
use crate::traits::VectorIndex;
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

const MISSING: &str = "None";

/// Embeds record batches and upserts them into one configured index.
pub struct VectorStoreWriter<V: VectorIndex> {
    index: V,
    index_name: String,
    clock: Arc<dyn Clock>,
}

impl<V: VectorIndex> VectorStoreWriter<V> {
    pub fn new(index: V, index_name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            index,
            index_name: index_name.into(),
            clock,
        }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Embeds every record in order, one awaited call at a time, then writes the whole
    /// batch with a single upsert. An embedding failure aborts before anything is written.
    pub async fn store<E>(
        &self,
        records: &[StructuredRecord],
        namespace: &str,
        embedder: &E,
    ) -> Result<WriteOutcome, IngestError>
    where
        E: Embedder + ?Sized,
    {
        if !self.index.index_exists(&self.index_name).await? {
            info!(index = %self.index_name, "vector index not found; it must be created before ingesting");
            return Ok(WriteOutcome::StoreUnavailable {
                name: self.index_name.clone(),
            });
        }

        let mut vectors = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let metadata = vector_metadata(record, &self.clock.now());
            let id = vector_id(record, position, &self.clock.now());
            let values = embedder.embed(&record.content).await?;
            debug!(id = %id, dimensions = values.len(), "embedded record");

            vectors.push(VectorRecord {
                id,
                values,
                metadata,
            });
        }

        if vectors.is_empty() {
            info!(index = %self.index_name, namespace = %namespace, "no records to vectorize");
            return Ok(WriteOutcome::Written { count: 0 });
        }

        self.index
            .upsert(&self.index_name, namespace, &vectors)
            .await?;

        info!(
            index = %self.index_name,
            namespace = %namespace,
            vectors = vectors.len(),
            "stored vectors"
        );
        Ok(WriteOutcome::Written {
            count: vectors.len(),
        })
    }
}

/// `{board}_{language}_{class}_{subject}_{subject_part}_{position}_{timestamp}`.
pub fn vector_id(record: &StructuredRecord, position: usize, at: &NaiveDateTime) -> String {
    format!("{}_{}_{}", record.id_prefix(), position, id_timestamp(at))
}

/// Copies every record field. Empty strings, zero numbers and absent or empty tag
/// lists are written as the string `"None"`. `date`/`time` describe when the vector
/// was built, not when the record was.
pub fn vector_metadata(record: &StructuredRecord, at: &NaiveDateTime) -> Map<String, Value> {
    let mut metadata = Map::new();

    metadata.insert("source".to_string(), text_or_missing(&record.source));
    metadata.insert("file_path".to_string(), text_or_missing(&record.file_path));
    metadata.insert("board".to_string(), text_or_missing(&record.board));
    metadata.insert("language".to_string(), text_or_missing(&record.language));
    metadata.insert("class".to_string(), text_or_missing(&record.class));
    metadata.insert("subject".to_string(), text_or_missing(&record.subject));
    metadata.insert(
        "subject_part".to_string(),
        number_or_missing(record.subject_part),
    );
    metadata.insert("author".to_string(), text_or_missing(&record.author));
    metadata.insert(
        "tags".to_string(),
        match &record.tags {
            Some(tags) if !tags.is_empty() => Value::from(tags.clone()),
            _ => Value::from(MISSING),
        },
    );
    metadata.insert("page".to_string(), number_or_missing(record.page));
    metadata.insert(
        "total_pages".to_string(),
        number_or_missing(record.total_pages),
    );
    metadata.insert("content".to_string(), text_or_missing(&record.content));
    metadata.insert("date".to_string(), Value::from(date_stamp(at)));
    metadata.insert("time".to_string(), Value::from(time_stamp(at)));

    metadata
}

fn text_or_missing(value: &str) -> Value {
    if value.is_empty() {
        Value::from(MISSING)
    } else {
        Value::from(value)
    }
}

fn number_or_missing(value: u32) -> Value {
    if value == 0 {
        Value::from(MISSING)
    } else {
        Value::from(value)
    }
}
