//! In-memory doubles for the pipeline boundaries.

use crate::clock::Clock;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::loader::PdfLoader;
use crate::models::{PageMetadata, RawPage, StructuredRecord, VectorRecord};
use crate::traits::{DocumentStore, VectorIndex};
use crate::{EmbeddingError, StoreError};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) fn page(content: &str, index: u32, total: u32) -> RawPage {
    RawPage {
        content: content.to_string(),
        metadata: PageMetadata {
            source: Some("/books/math.pdf".to_string()),
            file_path: Some("/books/math.pdf".to_string()),
            page: Some(index),
            total_pages: Some(total),
        },
    }
}

pub(crate) fn record(board: &str, page: u32, content: &str) -> StructuredRecord {
    StructuredRecord {
        source: "/books/math.pdf".to_string(),
        file_path: "/books/math.pdf".to_string(),
        board: board.to_string(),
        language: "ENGLISH".to_string(),
        class: "5".to_string(),
        subject: "MATH".to_string(),
        subject_part: 1,
        author: "ADMIN".to_string(),
        tags: None,
        page,
        total_pages: 10,
        content: content.to_string(),
        date: "2024-06-01".to_string(),
        time: "08:00:00".to_string(),
    }
}

/// Starts at 2024-06-01 09:00:00 and moves one second forward on every read.
pub(crate) struct SteppingClock {
    next: Mutex<NaiveDateTime>,
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid start time");
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let mut next = self.next.lock().expect("clock lock");
        let current = *next;
        *next = current + Duration::seconds(1);
        current
    }
}

pub(crate) struct StaticLoader {
    pages: Vec<RawPage>,
    calls: AtomicUsize,
}

impl StaticLoader {
    pub(crate) fn with_pages(count: u32) -> Self {
        Self {
            pages: (0..count)
                .map(|index| page(&format!("Page {index}\n\ntext\twith  gaps"), index, count))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PdfLoader for StaticLoader {
    fn load_pdf(&self, path: &Path) -> Result<Vec<RawPage>, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.pages.is_empty() {
            return Err(IngestError::Load(format!("pdf has no pages: {}", path.display())));
        }
        Ok(self.pages.clone())
    }
}

#[derive(Default)]
pub(crate) struct RecordingDocumentStore {
    collections: HashSet<String>,
    documents: Mutex<HashMap<String, Vec<StructuredRecord>>>,
    inserts: AtomicUsize,
    fail_inserts: bool,
}

impl RecordingDocumentStore {
    pub(crate) fn without_collections() -> Self {
        Self::default()
    }

    pub(crate) fn with_collections(names: &[&str]) -> Self {
        Self {
            collections: names.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub(crate) fn documents(&self, collection: &str) -> Vec<StructuredRecord> {
        self.documents
            .lock()
            .expect("documents lock")
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.collections.contains(collection))
    }

    async fn insert_many(
        &self,
        collection: &str,
        records: &[StructuredRecord],
    ) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(StoreError::Request("connection refused".to_string()));
        }
        self.documents
            .lock()
            .expect("documents lock")
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpsertCall {
    pub(crate) index: String,
    pub(crate) namespace: String,
    pub(crate) vectors: Vec<VectorRecord>,
}

#[derive(Default)]
pub(crate) struct RecordingVectorIndex {
    indexes: HashSet<String>,
    upserts: Mutex<Vec<UpsertCall>>,
    fail_upserts: bool,
}

impl RecordingVectorIndex {
    pub(crate) fn without_indexes() -> Self {
        Self::default()
    }

    pub(crate) fn with_indexes(names: &[&str]) -> Self {
        Self {
            indexes: names.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    pub(crate) fn upsert_calls(&self) -> Vec<UpsertCall> {
        self.upserts.lock().expect("upserts lock").clone()
    }
}

#[async_trait]
impl VectorIndex for RecordingVectorIndex {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self.indexes.contains(index))
    }

    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        vectors: &[VectorRecord],
    ) -> Result<(), StoreError> {
        if self.fail_upserts {
            return Err(StoreError::BackendResponse {
                backend: "fake".to_string(),
                details: "503 Service Unavailable".to_string(),
            });
        }
        self.upserts.lock().expect("upserts lock").push(UpsertCall {
            index: index.to_string(),
            namespace: namespace.to_string(),
            vectors: vectors.to_vec(),
        });
        Ok(())
    }
}

/// Returns `[chars in text, 1.0]` and remembers what it was asked to embed.
#[derive(Default)]
pub(crate) struct CountingEmbedder {
    texts: Mutex<Vec<String>>,
    fail_after: Option<usize>,
}

impl CountingEmbedder {
    /// Succeeds `successes` times, then fails every call.
    pub(crate) fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.texts.lock().expect("texts lock").len()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("texts lock").clone()
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut texts = self.texts.lock().expect("texts lock");
        texts.push(text.to_string());
        if self.fail_after.is_some_and(|successes| texts.len() > successes) {
            return Err(EmbeddingError::Malformed("model unavailable".to_string()));
        }
        Ok(vec![text.chars().count() as f32, 1.0])
    }
}
