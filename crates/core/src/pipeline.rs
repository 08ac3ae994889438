use crate::clock::Clock;
use crate::document_writer::DocumentStoreWriter;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::loader::PdfLoader;
use crate::models::{IngestionReport, IngestionRequest, IngestionStage};
use crate::records::RecordBuilder;
use crate::traits::{DocumentStore, VectorIndex};
use crate::vector_writer::VectorStoreWriter;
use std::sync::Arc;
use tracing::{error, info};

/// Stages run strictly in sequence. A failure stops the run where it happened; earlier
/// writes are left in place, so a vector failure can leave the document store ahead
/// of the index.
pub struct IngestionPipeline<L, D, V, E>
where
    L: PdfLoader,
    D: DocumentStore,
    V: VectorIndex,
    E: Embedder,
{
    loader: L,
    records: RecordBuilder,
    documents: DocumentStoreWriter<D>,
    vectors: VectorStoreWriter<V>,
    embedder: E,
}

impl<L, D, V, E> IngestionPipeline<L, D, V, E>
where
    L: PdfLoader,
    D: DocumentStore,
    V: VectorIndex,
    E: Embedder,
{
    pub fn new(
        loader: L,
        document_store: D,
        vector_index: V,
        index_name: impl Into<String>,
        embedder: E,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            loader,
            records: RecordBuilder::new(clock.clone())?,
            documents: DocumentStoreWriter::new(document_store),
            vectors: VectorStoreWriter::new(vector_index, index_name, clock),
            embedder,
        })
    }

    pub fn document_writer(&self) -> &DocumentStoreWriter<D> {
        &self.documents
    }

    pub fn vector_writer(&self) -> &VectorStoreWriter<V> {
        &self.vectors
    }

    pub async fn ingest(&self, request: IngestionRequest) -> Result<IngestionReport, IngestError> {
        let collection = request.collection.to_uppercase();
        let classification = request.classification.uppercased();
        let file = request.file_path.display().to_string();

        info!(
            file = %file,
            collection = %collection,
            classification = %classification.id_prefix(),
            "starting data ingestion"
        );

        let mut stage = IngestionStage::Start;
        let result = async {
            validate_collection(&collection)?;

            let pages = self.loader.load_pdf(&request.file_path)?;
            stage = advance(stage, IngestionStage::Loaded);

            let records = self.records.build(&pages, &classification);
            stage = advance(stage, IngestionStage::Preprocessed);

            let documents = self.documents.upload(&records, &collection).await?;
            stage = advance(stage, IngestionStage::DocStored);

            let namespace = collection.clone();
            let vectors = self
                .vectors
                .store(&records, &namespace, &self.embedder)
                .await?;
            stage = advance(stage, IngestionStage::VectorStored);

            Ok::<_, IngestError>(IngestionReport {
                collection: collection.clone(),
                namespace,
                pages_loaded: pages.len(),
                documents,
                vectors,
            })
        }
        .await;

        match result {
            Ok(report) => {
                advance(stage, IngestionStage::Done);
                info!(
                    file = %file,
                    documents = %report.documents,
                    vectors = %report.vectors,
                    "data ingestion completed"
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    file = %file,
                    last_stage = %stage,
                    stage = %IngestionStage::Failed,
                    error = %err,
                    "data ingestion failed"
                );
                Err(err)
            }
        }
    }
}

// Collections become OpenSearch index names and URL path segments.
const FORBIDDEN_COLLECTION_CHARS: &[char] =
    &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

fn validate_collection(collection: &str) -> Result<(), IngestError> {
    if collection.trim().is_empty() {
        return Err(IngestError::InvalidArgument(
            "collection name must not be empty".to_string(),
        ));
    }

    if let Some(bad) = collection
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_COLLECTION_CHARS.contains(c))
    {
        return Err(IngestError::InvalidArgument(format!(
            "collection name {collection:?} contains {bad:?}"
        )));
    }

    Ok(())
}

fn advance(from: IngestionStage, to: IngestionStage) -> IngestionStage {
    info!(from = %from, to = %to, "ingestion stage");
    to
}
