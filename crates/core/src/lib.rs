pub mod clock;
pub mod document_writer;
pub mod embeddings;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod stores;
pub mod traits;
pub mod vector_writer;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, SystemClock};
pub use document_writer::DocumentStoreWriter;
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, HuggingFaceEmbedder, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_HF_ENDPOINT, DEFAULT_HF_MODEL,
};
pub use error::{EmbeddingError, IngestError, StoreError};
pub use loader::{LopdfLoader, PdfLoader};
pub use models::{
    Classification, IngestionReport, IngestionRequest, IngestionStage, PageMetadata, RawPage,
    StructuredRecord, VectorRecord, WriteOutcome, DEFAULT_AUTHOR,
};
pub use normalize::TextNormalizer;
pub use pipeline::IngestionPipeline;
pub use records::RecordBuilder;
pub use stores::{OpenSearchDocumentStore, PineconeIndex, DEFAULT_CONTROLLER_URL};
pub use traits::{DocumentStore, VectorIndex};
pub use vector_writer::{vector_id, vector_metadata, VectorStoreWriter};
