use crate::StoreError;
use reqwest::StatusCode;

pub mod opensearch;
pub mod pinecone;

pub use opensearch::OpenSearchDocumentStore;
pub use pinecone::{PineconeIndex, DEFAULT_CONTROLLER_URL};

// 200 means the target exists, 404 that it does not. Anything else is a backend failure.
pub(crate) fn exists_from_status(
    backend: &str,
    target: &str,
    status: StatusCode,
) -> Result<bool, StoreError> {
    match status {
        StatusCode::OK => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        status => Err(StoreError::BackendResponse {
            backend: backend.to_string(),
            details: format!("lookup of {target} returned {status}"),
        }),
    }
}
