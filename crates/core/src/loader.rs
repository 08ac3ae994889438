use crate::error::IngestError;
use crate::models::{PageMetadata, RawPage};
use lopdf::Document;
use std::path::Path;
use tracing::info;

pub trait PdfLoader: Send + Sync {
    fn load_pdf(&self, path: &Path) -> Result<Vec<RawPage>, IngestError>;
}

#[derive(Debug, Default)]
pub struct LopdfLoader;

impl PdfLoader for LopdfLoader {
    fn load_pdf(&self, path: &Path) -> Result<Vec<RawPage>, IngestError> {
        let document = Document::load(path)
            .map_err(|error| IngestError::Load(format!("{}: {error}", path.display())))?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(IngestError::Load(format!(
                "pdf has no pages: {}",
                path.display()
            )));
        }

        let location = path.to_string_lossy().to_string();
        let total_pages = page_numbers.len() as u32;

        let pages = page_numbers
            .into_iter()
            .enumerate()
            .map(|(index, page_no)| {
                let content = document.extract_text(&[page_no]).map_err(|error| {
                    IngestError::Load(format!("{} page {page_no}: {error}", path.display()))
                })?;

                Ok(RawPage {
                    content,
                    metadata: PageMetadata {
                        source: Some(location.clone()),
                        file_path: Some(location.clone()),
                        page: Some(index as u32),
                        total_pages: Some(total_pages),
                    },
                })
            })
            .collect::<Result<Vec<_>, IngestError>>()?;

        info!(pages = pages.len(), path = %path.display(), "loaded pdf pages");
        Ok(pages)
    }
}
