use crate::clock::{date_stamp, time_stamp, Clock};
use crate::error::IngestError;
use crate::models::{Classification, RawPage, StructuredRecord};
use crate::normalize::TextNormalizer;
use std::sync::Arc;
use tracing::info;

/// Turns loaded pages into structured records, one record per page, in page order.
pub struct RecordBuilder {
    normalizer: TextNormalizer,
    clock: Arc<dyn Clock>,
}

impl RecordBuilder {
    pub fn new(clock: Arc<dyn Clock>) -> Result<Self, IngestError> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
            clock,
        })
    }

    pub fn build(&self, pages: &[RawPage], classification: &Classification) -> Vec<StructuredRecord> {
        let records: Vec<StructuredRecord> = pages
            .iter()
            .map(|page| {
                let now = self.clock.now();
                StructuredRecord {
                    source: page.metadata.source.clone().unwrap_or_default(),
                    file_path: page.metadata.file_path.clone().unwrap_or_default(),
                    board: classification.board.clone(),
                    language: classification.language.clone(),
                    class: classification.class.clone(),
                    subject: classification.subject.clone(),
                    subject_part: classification.subject_part,
                    author: classification.author.clone(),
                    tags: classification.tags.clone(),
                    page: page.metadata.page.unwrap_or(0),
                    total_pages: page.metadata.total_pages.unwrap_or(0),
                    content: self.normalizer.normalize(&page.content),
                    date: date_stamp(&now),
                    time: time_stamp(&now),
                }
            })
            .collect();

        info!(records = records.len(), "preprocessed pages into structured records");
        records
    }
}
