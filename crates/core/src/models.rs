use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_AUTHOR: &str = "Admin";

/// Provenance attached to a page by the loader. Absent fields fall back to
/// empty strings and zeroes when the page becomes a [`StructuredRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMetadata {
    pub source: Option<String>,
    pub file_path: Option<String>,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawPage {
    pub content: String,
    pub metadata: PageMetadata,
}

/// Caller-supplied tags that classify every page of one source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub board: String,
    pub language: String,
    pub class: String,
    pub subject: String,
    pub subject_part: u32,
    pub author: String,
    pub tags: Option<Vec<String>>,
}

impl Classification {
    pub fn new(
        board: impl Into<String>,
        language: impl Into<String>,
        class: impl Into<String>,
        subject: impl Into<String>,
        subject_part: u32,
    ) -> Self {
        Self {
            board: board.into(),
            language: language.into(),
            class: class.into(),
            subject: subject.into(),
            subject_part,
            author: DEFAULT_AUTHOR.to_string(),
            tags: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = if tags.is_empty() { None } else { Some(tags) };
        self
    }

    pub fn uppercased(&self) -> Self {
        Self {
            board: self.board.to_uppercase(),
            language: self.language.to_uppercase(),
            class: self.class.to_uppercase(),
            subject: self.subject.to_uppercase(),
            subject_part: self.subject_part,
            author: self.author.to_uppercase(),
            tags: self
                .tags
                .as_ref()
                .filter(|tags| !tags.is_empty())
                .map(|tags| tags.iter().map(|tag| tag.to_uppercase()).collect()),
        }
    }

    /// `{board}_{language}_{class}_{subject}_{subject_part}`, the shared prefix of
    /// every vector id produced for this classification.
    pub fn id_prefix(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.board, self.language, self.class, self.subject, self.subject_part
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredRecord {
    pub source: String,
    pub file_path: String,
    pub board: String,
    pub language: String,
    pub class: String,
    pub subject: String,
    pub subject_part: u32,
    pub author: String,
    pub tags: Option<Vec<String>>,
    pub page: u32,
    pub total_pages: u32,
    pub content: String,
    pub date: String,
    pub time: String,
}

impl StructuredRecord {
    pub fn id_prefix(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.board, self.language, self.class, self.subject, self.subject_part
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// Result of a write stage. A missing collection or index is an expected
/// operational state and is reported here instead of as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WriteOutcome {
    Written { count: usize },
    StoreUnavailable { name: String },
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }

    pub fn count(&self) -> usize {
        match self {
            WriteOutcome::Written { count } => *count,
            WriteOutcome::StoreUnavailable { .. } => 0,
        }
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Written { count } => write!(f, "written ({count})"),
            WriteOutcome::StoreUnavailable { name } => write!(f, "skipped ({name} not found)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub file_path: PathBuf,
    pub collection: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngestionStage {
    Start,
    Loaded,
    Preprocessed,
    DocStored,
    VectorStored,
    Done,
    Failed,
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestionStage::Start => "START",
            IngestionStage::Loaded => "LOADED",
            IngestionStage::Preprocessed => "PREPROCESSED",
            IngestionStage::DocStored => "DOC_STORED",
            IngestionStage::VectorStored => "VECTOR_STORED",
            IngestionStage::Done => "DONE",
            IngestionStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub collection: String,
    pub namespace: String,
    pub pages_loaded: usize,
    pub documents: WriteOutcome,
    pub vectors: WriteOutcome,
}
