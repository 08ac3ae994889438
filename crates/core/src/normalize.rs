use crate::error::IngestError;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    line_breaks: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            line_breaks: Regex::new(r"[\n\t\r]+")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn normalize(&self, raw: &str) -> String {
        let joined = self.line_breaks.replace_all(raw, " ");
        let collapsed = self.whitespace.replace_all(&joined, " ");
        collapsed.trim().to_string()
    }
}
