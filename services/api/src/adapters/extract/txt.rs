//! services/api/src/adapters/extract/txt.rs
//!
//! Plain text documents are decoded as UTF-8, verbatim.

use doc_chat_core::{ExtractedText, ExtractionError, TextExtractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, raw_bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let text = String::from_utf8(raw_bytes.to_vec())?;
        Ok(ExtractedText::new(text))
    }
}
