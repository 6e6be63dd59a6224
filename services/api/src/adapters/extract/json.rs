//! services/api/src/adapters/extract/json.rs
//!
//! JSON documents are parsed and written back out in a canonical compact form,
//! so the prompt always receives a string. Object keys come out sorted.

use doc_chat_core::{ExtractedText, ExtractionError, TextExtractor};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl TextExtractor for JsonExtractor {
    fn extract(&self, raw_bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let value: Value = serde_json::from_slice(raw_bytes)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;
        let text = serde_json::to_string(&canonicalize(value))
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;
        Ok(ExtractedText::new(text))
    }
}

/// Rebuilds every object with its keys in sorted order, whatever map type serde_json uses.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
