//! crates/doc_chat_core/src/extraction.rs
//!
//! Routes an uploaded file to the extractor registered for its extension.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{file_extension, DocumentFormat, ExtractedText, LoadedDocument, UploadedDocument};
use crate::ports::{ExtractionError, TextExtractor};

/// The message shown to the user when a file type is not supported.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported file format.";

/// Result of routing a file through the dispatcher.
///
/// An unsupported extension is a normal outcome, not an error, so callers can
/// show a message instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Extracted {
        format: DocumentFormat,
        text: ExtractedText,
    },
    Unsupported {
        extension: String,
    },
}

impl DispatchOutcome {
    pub fn is_supported(&self) -> bool {
        matches!(self, DispatchOutcome::Extracted { .. })
    }
}

/// Holds one extractor per supported format.
#[derive(Clone, Default)]
pub struct ExtractionDispatcher {
    extractors: HashMap<DocumentFormat, Arc<dyn TextExtractor>>,
}

impl ExtractionDispatcher {
    pub fn new(extractors: Vec<(DocumentFormat, Arc<dyn TextExtractor>)>) -> Self {
        Self {
            extractors: extractors.into_iter().collect(),
        }
    }

    pub fn register(mut self, format: DocumentFormat, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors.insert(format, extractor);
        self
    }

    /// Extracts the text of `raw_bytes`, choosing the extractor from `file_name`'s extension.
    ///
    /// Extractor failures propagate; an unknown or unregistered extension does not.
    pub fn dispatch(
        &self,
        file_name: &str,
        raw_bytes: &[u8],
    ) -> Result<DispatchOutcome, ExtractionError> {
        let extension = file_extension(file_name);
        let registered = DocumentFormat::from_extension(extension)
            .and_then(|format| self.extractors.get(&format).map(|e| (format, e)));

        match registered {
            Some((format, extractor)) => {
                let text = extractor.extract(raw_bytes)?;
                Ok(DispatchOutcome::Extracted { format, text })
            }
            None => Ok(DispatchOutcome::Unsupported {
                extension: extension.to_string(),
            }),
        }
    }

    /// Dispatches an uploaded document and, on success, pairs the text with its name.
    pub fn load(&self, document: &UploadedDocument) -> Result<Option<LoadedDocument>, ExtractionError> {
        match self.dispatch(&document.name, &document.raw_bytes)? {
            DispatchOutcome::Extracted { format, text } => Ok(Some(LoadedDocument {
                name: document.name.clone(),
                format,
                text,
            })),
            DispatchOutcome::Unsupported { .. } => Ok(None),
        }
    }
}
