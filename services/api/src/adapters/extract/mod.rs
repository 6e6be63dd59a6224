//! services/api/src/adapters/extract/mod.rs
//!
//! Concrete `TextExtractor` implementations, one per supported document format.

pub mod docx;
pub mod json;
pub mod pdf;
pub mod txt;

use std::sync::Arc;

use doc_chat_core::{DocumentFormat, ExtractionDispatcher, TextExtractor};

pub use docx::DocxExtractor;
pub use json::JsonExtractor;
pub use pdf::PdfExtractor;
pub use txt::PlainTextExtractor;

/// Builds a dispatcher with an extractor registered for every supported format.
pub fn default_dispatcher() -> ExtractionDispatcher {
    let extractors: Vec<(DocumentFormat, Arc<dyn TextExtractor>)> = vec![
        (DocumentFormat::Txt, Arc::new(PlainTextExtractor)),
        (DocumentFormat::Json, Arc::new(JsonExtractor)),
        (DocumentFormat::Pdf, Arc::new(PdfExtractor)),
        (DocumentFormat::Docx, Arc::new(DocxExtractor)),
    ];
    ExtractionDispatcher::new(extractors)
}
