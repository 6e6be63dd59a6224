//! services/api/src/adapters/extract/pdf.rs
//!
//! PDF documents are read page by page with `pdf-extract`, and the page texts are
//! concatenated in page order without any separator.

use std::panic;

use doc_chat_core::{ExtractedText, ExtractionError, TextExtractor};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, raw_bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(raw_bytes))
            .map_err(|_| {
                warn!("PDF parser panicked while reading the document");
                ExtractionError::CorruptDocument("PDF parser failed on this document".to_string())
            })?
            .map_err(|e| ExtractionError::CorruptDocument(e.to_string()))?;

        debug!(pages = pages.len(), "Extracted text from PDF pages");
        Ok(ExtractedText::new(concat_pages(pages)))
    }
}

/// Joins page texts in order. Pages without text contribute nothing.
///
/// pdf-extract frames every page with line breaks of its own; those are dropped
/// so that only the text on the page remains.
pub fn concat_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages
        .into_iter()
        .map(|page| page.trim_matches(|c: char| c == '\n' || c == '\r').to_string())
        .collect()
}

#[cfg(test)]
mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// A PDF with one line of Courier text per page.
    pub fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
