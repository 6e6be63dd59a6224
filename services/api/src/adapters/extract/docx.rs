//! services/api/src/adapters/extract/docx.rs
//!
//! Word documents are opened with `docx-rs`. Each body paragraph becomes one line,
//! and paragraphs are joined with `\n` in document order.

use doc_chat_core::{ExtractedText, ExtractionError, TextExtractor};
use docx_rs::{DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild};

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, raw_bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let docx = docx_rs::read_docx(raw_bytes)
            .map_err(|e| ExtractionError::CorruptDocument(e.to_string()))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
                _ => None,
            })
            .collect();

        Ok(ExtractedText::new(paragraphs.join("\n")))
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&mut text, &paragraph.children);
    text
}

/// Hyperlinks and tracked insertions wrap runs of their own; their text is part of the paragraph.
fn push_children(text: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(text, run),
            ParagraphChild::Hyperlink(link) => push_children(text, &link.children),
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        push_run(text, run);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(text: &mut String, run: &Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use docx_rs::{Docx, Hyperlink, HyperlinkType, Insert, Paragraph, Run};

    use super::*;

    fn pack(docx: Docx) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    fn build_docx(paragraphs: &[&[&str]]) -> Vec<u8> {
        let mut docx = Docx::new();
        for runs in paragraphs {
            let mut paragraph = Paragraph::new();
            for run in *runs {
                paragraph = paragraph.add_run(Run::new().add_text(*run));
            }
            docx = docx.add_paragraph(paragraph);
        }
        pack(docx)
    }

    #[test]
    fn paragraphs_are_joined_with_newlines() {
        let bytes = build_docx(&[&["A"], &["B"]]);
        let text = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(text.as_str(), "A\nB");
    }

    #[test]
    fn runs_within_a_paragraph_are_concatenated() {
        let bytes = build_docx(&[&["The sky ", "is blue."], &["Second"]]);
        let text = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(text.as_str(), "The sky is blue.\nSecond");
    }

    #[test]
    fn hyperlink_text_stays_in_its_paragraph() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("See "))
            .add_hyperlink(
                Hyperlink::new("https://example.com/docs", HyperlinkType::External)
                    .add_run(Run::new().add_text("the docs")),
            )
            .add_run(Run::new().add_text("."));
        let bytes = pack(Docx::new().add_paragraph(paragraph));

        let text = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(text.as_str(), "See the docs.");
    }

    #[test]
    fn inserted_runs_are_included() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Tracked "))
            .add_insert(Insert::new(Run::new().add_text("insertion")));
        let bytes = pack(Docx::new().add_paragraph(paragraph));

        let text = DocxExtractor.extract(&bytes).unwrap();
        assert_eq!(text.as_str(), "Tracked insertion");
    }

    #[test]
    fn non_zip_bytes_are_a_corrupt_document() {
        let result = DocxExtractor.extract(b"PK? not really");
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
    }
}
