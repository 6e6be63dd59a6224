use std::io::Cursor;

use api_lib::adapters::default_dispatcher;
use doc_chat_core::{DispatchOutcome, DocumentFormat, ExtractionError, UploadedDocument};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A PDF with one line of text per page, set in a base-14 font.
fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
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
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
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

fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

fn extracted(outcome: DispatchOutcome) -> (DocumentFormat, String) {
    match outcome {
        DispatchOutcome::Extracted { format, text } => (format, text.into_inner()),
        DispatchOutcome::Unsupported { extension } => {
            panic!("expected extraction, got unsupported extension {extension:?}")
        }
    }
}

#[test]
fn pdf_text_is_extracted() {
    let outcome = default_dispatcher()
        .dispatch("hello.pdf", &pdf_with_pages(&["Hello"]))
        .unwrap();

    let (format, text) = extracted(outcome);
    assert_eq!(format, DocumentFormat::Pdf);
    assert_eq!(text, "Hello");
}

#[test]
fn pdf_pages_are_concatenated_without_separator() {
    let outcome = default_dispatcher()
        .dispatch("two-pages.pdf", &pdf_with_pages(&["A", "B"]))
        .unwrap();

    let (_, text) = extracted(outcome);
    assert_eq!(text, "AB");
}

#[test]
fn docx_paragraphs_are_extracted_in_order() {
    let bytes = docx_with_paragraphs(&["The sky is blue.", "Grass is green."]);

    let outcome = default_dispatcher().dispatch("facts.DOCX", &bytes).unwrap();

    let (format, text) = extracted(outcome);
    assert_eq!(format, DocumentFormat::Docx);
    assert_eq!(text, "The sky is blue.\nGrass is green.");
}

#[test]
fn every_supported_format_has_an_extractor() {
    let dispatcher = default_dispatcher();
    let fixtures: Vec<(&str, Vec<u8>)> = vec![
        ("a.txt", b"plain".to_vec()),
        ("a.json", br#"{"k":"v"}"#.to_vec()),
        ("a.pdf", pdf_with_pages(&["Hi"])),
        ("a.docx", docx_with_paragraphs(&["Hi"])),
    ];

    for (name, bytes) in fixtures {
        let outcome = dispatcher.dispatch(name, &bytes).unwrap();
        assert!(outcome.is_supported(), "{name} should be supported");
    }
}

#[test]
fn unknown_extensions_are_reported_not_failed() {
    let dispatcher = default_dispatcher();

    for (name, expected) in [("deck.pptx", "pptx"), ("README", ""), ("archive.tar.gz", "gz")] {
        match dispatcher.dispatch(name, b"irrelevant").unwrap() {
            DispatchOutcome::Unsupported { extension } => assert_eq!(extension, expected),
            other => panic!("{name} should be unsupported, got {other:?}"),
        }
    }
}

#[test]
fn load_pairs_the_document_name_with_its_text() {
    let upload = UploadedDocument::new("notes.txt", b"Remember the milk".to_vec());

    let loaded = default_dispatcher().load(&upload).unwrap().unwrap();

    assert_eq!(loaded.name, "notes.txt");
    assert_eq!(loaded.format, DocumentFormat::Txt);
    assert_eq!(loaded.text.as_str(), "Remember the milk");
}

#[test]
fn a_pdf_named_as_docx_fails_extraction() {
    let result = default_dispatcher().dispatch("report.docx", &pdf_with_pages(&["Hello"]));

    assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
}
