//! crates/doc_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any web framework, HTTP client or file format library.

use std::fmt;

/// The document formats the extraction pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Txt,
    Json,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Txt,
        DocumentFormat::Json,
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
    ];

    /// Matches an extension (without the leading dot), ignoring ASCII case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| extension.eq_ignore_ascii_case(format.extension()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Txt => "txt",
            DocumentFormat::Json => "json",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returns everything after the final `.` of a file name, or `""` when there is none.
pub fn file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or("")
}

/// A file as it was received from the user.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub raw_bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, raw_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            raw_bytes: raw_bytes.into(),
        }
    }

    pub fn extension(&self) -> &str {
        file_extension(&self.name)
    }
}

/// Plain text derived from exactly one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document whose text has been extracted and is ready to be asked about.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub format: DocumentFormat,
    pub text: ExtractedText,
}

/// Represents a single question-and-answer exchange within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// The single string sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The first generated candidate, with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
}

impl CompletionResult {
    pub fn from_raw(raw: &str) -> Self {
        Self {
            text: raw.trim().to_string(),
        }
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    /// `0` leaves top-k sampling disabled.
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 300,
            temperature: 0.7,
            top_k: 0,
            stop_sequences: vec!["\n".to_string()],
        }
    }
}
