//! crates/doc_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific file format libraries or generation APIs.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CompletionResult, ExtractedText, Prompt};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Failures of the external generation service.
///
/// Every variant belongs to the upstream family: none of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Upstream service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Upstream service returned no completion candidates")]
    EmptyCompletion,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures of a single format extractor.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Document is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("Document could not be parsed: {0}")]
    Parse(String),
    #[error("Document container is corrupt: {0}")]
    CorruptDocument(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Converts the raw bytes of one document format into plain text.
///
/// Implementations are pure: no I/O beyond reading `raw_bytes`.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, raw_bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends the prompt and returns the first candidate, trimmed.
    async fn complete(&self, prompt: &Prompt) -> PortResult<CompletionResult>;
}
