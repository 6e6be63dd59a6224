//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server.

use chrono::{DateTime, Utc};
use doc_chat_core::{ConversationTurn, LoadedDocument};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: Documents are uploaded as multipart/form-data, not as part of these structs.
//=========================================================================================

/// A question about the session's document.
#[derive(Deserialize, Debug, ToSchema)]
pub struct AskRequest {
    pub question: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Sent after a document was uploaded and its text extracted.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub document_name: String,
    pub format: String,
    /// Number of characters in the extracted text.
    pub characters: usize,
    /// Number of turns still in the conversation after the upload.
    pub turns: usize,
}

impl UploadResponse {
    pub fn new(session_id: Uuid, document: &LoadedDocument, turns: usize) -> Self {
        Self {
            session_id,
            document_name: document.name.clone(),
            format: document.format.to_string(),
            characters: document.text.char_count(),
            turns,
        }
    }
}

/// A human-readable message, used for soft failures and errors alike.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct AskResponse {
    pub answer: String,
    pub turns: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct TurnView {
    pub user: String,
    pub bot: String,
}

impl From<&ConversationTurn> for TurnView {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            user: turn.user.clone(),
            bot: turn.bot.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub document_name: Option<String>,
    pub turns: Vec<TurnView>,
}
