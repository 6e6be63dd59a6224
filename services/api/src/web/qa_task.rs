//! services/api/src/web/qa_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! handling a single question-and-answer cycle.

use crate::web::state::{AppState, SessionState};
use doc_chat_core::{AskError, CompletionResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Represents the outcome of a successful `qa_process` run.
#[derive(Debug, PartialEq, Eq)]
pub struct QaOutcome {
    pub answer: CompletionResult,
    /// Number of turns in the conversation, including the one just answered.
    pub turns: usize,
}

/// Answers one question against the session's document and history.
///
/// The session lock is held for the whole turn. A failed completion is logged and
/// returned to the caller; the turns recorded so far are left untouched.
pub async fn qa_process(
    app_state: &AppState,
    session_state_lock: Arc<Mutex<SessionState>>,
    question: &str,
) -> Result<QaOutcome, AskError> {
    let start_time = Instant::now();
    let mut session = session_state_lock.lock().await;
    session.touch();
    let session_id = session.session_id;
    info!(%session_id, turns = session.chat.history().len(), "QA process started.");

    let result = session
        .chat
        .ask(question, &app_state.assembler, app_state.completion.as_ref())
        .await;

    match result {
        Ok(answer) => {
            let turns = session.chat.history().len();
            info!(
                %session_id,
                answer_chars = answer.text.chars().count(),
                turns,
                "⏱️ QA process took: {:?}",
                start_time.elapsed()
            );
            Ok(QaOutcome { answer, turns })
        }
        Err(AskError::Upstream(e)) => {
            error!(%session_id, "Completion failed, conversation left unchanged: {}", e);
            Err(AskError::Upstream(e))
        }
        Err(e) => {
            warn!(%session_id, "Question rejected: {}", e);
            Err(e)
        }
    }
}
