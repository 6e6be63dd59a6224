//! crates/doc_chat_core/src/session.rs
//!
//! One user's chat: the loaded document and the conversation about it.

use crate::conversation::ConversationHistory;
use crate::domain::{CompletionResult, ConversationTurn, LoadedDocument, Prompt};
use crate::ports::{CompletionService, PortError};
use crate::prompt::PromptAssembler;

/// Why a question could not be answered.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("No document has been loaded")]
    NoDocument,
    #[error(transparent)]
    Upstream(#[from] PortError),
}

/// What happens to the history when a new document replaces the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacePolicy {
    ResetHistory,
    KeepHistory,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    document: Option<LoadedDocument>,
    history: ConversationHistory,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: LoadedDocument) -> Self {
        Self {
            document: Some(document),
            history: ConversationHistory::new(),
        }
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Swaps in a new document, returning the previous one.
    pub fn replace_document(
        &mut self,
        document: LoadedDocument,
        policy: ReplacePolicy,
    ) -> Option<LoadedDocument> {
        if policy == ReplacePolicy::ResetHistory {
            self.history.clear();
        }
        self.document.replace(document)
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Builds the prompt the next question would be sent with.
    pub fn prompt_for(&self, assembler: &PromptAssembler, question: &str) -> Result<Prompt, AskError> {
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }
        let document = self.document.as_ref().ok_or(AskError::NoDocument)?;
        Ok(assembler.assemble(document.text.as_str(), self.history.all(), question))
    }

    /// Answers `question` and records the turn.
    ///
    /// The history is only appended to after the completion succeeded; any
    /// failure leaves it exactly as it was.
    pub async fn ask(
        &mut self,
        question: &str,
        assembler: &PromptAssembler,
        completion: &dyn CompletionService,
    ) -> Result<CompletionResult, AskError> {
        let prompt = self.prompt_for(assembler, question)?;
        let result = completion.complete(&prompt).await?;
        self.history
            .append(ConversationTurn::new(question, result.text.clone()));
        Ok(result)
    }
}
