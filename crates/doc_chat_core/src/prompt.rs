//! crates/doc_chat_core/src/prompt.rs
//!
//! Serializes the document, the conversation so far and the new question into
//! the single prompt string sent to the generation service.
//!
//! No token counting happens here. A prompt larger than the model's context
//! window is only noticed when the upstream service rejects or truncates it.

use std::fmt::Write;
use std::sync::Arc;

use crate::domain::{ConversationTurn, Prompt};

const DOCUMENT_LABEL: &str = "Document content: ";
const USER_LABEL: &str = "User: ";
const BOT_LABEL: &str = "Chatbot:";

/// Decides which history turns make it into the prompt.
///
/// Policies only narrow what is sent; the conversation store is never modified.
pub trait TruncationPolicy: Send + Sync {
    fn select_turns<'a>(
        &self,
        document_text: &str,
        history: &'a [ConversationTurn],
        current_input: &str,
    ) -> &'a [ConversationTurn];
}

/// Sends the whole history, however long.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTruncation;

impl TruncationPolicy for NoTruncation {
    fn select_turns<'a>(
        &self,
        _document_text: &str,
        history: &'a [ConversationTurn],
        _current_input: &str,
    ) -> &'a [ConversationTurn] {
        history
    }
}

/// Keeps only the most recent `max_turns` turns.
#[derive(Debug, Clone, Copy)]
pub struct RecentTurns {
    pub max_turns: usize,
}

impl TruncationPolicy for RecentTurns {
    fn select_turns<'a>(
        &self,
        _document_text: &str,
        history: &'a [ConversationTurn],
        _current_input: &str,
    ) -> &'a [ConversationTurn] {
        let skip = history.len().saturating_sub(self.max_turns);
        &history[skip..]
    }
}

/// Builds prompts under a truncation policy.
#[derive(Clone)]
pub struct PromptAssembler {
    policy: Arc<dyn TruncationPolicy>,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(Arc::new(NoTruncation))
    }
}

impl PromptAssembler {
    pub fn new(policy: Arc<dyn TruncationPolicy>) -> Self {
        Self { policy }
    }

    pub fn assemble(
        &self,
        document_text: &str,
        history: &[ConversationTurn],
        current_input: &str,
    ) -> Prompt {
        let turns = self
            .policy
            .select_turns(document_text, history, current_input);
        assemble_prompt(document_text, turns, current_input)
    }
}

/// Concatenates the prompt in fixed order: document header, each turn, then the question.
pub fn assemble_prompt(
    document_text: &str,
    history: &[ConversationTurn],
    current_input: &str,
) -> Prompt {
    let mut prompt = String::with_capacity(
        document_text.len()
            + current_input.len()
            + history
                .iter()
                .map(|turn| turn.user.len() + turn.bot.len() + 24)
                .sum::<usize>()
            + 48,
    );

    // Writing into a String cannot fail.
    let _ = write!(prompt, "{DOCUMENT_LABEL}{document_text}\n\n");
    for turn in history {
        let _ = writeln!(prompt, "{USER_LABEL}{}", turn.user);
        let _ = writeln!(prompt, "{BOT_LABEL} {}", turn.bot);
    }
    let _ = write!(prompt, "{USER_LABEL}{current_input}\n{BOT_LABEL}");

    Prompt::new(prompt)
}
