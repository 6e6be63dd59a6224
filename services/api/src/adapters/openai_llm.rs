//! services/api/src/adapters/openai_llm.rs
//!
//! This module contains the adapter for an OpenAI-compatible chat model.
//! It implements the `CompletionService` port from the `core` crate.
//!
//! The assembled prompt is sent as a single user message. The chat API has no
//! top-k or likelihood options, so only the token limit, temperature and stop
//! sequences of `GenerationSettings` are forwarded.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use doc_chat_core::{CompletionResult, CompletionService, GenerationSettings, PortError, PortResult, Prompt};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    settings: GenerationSettings,
    timeout: Duration,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            settings: GenerationSettings::default(),
            timeout,
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, prompt: &Prompt) -> PortResult<CompletionResult> {
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.as_str())
                .build()
                .map_err(|e| PortError::Upstream(e.to_string()))?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
            .stop(self.settings.stop_sequences.clone())
            .n(1)
            .build()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        // Call the API under the configured deadline and map the error manually, which respects the orphan rule.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| PortError::Timeout(self.timeout))?
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        info!(model = %self.model, prompt_bytes = prompt.len(), "Chat completion call finished");

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(PortError::EmptyCompletion)?;

        Ok(CompletionResult::from_raw(&text))
    }
}
