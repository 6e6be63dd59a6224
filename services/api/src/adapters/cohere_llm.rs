//! services/api/src/adapters/cohere_llm.rs
//!
//! This module contains the adapter for Cohere's text generation endpoint.
//! It implements the `CompletionService` port from the `core` crate.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use doc_chat_core::{CompletionResult, CompletionService, GenerationSettings, PortError, PortResult, Prompt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const GENERATE_PATH: &str = "/v1/generate";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    k: u32,
    stop_sequences: &'a [String],
    return_likelihoods: &'static str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Deserialize, Debug)]
struct Generation {
    text: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using Cohere's generate API.
#[derive(Clone)]
pub struct CohereCompletionAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    settings: GenerationSettings,
    timeout: Duration,
}

impl fmt::Debug for CohereCompletionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereCompletionAdapter")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CohereCompletionAdapter {
    /// Creates a new `CohereCompletionAdapter` whose requests give up after `timeout`.
    ///
    /// A missing key is not rejected here; the upstream service reports it on the first call.
    pub fn new(api_key: Option<String>, model: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
            settings: GenerationSettings::default(),
            timeout,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn map_send_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout(self.timeout)
        } else {
            PortError::Upstream(error.to_string())
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for CohereCompletionAdapter {
    async fn complete(&self, prompt: &Prompt) -> PortResult<CompletionResult> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: prompt.as_str(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            k: self.settings.top_k,
            stop_sequences: &self.settings.stop_sequences,
            return_likelihoods: "NONE",
        };

        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "Cohere generate request was rejected");
            return Err(PortError::Upstream(format!("{status}: {detail}")));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| self.map_send_error(e))?;
        info!(
            model = %self.model,
            prompt_bytes = prompt.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cohere generate call finished"
        );

        parsed
            .generations
            .into_iter()
            .next()
            .map(|generation| CompletionResult::from_raw(&generation.text))
            .ok_or(PortError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_the_generate_wire_format() {
        let settings = GenerationSettings::default();
        let body = GenerateRequest {
            model: "command-xlarge-nightly",
            prompt: "Document content: D\n\nUser: Q\nChatbot:",
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            k: settings.top_k,
            stop_sequences: &settings.stop_sequences,
            return_likelihoods: "NONE",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "command-xlarge-nightly");
        assert_eq!(json["max_tokens"], 300);
        assert_eq!(json["k"], 0);
        assert_eq!(json["stop_sequences"], serde_json::json!(["\n"]));
        assert_eq!(json["return_likelihoods"], "NONE");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let adapter = CohereCompletionAdapter::new(
            Some("secret-key".to_string()),
            "command".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let debug = format!("{adapter:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
