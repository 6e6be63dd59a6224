//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which generation backend answers questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionProvider {
    Cohere,
    OpenAi,
}

impl CompletionProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            CompletionProvider::Cohere => "command-xlarge-nightly",
            CompletionProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

impl FromStr for CompletionProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cohere" => Ok(CompletionProvider::Cohere),
            "openai" => Ok(CompletionProvider::OpenAi),
            other => Err(format!("'{}' is not a known provider (cohere, openai)", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub provider: CompletionProvider,
    pub cohere_api_key: Option<String>,
    pub cohere_base_url: String,
    pub openai_api_key: Option<String>,
    pub completion_model: String,
    pub request_timeout: Duration,
    /// `None` sends the whole history with every question.
    pub history_turn_limit: Option<usize>,
    pub reset_history_on_upload: bool,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped. `None` keeps them until deleted.
    pub session_idle_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server Settings ---
        let default_bind = "0.0.0.0:3000".parse().ok();
        let bind_address = parse_or::<SocketAddr, _>("BIND_ADDRESS", &lookup, default_bind)?
            .ok_or_else(|| ConfigError::MissingVar("BIND_ADDRESS".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Completion Backend Settings ---
        let provider = match lookup("COMPLETION_PROVIDER") {
            Some(value) => value
                .parse::<CompletionProvider>()
                .map_err(|e| ConfigError::InvalidValue("COMPLETION_PROVIDER".to_string(), e))?,
            None => CompletionProvider::Cohere,
        };

        // API keys stay optional; a missing key surfaces on the first completion call.
        let cohere_api_key = lookup("COHERE_API_KEY").filter(|key| !key.is_empty());
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());
        let cohere_base_url = lookup("COHERE_BASE_URL")
            .unwrap_or_else(|| crate::adapters::cohere_llm::DEFAULT_BASE_URL.to_string());
        let completion_model =
            lookup("COMPLETION_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs =
            parse_or::<u64, _>("REQUEST_TIMEOUT_SECS", &lookup, Some(60))?.unwrap_or(60);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        // --- Load Conversation Settings ---
        let history_turn_limit = parse_or::<usize, _>("HISTORY_TURN_LIMIT", &lookup, None)?;
        let reset_history_on_upload =
            parse_or::<bool, _>("RESET_HISTORY_ON_UPLOAD", &lookup, Some(true))?.unwrap_or(true);
        let max_upload_bytes = parse_or::<usize, _>("MAX_UPLOAD_BYTES", &lookup, None)?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        // 0 turns eviction off.
        let session_idle_timeout =
            parse_or::<u64, _>("SESSION_IDLE_TIMEOUT_SECS", &lookup, Some(DEFAULT_SESSION_IDLE_SECS))?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs);

        Ok(Self {
            bind_address,
            log_level,
            provider,
            cohere_api_key,
            cohere_base_url,
            openai_api_key,
            completion_model,
            request_timeout: Duration::from_secs(timeout_secs),
            history_turn_limit,
            reset_history_on_upload,
            max_upload_bytes,
            session_idle_timeout,
        })
    }

    /// The API key for the selected provider, if one was configured.
    pub fn provider_api_key(&self) -> Option<&str> {
        match self.provider {
            CompletionProvider::Cohere => self.cohere_api_key.as_deref(),
            CompletionProvider::OpenAi => self.openai_api_key.as_deref(),
        }
    }
}

/// Parses `name` when it is set, falling back to `default` when it is not.
fn parse_or<T, F>(name: &str, lookup: &F, default: Option<T>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}
