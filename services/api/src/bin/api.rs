//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{default_dispatcher, CohereCompletionAdapter, OpenAiCompletionAdapter},
    config::{CompletionProvider, Config},
    error::ApiError,
    web::{
        rest::ApiDoc,
        router,
        state::{spawn_idle_sweeper, AppState},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use doc_chat_core::CompletionService;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Completion Backend ---
    if config.provider_api_key().is_none() {
        warn!(
            provider = ?config.provider,
            "No API key configured; completion calls will fail with an authentication error"
        );
    }

    let completion: Arc<dyn CompletionService> = match config.provider {
        CompletionProvider::Cohere => Arc::new(
            CohereCompletionAdapter::new(
                config.cohere_api_key.clone(),
                config.completion_model.clone(),
                config.request_timeout,
            )?
            .with_base_url(config.cohere_base_url.clone()),
        ),
        CompletionProvider::OpenAi => {
            let openai_config =
                OpenAIConfig::new().with_api_key(config.openai_api_key.clone().unwrap_or_default());
            Arc::new(OpenAiCompletionAdapter::new(
                Client::with_config(openai_config),
                config.completion_model.clone(),
                config.request_timeout,
            ))
        }
    };
    info!(
        provider = ?config.provider,
        model = %config.completion_model,
        timeout = ?config.request_timeout,
        history_turn_limit = ?config.history_turn_limit,
        "Completion backend ready."
    );

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), default_dispatcher(), completion));
    if let Some(max_idle) = config.session_idle_timeout {
        spawn_idle_sweeper(app_state.sessions.clone(), max_idle);
        info!(?max_idle, "Idle session eviction enabled.");
    }

    // --- 4. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
