pub mod protocol;
pub mod qa_task;
pub mod render;
pub mod rest;
pub mod state;
pub mod upload_task;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{
    ask_handler, create_session_handler, delete_session_handler, health_handler, history_handler,
    replace_document_handler, reset_history_handler, transcript_handler,
};
use state::AppState;

/// Builds the API router. The Swagger UI is merged in by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{session_id}", delete(delete_session_handler))
        .route("/sessions/{session_id}/document", put(replace_document_handler))
        .route("/sessions/{session_id}/ask", post(ask_handler))
        .route(
            "/sessions/{session_id}/history",
            get(history_handler).delete(reset_history_handler),
        )
        .route("/sessions/{session_id}/transcript", get(transcript_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
