//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{AskRequest, AskResponse, HistoryResponse, MessageResponse, TurnView, UploadResponse},
    qa_task::qa_process,
    render::render_transcript,
    state::{AppState, SessionState},
    upload_task::{extract_upload, read_upload},
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use doc_chat_core::{AskError, LoadedDocument, PortError, UNSUPPORTED_FORMAT_MESSAGE};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        create_session_handler,
        replace_document_handler,
        ask_handler,
        history_handler,
        reset_history_handler,
        transcript_handler,
        delete_session_handler,
    ),
    components(
        schemas(AskRequest, AskResponse, HistoryResponse, MessageResponse, TurnView, UploadResponse)
    ),
    tags(
        (name = "Document Chat API", description = "Upload a document and ask questions about its contents.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Helpers
//=========================================================================================

type ApiFailure = (StatusCode, Json<MessageResponse>);

fn failure(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (status, Json(MessageResponse::new(message)))
}

fn ask_failure(e: AskError) -> ApiFailure {
    let status = match &e {
        AskError::EmptyQuestion => StatusCode::BAD_REQUEST,
        AskError::NoDocument => StatusCode::CONFLICT,
        AskError::Upstream(PortError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AskError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    failure(status, e.to_string())
}

async fn find_session(
    app_state: &AppState,
    session_id: Uuid,
) -> Result<Arc<tokio::sync::Mutex<SessionState>>, ApiFailure> {
    app_state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("Session {} not found", session_id)))
}

/// Reads and extracts the uploaded file, turning soft and hard failures into responses.
async fn load_document(
    app_state: &AppState,
    multipart: &mut Multipart,
) -> Result<LoadedDocument, ApiFailure> {
    let upload = read_upload(multipart)
        .await
        .map_err(|message| failure(StatusCode::BAD_REQUEST, message))?;

    match extract_upload(app_state, upload).await {
        Ok(Some(document)) => Ok(document),
        Ok(None) => Err(failure(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UNSUPPORTED_FORMAT_MESSAGE,
        )),
        Err(e) => Err(failure(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running"))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}

/// Create a new chat session by uploading a document.
///
/// Accepts a multipart/form-data request whose first part is the file.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body(content_type = "multipart/form-data", description = "The document to upload (.txt, .json, .pdf or .docx)."),
    responses(
        (status = 201, description = "Session created successfully", body = UploadResponse),
        (status = 400, description = "Bad request (e.g., missing file)", body = MessageResponse),
        (status = 415, description = "Unsupported file format", body = MessageResponse),
        (status = 422, description = "The document could not be read", body = MessageResponse)
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiFailure> {
    let document = load_document(&app_state, &mut multipart).await?;

    let session_id = Uuid::new_v4();
    let response = UploadResponse::new(session_id, &document, 0);
    app_state
        .sessions
        .insert(SessionState::new(session_id, document))
        .await;
    info!(%session_id, document = %response.document_name, "Created chat session");

    Ok((StatusCode::CREATED, Json(response)))
}

/// Replace the document of an existing session.
#[utoipa::path(
    put,
    path = "/sessions/{session_id}/document",
    request_body(content_type = "multipart/form-data", description = "The new document."),
    responses(
        (status = 200, description = "Document replaced", body = UploadResponse),
        (status = 404, description = "Unknown session", body = MessageResponse),
        (status = 415, description = "Unsupported file format", body = MessageResponse),
        (status = 422, description = "The document could not be read", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn replace_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiFailure> {
    let session_lock = find_session(&app_state, session_id).await?;
    let document = load_document(&app_state, &mut multipart).await?;

    let mut session = session_lock.lock().await;
    session.touch();
    let response = UploadResponse::new(session_id, &document, 0);
    session.chat.replace_document(document, app_state.replace_policy());
    let turns = session.chat.history().len();
    info!(%session_id, turns, "Replaced session document");

    Ok(Json(UploadResponse { turns, ..response }))
}

/// Ask a question about the session's document.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer generated", body = AskResponse),
        (status = 400, description = "Empty question", body = MessageResponse),
        (status = 404, description = "Unknown session", body = MessageResponse),
        (status = 502, description = "The generation service failed", body = MessageResponse),
        (status = 504, description = "The generation service timed out", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiFailure> {
    let session_lock = find_session(&app_state, session_id).await?;

    let outcome = qa_process(&app_state, session_lock, &request.question)
        .await
        .map_err(ask_failure)?;

    Ok(Json(AskResponse {
        answer: outcome.answer.text,
        turns: outcome.turns,
    }))
}

/// Return the conversation so far, oldest turn first.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/history",
    responses(
        (status = 200, description = "Conversation history", body = HistoryResponse),
        (status = 404, description = "Unknown session", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiFailure> {
    let session_lock = find_session(&app_state, session_id).await?;
    let session = session_lock.lock().await;

    Ok(Json(HistoryResponse {
        session_id,
        created_at: session.created_at,
        last_accessed_at: session.last_accessed_at,
        document_name: session.chat.document().map(|d| d.name.clone()),
        turns: session.chat.history().all().iter().map(TurnView::from).collect(),
    }))
}

/// Clear the conversation while keeping the document.
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}/history",
    responses(
        (status = 204, description = "History cleared"),
        (status = 404, description = "Unknown session", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn reset_history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let session_lock = find_session(&app_state, session_id).await?;
    let mut session = session_lock.lock().await;
    session.touch();
    session.chat.reset_history();
    info!(%session_id, "Conversation history reset");
    Ok(StatusCode::NO_CONTENT)
}

/// Render the conversation as HTML.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/transcript",
    responses(
        (status = 200, description = "HTML transcript", content_type = "text/html"),
        (status = 404, description = "Unknown session", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn transcript_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Html<String>, ApiFailure> {
    let session_lock = find_session(&app_state, session_id).await?;
    let session = session_lock.lock().await;
    Ok(Html(render_transcript(
        session.chat.document().map(|d| d.name.as_str()),
        session.chat.history().all(),
    )))
}

/// End a session, discarding its document and conversation.
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session", body = MessageResponse)
    ),
    params(("session_id" = Uuid, Path, description = "The chat session."))
)]
pub async fn delete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    if !app_state.sessions.remove(session_id).await {
        return Err(failure(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        ));
    }
    info!(%session_id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}
