//! HTTP request handlers

use super::types::{
    ClipboardResponse, ConversationListResponse, ErrorResponse, FrameQuery, NewChatResponse,
    PixelLayout, SubmitRequest, SubmitResponse,
};
use super::{AppState, MAX_UPLOAD_BYTES};
use crate::bitmap::{Bitmap, BitmapError};
use crate::session::{ExchangeView, SessionError, SessionView};
use crate::store::{ConversationId, Exchange};
use crate::transcript;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/submit", post(submit))
        // Pending image
        .route("/api/image", put(upload_image).delete(discard_image))
        // Webcam
        .route("/api/webcam/frame", post(publish_frame))
        .route("/api/webcam/capture", post(capture_frame))
        // Archive
        .route("/api/chats/new", post(new_chat))
        .route("/api/conversations", get(list_conversations))
        .route("/api/conversations/:id/open", post(open_conversation))
        .route("/api/history/clear", post(clear_history))
        // Export
        .route("/api/transcript", get(download_transcript))
        .route("/api/exchanges/:number/clipboard", get(exchange_clipboard))
        .route("/api/exchanges/:number/image", get(exchange_image))
        .route("/version", get(get_version))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ============================================================
// Session
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let _turn = state.actions.lock().await;
    let (pending, llm) = {
        let session = state.session.lock().await;
        (session.prepare_submit(&req.text)?, session.llm())
    };

    // Session unlocked while the model works; reads stay responsive
    let response = pending.send(llm.as_ref()).await?;

    let mut session = state.session.lock().await;
    let number = session.current().len() + 1;
    let exchange = ExchangeView::new(number, session.complete_submit(pending, response));

    Ok(Json(SubmitResponse {
        exchange,
        session: session.view(),
    }))
}

// ============================================================
// Pending Image
// ============================================================

async fn upload_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SessionView>, AppError> {
    let image = Bitmap::decode(&body)?;
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    session.stage_image(image);
    Ok(Json(session.view()))
}

async fn discard_image(State(state): State<AppState>) -> Json<SessionView> {
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    session.discard_pending_image();
    Json(session.view())
}

// ============================================================
// Webcam
// ============================================================

/// Called by the capture loop for every frame
async fn publish_frame(
    State(state): State<AppState>,
    Query(query): Query<FrameQuery>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let frame = match (query.width, query.height) {
        (None, None) => Bitmap::decode(&body)?,
        (Some(width), Some(height)) => match query.layout {
            PixelLayout::Rgb => Bitmap::from_rgb(width, height, body.to_vec())?,
            PixelLayout::Bgr => Bitmap::from_bgr(width, height, body.to_vec())?,
        },
        _ => {
            return Err(AppError::BadRequest(
                "Raw frames need both width and height".to_string(),
            ))
        }
    };
    state.frames.publish(frame);
    Ok(StatusCode::NO_CONTENT)
}

async fn capture_frame(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    if !session.capture_frame(&state.frames) {
        return Err(AppError::NotFound(
            "No webcam frame has been captured yet".to_string(),
        ));
    }
    Ok(Json(session.view()))
}

// ============================================================
// Archive
// ============================================================

async fn new_chat(State(state): State<AppState>) -> Json<NewChatResponse> {
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    let archived = session.start_new_chat();
    Json(NewChatResponse {
        archived,
        session: session.view(),
    })
}

async fn list_conversations(State(state): State<AppState>) -> Json<ConversationListResponse> {
    Json(ConversationListResponse {
        conversations: state.session.lock().await.conversation_ids(),
    })
}

async fn open_conversation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<SessionView>, AppError> {
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    session.open_conversation(ConversationId::new(id))?;
    Ok(Json(session.view()))
}

async fn clear_history(State(state): State<AppState>) -> Json<SessionView> {
    let _turn = state.actions.lock().await;
    let mut session = state.session.lock().await;
    session.clear_history();
    Json(session.view())
}

// ============================================================
// Export
// ============================================================

async fn download_transcript(State(state): State<AppState>) -> Result<Response, AppError> {
    let bytes = state.session.lock().await.export_transcript()?;
    let disposition = format!("attachment; filename=\"{}\"", transcript::FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, transcript::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn exchange_clipboard(
    State(state): State<AppState>,
    Path(number): Path<usize>,
) -> Result<Json<ClipboardResponse>, AppError> {
    let session = state.session.lock().await;
    let exchange = session
        .exchange(number)
        .ok_or_else(|| AppError::NotFound(format!("Exchange {number} not found")))?;
    Ok(Json(ClipboardResponse {
        text: exchange.clipboard_text(),
    }))
}

async fn exchange_image(
    State(state): State<AppState>,
    Path(number): Path<usize>,
) -> Result<Response, AppError> {
    let session = state.session.lock().await;
    let image = session
        .exchange(number)
        .and_then(Exchange::image)
        .ok_or_else(|| AppError::NotFound(format!("Exchange {number} has no image")))?;
    let png = image
        .to_png()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn get_version() -> &'static str {
    concat!("pictalk ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    BadGateway(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let message = e.to_string();
        match e {
            SessionError::Validation => AppError::BadRequest(message),
            SessionError::NotFound(_) => AppError::NotFound(message),
            SessionError::EmptyTranscript => AppError::Unprocessable(message),
            SessionError::ModelRequest(_) => AppError::BadGateway(message),
            SessionError::Image(_) | SessionError::Transcript(_) => {
                tracing::error!(error = %message, kind = e.kind(), "Session action failed");
                AppError::Internal(message)
            }
        }
    }
}

impl From<BitmapError> for AppError {
    fn from(e: BitmapError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
