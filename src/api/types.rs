//! API request and response types

use serde::{Deserialize, Serialize};

use crate::session::{ExchangeView, SessionView};
use crate::store::ConversationId;

/// Request to submit a prompt
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: String,
}

/// Response for a successful submit
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub exchange: ExchangeView,
    pub session: SessionView,
}

/// Response for starting a new chat
#[derive(Debug, Serialize)]
pub struct NewChatResponse {
    /// Id the previous conversation was archived under, if any
    pub archived: Option<ConversationId>,
    pub session: SessionView,
}

/// Response with the archived conversation ids
#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationId>,
}

/// Response with the clipboard text of one exchange
#[derive(Debug, Serialize)]
pub struct ClipboardResponse {
    pub text: String,
}

/// Channel order of an uncompressed webcam frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelLayout {
    Rgb,
    #[default]
    Bgr,
}

/// Query for a published webcam frame. Without dimensions the body is an
/// encoded image; with them it is packed 8-bit pixels.
#[derive(Debug, Default, Deserialize)]
pub struct FrameQuery {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub layout: PixelLayout,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
