//! Session controller errors

use thiserror::Error;

use crate::bitmap::BitmapError;
use crate::llm::LlmError;
use crate::store::ConversationId;
use crate::transcript::TranscriptError;

/// Failure of a session action. None of these are fatal: the session is
/// left exactly as it was before the action.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Submit with blank text and no pending image
    #[error("provide prompt or image")]
    Validation,

    #[error("Model request failed: {0}")]
    ModelRequest(#[from] LlmError),

    #[error("Conversation {0} not found")]
    NotFound(ConversationId),

    #[error("Nothing to export: the current conversation is empty")]
    EmptyTranscript,

    #[error("Failed to prepare image: {0}")]
    Image(#[from] BitmapError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

impl SessionError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::ModelRequest(_) => "model_request",
            Self::NotFound(_) => "not_found",
            Self::EmptyTranscript => "empty_transcript",
            Self::Image(_) => "image",
            Self::Transcript(_) => "transcript",
        }
    }
}
