//! Session controller
//!
//! Owns the active session: the working conversation, the image staged for
//! the next submit, the archive and the view mode. Every action either
//! completes or leaves the session untouched.

mod error;

#[cfg(test)]
mod proptests;

pub use error::SessionError;

use serde::Serialize;
use std::sync::Arc;

use crate::bitmap::Bitmap;
use crate::capture::FrameSource;
use crate::context::build_prompt;
use crate::llm::{LlmRequest, LlmResponse, LlmService};
use crate::store::{ConversationId, ConversationStore, Exchange};
use crate::transcript;

/// Which pane the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    NewChat,
    ChatHistory,
}

pub struct Session {
    llm: Arc<dyn LlmService>,
    store: ConversationStore,
    current: Vec<Exchange>,
    pending_image: Option<Bitmap>,
    /// Archived conversation the working copy was loaded from
    viewing: Option<ConversationId>,
    mode: ViewMode,
}

impl Session {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            store: ConversationStore::new(),
            current: Vec::new(),
            pending_image: None,
            viewing: None,
            mode: ViewMode::NewChat,
        }
    }

    #[cfg(test)]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[cfg(test)]
    pub fn viewing(&self) -> Option<ConversationId> {
        self.viewing
    }

    pub fn current(&self) -> &[Exchange] {
        &self.current
    }

    #[cfg(test)]
    pub fn pending_image(&self) -> Option<&Bitmap> {
        self.pending_image.as_ref()
    }

    pub fn conversation_ids(&self) -> Vec<ConversationId> {
        self.store.ids()
    }

    /// Exchange by its 1-based display number
    pub fn exchange(&self, number: usize) -> Option<&Exchange> {
        number.checked_sub(1).and_then(|i| self.current.get(i))
    }

    /// Stage an image for the next submit, replacing any staged one
    pub fn stage_image(&mut self, image: Bitmap) {
        tracing::debug!(width = image.width(), height = image.height(), "Image staged");
        self.pending_image = Some(image);
    }

    pub fn discard_pending_image(&mut self) {
        if self.pending_image.take().is_some() {
            tracing::debug!("Pending image discarded");
        }
    }

    /// Stage the newest webcam frame. Returns false when no frame has
    /// arrived yet, leaving any staged image alone.
    pub fn capture_frame(&mut self, source: &dyn FrameSource) -> bool {
        match source.latest_frame() {
            Some(frame) => {
                self.stage_image(frame);
                true
            }
            None => false,
        }
    }

    /// Send `text` (and the staged image) to the model with the recent
    /// history as context, and append the resulting exchange.
    ///
    /// On any failure nothing is appended and the staged image is kept.
    pub async fn submit(&mut self, text: &str) -> Result<&Exchange, SessionError> {
        let turn = self.prepare_submit(text)?;
        let response = turn.send(self.llm.as_ref()).await?;
        Ok(self.complete_submit(turn, response))
    }

    /// First half of [`Session::submit`]: validate and build the model
    /// request without touching any state.
    pub fn prepare_submit(&self, text: &str) -> Result<PendingTurn, SessionError> {
        let blank = text.trim().is_empty();
        if blank && self.pending_image.is_none() {
            return Err(SessionError::Validation);
        }

        // Nothing to say and nothing to recall: send the image alone
        let prompt = if blank && self.current.is_empty() {
            None
        } else {
            Some(build_prompt(&self.current, text))
        };
        let image = self
            .pending_image
            .as_ref()
            .map(Bitmap::to_inline_image)
            .transpose()?;
        let request = LlmRequest::from_parts(prompt, image).ok_or(SessionError::Validation)?;

        Ok(PendingTurn {
            input: text.to_string(),
            request,
        })
    }

    /// Second half of [`Session::submit`]: record the reply and consume the
    /// staged image. Callers that drop the session between the halves must
    /// keep other mutations out until this runs.
    pub fn complete_submit(&mut self, turn: PendingTurn, response: LlmResponse) -> &Exchange {
        let index = self.current.len();
        self.current.push(Exchange::new(
            turn.input,
            response.text,
            self.pending_image.take(),
        ));
        tracing::info!(
            exchange = index + 1,
            shape = turn.request.shape(),
            conversation = ?self.viewing,
            "Exchange recorded"
        );
        &self.current[index]
    }

    /// The model gateway this session talks to
    pub fn llm(&self) -> Arc<dyn LlmService> {
        Arc::clone(&self.llm)
    }

    /// Archive the working conversation and start an empty one.
    ///
    /// A conversation opened from the archive is written back under its
    /// own id; anything else gets a fresh id. Returns the id archived
    /// under, or `None` when there was nothing to archive.
    pub fn start_new_chat(&mut self) -> Option<ConversationId> {
        if self.current.is_empty() {
            return None;
        }

        let id = match (self.mode, self.viewing) {
            (ViewMode::ChatHistory, Some(id)) => id,
            _ => self.store.mint_id(),
        };
        let exchanges = std::mem::take(&mut self.current);
        let count = exchanges.len();
        let added = self.store.archive(id, exchanges);
        self.viewing = None;
        self.mode = ViewMode::NewChat;

        tracing::info!(conversation = %id, exchanges = count, new = added, "Conversation archived");
        Some(id)
    }

    /// Load an archived conversation as the working copy.
    ///
    /// Edits to a conversation already open are written back first; an
    /// unarchived new chat is dropped.
    pub fn open_conversation(&mut self, id: ConversationId) -> Result<(), SessionError> {
        if !self.store.contains(id) {
            return Err(SessionError::NotFound(id));
        }

        if let (ViewMode::ChatHistory, Some(open)) = (self.mode, self.viewing) {
            if self.store.contains(open) {
                let previous = std::mem::take(&mut self.current);
                self.store.archive(open, previous);
            }
        }

        self.current = self.store.get(id).map(<[Exchange]>::to_vec).unwrap_or_default();
        self.viewing = Some(id);
        self.mode = ViewMode::ChatHistory;
        tracing::info!(conversation = %id, exchanges = self.current.len(), "Conversation opened");
        Ok(())
    }

    /// Forget every archived conversation and the working one. The view
    /// mode and the id counter are kept.
    pub fn clear_history(&mut self) {
        if self.store.is_empty() && self.current.is_empty() {
            tracing::debug!("History already empty");
            return;
        }
        let archived = self.store.len();
        self.store.clear();
        self.current.clear();
        tracing::info!(archived, "History cleared");
    }

    /// Render the working conversation as a PDF
    pub fn export_transcript(&self) -> Result<Vec<u8>, SessionError> {
        if self.current.is_empty() {
            return Err(SessionError::EmptyTranscript);
        }
        let bytes = transcript::render_pdf(&self.current)?;
        tracing::info!(exchanges = self.current.len(), bytes = bytes.len(), "Transcript exported");
        Ok(bytes)
    }

    /// Snapshot for display
    pub fn view(&self) -> SessionView {
        let last_index = match self.mode {
            ViewMode::ChatHistory => self.current.len().checked_sub(1),
            ViewMode::NewChat => None,
        };
        SessionView {
            mode: self.mode,
            viewing: self.viewing,
            conversations: self.store.ids(),
            exchanges: self
                .current
                .iter()
                .enumerate()
                .map(|(i, exchange)| ExchangeView::new(i + 1, exchange))
                .collect(),
            pending_image: self.pending_image.is_some(),
            last_index,
        }
    }
}

/// A validated submit waiting for the model's reply
#[derive(Debug)]
pub struct PendingTurn {
    input: String,
    request: LlmRequest,
}

impl PendingTurn {
    /// Call the model. Needs no access to the session.
    pub async fn send(&self, llm: &dyn LlmService) -> Result<LlmResponse, SessionError> {
        llm.complete(&self.request).await.map_err(|e| {
            tracing::warn!(error = %e, kind = e.kind.as_str(), "Submit failed");
            SessionError::ModelRequest(e)
        })
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub mode: ViewMode,
    pub viewing: Option<ConversationId>,
    pub conversations: Vec<ConversationId>,
    pub exchanges: Vec<ExchangeView>,
    pub pending_image: bool,
    /// Zero-based index of the newest exchange while browsing history
    pub last_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeView {
    /// 1-based, shown as "Prompt N" / "Response N"
    pub number: usize,
    pub input: String,
    pub response: String,
    pub has_image: bool,
}

impl ExchangeView {
    pub fn new(number: usize, exchange: &Exchange) -> Self {
        Self {
            number,
            input: exchange.input().to_string(),
            response: exchange.response().to_string(),
            has_image: exchange.image().is_some(),
        }
    }
}
