//! HTTP API for `PicTalk`
//!
//! One session per process. Mutating actions take the `actions` lock so
//! they run one at a time; the `session` lock is only held for short,
//! non-blocking sections, so reads never wait on a model call. Webcam
//! frames bypass both.

mod handlers;
mod types;

pub use handlers::create_router;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::capture::LatestFrame;
use crate::llm::LlmService;
use crate::session::Session;

/// Largest accepted upload or frame body
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    /// Serializes mutating actions, including a submit's model call
    pub actions: Arc<Mutex<()>>,
    pub frames: LatestFrame,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(llm))),
            actions: Arc::new(Mutex::new(())),
            frames: LatestFrame::new(),
        }
    }
}
