//! In-memory conversation store
//!
//! Holds archived conversations by id and mints ids. Nothing here
//! outlives the process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::bitmap::Bitmap;

/// One user turn and the model's reply
#[derive(Debug, Clone)]
pub struct Exchange {
    input: String,
    response: String,
    image: Option<Bitmap>,
}

impl Exchange {
    pub fn new(input: impl Into<String>, response: impl Into<String>, image: Option<Bitmap>) -> Self {
        Self {
            input: input.into(),
            response: response.into(),
            image,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    /// Text staged for the system clipboard when the user copies this exchange
    pub fn clipboard_text(&self) -> String {
        format!("User: {}\nBot: {}", self.input, self.response)
    }
}

/// Identifier of an archived conversation, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(u32);

impl ConversationId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[cfg(test)]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Archive of conversations.
///
/// Ids come from a counter that only moves forward, so an id is never
/// handed out twice, even after [`ConversationStore::clear`].
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: BTreeMap<ConversationId, Vec<Exchange>>,
    last_issued: u32,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id
    pub fn mint_id(&mut self) -> ConversationId {
        self.last_issued += 1;
        ConversationId(self.last_issued)
    }

    /// Store `exchanges` under `id`, replacing any previous content.
    /// Returns true when the id was not yet in the index.
    pub fn archive(&mut self, id: ConversationId, exchanges: Vec<Exchange>) -> bool {
        self.last_issued = self.last_issued.max(id.0);
        self.conversations.insert(id, exchanges).is_none()
    }

    pub fn get(&self, id: ConversationId) -> Option<&[Exchange]> {
        self.conversations.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.conversations.contains_key(&id)
    }

    /// Archived ids, oldest first
    pub fn ids(&self) -> Vec<ConversationId> {
        self.conversations.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Drop every archived conversation. The id counter is kept.
    pub fn clear(&mut self) {
        self.conversations.clear();
    }
}
