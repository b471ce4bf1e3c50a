use uuid::Uuid;

use crate::models::chat::ConversationMessage;

/// In-memory conversation log for one shell session. Append-only until reset.
#[derive(Clone, Debug)]
pub struct Session {
    id: Uuid,
    messages: Vec<ConversationMessage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), messages: Vec::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops the log and starts a fresh session id.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.id = Uuid::new_v4();
    }
}
