use crate::session::{ReplayEntry, Turn};

/// In-memory transcript plus the query/response index used by the history
/// browser. Nothing here outlives the window.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    transcript: Vec<Turn>,
    replay: Vec<ReplayEntry>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Appends the user turn, then the assistant turn, then the replay entry.
    pub fn record_exchange(&mut self, query: impl Into<String>, response: impl Into<String>) {
        let query = query.into();
        let response = response.into();

        self.transcript.push(Turn::user(query.clone()));
        self.transcript.push(Turn::assistant(response.clone()));
        self.replay.push(ReplayEntry { query, response });
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.replay.clear();
    }

    pub fn all(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn replay_entries(&self) -> &[ReplayEntry] {
        &self.replay
    }

    pub fn replay(&self, index: usize) -> Option<&ReplayEntry> {
        self.replay.get(index)
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }
}
