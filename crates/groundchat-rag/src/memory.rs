//! Bounded per-session chat memory.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use groundchat_core::{ChatId, ChatMessage};

/// In-process conversation history, bounded per session. When a session
/// exceeds the window the oldest messages are evicted first.
pub struct ChatMemory {
    window: usize,
    sessions: Mutex<HashMap<ChatId, VecDeque<ChatMessage>>>,
}

impl ChatMemory {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a session's history, oldest first. Unknown sessions are
    /// simply empty.
    pub fn history(&self, chat_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .lock()
            .unwrap()
            .get(chat_id)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record one completed turn. The user message and the assistant reply
    /// land together so no reader ever observes half a turn.
    pub fn append_turn(&self, chat_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let messages = sessions.entry(chat_id.to_string()).or_default();
        messages.push_back(ChatMessage::user(user));
        messages.push_back(ChatMessage::assistant(assistant));
        while messages.len() > self.window {
            messages.pop_front();
        }
    }

    /// Forget a session entirely.
    pub fn clear(&self, chat_id: &str) {
        self.sessions.lock().unwrap().remove(chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundchat_core::Role;

    #[test]
    fn unknown_session_is_empty() {
        let memory = ChatMemory::new(20);
        assert!(memory.history("nope").is_empty());
    }

    #[test]
    fn turns_are_recorded_in_order() {
        let memory = ChatMemory::new(20);
        memory.append_turn("c1", "q1", "a1");
        memory.append_turn("c1", "q2", "a2");

        let history = memory.history("c1");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[3].content, "a2");
    }

    #[test]
    fn sessions_are_isolated() {
        let memory = ChatMemory::new(20);
        memory.append_turn("c1", "q", "a");
        assert!(memory.history("c2").is_empty());
    }

    #[test]
    fn oldest_messages_are_evicted_past_the_window() {
        let memory = ChatMemory::new(20);
        for i in 0..25 {
            memory.append_turn("c1", &format!("q{i}"), &format!("a{i}"));
        }

        let history = memory.history("c1");
        assert_eq!(history.len(), 20);
        // 25 turns of 2 messages, window 20: the first 15 turns are gone.
        assert_eq!(history[0].content, "q15");
        assert_eq!(history[19].content, "a24");
    }

    #[test]
    fn clear_forgets_the_session() {
        let memory = ChatMemory::new(20);
        memory.append_turn("c1", "q", "a");
        memory.clear("c1");
        assert!(memory.history("c1").is_empty());
    }
}
