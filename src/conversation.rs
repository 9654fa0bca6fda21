//! The message log of a chat and the history it replays to a new session.

use time::OffsetDateTime;

use crate::types::{Content, Message, MessageDraft, MessageId, Role};

/// Greeting every conversation starts with.
pub const WELCOME_MESSAGE: &str = "Hello! I'm Gemini AI, ready to assist you. Feel free to ask me anything or upload images, documents, or other files for analysis.";

/// The append-only message log of a chat.
///
/// Identifiers increase across the lifetime of the value, resets included.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    /// Creates a conversation holding only the welcome message.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        conversation.append(MessageDraft::system(WELCOME_MESSAGE));
        conversation
    }

    /// Stamps `draft` with an id and timestamp and appends it.
    pub fn append(&mut self, draft: MessageDraft) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        let message = Message {
            id,
            content: draft.content,
            role: draft.role,
            timestamp: OffsetDateTime::now_utc(),
            files: draft.files,
            thinking: draft.thinking,
        };
        tracing::trace!(%id, role = %message.role, "message appended");
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Every message in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops every message and starts over with the welcome message.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.append(MessageDraft::system(WELCOME_MESSAGE));
    }

    /// The provider history implied by the log.
    ///
    /// Only user messages answered by a model message are kept, so the
    /// result starts with a user turn and strictly alternates.  System and
    /// thinking messages are never included, and neither is a user message
    /// whose turn was cancelled or failed.
    pub fn history_view(&self) -> Vec<Content> {
        let mut history = Vec::new();
        let mut unanswered: Option<&Message> = None;
        for message in &self.messages {
            match message.role {
                Role::User => unanswered = Some(message),
                Role::Model => {
                    if let Some(user) = unanswered.take() {
                        history.push(Content::text(Role::User, user.content.clone()));
                        history.push(Content::text(Role::Model, message.content.clone()));
                    }
                }
                Role::System | Role::Thinking => {}
            }
        }
        history
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::validate_history;

    #[test]
    fn starts_with_welcome() {
        let conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        let welcome = &conversation.messages()[0];
        assert_eq!(welcome.role, Role::System);
        assert_eq!(welcome.content, WELCOME_MESSAGE);
        assert!(conversation.history_view().is_empty());
    }

    #[test]
    fn ids_increase_across_resets() {
        let mut conversation = Conversation::new();
        let first = conversation.append(MessageDraft::user("a")).id;
        conversation.reset();
        assert_eq!(conversation.len(), 1);
        let second = conversation.append(MessageDraft::user("b")).id;
        assert!(second > first);
    }

    #[test]
    fn history_skips_notices_and_unanswered_turns() {
        let mut conversation = Conversation::new();
        conversation.append(MessageDraft::user("cancelled one"));
        conversation.append(MessageDraft::system("Response generation cancelled."));
        conversation.append(MessageDraft::user("Hello"));
        conversation.append(
            MessageDraft::model("Hi there").with_thinking(Some("greet".to_string())),
        );
        conversation.append(MessageDraft::user("failed one"));
        conversation.append(MessageDraft::system("Sorry, I encountered an error. Please try again."));

        let history = conversation.history_view();
        assert_eq!(
            history,
            vec![
                Content::text(Role::User, "Hello"),
                Content::text(Role::Model, "Hi there"),
            ]
        );
        validate_history(&history).unwrap();
    }
}
