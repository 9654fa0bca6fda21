use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::Role;

/// Identifier of a message, unique and increasing within a conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a file that was attached to a user message.
///
/// Only the description is kept; the bytes are dropped once the request
/// that carried them completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// The file name shown to the user.
    pub name: String,
    /// MIME type the file was sent as.
    pub mime_type: String,
    /// Size in bytes, when known before encoding.
    pub size: Option<u64>,
}

/// An entry in the conversation log.
///
/// Messages are created by [`Conversation`](crate::Conversation) and never
/// change after being appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, increasing identifier.
    pub id: MessageId,
    /// The text shown for the message.
    pub content: String,
    /// Who produced the message.
    pub role: Role,
    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
    /// Files attached to a user message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRef>>,
    /// Reasoning captured for a model message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

/// A message that has not been assigned an identity yet.
///
/// The conversation stamps the id and timestamp when the draft is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    /// The text shown for the message.
    pub content: String,
    /// Who produced the message.
    pub role: Role,
    /// Files attached to a user message.
    pub files: Option<Vec<FileRef>>,
    /// Reasoning captured for a model message.
    pub thinking: Option<String>,
}

impl MessageDraft {
    /// Creates a draft with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role,
            files: None,
            thinking: None,
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A model response.
    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    /// A client notice.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Attaches file references; an empty list records none.
    pub fn with_files(mut self, files: Vec<FileRef>) -> Self {
        self.files = if files.is_empty() { None } else { Some(files) };
        self
    }

    /// Attaches captured reasoning.
    pub fn with_thinking(mut self, thinking: Option<String>) -> Self {
        self.thinking = thinking;
        self
    }
}
