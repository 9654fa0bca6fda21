use serde::{Deserialize, Serialize};
use std::fmt;

/// The author of a conversation message.
///
/// Only `User` and `Model` are ever sent to the provider; `System` and
/// `Thinking` messages live in the local transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Input typed (or attached) by the user.
    User,

    /// A completed response from the model.
    Model,

    /// Notices produced by the client itself: welcome, cancellation, failures.
    System,

    /// Reasoning text captured from the side-channel thinking request.
    Thinking,
}

impl Role {
    /// Returns true if messages with this role are replayed as provider history.
    pub fn is_history(self) -> bool {
        matches!(self, Role::User | Role::Model)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::System => write!(f, "system"),
            Role::Thinking => write!(f, "thinking"),
        }
    }
}
