// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod encoder;
pub mod error;
pub mod policy;
pub mod provider;
pub mod render;
pub mod sse;
pub mod text_stream;
pub mod thinking;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{Gemini, ResponseStream};
pub use client_logger::ClientLogger;
pub use config::{DEFAULT_SYSTEM_PROMPT, SessionConfig};
pub use controller::{
    CANCELLED_NOTICE, CancelHandle, ChatController, FAILURE_NOTICE, TurnOutcome, TurnState,
};
pub use conversation::{Conversation, WELCOME_MESSAGE};
pub use encoder::{AttachmentSource, FileSource, PendingFile};
pub use error::{Error, ErrorKind, Result};
pub use observability::register_biometrics;
pub use provider::{GeminiSession, ModelHandle, Provider, ProviderSession, validate_history};
pub use render::{ErrorSink, Notice, PlainTextRenderer, Renderer, Severity};
pub use text_stream::TextStream;
pub use types::*;
