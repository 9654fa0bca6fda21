//! Terminal front-end for chatting with Gemini.
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing
//!
//! The REPL itself lives in the `gemini-chat` binary and drives a
//! [`ChatController`](crate::ChatController).

mod commands;
mod config;

pub use crate::render::{ErrorSink, Notice, PlainTextRenderer, Renderer, Severity};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, load_session_config};
