//! Output rendering for streamed chat turns.
//!
//! The controller drives a [`Renderer`] with display events as a turn
//! progresses and reports user-facing failures through an [`ErrorSink`].
//! [`PlainTextRenderer`] implements both for a terminal.

use std::fmt;
use std::io::{self, Stdout, Write};

use crate::error::{Error, ErrorKind};
use crate::types::Message;

/// ANSI escape code for dim text (used for thinking).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for thinking).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for red text (used for error notices).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Receives display events for a turn.
///
/// Calls arrive in turn order: an optional thinking phase, zero or more text
/// chunks (possibly interrupted by one restart), then exactly one of
/// [`Renderer::finish_response`], [`Renderer::print_interrupted`] or
/// [`Renderer::print_error`].
pub trait Renderer: Send {
    /// The thinking request has been sent.
    fn start_thinking(&mut self) {}

    /// The thinking request finished; `None` when nothing was captured.
    fn finish_thinking(&mut self, thinking: Option<&str>) {
        _ = thinking;
    }

    /// Print a chunk of response text as it arrives.
    fn print_text(&mut self, text: &str);

    /// Text printed so far for this turn is being discarded because the
    /// request is retried with a reframed prompt.
    fn restart_response(&mut self) {}

    /// The model message has been appended.
    fn finish_response(&mut self, message: &Message);

    /// The turn was cancelled by the user.
    fn print_interrupted(&mut self);

    /// The turn failed; `error` is the notice appended to the conversation.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// How prominently a [`Notice`] should be shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Destructive,
}

/// A user-facing failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    /// The notice shown when a turn fails with `err`.
    pub fn for_error(err: &Error) -> Self {
        let description = match err.kind() {
            ErrorKind::Construction => format!("Failed to initialize chat session: {err}"),
            ErrorKind::Read => format!("Failed to read an attached file: {err}"),
            _ => format!("Failed to generate a response: {err}"),
        };
        Self::new("Error", description, Severity::Destructive)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Receives user-facing failure reports.
pub trait ErrorSink: Send {
    fn report(&mut self, notice: Notice);
}

/// Plain text renderer with optional ANSI styling.
///
/// Response text goes to stdout; notices go to stderr.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    line_start: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            line_start: true,
        }
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = self.stdout.write_all(text.as_bytes());
        let _ = self.stdout.flush();
        self.line_start = text.ends_with('\n');
    }

    fn end_line(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_thinking(&mut self) {
        self.end_line();
        let line = self.styled(ANSI_DIM, "[thinking...]");
        self.write(&format!("{line}\n"));
    }

    fn finish_thinking(&mut self, thinking: Option<&str>) {
        let Some(thinking) = thinking.filter(|t| !t.trim().is_empty()) else {
            return;
        };
        let body = if self.use_color {
            format!("{ANSI_DIM}{ANSI_ITALIC}{}{ANSI_RESET}", thinking.trim_end())
        } else {
            format!("[thinking] {}", thinking.trim_end())
        };
        self.write(&format!("{body}\n\n"));
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn restart_response(&mut self) {
        self.end_line();
        let line = self.styled(ANSI_YELLOW, "[response blocked, retrying with a reframed prompt]");
        self.write(&format!("{line}\n"));
    }

    fn finish_response(&mut self, _message: &Message) {
        self.end_line();
    }

    fn print_interrupted(&mut self) {
        self.end_line();
        self.write("[interrupted]\n");
    }

    fn print_error(&mut self, error: &str) {
        self.end_line();
        eprintln!("{error}");
    }

    fn print_info(&mut self, info: &str) {
        self.end_line();
        self.write(&format!("{info}\n"));
    }
}

impl ErrorSink for PlainTextRenderer {
    fn report(&mut self, notice: Notice) {
        let style = match notice.severity {
            Severity::Info => "",
            Severity::Warning => ANSI_YELLOW,
            Severity::Destructive => ANSI_RED,
        };
        eprintln!("{}", self.styled(style, &notice.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert_eq!(renderer.styled(ANSI_RED, "x"), "x");
    }

    #[test]
    fn notices_describe_the_failure() {
        let notice = Notice::for_error(&Error::rate_limit("quota exceeded", None));
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.severity, Severity::Destructive);
        assert!(notice.description.starts_with("Failed to generate a response: "));
        assert!(notice.description.contains("quota exceeded"));

        let notice = Notice::for_error(&Error::construction("bad model"));
        assert!(notice.description.starts_with("Failed to initialize chat session"));
    }
}
