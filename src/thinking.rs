//! The thinking side channel.
//!
//! Before the main reply, thinking-capable models are asked separately to
//! lay out their reasoning.  The reasoning portion of that answer is shown to
//! the user and kept on the model message.  Nothing here ever fails a turn.

use crate::observability::{THINKING_FAILURES, THINKING_REQUESTS};
use crate::provider::{ModelHandle, Provider};
use crate::types::Model;

/// Instruction bound to the model for the thinking request.
pub const THINKING_INSTRUCTION: &str = "Show your step-by-step thinking process before answering. Break down complex problems methodically.";

/// Paragraph openers that mark the start of a conclusion.
const CONCLUSION_MARKERS: [&str; 4] = [
    "\n\ntherefore,",
    "\n\nin conclusion,",
    "\n\nto summarize,",
    "\n\nso,",
];

/// Asks `model` for its reasoning about `prompt`.
///
/// Returns `None` on any failure, including a model that cannot be built.
pub async fn fetch_thinking<P>(provider: &P, prompt: &str, model: &Model) -> Option<String>
where
    P: Provider + ?Sized,
{
    THINKING_REQUESTS.click();
    let handle = match ModelHandle::new(model.clone(), Some(THINKING_INSTRUCTION.to_string()), false)
    {
        Ok(handle) => handle,
        Err(err) => {
            THINKING_FAILURES.click();
            tracing::warn!(error = %err, "could not build thinking model");
            return None;
        }
    };
    match provider.generate(&handle, prompt).await {
        Ok(text) => {
            let thinking = split_thinking(&text).trim();
            (!thinking.is_empty()).then(|| thinking.to_string())
        }
        Err(err) => {
            THINKING_FAILURES.click();
            tracing::warn!(error = %err, %model, "thinking request failed");
            None
        }
    }
}

/// Returns the reasoning part of `text`: everything before the first
/// paragraph opening with a conclusion phrase, matched case-insensitively.
///
/// When there is no such paragraph, or it is the very first thing in
/// `text`, the whole text is returned.
pub fn split_thinking(text: &str) -> &str {
    let lowered = text.to_ascii_lowercase();
    let cut = CONCLUSION_MARKERS
        .iter()
        .filter_map(|marker| lowered.find(marker))
        .min();
    match cut {
        Some(index) if index > 0 => &text[..index],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_earliest_conclusion() {
        let text = "Step one.\n\nStep two.\n\nSo, the answer.\n\nTherefore, done.";
        assert_eq!(split_thinking(text), "Step one.\n\nStep two.");
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(split_thinking("Think.\n\nIN CONCLUSION, yes"), "Think.");
        assert_eq!(split_thinking("Think.\n\nto summarize, yes"), "Think.");
    }

    #[test]
    fn phrase_must_open_a_paragraph() {
        let text = "We conclude. Therefore, yes.\nSo, fine.";
        assert_eq!(split_thinking(text), text);
    }

    #[test]
    fn leading_marker_keeps_everything() {
        let text = "\n\nSo, straight to it.";
        assert_eq!(split_thinking(text), text);
    }
}
