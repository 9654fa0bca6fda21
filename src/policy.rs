//! Content-policy handling for streamed responses.
//!
//! A response the provider refuses for policy reasons is retried once with
//! the prompt wrapped in an analytical framing.  Which failures count as a
//! block is decided here and nowhere else.

use crate::error::Error;

/// How many reframed retries a single turn may make.
pub const MAX_BLOCK_RETRIES: usize = 1;

const REFRAME_PREFIX: &str = "Please provide a comprehensive analysis and your insights about the following, focusing on factual information and analytical perspectives: ";

/// Marker the provider puts in recitation refusals that arrive as plain
/// API errors rather than structured block signals.
const RECITATION_MARKER: &str = "RECITATION";

/// Returns true if `err` is a policy refusal worth one reframed retry.
pub fn is_content_block(err: &Error) -> bool {
    if err.is_abort() {
        return false;
    }
    err.is_content_blocked() || err.to_string().contains(RECITATION_MARKER)
}

/// Wraps `prompt` in the analytical framing used for the retry.
pub fn reframe_prompt(prompt: &str) -> String {
    format!("{REFRAME_PREFIX}{prompt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_blocks_are_blocks() {
        assert!(is_content_block(&Error::content_blocked(
            "Candidate was blocked due to SAFETY",
            Some("SAFETY".to_string()),
        )));
    }

    #[test]
    fn recitation_in_api_message_is_a_block() {
        assert!(is_content_block(&Error::api(
            500,
            None,
            "[GoogleGenerativeAI Error]: Candidate was blocked due to RECITATION",
        )));
    }

    #[test]
    fn other_failures_are_not_blocks() {
        assert!(!is_content_block(&Error::rate_limit("slow down", None)));
        assert!(!is_content_block(&Error::abort("RECITATION")));
        assert!(!is_content_block(&Error::construction("bad model")));
    }

    #[test]
    fn reframed_prompt_keeps_original_text() {
        let reframed = reframe_prompt("Write the lyrics");
        assert!(reframed.starts_with("Please provide a comprehensive analysis"));
        assert!(reframed.ends_with(": Write the lyrics"));
    }
}
