use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::Content;

/// One response object: the whole answer for `generateContent`, one chunk
/// for `streamGenerateContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; at most one is requested.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Feedback about the prompt, present when the prompt itself was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

/// A generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content, absent when the candidate was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped; only present on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point or stop sequence.
    Stop,
    /// Token limit reached.
    MaxTokens,
    /// Flagged for safety reasons.
    Safety,
    /// Flagged for reciting training data.
    Recitation,
    /// Flagged for using an unsupported language.
    Language,
    /// Matched the terms blocklist.
    Blocklist,
    /// Flagged for prohibited content.
    ProhibitedContent,
    /// Flagged for sensitive personally identifiable information.
    Spii,
    /// Unknown or unspecified reason.
    #[serde(other)]
    Other,
}

impl FinishReason {
    /// Returns true if this reason means the provider refused the content.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii
        )
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "STOP"),
            FinishReason::MaxTokens => write!(f, "MAX_TOKENS"),
            FinishReason::Safety => write!(f, "SAFETY"),
            FinishReason::Recitation => write!(f, "RECITATION"),
            FinishReason::Language => write!(f, "LANGUAGE"),
            FinishReason::Blocklist => write!(f, "BLOCKLIST"),
            FinishReason::ProhibitedContent => write!(f, "PROHIBITED_CONTENT"),
            FinishReason::Spii => write!(f, "SPII"),
            FinishReason::Other => write!(f, "OTHER"),
        }
    }
}

/// Feedback about the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked, e.g. `SAFETY` or `OTHER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Token accounting for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Tokens across generated candidates.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total tokens.
    #[serde(default)]
    pub total_token_count: u32,
}

impl GenerateContentResponse {
    /// Extracts the text of the first candidate.
    ///
    /// A blocked prompt or a candidate that finished for a policy reason is
    /// reported as [`Error::ContentBlocked`], mirroring how the provider's own
    /// SDKs refuse to hand out text for such responses.
    pub fn text(&self) -> Result<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(Error::content_blocked(
                format!("Response was blocked due to {reason}"),
                Some(reason.clone()),
            ));
        }
        let Some(candidate) = self.candidates.first() else {
            return Ok(String::new());
        };
        if let Some(reason) = candidate.finish_reason.as_ref().filter(|r| r.is_block()) {
            return Err(Error::content_blocked(
                format!("Candidate was blocked due to {reason}"),
                Some(reason.to_string()),
            ));
        }
        Ok(candidate
            .content
            .as_ref()
            .map(Content::rendered_text)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hel"}, {"text": "lo"}]},
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 3, "totalTokenCount": 5}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "Hello");
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 3);
    }

    #[test]
    fn recitation_finish_is_a_block() {
        let json = r#"{"candidates": [{"finishReason": "RECITATION", "index": 0}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = response.text().unwrap_err();
        assert!(err.is_content_blocked());
        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn prompt_feedback_block() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().unwrap_err().is_content_blocked());
    }

    #[test]
    fn unknown_finish_reason_is_other() {
        let json = r#"{"candidates": [{"finishReason": "MALFORMED_FUNCTION_CALL"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.candidates[0].finish_reason,
            Some(FinishReason::Other)
        );
        assert_eq!(response.text().unwrap(), "");
    }

    #[test]
    fn max_tokens_is_not_a_block() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "cut"}]}, "finishReason": "MAX_TOKENS"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "cut");
    }
}
