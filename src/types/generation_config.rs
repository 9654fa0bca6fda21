use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every request of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    pub top_p: f32,

    /// Top-k sampling limit.
    pub top_k: u32,

    /// Maximum number of tokens in a response.
    pub max_output_tokens: u32,

    /// MIME type of the generated output.
    pub response_mime_type: String,

    /// Number of candidates to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,

    /// Sequences that stop generation.
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 65536,
            response_mime_type: "text/plain".to_string(),
            candidate_count: None,
            stop_sequences: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_on_the_wire() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert!(json["topP"].is_number());
        assert_eq!(json["topK"], 64);
        assert_eq!(json["maxOutputTokens"], 65536);
        assert_eq!(json["responseMimeType"], "text/plain");
        assert!(json.get("candidateCount").is_none());
    }
}
