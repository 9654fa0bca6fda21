use serde::{Deserialize, Serialize};

use crate::types::{Content, GenerationConfig};

/// Body of a `generateContent` / `streamGenerateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far, ending with the new user turn.
    pub contents: Vec<Content>,

    /// System instruction bound to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Tools the model may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    /// Sampling parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A tool declaration.  Only server-side code execution is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Enables server-side code execution when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<CodeExecution>,
}

impl Tool {
    /// The code-execution tool.
    pub fn code_execution() -> Self {
        Self {
            code_execution: Some(CodeExecution {}),
        }
    }
}

/// Marker object enabling code execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecution {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Role::User, "hi")],
            system_instruction: Some(Content::instruction("be kind")),
            tools: vec![Tool::code_execution()],
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "be kind"}]},
                "tools": [{"codeExecution": {}}],
            })
        );
    }
}
