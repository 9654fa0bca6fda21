use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One turn of provider-side conversation: a role and its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`; omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The ordered parts of this turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a content block with a role.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role),
            parts,
        }
    }

    /// Creates a single-text-part content block with a role.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, vec![Part::text(text)])
    }

    /// Creates a role-less content block, as used for system instructions.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the renderable text of every part.
    pub fn rendered_text(&self) -> String {
        self.parts.iter().filter_map(Part::rendered_text).collect()
    }
}

/// A single part of a [`Content`] block.
///
/// The API sends parts as objects carrying exactly one payload key, sometimes
/// next to bookkeeping keys this crate does not interpret, so a part is kept
/// as a struct of optional payloads rather than an enum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Inline base64 data, e.g. an attached image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,

    /// Code the model generated for the code-execution tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<ExecutableCode>,

    /// Output of running [`ExecutableCode`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<CodeExecutionResult>,
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates an inline-data part.
    pub fn inline_data(blob: Blob) -> Self {
        Self {
            inline_data: Some(blob),
            ..Self::default()
        }
    }

    /// Returns true if this part carries an attachment.
    pub fn is_inline_data(&self) -> bool {
        self.inline_data.is_some()
    }

    /// The text this part contributes to a rendered response.
    ///
    /// Code-execution parts are rendered as fenced blocks.
    pub fn rendered_text(&self) -> Option<String> {
        if let Some(text) = &self.text {
            return Some(text.clone());
        }
        if let Some(code) = &self.executable_code {
            let language = code.language.to_ascii_lowercase();
            return Some(format!("\n```{language}\n{}\n```\n", code.code));
        }
        if let Some(result) = &self.code_execution_result {
            return Some(format!("\n```\n{}\n```\n", result.output));
        }
        None
    }
}

/// Base64 payload paired with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The MIME type of the payload.
    pub mime_type: String,

    /// The base64-encoded payload.
    pub data: String,
}

/// Code generated by the model for the code-execution tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableCode {
    /// Language of the code, e.g. `PYTHON`.
    pub language: String,

    /// The code itself.
    pub code: String,
}

/// The result of running [`ExecutableCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    /// Outcome string, e.g. `OUTCOME_OK`.
    pub outcome: String,

    /// Captured stdout, or the error text.
    #[serde(default)]
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_part_wire_shape() {
        let part = Part::text("hello");
        assert_eq!(serde_json::to_string(&part).unwrap(), r#"{"text":"hello"}"#);
    }

    #[test]
    fn inline_data_wire_shape() {
        let part = Part::inline_data(Blob {
            mime_type: "image/png".to_string(),
            data: "AAEC".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&part).unwrap(),
            r#"{"inlineData":{"mimeType":"image/png","data":"AAEC"}}"#
        );
    }

    #[test]
    fn tolerates_unknown_part_keys() {
        let json = r#"{"text":"thought","thought":true}"#;
        let part: Part = serde_json::from_str(json).unwrap();
        assert_eq!(part.text.as_deref(), Some("thought"));
    }

    #[test]
    fn renders_code_execution_parts() {
        let content = Content::new(
            Role::Model,
            vec![
                Part::text("Let me compute."),
                Part {
                    executable_code: Some(ExecutableCode {
                        language: "PYTHON".to_string(),
                        code: "print(2 + 2)".to_string(),
                    }),
                    ..Part::default()
                },
                Part {
                    code_execution_result: Some(CodeExecutionResult {
                        outcome: "OUTCOME_OK".to_string(),
                        output: "4".to_string(),
                    }),
                    ..Part::default()
                },
            ],
        );
        assert_eq!(
            content.rendered_text(),
            "Let me compute.\n```python\nprint(2 + 2)\n```\n\n```\n4\n```\n"
        );
    }

    #[test]
    fn instruction_has_no_role() {
        let json = serde_json::to_string(&Content::instruction("be brief")).unwrap();
        assert_eq!(json, r#"{"parts":[{"text":"be brief"}]}"#);
    }
}
