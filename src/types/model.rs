use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a Gemini model identifier.
///
/// This can be one of the catalogued models or a custom string value for
/// models the catalogue does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Catalogued model versions
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Catalogued Gemini model versions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.0 Flash Thinking (experimental, 2025-01-21)
    #[serde(rename = "gemini-2.0-flash-thinking-exp-01-21")]
    Gemini20FlashThinking,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.0 Flash Lite (preview, 2025-02-05)
    #[serde(rename = "gemini-2.0-flash-lite-preview-02-05")]
    Gemini20FlashLite,
}

/// Default max output tokens for models outside the catalogue.
const CUSTOM_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Default temperature for models outside the catalogue.
const CUSTOM_DEFAULT_TEMPERATURE: f32 = 1.0;

impl KnownModel {
    /// Every catalogued model, in display order.
    pub const ALL: [KnownModel; 3] = [
        KnownModel::Gemini20FlashThinking,
        KnownModel::Gemini20Flash,
        KnownModel::Gemini20FlashLite,
    ];

    /// The wire identifier of the model.
    pub fn id(self) -> &'static str {
        match self {
            KnownModel::Gemini20FlashThinking => "gemini-2.0-flash-thinking-exp-01-21",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini20FlashLite => "gemini-2.0-flash-lite-preview-02-05",
        }
    }

    /// Human readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            KnownModel::Gemini20FlashThinking => "Gemini 2.0 Flash Thinking",
            KnownModel::Gemini20Flash => "Gemini 2.0 Flash",
            KnownModel::Gemini20FlashLite => "Gemini 2.0 Flash Lite",
        }
    }

    /// One-line description for model pickers.
    pub fn description(self) -> &'static str {
        match self {
            KnownModel::Gemini20FlashThinking => {
                "Supports visible reasoning process (Flash Thinking)"
            }
            KnownModel::Gemini20Flash => "Fast, lightweight model for quick responses",
            KnownModel::Gemini20FlashLite => "Preview version for leaner, faster responses",
        }
    }

    /// Largest `maxOutputTokens` the model accepts.
    pub fn max_output_tokens(self) -> u32 {
        match self {
            KnownModel::Gemini20FlashThinking => 65536,
            KnownModel::Gemini20Flash | KnownModel::Gemini20FlashLite => 8192,
        }
    }

    /// Temperature applied when the user switches to this model.
    pub fn default_temperature(self) -> f32 {
        match self {
            KnownModel::Gemini20FlashThinking => 0.9,
            KnownModel::Gemini20Flash | KnownModel::Gemini20FlashLite => 1.0,
        }
    }

    /// Whether the thinking side channel is offered for this model.
    pub fn supports_thinking(self) -> bool {
        matches!(self, KnownModel::Gemini20FlashThinking)
    }
}

impl Model {
    /// Returns the catalogue entry, if this model is catalogued.
    pub fn known(&self) -> Option<KnownModel> {
        match self {
            Model::Known(known) => Some(*known),
            Model::Custom(_) => None,
        }
    }

    /// Largest `maxOutputTokens` the model accepts.
    pub fn max_output_tokens(&self) -> u32 {
        self.known()
            .map(KnownModel::max_output_tokens)
            .unwrap_or(CUSTOM_MAX_OUTPUT_TOKENS)
    }

    /// Temperature applied when the user switches to this model.
    pub fn default_temperature(&self) -> f32 {
        self.known()
            .map(KnownModel::default_temperature)
            .unwrap_or(CUSTOM_DEFAULT_TEMPERATURE)
    }

    /// Whether the thinking side channel is offered for this model.
    pub fn supports_thinking(&self) -> bool {
        self.known().is_some_and(KnownModel::supports_thinking)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(KnownModel::ALL
            .into_iter()
            .find(|known| known.id() == s)
            .map(Model::Known)
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini20Flash);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-2.0-flash""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-2.0-flash-thinking-exp-01-21""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini20FlashThinking));

        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn parse_prefers_catalogue() {
        assert_eq!(
            Model::from("gemini-2.0-flash-lite-preview-02-05"),
            Model::Known(KnownModel::Gemini20FlashLite)
        );
        assert_eq!(
            Model::from("gemini-1.5-pro"),
            Model::Custom("gemini-1.5-pro".to_string())
        );
    }

    #[test]
    fn catalogue_defaults() {
        let thinking = Model::Known(KnownModel::Gemini20FlashThinking);
        assert!(thinking.supports_thinking());
        assert_eq!(thinking.max_output_tokens(), 65536);
        assert_eq!(thinking.default_temperature(), 0.9);

        let custom = Model::Custom("gemini-1.5-pro".to_string());
        assert!(!custom.supports_thinking());
        assert_eq!(custom.max_output_tokens(), 8192);
    }
}
