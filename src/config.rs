//! Session configuration.
//!
//! A [`SessionConfig`] is the snapshot the controller reads when it builds a
//! provider session.  Editing it never touches a live session; the controller
//! drops its session on every change and rebuilds it lazily on the next send.

use serde::{Deserialize, Serialize};

use crate::types::{GenerationConfig, KnownModel, Model};

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and knowledgeable AI assistant. You can engage with any topic and provide comprehensive information while maintaining factual accuracy. You should aim to be direct and thorough in your responses. When discussing complex or sensitive topics, provide balanced and well-reasoned explanations.";

/// Appended to every system instruction sent to the provider.
const SYSTEM_INSTRUCTION_SUFFIX: &str = "Please provide direct, comprehensive responses. When encountering potentially sensitive topics, focus on providing factual, analytical insights while maintaining professionalism.";

const MIN_TEMPERATURE: f32 = 0.7;
const MIN_TOP_P: f32 = 0.95;
const MIN_TOP_K: u32 = 40;

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System instruction bound to the model.
    pub system_instruction: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    pub top_p: f32,

    /// Top-k sampling limit.
    pub top_k: u32,

    /// Maximum tokens per response.
    pub max_output_tokens: u32,

    /// Whether the model may run code server-side.
    pub code_execution_enabled: bool,

    /// Whether the user opted into the thinking side channel.
    ///
    /// Only honored for models that support it; see [`SessionConfig::thinking_active`].
    pub thinking_enabled: bool,
}

impl SessionConfig {
    /// Creates a new SessionConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.0-flash-thinking-exp-01-21
    /// - Temperature 0.7, top-p 0.95, top-k 64
    /// - Max output tokens: 65536
    /// - Code execution and thinking: enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gemini20FlashThinking),
            system_instruction: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 65536,
            code_execution_enabled: true,
            thinking_enabled: true,
        }
    }

    /// Switches model and applies its catalogue defaults for max output
    /// tokens and temperature.
    pub fn with_model(mut self, model: Model) -> Self {
        self.max_output_tokens = model.max_output_tokens();
        self.temperature = model.default_temperature();
        self.model = model;
        self
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the top-k value.
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Enables or disables server-side code execution.
    pub fn with_code_execution(mut self, enabled: bool) -> Self {
        self.code_execution_enabled = enabled;
        self
    }

    /// Opts in or out of the thinking side channel.
    pub fn with_thinking(mut self, enabled: bool) -> Self {
        self.thinking_enabled = enabled;
        self
    }

    /// True when the user opted into thinking and the model supports it.
    pub fn thinking_active(&self) -> bool {
        self.thinking_enabled && self.model.supports_thinking()
    }

    /// The system instruction as sent to the provider.
    pub fn effective_system_instruction(&self) -> String {
        format!("{}\n{SYSTEM_INSTRUCTION_SUFFIX}", self.system_instruction)
    }

    /// Generation parameters for a new session.
    ///
    /// Sampling parameters are floored at temperature 0.7, top-p 0.95 and
    /// top-k 40; a single plain-text candidate is requested.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature.max(MIN_TEMPERATURE),
            top_p: self.top_p.max(MIN_TOP_P),
            top_k: self.top_k.max(MIN_TOP_K),
            max_output_tokens: self.max_output_tokens,
            response_mime_type: "text/plain".to_string(),
            candidate_count: Some(1),
            stop_sequences: Vec::new(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
