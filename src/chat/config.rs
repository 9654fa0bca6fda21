//! Configuration types for the chat application.
//!
//! Settings are layered: [`SessionConfig`] defaults, then an optional YAML
//! file named by `--config`, then the remaining command-line flags.

use std::path::Path;

use arrrg_derive::CommandLine;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::types::Model;

/// Command-line arguments for the gemini-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.0-flash-thinking-exp-01-21)", "MODEL")]
    pub model: Option<String>,

    /// System instruction for the conversation.
    #[arrrg(optional, "System instruction for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max output tokens per response", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// YAML file with session settings.
    #[arrrg(optional, "YAML file with session settings", "PATH")]
    pub config: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Skip the thinking request before each reply.
    #[arrrg(flag, "Do not request step-by-step thinking")]
    pub no_thinking: bool,
}

/// Resolved configuration for the chat binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Settings handed to the controller.
    pub session: SessionConfig,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    pub fn new() -> Self {
        Self {
            session: SessionConfig::default(),
            use_color: true,
        }
    }

    /// Resolves `args`, reading the YAML file it names if any.
    ///
    /// # Errors
    ///
    /// Fails if the YAML file cannot be read or parsed.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let session = match args.config.as_deref() {
            Some(path) => load_session_config(Path::new(path))?,
            None => SessionConfig::default(),
        };
        Ok(Self::overlay(session, args))
    }

    fn overlay(mut session: SessionConfig, args: ChatArgs) -> Self {
        if let Some(model) = args.model {
            session = session.with_model(Model::from(model.as_str()));
        }
        if let Some(system) = args.system {
            session = session.with_system_instruction(system);
        }
        if let Some(max_tokens) = args.max_tokens {
            session = session.with_max_output_tokens(max_tokens);
        }
        if args.no_thinking {
            session = session.with_thinking(false);
        }
        Self {
            session,
            use_color: !args.no_color,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a [`SessionConfig`] from YAML; missing keys keep their defaults.
pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read {}: {e}", path.display()), e))?;
    serde_yaml::from_str(&text).map_err(|e| {
        Error::serialization(
            format!("Failed to parse {}: {e}", path.display()),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from_args(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-2.0-flash".to_string()),
            system: Some("You are terse.".to_string()),
            max_tokens: Some(2048),
            config: None,
            no_color: true,
            no_thinking: true,
        };
        let config = ChatConfig::from_args(args).unwrap();
        assert_eq!(config.session.model, Model::Known(KnownModel::Gemini20Flash));
        assert_eq!(config.session.system_instruction, "You are terse.");
        assert_eq!(config.session.max_output_tokens, 2048);
        assert!(!config.session.thinking_enabled);
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_model_is_custom() {
        let args = ChatArgs {
            model: Some("gemini-exp-1206".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from_args(args).unwrap();
        assert_eq!(
            config.session.model,
            Model::Custom("gemini-exp-1206".to_string())
        );
        assert!(!config.session.thinking_active());
    }

    #[test]
    fn yaml_file_is_overlaid_by_flags() {
        let path = std::env::temp_dir().join(format!("gemini-chat-{}.yaml", std::process::id()));
        std::fs::write(&path, "top_k: 50\nmax_output_tokens: 1000\ncode_execution_enabled: false\n")
            .unwrap();
        let args = ChatArgs {
            config: Some(path.display().to_string()),
            max_tokens: Some(500),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from_args(args).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.session.top_k, 50);
        assert_eq!(config.session.max_output_tokens, 500);
        assert!(!config.session.code_execution_enabled);
    }

    #[test]
    fn missing_yaml_file_is_an_error() {
        let err = load_session_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("here.yaml"));
    }
}
