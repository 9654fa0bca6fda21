//! Slash command parsing for the chat application.
//!
//! Lines starting with `/` control the session and are never sent to the
//! model.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Start the conversation over.
    Reset,

    /// Change the model.
    Model(String),

    /// List the catalogued models.
    Models,

    /// Set the system instruction; `None` restores the default.
    System(Option<String>),

    /// Set the maximum output tokens per response.
    MaxTokens(u32),

    /// Set the sampling temperature.
    Temperature(f32),

    /// Set the top-p value.
    TopP(f32),

    /// Set the top-k value.
    TopK(u32),

    /// Toggle the thinking request.
    Thinking(bool),

    /// Toggle server-side code execution.
    CodeExecution(bool),

    /// Stage a file, with an optional MIME type.
    Attach {
        path: String,
        mime_type: Option<String>,
    },

    /// List staged files.
    Files,

    /// Drop every staged file.
    Detach,

    /// Display help information.
    Help,

    /// Show the current configuration.
    ShowConfig,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent as a message.
///
/// # Examples
///
/// ```
/// # use gemini_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model gemini-2.0-flash").is_some());
/// assert!(parse_command("Hello, Gemini!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "reset" | "clear" => ChatCommand::Reset,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "models" => ChatCommand::Models,
        "system" => ChatCommand::System(argument.map(str::to_string)),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "config" => ChatCommand::ShowConfig,
        "max-tokens" | "max_tokens" => match argument.map(str::parse::<u32>) {
            Some(Ok(value)) if value > 0 => ChatCommand::MaxTokens(value),
            Some(_) => ChatCommand::Invalid("/max-tokens expects a positive integer".to_string()),
            None => ChatCommand::Invalid("/max-tokens requires a value".to_string()),
        },
        "temperature" => parse_f32_command(argument, 0.0, 2.0, "/temperature", ChatCommand::Temperature),
        "top-p" | "top_p" => parse_f32_command(argument, 0.0, 1.0, "/top-p", ChatCommand::TopP),
        "top-k" | "top_k" => match argument.map(str::parse::<u32>) {
            Some(Ok(value)) => ChatCommand::TopK(value),
            Some(Err(_)) => ChatCommand::Invalid("/top-k expects a positive integer".to_string()),
            None => ChatCommand::Invalid("/top-k requires a value".to_string()),
        },
        "thinking" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Thinking(value),
            None => ChatCommand::Invalid("/thinking expects 'on' or 'off'".to_string()),
        },
        "code" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::CodeExecution(value),
            None => ChatCommand::Invalid("/code expects 'on' or 'off'".to_string()),
        },
        "attach" => parse_attach(argument),
        "files" => ChatCommand::Files,
        "detach" => ChatCommand::Detach,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_attach(argument: Option<&str>) -> ChatCommand {
    let Some(arg) = argument else {
        return ChatCommand::Invalid("/attach requires a file path".to_string());
    };
    match arg.rsplit_once(' ') {
        Some((path, mime)) if mime.contains('/') && !path.trim().is_empty() => {
            ChatCommand::Attach {
                path: path.trim().to_string(),
                mime_type: Some(mime.to_string()),
            }
        }
        _ => ChatCommand::Attach {
            path: arg.to_string(),
            mime_type: None,
        },
    }
}

fn parse_f32_command<F>(argument: Option<&str>, min: f32, max: f32, name: &str, constructor: F) -> ChatCommand
where
    F: Fn(f32) -> ChatCommand,
{
    let Some(arg) = argument else {
        return ChatCommand::Invalid(format!("{name} requires a value"));
    };
    match arg.parse::<f32>() {
        Ok(value) if value.is_finite() && value >= min && value <= max => constructor(value),
        _ => ChatCommand::Invalid(format!("{name} expects a value between {min} and {max}")),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /reset                 Start the conversation over
  /model <name>          Change the model (e.g., /model gemini-2.0-flash)
  /models                List known models
  /system [prompt]       Set system instruction (no argument restores the default)
  /max-tokens <n>        Set maximum output tokens
  /temperature <v>       Set temperature 0.0-2.0 (values below 0.7 are raised)
  /top-p <v>             Set top-p 0.0-1.0 (values below 0.95 are raised)
  /top-k <n>             Set top-k (values below 40 are raised)
  /thinking on|off       Request step-by-step thinking before each reply
  /code on|off           Allow server-side code execution
  /attach <path> [mime]  Attach a file to the next message
  /files                 List attached files
  /detach                Remove all attached files
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat

Press Ctrl-C while a reply is streaming to cancel it."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /q  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_reset() {
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Reset));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            parse_command("/model   gemini-2.0-flash  "),
            Some(ChatCommand::Model("gemini-2.0-flash".to_string()))
        );
        assert!(matches!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
        assert_eq!(parse_command("/models"), Some(ChatCommand::Models));
    }

    #[test]
    fn parse_system() {
        assert_eq!(
            parse_command("/system Answer in French"),
            Some(ChatCommand::System(Some("Answer in French".to_string())))
        );
        assert_eq!(parse_command("/system"), Some(ChatCommand::System(None)));
    }

    #[test]
    fn parse_sampling() {
        assert_eq!(
            parse_command("/temperature 1.5"),
            Some(ChatCommand::Temperature(1.5))
        );
        assert_eq!(parse_command("/top-p 0.5"), Some(ChatCommand::TopP(0.5)));
        assert_eq!(parse_command("/top_k 64"), Some(ChatCommand::TopK(64)));
        assert_eq!(
            parse_command("/max-tokens 1024"),
            Some(ChatCommand::MaxTokens(1024))
        );
        assert!(matches!(
            parse_command("/temperature 3"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("between")
        ));
        assert!(matches!(
            parse_command("/max-tokens 0"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_toggles() {
        assert_eq!(
            parse_command("/thinking off"),
            Some(ChatCommand::Thinking(false))
        );
        assert_eq!(
            parse_command("/code on"),
            Some(ChatCommand::CodeExecution(true))
        );
        assert!(matches!(
            parse_command("/code maybe"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
    }

    #[test]
    fn parse_attachments() {
        assert_eq!(
            parse_command("/attach photo.png"),
            Some(ChatCommand::Attach {
                path: "photo.png".to_string(),
                mime_type: None,
            })
        );
        assert_eq!(
            parse_command("/attach notes.bin text/plain"),
            Some(ChatCommand::Attach {
                path: "notes.bin".to_string(),
                mime_type: Some("text/plain".to_string()),
            })
        );
        assert_eq!(
            parse_command("/attach My Documents/report.pdf"),
            Some(ChatCommand::Attach {
                path: "My Documents/report.pdf".to_string(),
                mime_type: None,
            })
        );
        assert!(matches!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(_))
        ));
        assert_eq!(parse_command("/files"), Some(ChatCommand::Files));
        assert_eq!(parse_command("/detach"), Some(ChatCommand::Detach));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello, Gemini!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_mentions_every_command() {
        let help = help_text();
        for command in [
            "/reset", "/model", "/models", "/system", "/max-tokens", "/temperature", "/top-p",
            "/top-k", "/thinking", "/code", "/attach", "/files", "/detach", "/config", "/quit",
        ] {
            assert!(help.contains(command), "{command} missing from help");
        }
    }
}
