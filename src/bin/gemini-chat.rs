//! Interactive chat application for conversing with Gemini.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! gemini-chat
//!
//! # Specify a model
//! gemini-chat --model gemini-2.0-flash
//!
//! # Load settings from YAML, skip the thinking request
//! gemini-chat --config chat.yaml --no-thinking
//! ```
//!
//! Set `RUST_LOG=gemini_chat=debug` to see request logs on stderr.

use std::path::Path;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use gemini_chat::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use gemini_chat::{AttachmentSource, ChatController, Gemini, KnownModel, Model, PendingFile};

const SETTINGS_NOTICE: &str = "New settings will apply to your next message.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("gemini-chat [OPTIONS]");
    let config = ChatConfig::from_args(args)?;
    let use_color = config.use_color;

    let client = Gemini::new(None)?;
    let mut controller = ChatController::new(client, config.session);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut notices = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    let cancel = controller.cancel_handle();
    ctrlc::set_handler(move || {
        cancel.cancel();
    })?;

    println!("Gemini Chat (model: {})", controller.config().model);
    if let Some(welcome) = controller.conversation().last() {
        println!("{}", welcome.content);
    }
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() && controller.pending_files().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    if !handle_command(cmd, &mut controller, &mut renderer) {
                        break;
                    }
                    continue;
                }

                println!("Gemini:");
                if let Err(err) = controller.submit(line, &mut renderer, &mut notices).await {
                    renderer.print_error(&err.to_string());
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Applies one slash command; returns false when the user asked to quit.
fn handle_command(
    cmd: ChatCommand,
    controller: &mut ChatController<Gemini>,
    renderer: &mut PlainTextRenderer,
) -> bool {
    match cmd {
        ChatCommand::Quit => {
            println!("Goodbye!");
            return false;
        }
        ChatCommand::Reset => {
            controller.reset();
            renderer.print_info("Conversation reset.");
            if let Some(welcome) = controller.conversation().last() {
                renderer.print_info(&welcome.content);
            }
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Model(name) => {
            let model = Model::from(name.as_str());
            let thinking = model.supports_thinking();
            controller.update_config(|config| config.with_model(model));
            renderer.print_info(&format!("Model changed to: {name}"));
            if !thinking {
                renderer.print_info("This model does not support the thinking request.");
            }
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::Models => print_models(controller.config().model.known()),
        ChatCommand::System(prompt) => {
            match prompt {
                Some(prompt) => {
                    renderer.print_info(&format!("System instruction set to: {prompt}"));
                    controller.update_config(|config| config.with_system_instruction(prompt));
                }
                None => {
                    controller.update_config(|config| {
                        config.with_system_instruction(gemini_chat::DEFAULT_SYSTEM_PROMPT)
                    });
                    renderer.print_info("System instruction restored to the default.");
                }
            }
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::MaxTokens(value) => {
            controller.update_config(|config| config.with_max_output_tokens(value));
            renderer.print_info(&format!("max output tokens set to {value}"));
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::Temperature(value) => {
            controller.update_config(|config| config.with_temperature(value));
            renderer.print_info(&format!("temperature set to {value:.2}"));
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::TopP(value) => {
            controller.update_config(|config| config.with_top_p(value));
            renderer.print_info(&format!("top-p set to {value:.2}"));
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::TopK(value) => {
            controller.update_config(|config| config.with_top_k(value));
            renderer.print_info(&format!("top-k set to {value}"));
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::Thinking(enabled) => {
            controller.update_config(|config| config.with_thinking(enabled));
            if enabled && !controller.config().thinking_active() {
                renderer.print_info("Thinking enabled, but the current model does not support it.");
            } else if enabled {
                renderer.print_info("Thinking enabled.");
            } else {
                renderer.print_info("Thinking disabled.");
            }
        }
        ChatCommand::CodeExecution(enabled) => {
            controller.update_config(|config| config.with_code_execution(enabled));
            if enabled {
                renderer.print_info("Code execution enabled.");
            } else {
                renderer.print_info("Code execution disabled.");
            }
            renderer.print_info(SETTINGS_NOTICE);
        }
        ChatCommand::Attach { path, mime_type } => {
            if !Path::new(&path).is_file() {
                renderer.print_error(&format!("No such file: {path}"));
            } else {
                let file = PendingFile::from_path(&path, mime_type);
                renderer.print_info(&format!("Attached {} ({})", file.name(), file.mime_type()));
                controller.attach(file);
            }
        }
        ChatCommand::Files => {
            let files = controller.pending_files();
            if files.is_empty() {
                renderer.print_info("No files attached.");
            }
            for file in files {
                println!("    {} ({})", file.name(), file.mime_type());
            }
        }
        ChatCommand::Detach => {
            controller.detach_all();
            renderer.print_info("Attachments removed.");
        }
        ChatCommand::ShowConfig => print_config(controller),
        ChatCommand::Invalid(message) => renderer.print_error(&message),
    }
    true
}

fn print_models(current: Option<KnownModel>) {
    println!("    Known models:");
    for model in KnownModel::ALL {
        let marker = if Some(model) == current { "*" } else { " " };
        println!(
            "    {marker} {} ({}): {}",
            model.id(),
            model.display_name(),
            model.description()
        );
    }
}

fn print_config(controller: &ChatController<Gemini>) {
    let config = controller.config();
    let on_off = |value: bool| if value { "on" } else { "off" };
    println!("    Current Configuration:");
    println!("      Model: {}", config.model);
    println!("      Max output tokens: {}", config.max_output_tokens);
    println!("      Temperature: {:.2}", config.temperature);
    println!("      Top-p: {:.2}", config.top_p);
    println!("      Top-k: {}", config.top_k);
    println!("      Thinking: {}", on_off(config.thinking_active()));
    println!("      Code execution: {}", on_off(config.code_execution_enabled));
    println!("      System instruction: {}", config.system_instruction);
    println!(
        "      Messages: {}",
        controller.conversation().len()
    );
}
