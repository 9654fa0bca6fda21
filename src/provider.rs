//! The seam between the controller and the generative-model service.
//!
//! A [`Provider`] builds [`ProviderSession`]s and answers one-shot prompts.
//! [`Gemini`] is the production provider; tests substitute scripted doubles.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::client::Gemini;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::text_stream::TextStream;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Model, Part, Role, Tool};

/// A model bound to its system instruction and tool set.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    model: Model,
    system_instruction: Option<String>,
    code_execution: bool,
}

impl ModelHandle {
    /// Binds a model to an instruction and tool set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the model identifier is empty.
    pub fn new(
        model: Model,
        system_instruction: Option<String>,
        code_execution: bool,
    ) -> Result<Self> {
        if model.to_string().trim().is_empty() {
            return Err(Error::construction("model identifier is empty"));
        }
        Ok(Self {
            model,
            system_instruction,
            code_execution,
        })
    }

    /// Builds the handle a chat session uses for `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::new(
            config.model.clone(),
            Some(config.effective_system_instruction()),
            config.code_execution_enabled,
        )
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn code_execution(&self) -> bool {
        self.code_execution
    }

    /// Assembles a request for this model.
    pub fn request(
        &self,
        contents: Vec<Content>,
        generation_config: Option<GenerationConfig>,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction.clone().map(Content::instruction),
            tools: if self.code_execution {
                vec![Tool::code_execution()]
            } else {
                Vec::new()
            },
            generation_config,
        }
    }
}

/// Checks that `history` starts with a user turn and strictly alternates.
///
/// # Errors
///
/// Returns [`Error::Construction`] describing the first offending entry.
pub fn validate_history(history: &[Content]) -> Result<()> {
    for (index, content) in history.iter().enumerate() {
        let expected = if index % 2 == 0 { Role::User } else { Role::Model };
        if content.role != Some(expected) {
            return Err(Error::construction(format!(
                "history entry {index} should be {expected}, found {}",
                content
                    .role
                    .map(|role| role.to_string())
                    .unwrap_or_else(|| "no role".to_string())
            )));
        }
    }
    Ok(())
}

/// Builds sessions and answers one-shot prompts.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Opens a multi-turn session seeded with `history`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the session cannot be built.
    fn start_session(
        &self,
        model: ModelHandle,
        generation: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Box<dyn ProviderSession>>;

    /// Sends a single prompt outside any session and returns the full text.
    async fn generate(&self, model: &ModelHandle, prompt: &str) -> Result<String>;
}

/// A live multi-turn session.
#[async_trait]
pub trait ProviderSession: Send {
    /// Sends `parts` as the next user turn and streams the reply.
    ///
    /// The returned stream observes `cancel`.  Only an exchange whose stream
    /// runs to completion becomes part of the session's history.
    async fn send_stream(&mut self, parts: Vec<Part>, cancel: CancellationToken)
    -> Result<TextStream>;
}

/// A [`ProviderSession`] backed by the Gemini REST API.
///
/// The API is stateless, so the session replays its history on every send.
pub struct GeminiSession {
    client: Gemini,
    model: ModelHandle,
    generation: GenerationConfig,
    history: Vec<Content>,
    pending: Option<(Content, oneshot::Receiver<String>)>,
}

impl GeminiSession {
    /// The exchanges this session will replay, including any completed
    /// since the last send.
    pub fn history(&mut self) -> &[Content] {
        self.settle_pending();
        &self.history
    }

    fn settle_pending(&mut self) {
        if let Some((user, mut rx)) = self.pending.take()
            && let Ok(text) = rx.try_recv()
        {
            self.history.push(user);
            self.history.push(Content::text(Role::Model, text));
        }
    }
}

#[async_trait]
impl ProviderSession for GeminiSession {
    async fn send_stream(
        &mut self,
        parts: Vec<Part>,
        cancel: CancellationToken,
    ) -> Result<TextStream> {
        self.settle_pending();
        let user = Content::new(Role::User, parts);
        let mut contents = self.history.clone();
        contents.push(user.clone());
        let request = self.model.request(contents, Some(self.generation.clone()));

        let responses = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::abort("request cancelled before the response began")),
            responses = self.client.stream_generate_content(self.model.model(), &request) => responses?,
        };
        let chunks = responses.map(|response| response.and_then(|r| r.text()));
        let (stream, rx) = TextStream::with_completion(chunks, cancel);
        self.pending = Some((user, rx));
        Ok(stream)
    }
}

#[async_trait]
impl Provider for Gemini {
    fn start_session(
        &self,
        model: ModelHandle,
        generation: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Box<dyn ProviderSession>> {
        validate_history(&history)?;
        Ok(Box::new(GeminiSession {
            client: self.clone(),
            model,
            generation,
            history,
            pending: None,
        }))
    }

    async fn generate(&self, model: &ModelHandle, prompt: &str) -> Result<String> {
        let request = model.request(vec![Content::text(Role::User, prompt)], None);
        self.generate_content(model.model(), &request).await?.text()
    }
}
