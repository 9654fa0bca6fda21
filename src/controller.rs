//! The streaming chat controller.
//!
//! [`ChatController`] owns the conversation, the live provider session and
//! the staged attachments, and drives one turn at a time through
//! [`TurnState`].  Every accepted submission appends exactly one user message
//! and then exactly one of: a model message, a cancellation notice, or a
//! failure notice.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::conversation::Conversation;
use crate::encoder::{self, AttachmentSource, PendingFile};
use crate::error::{Error, Result};
use crate::observability::{
    SESSIONS_CREATED, TURN_BLOCK_RETRIES, TURN_DURATION, TURNS_CANCELLED, TURNS_COMPLETED,
    TURNS_FAILED, TURNS_STARTED,
};
use crate::policy;
use crate::provider::{ModelHandle, Provider, ProviderSession};
use crate::render::{ErrorSink, Notice, Renderer};
use crate::thinking;
use crate::types::{Message, MessageDraft, Part};

/// Appended when the user cancels a turn.
pub const CANCELLED_NOTICE: &str = "Response generation cancelled.";

/// Appended when a turn fails for any reason other than cancellation.
pub const FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

/// Where the controller is in the current turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingThinking,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

/// How a submitted turn ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model message that was appended.
    Completed(Message),
    Cancelled,
    /// The error behind the failure notice.
    Failed(Error),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TurnOutcome::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TurnOutcome::Failed(_))
    }
}

/// Cancels the in-flight turn from anywhere, e.g. a signal handler.
///
/// Cloning is cheap and every clone controls the same controller.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl CancelHandle {
    /// Cancels the in-flight turn.
    ///
    /// Returns false, and does nothing, when no turn is in flight or it was
    /// already cancelled.
    pub fn cancel(&self) -> bool {
        let token = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// True while a turn can still be cancelled.
    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        token
    }

    fn disarm(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Drives chat turns against a [`Provider`].
pub struct ChatController<P: Provider> {
    provider: P,
    config: SessionConfig,
    conversation: Conversation,
    session: Option<Box<dyn ProviderSession>>,
    pending_files: Vec<PendingFile>,
    cancel: CancelHandle,
    state: TurnState,
}

impl<P: Provider> ChatController<P> {
    /// Creates a controller with a fresh conversation.
    ///
    /// No provider session is built until the first submission.
    pub fn new(provider: P, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            conversation: Conversation::new(),
            session: None,
            pending_files: Vec::new(),
            cancel: CancelHandle::default(),
            state: TurnState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// True if a provider session is currently live.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// A handle that cancels whichever turn is in flight.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancels the in-flight turn; see [`CancelHandle::cancel`].
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    /// Stages a file for the next submission.
    pub fn attach(&mut self, file: PendingFile) {
        self.pending_files.push(file);
    }

    pub fn pending_files(&self) -> &[PendingFile] {
        &self.pending_files
    }

    /// Drops every staged file.
    pub fn detach_all(&mut self) {
        self.pending_files.clear();
    }

    /// Replaces the configuration.
    ///
    /// The live session is dropped; the next submission builds a new one
    /// from the conversation's history.
    pub fn set_config(&mut self, config: SessionConfig) {
        tracing::debug!(model = %config.model, "configuration changed");
        self.config = config;
        self.session = None;
    }

    /// Applies `f` to a copy of the configuration and installs the result.
    pub fn update_config(&mut self, f: impl FnOnce(SessionConfig) -> SessionConfig) {
        self.set_config(f(self.config.clone()));
    }

    /// Starts over with only the welcome message and no live session.
    ///
    /// Staged files are kept.
    pub fn reset(&mut self) {
        self.conversation.reset();
        self.session = None;
        self.state = TurnState::Idle;
    }

    /// Runs one turn for `prompt` and any staged files.
    ///
    /// Staged files are consumed whatever the outcome.  Failures of the turn
    /// itself are reported through `errors`, recorded in the conversation,
    /// and returned as [`TurnOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without touching any state when the
    /// prompt is blank and no files are staged.
    pub async fn submit(
        &mut self,
        prompt: &str,
        renderer: &mut dyn Renderer,
        errors: &mut dyn ErrorSink,
    ) -> Result<TurnOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() && self.pending_files.is_empty() {
            return Err(Error::validation(
                "a message needs text or at least one attached file",
                Some("prompt".to_string()),
            ));
        }

        TURNS_STARTED.click();
        let started = Instant::now();
        let files = std::mem::take(&mut self.pending_files);
        let token = self.cancel.arm();

        // The session must be seeded before this turn's user message exists.
        let session = self.ensure_session();
        let file_refs = files.iter().map(AttachmentSource::file_ref).collect();
        self.conversation
            .append(MessageDraft::user(display_content(prompt, &files)).with_files(file_refs));

        let result = match session {
            Ok(()) => self.run_turn(prompt, &files, &token, renderer).await,
            Err(err) => Err(err),
        };
        self.cancel.disarm();

        let outcome = self.finish_turn(result, renderer, errors);
        TURN_DURATION.add(started.elapsed().as_secs_f64());
        self.transition(TurnState::Idle);
        Ok(outcome)
    }

    fn ensure_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let model = ModelHandle::from_config(&self.config)?;
        let history = self.conversation.history_view();
        tracing::debug!(model = %self.config.model, history = history.len(), "starting provider session");
        let session =
            self.provider
                .start_session(model, self.config.generation_config(), history)?;
        SESSIONS_CREATED.click();
        self.session = Some(session);
        Ok(())
    }

    async fn run_turn(
        &mut self,
        prompt: &str,
        files: &[PendingFile],
        token: &CancellationToken,
        renderer: &mut dyn Renderer,
    ) -> Result<(String, Option<String>)> {
        let thinking = if self.config.thinking_active() && !prompt.is_empty() {
            self.transition(TurnState::AwaitingThinking);
            renderer.start_thinking();
            let thinking = tokio::select! {
                _ = token.cancelled() => None,
                thinking = thinking::fetch_thinking(&self.provider, prompt, &self.config.model) => thinking,
            };
            renderer.finish_thinking(thinking.as_deref());
            thinking
        } else {
            None
        };
        if token.is_cancelled() {
            return Err(Error::abort("cancelled while waiting for thinking"));
        }

        self.transition(TurnState::Streaming);
        let attachments = encoder::encode_all(files).await?;
        let session = self
            .session
            .as_deref_mut()
            .ok_or_else(|| Error::construction("no provider session"))?;

        let mut attempts = 0;
        let mut text_prompt = prompt.to_string();
        let text = loop {
            let parts = message_parts(&text_prompt, &attachments);
            match stream_reply(session, parts, token, renderer).await {
                Err(err) if attempts < policy::MAX_BLOCK_RETRIES && policy::is_content_block(&err) => {
                    attempts += 1;
                    TURN_BLOCK_RETRIES.click();
                    tracing::warn!(error = %err, "response blocked, retrying with reframed prompt");
                    renderer.restart_response();
                    text_prompt = policy::reframe_prompt(prompt);
                }
                result => break result?,
            }
        };
        Ok((text, thinking))
    }

    fn finish_turn(
        &mut self,
        result: Result<(String, Option<String>)>,
        renderer: &mut dyn Renderer,
        errors: &mut dyn ErrorSink,
    ) -> TurnOutcome {
        match result {
            Ok((text, thinking)) => {
                self.transition(TurnState::Completed);
                TURNS_COMPLETED.click();
                let message = self
                    .conversation
                    .append(MessageDraft::model(text).with_thinking(thinking))
                    .clone();
                renderer.finish_response(&message);
                TurnOutcome::Completed(message)
            }
            Err(err) if err.is_abort() => {
                self.transition(TurnState::Cancelled);
                TURNS_CANCELLED.click();
                tracing::info!("turn cancelled");
                self.conversation.append(MessageDraft::system(CANCELLED_NOTICE));
                renderer.print_interrupted();
                TurnOutcome::Cancelled
            }
            Err(err) => {
                self.transition(TurnState::Failed);
                TURNS_FAILED.click();
                tracing::error!(error = %err, kind = ?err.kind(), "turn failed");
                if err.is_construction() {
                    self.session = None;
                }
                self.conversation.append(MessageDraft::system(FAILURE_NOTICE));
                renderer.print_error(FAILURE_NOTICE);
                errors.report(Notice::for_error(&err));
                TurnOutcome::Failed(err)
            }
        }
    }

    fn transition(&mut self, next: TurnState) {
        tracing::trace!(from = ?self.state, to = ?next, "turn state");
        self.state = next;
    }
}

async fn stream_reply(
    session: &mut dyn ProviderSession,
    parts: Vec<Part>,
    token: &CancellationToken,
    renderer: &mut dyn Renderer,
) -> Result<String> {
    let mut stream = session.send_stream(parts, token.clone()).await?;
    while let Some(chunk) = stream.next().await {
        renderer.print_text(&chunk?);
    }
    Ok(stream.into_aggregate())
}

fn message_parts(prompt: &str, attachments: &[Part]) -> Vec<Part> {
    let mut parts = Vec::with_capacity(attachments.len() + 1);
    if !prompt.is_empty() {
        parts.push(Part::text(prompt));
    }
    parts.extend_from_slice(attachments);
    parts
}

/// The text shown for a user message, noting any attached files.
fn display_content(prompt: &str, files: &[PendingFile]) -> String {
    if files.is_empty() {
        return prompt.to_string();
    }
    let names = files
        .iter()
        .map(AttachmentSource::name)
        .collect::<Vec<_>>()
        .join(", ");
    if prompt.is_empty() {
        format!("[Attached files: {names}]")
    } else {
        format!("{prompt}\n\n[Attached files: {names}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_handle_is_idempotent() {
        let handle = CancelHandle::default();
        assert!(!handle.cancel());
        let token = handle.arm();
        assert!(handle.is_armed());
        assert!(handle.clone().cancel());
        assert!(token.is_cancelled());
        assert!(!handle.cancel());
        assert!(!handle.is_armed());
    }

    #[test]
    fn display_content_lists_files() {
        let files = vec![
            PendingFile::from_bytes("a.png", "image/png", &b"a"[..]),
            PendingFile::from_bytes("b.pdf", "application/pdf", &b"b"[..]),
        ];
        assert_eq!(
            display_content("Look", &files),
            "Look\n\n[Attached files: a.png, b.pdf]"
        );
        assert_eq!(display_content("", &files), "[Attached files: a.png, b.pdf]");
        assert_eq!(display_content("Look", &[]), "Look");
    }

    #[test]
    fn text_part_comes_first_and_is_omitted_when_blank() {
        let attachment = Part::text("stand-in");
        let parts = message_parts("Hi", std::slice::from_ref(&attachment));
        assert_eq!(parts, vec![Part::text("Hi"), attachment.clone()]);
        assert_eq!(message_parts("", std::slice::from_ref(&attachment)), vec![attachment]);
    }
}
