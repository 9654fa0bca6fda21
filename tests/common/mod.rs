//! A scripted provider and recording sinks for driving the controller.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use gemini_chat::{
    CancelHandle, Content, Error, ErrorSink, GenerationConfig, Message, ModelHandle, Notice, Part,
    Provider, ProviderSession, Renderer, Result, TextStream, validate_history,
};

/// What the provider does for one streaming send.
pub enum Reply {
    /// Stream these chunks, then finish.
    Chunks(Vec<&'static str>),
    /// Stream these chunks, each after a delay in milliseconds.
    Delayed(Vec<(u64, &'static str)>),
    /// Stream these chunks, then fail.
    ChunksThenError(Vec<&'static str>, Error),
    /// Stream these chunks, then never yield again.
    Stall(Vec<&'static str>),
    /// Fail before any chunk.
    Fail(Error),
}

#[derive(Default)]
pub struct Script {
    pub replies: VecDeque<Reply>,
    pub thinking: Option<Result<String>>,
    pub thinking_stalls: bool,
    pub construction_error: Option<Error>,
    /// Parts of every streaming send, in call order.
    pub sends: Vec<Vec<Part>>,
    /// History each session was started with.
    pub sessions: Vec<Vec<Content>>,
    /// Models of every thinking request.
    pub thinking_requests: Vec<ModelHandle>,
}

#[derive(Clone, Default)]
pub struct ScriptedProvider {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        let provider = Self::default();
        provider.script.lock().unwrap().replies = replies.into();
        provider
    }

    pub fn with_thinking(self, thinking: Result<String>) -> Self {
        self.script.lock().unwrap().thinking = Some(thinking);
        self
    }

    pub fn push(&self, reply: Reply) {
        self.script.lock().unwrap().replies.push_back(reply);
    }

    pub fn sends(&self) -> Vec<Vec<Part>> {
        self.script.lock().unwrap().sends.clone()
    }

    pub fn sessions(&self) -> Vec<Vec<Content>> {
        self.script.lock().unwrap().sessions.clone()
    }

    pub fn thinking_requests(&self) -> usize {
        self.script.lock().unwrap().thinking_requests.len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn start_session(
        &self,
        _model: ModelHandle,
        _generation: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Box<dyn ProviderSession>> {
        let mut script = self.script.lock().unwrap();
        if let Some(err) = script.construction_error.clone() {
            return Err(err);
        }
        validate_history(&history)?;
        script.sessions.push(history);
        Ok(Box::new(ScriptedSession {
            script: Arc::clone(&self.script),
        }))
    }

    async fn generate(&self, model: &ModelHandle, _prompt: &str) -> Result<String> {
        let (thinking, stalls) = {
            let mut script = self.script.lock().unwrap();
            script.thinking_requests.push(model.clone());
            (script.thinking.clone(), script.thinking_stalls)
        };
        if stalls {
            futures::future::pending::<()>().await;
        }
        thinking.unwrap_or_else(|| Ok("Consider the question.\n\nSo, answer it.".to_string()))
    }
}

struct ScriptedSession {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl ProviderSession for ScriptedSession {
    async fn send_stream(
        &mut self,
        parts: Vec<Part>,
        cancel: CancellationToken,
    ) -> Result<TextStream> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.sends.push(parts);
            script.replies.pop_front()
        };
        let Some(reply) = reply else {
            return Err(Error::internal_server("script exhausted"));
        };
        let owned = |chunks: Vec<&'static str>| {
            chunks
                .into_iter()
                .map(|chunk| Ok(chunk.to_string()))
                .collect::<Vec<Result<String>>>()
        };
        let stream = match reply {
            Reply::Chunks(chunks) => TextStream::new(stream::iter(owned(chunks)), cancel),
            Reply::Delayed(chunks) => TextStream::new(
                stream::iter(chunks).then(|(delay, chunk)| async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(chunk.to_string())
                }),
                cancel,
            ),
            Reply::ChunksThenError(chunks, err) => TextStream::new(
                stream::iter(owned(chunks)).chain(stream::once(async move { Err(err) })),
                cancel,
            ),
            Reply::Stall(chunks) => {
                TextStream::new(stream::iter(owned(chunks)).chain(stream::pending()), cancel)
            }
            Reply::Fail(err) => return Err(err),
        };
        Ok(stream)
    }
}

/// Records every render event.
#[derive(Default)]
pub struct Recorder {
    pub chunks: Vec<String>,
    pub thinking_started: usize,
    pub thinking: Vec<Option<String>>,
    pub restarts: usize,
    pub finished: Vec<Message>,
    pub interrupted: usize,
    pub errors: Vec<String>,
    pub info: Vec<String>,
    /// Cancels through this handle once this many chunks have arrived.
    pub cancel_after: Option<(usize, CancelHandle)>,
    /// Return values of every cancel the recorder issued.
    pub cancel_results: Vec<bool>,
}

impl Recorder {
    pub fn cancelling_after(chunks: usize, handle: CancelHandle) -> Self {
        Self {
            cancel_after: Some((chunks, handle)),
            ..Self::default()
        }
    }

    pub fn text(&self) -> String {
        self.chunks.concat()
    }
}

impl Renderer for Recorder {
    fn start_thinking(&mut self) {
        self.thinking_started += 1;
    }

    fn finish_thinking(&mut self, thinking: Option<&str>) {
        self.thinking.push(thinking.map(str::to_string));
    }

    fn print_text(&mut self, text: &str) {
        self.chunks.push(text.to_string());
        if let Some((after, handle)) = &self.cancel_after
            && self.chunks.len() == *after
        {
            self.cancel_results.push(handle.cancel());
            self.cancel_results.push(handle.cancel());
        }
    }

    fn restart_response(&mut self) {
        self.restarts += 1;
        self.chunks.clear();
    }

    fn finish_response(&mut self, message: &Message) {
        self.finished.push(message.clone());
    }

    fn print_interrupted(&mut self) {
        self.interrupted += 1;
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, info: &str) {
        self.info.push(info.to_string());
    }
}

#[derive(Default)]
pub struct NoticeLog {
    pub notices: Vec<Notice>,
}

impl ErrorSink for NoticeLog {
    fn report(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// The text of the text parts of a send.
pub fn text_of(parts: &[Part]) -> Vec<String> {
    parts.iter().filter_map(|part| part.text.clone()).collect()
}
