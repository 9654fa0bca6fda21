//! Cancellable text chunk streams with a running aggregate.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::{Error, Result};
use crate::observability::{STREAM_BYTES, STREAM_CANCELLED, STREAM_CHUNKS, STREAM_ERRORS};

type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// An ordered stream of text chunks for one send.
///
/// Chunks are yielded in arrival order and appended to a running aggregate.
/// When the supplied [`CancellationToken`] fires, the stream yields a single
/// [`Error::Abort`] and then ends; chunks arriving after that are never
/// observed.  A stream that runs to completion hands its aggregate to the
/// receiver returned by [`TextStream::with_completion`].
pub struct TextStream {
    inner: ChunkStream,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    aggregate: String,
    aggregate_tx: Option<oneshot::Sender<String>>,
    finished: bool,
}

impl TextStream {
    /// Wraps a chunk stream so that it observes `cancel`.
    pub fn new<S>(stream: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
            cancelled: Box::pin(cancel.cancelled_owned()),
            aggregate: String::new(),
            aggregate_tx: None,
            finished: false,
        }
    }

    /// Like [`TextStream::new`], but also returns a receiver that resolves
    /// with the full text once the stream ends cleanly.
    ///
    /// The receiver errors if the stream is cancelled, fails, or is dropped
    /// before reaching its end.
    pub fn with_completion<S>(
        stream: S,
        cancel: CancellationToken,
    ) -> (Self, oneshot::Receiver<String>)
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let mut this = Self::new(stream, cancel);
        this.aggregate_tx = Some(tx);
        (this, rx)
    }

    /// Text received so far.
    pub fn aggregate(&self) -> &str {
        &self.aggregate
    }

    /// Consumes the stream, returning the text received so far.
    pub fn into_aggregate(self) -> String {
        self.aggregate
    }

    fn abort(&mut self) -> Poll<Option<Result<String>>> {
        self.finished = true;
        self.aggregate_tx = None;
        STREAM_CANCELLED.click();
        Poll::Ready(Some(Err(Error::abort("response stream cancelled"))))
    }
}

impl Stream for TextStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            return this.abort();
        }
        loop {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if this.cancelled.as_mut().poll(cx).is_ready() {
                        return this.abort();
                    }
                    if chunk.is_empty() {
                        continue;
                    }
                    STREAM_CHUNKS.click();
                    STREAM_BYTES.count(chunk.len() as u64);
                    this.aggregate.push_str(&chunk);
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Poll::Ready(Some(Err(err))) => {
                    this.finished = true;
                    this.aggregate_tx = None;
                    STREAM_ERRORS.click();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    if let Some(tx) = this.aggregate_tx.take() {
                        let _ = tx.send(this.aggregate.clone());
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
