use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gemini_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("gemini_chat.client.request_errors");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("gemini_chat.stream.chunks");
pub(crate) static STREAM_BYTES: Counter = Counter::new("gemini_chat.stream.bytes");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("gemini_chat.stream.errors");
pub(crate) static STREAM_CANCELLED: Counter = Counter::new("gemini_chat.stream.cancelled");

pub(crate) static TURNS_STARTED: Counter = Counter::new("gemini_chat.turn.started");
pub(crate) static TURNS_COMPLETED: Counter = Counter::new("gemini_chat.turn.completed");
pub(crate) static TURNS_CANCELLED: Counter = Counter::new("gemini_chat.turn.cancelled");
pub(crate) static TURNS_FAILED: Counter = Counter::new("gemini_chat.turn.failed");
pub(crate) static TURN_BLOCK_RETRIES: Counter = Counter::new("gemini_chat.turn.block_retries");
pub(crate) static TURN_DURATION: Moments = Moments::new("gemini_chat.turn.duration_seconds");

pub(crate) static SESSIONS_CREATED: Counter = Counter::new("gemini_chat.session.created");

pub(crate) static ATTACHMENTS_ENCODED: Counter = Counter::new("gemini_chat.attachments.encoded");
pub(crate) static ATTACHMENT_BYTES: Counter = Counter::new("gemini_chat.attachments.bytes");
pub(crate) static ATTACHMENT_ERRORS: Counter = Counter::new("gemini_chat.attachments.errors");

pub(crate) static THINKING_REQUESTS: Counter = Counter::new("gemini_chat.thinking.requests");
pub(crate) static THINKING_FAILURES: Counter = Counter::new("gemini_chat.thinking.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_CANCELLED);

    collector.register_counter(&TURNS_STARTED);
    collector.register_counter(&TURNS_COMPLETED);
    collector.register_counter(&TURNS_CANCELLED);
    collector.register_counter(&TURNS_FAILED);
    collector.register_counter(&TURN_BLOCK_RETRIES);
    collector.register_moments(&TURN_DURATION);

    collector.register_counter(&SESSIONS_CREATED);

    collector.register_counter(&ATTACHMENTS_ENCODED);
    collector.register_counter(&ATTACHMENT_BYTES);
    collector.register_counter(&ATTACHMENT_ERRORS);

    collector.register_counter(&THINKING_REQUESTS);
    collector.register_counter(&THINKING_FAILURES);
}
