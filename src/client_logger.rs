//! Logging hook for [`Gemini`](crate::Gemini) client traffic.

use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// A trait for capturing API interactions passing through the client.
///
/// # Example
///
/// ```rust,ignore
/// use gemini_chat::{ClientLogger, GenerateContentRequest, GenerateContentResponse, Model};
///
/// struct StderrLogger;
///
/// impl ClientLogger for StderrLogger {
///     fn log_request(&self, model: &Model, request: &GenerateContentRequest) {
///         eprintln!("{model}: {}", serde_json::to_string(request).unwrap());
///     }
///
///     fn log_response(&self, response: &GenerateContentResponse) {
///         eprintln!("response: {}", serde_json::to_string(response).unwrap());
///     }
///
///     fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
///         eprintln!("chunk: {}", serde_json::to_string(chunk).unwrap());
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Called before every request is sent.
    fn log_request(&self, model: &Model, request: &GenerateContentRequest);

    /// Called once per successful non-streaming call.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Called for each parsed event of a streaming call.
    fn log_stream_chunk(&self, chunk: &GenerateContentResponse);
}
