//! Server-Sent Events parsing for `streamGenerateContent?alt=sse`.
//!
//! The API sends one `data:` line per event, each carrying a complete
//! [`GenerateContentResponse`].  A mid-stream failure arrives as an event whose
//! JSON body is `{"error": {...}}`.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::GenerateContentResponse;

/// The error body Google APIs use both for HTTP errors and error events.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorDetail {
    pub(crate) fn into_error(self, fallback_code: u16) -> Error {
        Error::api(
            self.code.unwrap_or(fallback_code),
            self.status,
            self.message.unwrap_or_else(|| "unknown error".to_string()),
        )
    }
}

/// Process a stream of bytes into a stream of parsed responses.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    stream::unfold(
        (stream, Vec::<u8>::new()),
        |(mut stream, mut buffer)| async move {
            loop {
                while let Some(event) = extract_event(&mut buffer) {
                    if let Some(event) = event {
                        return Some((event, (stream, buffer)));
                    }
                }

                match stream.next().await {
                    // Payloads are JSON, so a carriage return can only be framing.
                    Some(Ok(bytes)) => buffer.extend(bytes.iter().filter(|&&b| b != b'\r')),
                    Some(Err(e)) => return Some((Err(e), (stream, buffer))),
                    None => {
                        if buffer.iter().all(u8::is_ascii_whitespace) {
                            return None;
                        }
                        buffer.extend_from_slice(b"\n\n");
                        if let Some(Some(event)) = extract_event(&mut buffer) {
                            buffer.clear();
                            return Some((event, (stream, buffer)));
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Splits the first complete event off the front of `buffer`.
///
/// Frames are found on raw bytes so a multi-byte character split across
/// network chunks is decoded only once the whole event has arrived.  Returns
/// `None` when no blank-line terminator is buffered yet, and `Some(None)` for
/// events without data such as comments.
fn extract_event(buffer: &mut Vec<u8>) -> Option<Option<Result<GenerateContentResponse>>> {
    let end = buffer.windows(2).position(|window| window == b"\n\n")?;
    let frame: Vec<u8> = buffer.drain(..end + 2).collect();
    let event_text = match std::str::from_utf8(&frame[..end]) {
        Ok(text) => text,
        Err(e) => {
            return Some(Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            ))));
        }
    };
    let data = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("\n");
    if data.trim().is_empty() {
        return Some(None);
    }
    Some(Some(parse_data(&data)))
}

fn parse_data(data: &str) -> Result<GenerateContentResponse> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    if value.get("error").is_some() {
        let envelope: ErrorEnvelope = serde_json::from_value(value)?;
        return Err(envelope.error.into_error(500));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        chunks: &[&'static str],
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static {
        stream::iter(
            chunks
                .iter()
                .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    const HELLO: &str =
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n";
    const WORLD: &str =
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}]}\n\n";

    async fn texts(chunks: &[&'static str]) -> Vec<Result<String>> {
        process_sse(byte_stream(chunks))
            .map(|event| event.and_then(|response| response.text()))
            .collect()
            .await
    }

    #[tokio::test]
    async fn parses_consecutive_events() {
        let combined: &'static str = Box::leak(format!("{HELLO}{WORLD}").into_boxed_str());
        let texts = texts(&[combined]).await;
        let texts: Vec<_> = texts.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn reassembles_events_split_across_chunks() {
        let texts = texts(&[&HELLO[..10], &HELLO[10..], WORLD]).await;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].as_ref().unwrap(), "Hel");
    }

    #[tokio::test]
    async fn accepts_crlf_framing_and_comments() {
        let texts = texts(&[
            ": keep-alive\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ok\"}]}}]}\r\n\r\n",
        ])
        .await;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].as_ref().unwrap(), "ok");
    }

    #[tokio::test]
    async fn unterminated_final_event_is_parsed() {
        let texts = texts(&["data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"end\"}]}}]}"]).await;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].as_ref().unwrap(), "end");
    }

    #[tokio::test]
    async fn multibyte_character_split_across_chunks() {
        const CAFE: &str =
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"caf\u{e9}\"}]}}]}\n\n";
        let split = CAFE.find('\u{e9}').unwrap() + 1;
        let chunks = vec![
            Ok(Bytes::from_static(&CAFE.as_bytes()[..split])),
            Ok(Bytes::from_static(&CAFE.as_bytes()[split..])),
        ];
        let texts: Vec<_> = process_sse(stream::iter(chunks))
            .map(|event| event.and_then(|response| response.text()))
            .collect()
            .await;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].as_ref().unwrap(), "caf\u{e9}");
    }

    #[tokio::test]
    async fn error_event_becomes_api_error() {
        let texts = texts(&[
            "data: {\"error\":{\"code\":503,\"message\":\"overloaded\",\"status\":\"UNAVAILABLE\"}}\n\n",
        ])
        .await;
        let err = texts[0].as_ref().unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn blocked_candidate_surfaces_as_content_blocked() {
        let texts = texts(&["data: {\"candidates\":[{\"finishReason\":\"RECITATION\"}]}\n\n"]).await;
        assert!(texts[0].as_ref().unwrap_err().is_content_blocked());
    }
}
