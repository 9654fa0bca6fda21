//! Turns attached files into inline provider parts.
//!
//! Encoding is all-or-nothing: [`encode_all`] reads every file concurrently
//! and fails the whole batch on the first unreadable file, so a request never
//! goes out with a partial attachment list.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use futures::future::try_join_all;

use crate::error::{Error, Result};
use crate::observability::{ATTACHMENTS_ENCODED, ATTACHMENT_BYTES, ATTACHMENT_ERRORS};
use crate::types::{Blob, FileRef, Part};

/// A file supplied by the UI for the next send.
///
/// The core performs no size or type validation; whatever the source reports
/// is forwarded.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// The file name shown to the user.
    fn name(&self) -> &str;

    /// The MIME type the file is sent as.
    fn mime_type(&self) -> &str;

    /// Size in bytes, if known without reading.
    fn size_hint(&self) -> Option<u64> {
        None
    }

    /// Reads the complete file contents.
    async fn read_bytes(&self) -> io::Result<Bytes>;

    /// The reference recorded on the user message.
    fn file_ref(&self) -> FileRef {
        FileRef {
            name: self.name().to_string(),
            mime_type: self.mime_type().to_string(),
            size: self.size_hint(),
        }
    }
}

/// Where a [`PendingFile`] gets its bytes from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Bytes already in memory.
    Bytes(Bytes),
    /// A path read when the send happens.
    Path(PathBuf),
}

/// A staged attachment.
#[derive(Debug, Clone)]
pub struct PendingFile {
    name: String,
    mime_type: String,
    source: FileSource,
}

impl PendingFile {
    /// Creates an attachment from in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }

    /// Creates an attachment read from disk at send time.
    ///
    /// The MIME type is taken from `mime_type` when given, otherwise guessed
    /// from the file extension.
    pub fn from_path(path: impl Into<PathBuf>, mime_type: Option<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_type.unwrap_or_else(|| guess_mime_type(&name).to_string());
        Self {
            name,
            mime_type,
            source: FileSource::Path(path),
        }
    }

    /// Where the bytes come from.
    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

#[async_trait]
impl AttachmentSource for PendingFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size_hint(&self) -> Option<u64> {
        match &self.source {
            FileSource::Bytes(bytes) => Some(bytes.len() as u64),
            FileSource::Path(_) => None,
        }
    }

    async fn read_bytes(&self) -> io::Result<Bytes> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// Encodes one file into an inline-data part.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file's bytes cannot be read.
pub async fn encode(file: &dyn AttachmentSource) -> Result<Part> {
    let bytes = file.read_bytes().await.map_err(|err| {
        ATTACHMENT_ERRORS.click();
        Error::read(err.to_string(), file.name(), err)
    })?;
    ATTACHMENTS_ENCODED.click();
    ATTACHMENT_BYTES.count(bytes.len() as u64);
    Ok(Part::inline_data(Blob {
        mime_type: file.mime_type().to_string(),
        data: STANDARD.encode(&bytes),
    }))
}

/// Encodes every file concurrently, preserving input order.
///
/// # Errors
///
/// Fails with the first [`Error::Read`]; no parts are returned in that case.
pub async fn encode_all<F: AttachmentSource>(files: &[F]) -> Result<Vec<Part>> {
    try_join_all(files.iter().map(|file| encode(file))).await
}

/// Best-effort MIME type from a file name's extension.
pub fn guess_mime_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "mp3" => "audio/mp3",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
