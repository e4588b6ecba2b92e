//! Files staged for upload with the next submission.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use serde::Serialize;

/// Kind of staged file. At most one of each kind is staged at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Document,
    Voice,
}

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];
const VOICE_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg"];

impl AttachmentKind {
    /// Multipart field name the backend expects.
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::Document => "file",
            Self::Voice => "voice",
        }
    }

    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Document => DOCUMENT_EXTENSIONS,
            Self::Voice => VOICE_EXTENSIONS,
        }
    }

    /// Picker-style filter on the file extension. The backend does its own
    /// validation; this only keeps obviously wrong files out of the picker.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.accepted_extensions().contains(&ext.as_str()))
    }

    pub(crate) fn label_key(&self) -> &'static str {
        match self {
            Self::Document => "common.document",
            Self::Voice => "common.voice",
        }
    }

    pub(crate) fn uploaded_key(&self) -> &'static str {
        match self {
            Self::Document => "common.file_uploaded",
            Self::Voice => "common.voice_file_uploaded",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Voice => f.write_str("voice"),
        }
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "doc" | "document" | "file" => Ok(Self::Document),
            "voice" | "audio" => Ok(Self::Voice),
            other => Err(format!(
                "unknown attachment kind '{other}' (expected 'document' or 'voice')"
            )),
        }
    }
}

/// A file staged for the next multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_name: String,
    pub mime: String,
    pub content: Bytes,
}

impl Attachment {
    pub fn new(
        kind: AttachmentKind,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            kind,
            file_name,
            mime,
            content: content.into(),
        }
    }

    /// Read `path` into memory.
    pub async fn from_path(kind: AttachmentKind, path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(kind, file_name, content))
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
