//! Wire-ready request descriptors, one builder strategy per capability mode.

use serde_json::json;

use crate::i18n::Language;
use crate::session::CapabilityMode;
use crate::session::attachment::Attachment;

/// Backend endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Predict,
    Analyze,
    Research,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Health => "",
            Self::Predict => "api/predict/",
            Self::Analyze => "api/analyze/",
            Self::Research => "api/research/",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Health)
    }
}

/// One field of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        attachment: Attachment,
    },
}

impl FormPart {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// Everything the transport needs to issue one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub endpoint: Endpoint,
    pub body: RequestBody,
}

impl RequestEnvelope {
    pub fn health() -> Self {
        Self {
            endpoint: Endpoint::Health,
            body: RequestBody::Empty,
        }
    }

    /// Envelope for `mode`, built by the mode's strategy.
    pub fn for_mode(mode: CapabilityMode, input: &RequestInput<'_>) -> Self {
        mode.request_strategy().build(input)
    }

    /// Field names present in the body, in wire order.
    pub fn field_names(&self) -> Vec<&str> {
        match &self.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Json(value) => value
                .as_object()
                .map(|map| map.keys().map(String::as_str).collect())
                .unwrap_or_default(),
            RequestBody::Multipart(parts) => parts.iter().map(FormPart::name).collect(),
        }
    }
}

/// Submitted input, already validated by the session.
#[derive(Debug, Clone, Copy)]
pub struct RequestInput<'a> {
    /// Trimmed compose text; `None` when empty.
    pub text: Option<&'a str>,
    pub document: Option<&'a Attachment>,
    pub voice: Option<&'a Attachment>,
    pub language: Language,
}

/// How a mode encodes its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStrategy {
    /// JSON `{text, language}`; attachments are never sent.
    StructuredBody(Endpoint),
    /// Multipart with whichever of `text`, `file`, `voice` are present, plus
    /// `language`.
    Multipart(Endpoint),
}

impl RequestStrategy {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::StructuredBody(endpoint) | Self::Multipart(endpoint) => *endpoint,
        }
    }

    pub fn build(&self, input: &RequestInput<'_>) -> RequestEnvelope {
        let body = match self {
            Self::StructuredBody(_) => RequestBody::Json(json!({
                "text": input.text.unwrap_or_default(),
                "language": input.language.code(),
            })),
            Self::Multipart(_) => {
                let mut parts = Vec::with_capacity(4);
                if let Some(text) = input.text.filter(|t| !t.is_empty()) {
                    parts.push(FormPart::Text {
                        name: "text",
                        value: text.to_string(),
                    });
                }
                for attachment in [input.document, input.voice].into_iter().flatten() {
                    parts.push(FormPart::File {
                        name: attachment.kind.form_field(),
                        attachment: attachment.clone(),
                    });
                }
                parts.push(FormPart::Text {
                    name: "language",
                    value: input.language.code().to_string(),
                });
                RequestBody::Multipart(parts)
            }
        };
        RequestEnvelope {
            endpoint: self.endpoint(),
            body,
        }
    }
}
