//! Backend transport.
//!
//! The session hands a [`RequestEnvelope`] to a [`Transport`] and gets back
//! the decoded [`BackendResponse`]. [`HttpTransport`] is the production
//! implementation; tests plug in scripted transports.

mod http;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::response::BackendValue;
use crate::session::RequestEnvelope;

pub use http::{GENERIC_FAILURE, HttpTransport, extract_error_detail};

/// Issues exactly one backend call per envelope. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestEnvelope) -> Result<BackendResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &RequestEnvelope) -> Result<BackendResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Decoded success body of the predict, analyze and research endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    /// Echo of the submitted input. The multipart endpoints call it
    /// `input_text`.
    #[serde(default, alias = "input_text")]
    pub input: Option<String>,
    #[serde(default)]
    pub prediction: BackendValue,
    #[serde(default)]
    pub document_id: Option<DocumentId>,
}

/// Backend reference for a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BackendResponse, DocumentId};

    #[test]
    fn predict_body_decodes() {
        let response: BackendResponse = serde_json::from_value(json!({
            "input": "Is a verbal lease valid?",
            "prediction": {"answer": "Often, for short terms."}
        }))
        .expect("decode");
        assert_eq!(response.input.as_deref(), Some("Is a verbal lease valid?"));
        assert_eq!(response.prediction, json!({"answer": "Often, for short terms."}));
        assert_eq!(response.document_id, None);
    }

    #[test]
    fn analyze_body_decodes_input_text_and_numeric_id() {
        let response: BackendResponse = serde_json::from_value(json!({
            "input_text": "lease.pdf",
            "prediction": "Summary",
            "document_id": 42
        }))
        .expect("decode");
        assert_eq!(response.input.as_deref(), Some("lease.pdf"));
        assert_eq!(
            response.document_id.map(|id| id.to_string()),
            Some("42".to_string())
        );
    }

    #[test]
    fn missing_fields_default() {
        let response: BackendResponse = serde_json::from_value(json!({})).expect("decode");
        assert!(response.prediction.is_null());
        assert_eq!(response.input, None);

        let id: DocumentId = serde_json::from_value(json!("doc-9")).expect("decode");
        assert_eq!(id.to_string(), "doc-9");
    }
}
