//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::session::{Endpoint, FormPart, RequestBody, RequestEnvelope};
use crate::transport::{BackendResponse, Transport};

/// Shown when an error response carries no usable detail.
pub const GENERIC_FAILURE: &str = "API request failed";

/// HTTP client for the analysis backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    message: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("lawgic/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Use a preconfigured client. `base_url` should end with `/`.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", endpoint.path())))
    }

    /// `GET /`. Returns the backend's greeting message.
    pub async fn health(&self) -> Result<String, TransportError> {
        let response = self.dispatch(&RequestEnvelope::health()).await?;
        let body: HealthBody = read_json(response).await?;
        Ok(body.message)
    }

    async fn dispatch(&self, request: &RequestEnvelope) -> Result<Response, TransportError> {
        let url = self.endpoint_url(request.endpoint)?;
        let method = if request.endpoint.is_read_only() {
            Method::GET
        } else {
            Method::POST
        };
        tracing::debug!(%method, %url, "Sending backend request");

        let builder = self.client.request(method, url);
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Network("request timed out".to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestEnvelope) -> Result<BackendResponse, TransportError> {
        let response = self.dispatch(request).await?;
        read_json(response).await
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(*name, value.clone()),
            FormPart::File { name, attachment } => {
                let file = Part::bytes(attachment.content.to_vec())
                    .file_name(attachment.file_name.clone())
                    .mime_str(&attachment.mime)
                    .map_err(|e| TransportError::Attachment {
                        file_name: attachment.file_name.clone(),
                        reason: e.to_string(),
                    })?;
                form.part(*name, file)
            }
        };
    }
    Ok(form)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = extract_error_detail(&body);
        tracing::debug!(status = status.as_u16(), %detail, "Backend returned an error status");
        return Err(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

/// Best-effort failure detail from an error body: `detail`, then `message`,
/// else [`GENERIC_FAILURE`]. Non-string values are kept as compact JSON.
pub fn extract_error_detail(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return GENERIC_FAILURE.to_string();
    };
    ["detail", "message"]
        .iter()
        .find_map(|field| match json.get(field)? {
            Value::Null | Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{GENERIC_FAILURE, HttpTransport, build_form, extract_error_detail};
    use crate::config::ClientConfig;
    use crate::i18n::Language;
    use crate::session::{
        Attachment, AttachmentKind, CapabilityMode, Endpoint, FormPart,
    };

    #[test]
    fn error_detail_prefers_detail_then_message() {
        assert_eq!(extract_error_detail(r#"{"detail": "File too large"}"#), "File too large");
        assert_eq!(
            extract_error_detail(r#"{"detail": "", "message": "Bad language"}"#),
            "Bad language"
        );
        assert_eq!(
            extract_error_detail(r#"{"detail": [{"loc": ["body", "text"]}]}"#),
            r#"[{"loc":["body","text"]}]"#
        );
    }

    #[test]
    fn error_detail_falls_back_to_generic() {
        assert_eq!(extract_error_detail("<html>502 Bad Gateway</html>"), GENERIC_FAILURE);
        assert_eq!(extract_error_detail(""), GENERIC_FAILURE);
        assert_eq!(extract_error_detail(r#"{"error": "nope"}"#), GENERIC_FAILURE);
        assert_eq!(extract_error_detail(r#"{"detail": null}"#), GENERIC_FAILURE);
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let config = ClientConfig {
            api_url: "https://legal.example.com/backend/".parse().expect("url"),
            language: Language::English,
            request_timeout: Duration::from_secs(5),
            default_mode: CapabilityMode::Quick,
        };
        let transport = HttpTransport::new(&config).expect("client");
        assert_eq!(
            transport.endpoint_url(Endpoint::Analyze).expect("join").as_str(),
            "https://legal.example.com/backend/api/analyze/"
        );
        assert_eq!(
            transport.endpoint_url(Endpoint::Health).expect("join").as_str(),
            "https://legal.example.com/backend/"
        );
    }

    #[test]
    fn bad_mime_is_reported_per_attachment() {
        let mut attachment = Attachment::new(AttachmentKind::Voice, "call.mp3", b"id3".to_vec());
        attachment.mime = "not a mime".to_string();
        let err = build_form(&[FormPart::File {
            name: "voice",
            attachment,
        }])
        .expect_err("must reject");
        assert!(err.to_string().contains("call.mp3"), "unexpected: {err}");
    }
}
