//! In-process mock of the analysis backend.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use lawgic::config::ClientConfig;
use lawgic::i18n::Language;
use lawgic::session::CapabilityMode;

/// One multipart field as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Json { path: &'static str, body: Value },
    Multipart { path: &'static str, fields: Vec<ReceivedField> },
}

impl Received {
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Received::Json { body, .. } => body
                .as_object()
                .map(|map| map.keys().map(String::as_str).collect())
                .unwrap_or_default(),
            Received::Multipart { fields, .. } => fields.iter().map(|f| f.name.as_str()).collect(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockBackend {
    pub received: Arc<Mutex<Vec<Received>>>,
}

impl MockBackend {
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn root() -> Json<Value> {
    Json(json!({"message": "LawGic API is running"}))
}

async fn predict(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    backend.received.lock().unwrap().push(Received::Json {
        path: "/api/predict/",
        body: body.clone(),
    });
    let text = body["text"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "input": text,
        "prediction": {
            "answer": "A landlord must give reasonable notice before entry.",
            "relevant_laws": ["Model Tenancy Act, 2021", "Transfer of Property Act, 1882"],
            "disclaimer": "This is not legal advice."
        }
    }))
    .into_response()
}

async fn read_fields(mut multipart: Multipart) -> Vec<ReceivedField> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("field bytes").to_vec();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    fields
}

async fn analyze(State(backend): State<MockBackend>, multipart: Multipart) -> Response {
    let fields = read_fields(multipart).await;
    let input_text = fields
        .iter()
        .find(|f| f.name == "text")
        .map(|f| String::from_utf8_lossy(&f.data).into_owned())
        .unwrap_or_else(|| "Uploaded document".to_string());
    backend.received.lock().unwrap().push(Received::Multipart {
        path: "/api/analyze/",
        fields,
    });
    Json(json!({
        "input_text": input_text,
        "prediction": "{\"summary\": \"Standard residential lease.\", \"risk_assessment\": {\"level\": \"low\"}}",
        "document_id": 12
    }))
    .into_response()
}

/// Research rejects uploads with a FastAPI-style detail and answers text-only
/// requests with an opaque gateway error.
async fn research(State(backend): State<MockBackend>, multipart: Multipart) -> Response {
    let fields = read_fields(multipart).await;
    let has_file = fields.iter().any(|f| f.file_name.is_some());
    backend.received.lock().unwrap().push(Received::Multipart {
        path: "/api/research/",
        fields,
    });
    if has_file {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "Unsupported file"})),
        )
            .into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "<html>upstream down</html>").into_response()
    }
}

/// Start the mock backend on an ephemeral port.
pub async fn start_mock_backend() -> (SocketAddr, MockBackend) {
    let backend = MockBackend::default();
    let app = Router::new()
        .route("/", get(root))
        .route("/api/predict/", post(predict))
        .route("/api/analyze/", post(analyze))
        .route("/api/research/", post(research))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    (addr, backend)
}

pub fn config_for(addr: SocketAddr, language: Language) -> ClientConfig {
    ClientConfig {
        api_url: format!("http://{addr}/").parse().expect("url"),
        language,
        request_timeout: Duration::from_secs(5),
        default_mode: CapabilityMode::Quick,
    }
}
