//! Session orchestration: mode, staged input, transcript and the submit flow.
//!
//! ```text
//!  set_compose / attach ──► begin_submit ──► Transport::send ──► complete
//!        ▲                  (validate,        (one call,          (normalize,
//!        │                   user message,     no retry)           render,
//!        │                   envelope)                             assistant message)
//!        └───────────────────────────────── Idle ◄─────────────────────┘
//! ```
//!
//! The session owns all mutable client state. The transcript is append-only;
//! assistant replies are rendered once, with the catalog active when the reply
//! arrived, so a later language switch never rewrites history.

pub mod attachment;
pub mod request;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{TransportError, ValidationError};
use crate::i18n::{Catalog, Language};
use crate::response::{DisplayBlock, ResponseSections, compose_response, render};
use crate::transport::{BackendResponse, Transport};

pub use attachment::{Attachment, AttachmentKind};
pub use request::{
    Endpoint, FormPart, RequestBody, RequestEnvelope, RequestInput, RequestStrategy,
};

/// Which backend capability handles the next submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityMode {
    /// Text-only question, JSON body to the predict endpoint.
    Quick,
    /// Text plus optional document and voice note, multipart to analyze.
    DocumentAndVoice,
    /// Like document-and-voice, routed to the research endpoint.
    Research,
}

impl CapabilityMode {
    pub const ALL: [CapabilityMode; 3] = [
        CapabilityMode::Quick,
        CapabilityMode::DocumentAndVoice,
        CapabilityMode::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::DocumentAndVoice => "document-and-voice",
            Self::Research => "research",
        }
    }

    pub fn allows_attachments(&self) -> bool {
        !matches!(self, Self::Quick)
    }

    pub fn request_strategy(&self) -> RequestStrategy {
        match self {
            Self::Quick => RequestStrategy::StructuredBody(Endpoint::Predict),
            Self::DocumentAndVoice => RequestStrategy::Multipart(Endpoint::Analyze),
            Self::Research => RequestStrategy::Multipart(Endpoint::Research),
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Quick => "mode.quick",
            Self::DocumentAndVoice => "mode.document_and_voice",
            Self::Research => "mode.research",
        }
    }

    pub fn description_key(&self) -> &'static str {
        match self {
            Self::Quick => "mode.quick_description",
            Self::DocumentAndVoice => "mode.document_and_voice_description",
            Self::Research => "mode.research_description",
        }
    }

    pub fn placeholder_key(&self) -> &'static str {
        match self {
            Self::Quick => "placeholder.quick",
            Self::DocumentAndVoice => "placeholder.document_and_voice",
            Self::Research => "placeholder.research",
        }
    }

    /// Heading prepended to every reply in this mode.
    pub fn title_key(&self) -> &'static str {
        match self {
            Self::Quick => "common.text_analysis_result",
            Self::DocumentAndVoice => "common.comprehensive_analysis",
            Self::Research => "common.legal_research_summary",
        }
    }

    pub fn success_key(&self) -> &'static str {
        match self {
            Self::Quick => "common.text_analysis_complete",
            Self::DocumentAndVoice => "common.document_analysis_complete",
            Self::Research => "common.legal_research_ready",
        }
    }
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quick" | "predict" => Ok(Self::Quick),
            "analyze" | "document" | "document-and-voice" | "document_and_voice" => {
                Ok(Self::DocumentAndVoice)
            }
            "research" => Ok(Self::Research),
            other => Err(format!(
                "unknown mode '{other}' (expected 'quick', 'document-and-voice' or 'research')"
            )),
        }
    }
}

/// Catalog keys of the starter prompts offered on an empty transcript.
pub const SUGGESTION_KEYS: [&str; 4] = [
    "suggestions.rental",
    "suggestions.tenant_rights",
    "suggestions.employment",
    "suggestions.legal_document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Display blocks for assistant replies. Empty for user messages.
    pub blocks: Vec<DisplayBlock>,
}

impl ChatMessage {
    fn user(content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content,
            created_at: Utc::now(),
            blocks: Vec::new(),
        }
    }

    fn assistant(content: String, catalog: &Catalog) -> Self {
        let blocks = render(&content, catalog);
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content,
            created_at: Utc::now(),
            blocks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient, user-visible notice. Never part of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// A validated submission waiting for its transport result.
///
/// Only [`Session::begin_submit`] creates one; hand it back to
/// [`Session::complete`] together with the result.
#[derive(Debug)]
pub struct PendingRequest {
    mode: CapabilityMode,
    envelope: RequestEnvelope,
}

impl PendingRequest {
    pub fn mode(&self) -> CapabilityMode {
        self.mode
    }

    pub fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

/// How a dispatched request ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    Answered,
    Failed(TransportError),
}

/// Client session bound to one transport.
pub struct Session<T> {
    transport: T,
    catalog: Arc<Catalog>,
    language: Language,
    mode: CapabilityMode,
    compose: String,
    document: Option<Attachment>,
    voice: Option<Attachment>,
    transcript: Vec<ChatMessage>,
    state: SessionState,
    notifications: Vec<Notification>,
}

impl<T> Session<T> {
    pub fn new(transport: T, language: Language, mode: CapabilityMode) -> Self {
        Self {
            transport,
            catalog: Arc::new(Catalog::for_language(language).clone()),
            language,
            mode,
            compose: String::new(),
            document: None,
            voice: None,
            transcript: Vec::new(),
            state: SessionState::Idle,
            notifications: Vec::new(),
        }
    }

    pub fn from_config(transport: T, config: &ClientConfig) -> Self {
        Self::new(transport, config.language, config.default_mode)
    }

    /// Replace the label catalog without changing the request language.
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> CapabilityMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::AwaitingResponse
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn staged(&self, kind: AttachmentKind) -> Option<&Attachment> {
        match kind {
            AttachmentKind::Document => self.document.as_ref(),
            AttachmentKind::Voice => self.voice.as_ref(),
        }
    }

    /// Whether a submit right now would pass validation.
    pub fn can_send(&self) -> bool {
        if self.is_busy() {
            return false;
        }
        let has_text = !self.compose.trim().is_empty();
        if self.mode.allows_attachments() {
            has_text || self.document.is_some() || self.voice.is_some()
        } else {
            has_text
        }
    }

    /// Localized starter prompts.
    pub fn suggestions(&self) -> Vec<String> {
        SUGGESTION_KEYS
            .iter()
            .map(|key| self.catalog.text(key))
            .collect()
    }

    /// Switch capability. Switching to quick drops staged attachments.
    pub fn set_mode(&mut self, mode: CapabilityMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(from = %self.mode, to = %mode, "Switching capability mode");
        self.mode = mode;
        if !mode.allows_attachments() {
            self.clear_attachments();
        }
    }

    /// Switch display and request language. Already rendered messages keep
    /// their original labels.
    pub fn set_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        tracing::debug!(%language, "Switching language");
        self.language = language;
        self.catalog = Arc::new(Catalog::for_language(language).clone());
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Use a starter prompt: quick mode with the prompt in the compose box.
    pub fn apply_suggestion(&mut self, text: impl Into<String>) {
        self.set_mode(CapabilityMode::Quick);
        self.set_compose(text);
    }

    /// Stage `attachment`, replacing any previous one of the same kind.
    pub fn attach(&mut self, attachment: Attachment) -> Result<(), ValidationError> {
        if !self.mode.allows_attachments() {
            let message = self.catalog.text("chat.text_only_mode");
            self.notify(NotificationLevel::Error, message);
            return Err(ValidationError::AttachmentsNotAllowed { mode: self.mode });
        }

        let message = format!(
            "{}: {}",
            self.catalog.text(attachment.kind.uploaded_key()),
            attachment.file_name
        );
        tracing::debug!(
            kind = %attachment.kind,
            file = %attachment.file_name,
            bytes = attachment.size(),
            "Staged attachment"
        );
        match attachment.kind {
            AttachmentKind::Document => self.document = Some(attachment),
            AttachmentKind::Voice => self.voice = Some(attachment),
        }
        self.notify(NotificationLevel::Success, message);
        Ok(())
    }

    pub fn remove_attachment(&mut self, kind: AttachmentKind) -> Option<Attachment> {
        match kind {
            AttachmentKind::Document => self.document.take(),
            AttachmentKind::Voice => self.voice.take(),
        }
    }

    /// Take all pending notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Validate the staged input and prepare the one request for it.
    ///
    /// On success the user message is appended, the compose box is cleared
    /// and the session waits for [`Session::complete`]. On failure nothing
    /// but a notification changes.
    pub fn begin_submit(&mut self) -> Result<PendingRequest, ValidationError> {
        if self.is_busy() {
            let message = self.catalog.text("chat.request_in_flight");
            self.notify(NotificationLevel::Error, message);
            return Err(ValidationError::RequestInFlight);
        }

        let text = self.compose.trim().to_string();
        let (document, voice) = if self.mode.allows_attachments() {
            (self.document.as_ref(), self.voice.as_ref())
        } else {
            (None, None)
        };

        let rejection = if !self.mode.allows_attachments() && text.is_empty() {
            Some((ValidationError::EmptyQuestion, "common.enter_question"))
        } else if text.is_empty() && document.is_none() && voice.is_none() {
            Some((ValidationError::MissingInput, "common.provide_input"))
        } else {
            None
        };
        if let Some((error, key)) = rejection {
            let message = self.catalog.text(key);
            self.notify(NotificationLevel::Error, message);
            return Err(error);
        }

        let mut parts = Vec::with_capacity(3);
        if !text.is_empty() {
            parts.push(text.clone());
        }
        for attachment in [document, voice].into_iter().flatten() {
            parts.push(format!(
                "[{}: {}]",
                self.catalog.text(attachment.kind.label_key()),
                attachment.file_name
            ));
        }

        let envelope = RequestEnvelope::for_mode(
            self.mode,
            &RequestInput {
                text: (!text.is_empty()).then_some(text.as_str()),
                document,
                voice,
                language: self.language,
            },
        );

        self.transcript.push(ChatMessage::user(parts.join("\n")));
        self.compose.clear();
        self.state = SessionState::AwaitingResponse;

        tracing::debug!(
            mode = %self.mode,
            endpoint = envelope.endpoint.path(),
            fields = ?envelope.field_names(),
            "Dispatching backend request"
        );

        Ok(PendingRequest {
            mode: self.mode,
            envelope,
        })
    }

    /// Merge the transport result for `pending` into the transcript.
    ///
    /// Staged attachments are cleared and the session is back to `Idle`
    /// either way. A failure is shown through the transcript entry and an
    /// error notification, so the user can resend at once.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        result: Result<BackendResponse, TransportError>,
    ) -> SubmitOutcome {
        let catalog = Arc::clone(&self.catalog);
        let outcome = match result {
            Ok(response) => {
                let title = catalog.text(pending.mode.title_key());
                let reference = response.document_id.as_ref().map(ToString::to_string);
                let document = compose_response(
                    &ResponseSections {
                        title: &title,
                        input: response.input.as_deref(),
                        prediction: &response.prediction,
                        reference_id: reference.as_deref(),
                    },
                    &catalog,
                );
                self.transcript.push(ChatMessage::assistant(document, &catalog));
                self.notify(
                    NotificationLevel::Success,
                    catalog.text(pending.mode.success_key()),
                );
                self.state = SessionState::Idle;
                tracing::info!(
                    mode = %pending.mode,
                    reference = reference.as_deref().unwrap_or("-"),
                    "Backend request completed"
                );
                SubmitOutcome::Answered
            }
            Err(err) => {
                tracing::warn!(
                    mode = %pending.mode,
                    status = ?err.status_code(),
                    error = %err,
                    "Backend request failed"
                );
                let content = format!("{}: {}", catalog.text("common.request_failed"), err);
                self.transcript.push(ChatMessage::assistant(content, &catalog));
                self.notify(
                    NotificationLevel::Error,
                    catalog.text("common.backend_unreachable"),
                );
                self.state = SessionState::Idle;
                SubmitOutcome::Failed(err)
            }
        };
        self.clear_attachments();
        outcome
    }

    fn clear_attachments(&mut self) {
        self.document = None;
        self.voice = None;
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        self.notifications.push(Notification { level, message });
    }
}

impl<T: Transport> Session<T> {
    /// Validate, send exactly one request and merge its result.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ValidationError> {
        let pending = self.begin_submit()?;
        let result = self.transport.send(pending.envelope()).await;
        Ok(self.complete(pending, result))
    }
}
