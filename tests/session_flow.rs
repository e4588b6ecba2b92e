//! Session end to end over HTTP: validation, dispatch, reply rendering and
//! failure handling against the mock backend.

mod common;

use pretty_assertions::assert_eq;

use lawgic::error::ValidationError;
use lawgic::i18n::Language;
use lawgic::response::{DisplayBlock, HeaderIcon};
use lawgic::session::{
    Attachment, AttachmentKind, CapabilityMode, NotificationLevel, Role, Session, SessionState,
    SubmitOutcome,
};
use lawgic::transport::HttpTransport;

use common::{Received, config_for, start_mock_backend};

fn lease() -> Attachment {
    Attachment::new(AttachmentKind::Document, "lease.pdf", b"%PDF-1.7".to_vec())
}

#[tokio::test]
async fn quick_question_renders_structured_reply() {
    let (addr, backend) = start_mock_backend().await;
    let config = config_for(addr, Language::English);
    let mut session = Session::from_config(HttpTransport::new(&config).expect("client"), &config);

    session.set_compose("Can my landlord enter without notice?");
    let outcome = session.submit().await.expect("valid");
    assert!(matches!(outcome, SubmitOutcome::Answered));
    assert_eq!(backend.received().len(), 1);

    let reply = &session.transcript()[1];
    assert_eq!(reply.role, Role::Assistant);
    let headings: Vec<(&str, HeaderIcon)> = reply
        .blocks
        .iter()
        .filter_map(|block| match block {
            DisplayBlock::Heading { label, icon, .. } => Some((label.as_str(), *icon)),
            _ => None,
        })
        .collect();
    assert_eq!(
        headings,
        vec![
            ("Text Analysis Result", HeaderIcon::Generic),
            ("Input Summary", HeaderIcon::Document),
            ("Answer", HeaderIcon::Generic),
            ("Relevant Laws", HeaderIcon::Book),
            ("Disclaimer", HeaderIcon::Generic),
        ]
    );
    assert!(reply.blocks.contains(&DisplayBlock::Bullet {
        text: lawgic::response::render_inline("Model Tenancy Act, 2021"),
    }));
}

#[tokio::test]
async fn empty_quick_question_never_reaches_the_backend() {
    let (addr, backend) = start_mock_backend().await;
    let config = config_for(addr, Language::English);
    let mut session = Session::from_config(HttpTransport::new(&config).expect("client"), &config);

    session.set_compose("  \n ");
    let err = session.submit().await.expect_err("must reject");
    assert_eq!(err, ValidationError::EmptyQuestion);
    assert!(session.transcript().is_empty());
    assert!(backend.received().is_empty());
}

#[tokio::test]
async fn research_with_only_a_document_sends_file_and_language() {
    let (addr, backend) = start_mock_backend().await;
    let config = config_for(addr, Language::English);
    let mut session = Session::new(
        HttpTransport::new(&config).expect("client"),
        Language::English,
        CapabilityMode::Research,
    );
    session.attach(lease()).expect("attach");

    let outcome = session.submit().await.expect("valid");
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    let received = backend.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].field_names(), vec!["file", "language"]);

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(
        session.transcript()[1].content,
        "The request could not be completed: Unsupported file"
    );
    let last = session.drain_notifications().pop().expect("notification");
    assert_eq!(last.level, NotificationLevel::Error);
}

#[tokio::test]
async fn switching_to_quick_drops_the_staged_document() {
    let (addr, backend) = start_mock_backend().await;
    let config = config_for(addr, Language::English);
    let mut session = Session::new(
        HttpTransport::new(&config).expect("client"),
        Language::English,
        CapabilityMode::DocumentAndVoice,
    );
    session.attach(lease()).expect("attach");
    session.set_mode(CapabilityMode::Quick);
    session.set_compose("Is a verbal lease binding?");

    session.submit().await.expect("valid");

    let received = backend.received();
    assert!(matches!(received[0], Received::Json { .. }));
    assert_eq!(received[0].field_names(), vec!["text", "language"]);
}

#[tokio::test]
async fn analyze_reply_unpacks_embedded_json_and_reference() {
    let (addr, _backend) = start_mock_backend().await;
    let config = config_for(addr, Language::Hindi);
    let mut session = Session::new(
        HttpTransport::new(&config).expect("client"),
        Language::Hindi,
        CapabilityMode::DocumentAndVoice,
    );
    session.attach(lease()).expect("attach");

    session.submit().await.expect("valid");

    let reply = &session.transcript()[1].content;
    assert!(reply.starts_with("**व्यापक विश्लेषण**"), "unexpected reply: {reply}");
    assert!(reply.contains(":** low"), "embedded JSON not unpacked: {reply}");
    assert!(reply.ends_with("संदर्भ आईडी: 12"), "missing reference: {reply}");
    assert!(session.staged(AttachmentKind::Document).is_none());
}
