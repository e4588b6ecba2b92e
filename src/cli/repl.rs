//! Interactive chat loop.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};

use crate::cli::paint::Painter;
use crate::i18n::Language;
use crate::session::{
    Attachment, AttachmentKind, CapabilityMode, Notification, NotificationLevel, Session,
    SubmitOutcome,
};
use crate::transport::Transport;

const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/mode", "[quick|document|research]  show or switch the capability mode"),
    ("/attach", "doc|voice PATH  stage a document or voice note"),
    ("/remove", "[doc|voice]  drop staged attachments"),
    ("/lang", "[en|hi]  show or switch the language"),
    ("/suggest", "[N]  list starter questions, or use question N"),
    ("/send", "send the staged files without a question"),
    ("/history", "reprint the conversation"),
    ("/help", "show this help"),
    ("/quit", "leave the chat"),
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Mode(Option<CapabilityMode>),
    Attach { kind: AttachmentKind, path: PathBuf },
    /// `None` removes every staged attachment.
    Remove(Option<AttachmentKind>),
    Language(Option<Language>),
    /// 1-based suggestion index.
    Suggest(Option<usize>),
    /// Submit with an empty compose box.
    Send,
    History,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse `line` as a slash command. `None` means the line is a message.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let command = line.trim().strip_prefix('/')?;
        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        let arg = (!rest.is_empty()).then_some(rest);

        let parsed = match name.to_ascii_lowercase().as_str() {
            "mode" => arg.map(str::parse).transpose().map(Self::Mode),
            "lang" | "language" => arg.map(str::parse).transpose().map(Self::Language),
            "remove" => arg.map(str::parse).transpose().map(Self::Remove),
            "attach" => match rest.split_once(char::is_whitespace) {
                Some((kind, path)) => kind.parse().map(|kind| Self::Attach {
                    kind,
                    path: PathBuf::from(path.trim()),
                }),
                None => Err("usage: /attach doc|voice PATH".to_string()),
            },
            "suggest" => arg
                .map(|n| match n.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(format!("'{n}' is not a suggestion number")),
                })
                .transpose()
                .map(Self::Suggest),
            "send" => Ok(Self::Send),
            "history" => Ok(Self::History),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '/{other}', try /help")),
        };
        Some(parsed)
    }
}

#[derive(Helper, Hinter, Highlighter, Validator)]
struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        if !head.starts_with('/') || head.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let candidates = SLASH_COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(head))
            .map(|(name, _)| Pair {
                display: (*name).to_string(),
                replacement: (*name).to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

/// Run the chat loop until `/quit` or end of input.
pub async fn run_chat<T: Transport>(
    session: &mut Session<T>,
    painter: Painter,
    history_path: Option<&Path>,
) -> Result<()> {
    let mut editor: Editor<ReplHelper, FileHistory> =
        Editor::new().context("failed to initialize the line editor")?;
    editor.set_helper(Some(ReplHelper));
    if let Some(path) = history_path
        && let Err(e) = editor.load_history(path)
    {
        tracing::debug!("No chat history loaded from {}: {}", path.display(), e);
    }

    let mut out = io::stdout();
    print_banner(session, painter, &mut out)?;

    loop {
        let prompt = prompt_for(session);
        let read = if session.compose().is_empty() {
            editor.readline(&prompt)
        } else {
            editor.readline_with_initial(&prompt, (session.compose(), ""))
        };
        let line = match read {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                session.set_compose("");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let _ = editor.add_history_entry(trimmed);
        }
        if handle_line(session, trimmed, painter, &mut out).await? == LineOutcome::Quit {
            break;
        }
    }

    if let Some(path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = editor.save_history(path) {
            tracing::warn!("Failed to save chat history to {}: {}", path.display(), e);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOutcome {
    Continue,
    Quit,
}

/// Dispatch one input line: a slash command, a question, or (empty, with
/// files staged outside quick mode) an attachment-only submission.
async fn handle_line<T: Transport, W: Write>(
    session: &mut Session<T>,
    line: &str,
    painter: Painter,
    out: &mut W,
) -> Result<LineOutcome> {
    let line = line.trim();
    if line.is_empty() {
        if !has_staged_files(session) {
            return Ok(LineOutcome::Continue);
        }
        session.set_compose("");
        submit_and_show(session, painter, out).await?;
    } else {
        match ReplCommand::parse(line) {
            Some(Ok(ReplCommand::Quit)) => return Ok(LineOutcome::Quit),
            Some(Ok(ReplCommand::Send)) => {
                session.set_compose("");
                submit_and_show(session, painter, out).await?;
            }
            Some(Ok(command)) => execute(session, command, painter, out).await?,
            Some(Err(message)) => painter.paint_notification(
                out,
                &Notification {
                    level: NotificationLevel::Error,
                    message,
                },
            )?,
            None => {
                session.set_compose(line);
                submit_and_show(session, painter, out).await?;
            }
        }
    }
    flush_notifications(session, painter, out)?;
    Ok(LineOutcome::Continue)
}

fn has_staged_files<T>(session: &Session<T>) -> bool {
    session.mode().allows_attachments()
        && [AttachmentKind::Document, AttachmentKind::Voice]
            .into_iter()
            .any(|kind| session.staged(kind).is_some())
}

fn prompt_for<T>(session: &Session<T>) -> String {
    let staged: Vec<&str> = [AttachmentKind::Document, AttachmentKind::Voice]
        .into_iter()
        .filter_map(|kind| session.staged(kind))
        .map(|attachment| attachment.file_name.as_str())
        .collect();
    if staged.is_empty() {
        format!("[{}] › ", session.mode())
    } else {
        format!("[{} + {}] › ", session.mode(), staged.join(", "))
    }
}

fn print_banner<T, W: Write>(session: &Session<T>, painter: Painter, out: &mut W) -> Result<()> {
    writeln!(out, "LawGic {}", env!("CARGO_PKG_VERSION"))?;
    describe_mode(session, painter, out)?;
    if session.transcript().is_empty() {
        list_suggestions(session, painter, out)?;
    }
    painter.paint_hint(out, "Type /help for commands, /quit to leave.")?;
    Ok(())
}

fn describe_mode<T, W: Write>(session: &Session<T>, painter: Painter, out: &mut W) -> Result<()> {
    let catalog = session.catalog();
    let mode = session.mode();
    writeln!(
        out,
        "{}: {}",
        catalog.text(mode.label_key()),
        catalog.text(mode.description_key())
    )?;
    painter.paint_hint(out, &catalog.text(mode.placeholder_key()))?;
    if mode.allows_attachments() {
        painter.paint_hint(out, &catalog.text("chat.file_formats"))?;
        painter.paint_hint(
            out,
            "Press Enter on an empty line, or /send, to submit staged files alone.",
        )?;
    } else {
        painter.paint_hint(out, &catalog.text("chat.text_only_mode"))?;
    }
    Ok(())
}

fn list_suggestions<T, W: Write>(
    session: &Session<T>,
    painter: Painter,
    out: &mut W,
) -> Result<()> {
    for (index, suggestion) in session.suggestions().iter().enumerate() {
        painter.paint_hint(out, &format!("  /suggest {}  {suggestion}", index + 1))?;
    }
    Ok(())
}

async fn execute<T: Transport, W: Write>(
    session: &mut Session<T>,
    command: ReplCommand,
    painter: Painter,
    out: &mut W,
) -> Result<()> {
    match command {
        ReplCommand::Mode(None) => {
            describe_mode(session, painter, out)?;
            let modes: Vec<&str> = CapabilityMode::ALL.iter().map(|m| m.as_str()).collect();
            painter.paint_hint(out, &format!("available: {}", modes.join(", ")))?;
        }
        ReplCommand::Mode(Some(mode)) => {
            session.set_mode(mode);
            describe_mode(session, painter, out)?;
        }
        ReplCommand::Attach { kind, path } => {
            if !kind.accepts(&path) {
                painter.paint_notification(
                    out,
                    &Notification {
                        level: NotificationLevel::Error,
                        message: session.catalog().text("chat.file_formats"),
                    },
                )?;
                return Ok(());
            }
            match Attachment::from_path(kind, &path).await {
                Ok(attachment) => {
                    if let Err(err) = session.attach(attachment) {
                        tracing::debug!(%err, "Attachment rejected");
                    }
                }
                Err(e) => painter.paint_notification(
                    out,
                    &Notification {
                        level: NotificationLevel::Error,
                        message: format!("Cannot read {}: {e}", path.display()),
                    },
                )?,
            }
        }
        ReplCommand::Remove(kind) => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => vec![AttachmentKind::Document, AttachmentKind::Voice],
            };
            let remove = session.catalog().text("common.remove");
            for kind in kinds {
                if let Some(removed) = session.remove_attachment(kind) {
                    painter.paint_hint(out, &format!("{remove}: {}", removed.file_name))?;
                }
            }
        }
        ReplCommand::Language(None) => {
            let names: Vec<String> = Language::ALL
                .iter()
                .map(|l| format!("{} ({})", l.code(), l.native_name()))
                .collect();
            writeln!(out, "{}", session.language().native_name())?;
            painter.paint_hint(out, &format!("available: {}", names.join(", ")))?;
        }
        ReplCommand::Language(Some(language)) => {
            session.set_language(language);
            writeln!(out, "{}", language.native_name())?;
        }
        ReplCommand::Suggest(None) => list_suggestions(session, painter, out)?,
        ReplCommand::Suggest(Some(n)) => match session.suggestions().get(n - 1).cloned() {
            Some(suggestion) => session.apply_suggestion(suggestion),
            None => painter.paint_notification(
                out,
                &Notification {
                    level: NotificationLevel::Error,
                    message: format!("There is no suggestion {n}"),
                },
            )?,
        },
        ReplCommand::History => {
            for message in session.transcript() {
                painter.paint_message(out, message)?;
            }
        }
        ReplCommand::Help => {
            for (name, help) in SLASH_COMMANDS {
                writeln!(out, "  {name:<10} {help}")?;
            }
        }
        ReplCommand::Send | ReplCommand::Quit => {}
    }
    Ok(())
}

async fn submit_and_show<T: Transport, W: Write>(
    session: &mut Session<T>,
    painter: Painter,
    out: &mut W,
) -> Result<()> {
    match session.submit().await {
        Ok(outcome) => {
            if let Some(reply) = session.transcript().last() {
                painter.paint_message(out, reply)?;
            }
            if let SubmitOutcome::Failed(err) = outcome {
                tracing::debug!(%err, "Reply recorded as failure");
            }
        }
        Err(err) => tracing::debug!(%err, "Submission rejected"),
    }
    Ok(())
}

fn flush_notifications<T, W: Write>(
    session: &mut Session<T>,
    painter: Painter,
    out: &mut W,
) -> Result<()> {
    for notice in session.drain_notifications() {
        painter.paint_notification(out, &notice)?;
    }
    out.flush()?;
    Ok(())
}
