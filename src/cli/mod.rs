//! Command-line interface.
//!
//! - `ask` sends one question (optionally with files) and prints the reply.
//! - `chat` runs the interactive session.
//! - `render` normalizes and renders a saved backend payload offline.
//! - `health` checks that the backend answers.

pub mod paint;
pub mod repl;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::tty::IsTty;

use crate::config::{ClientConfig, ConfigOverrides};
use crate::i18n::{Catalog, Language};
use crate::response::{BackendValue, normalize, render};
use crate::session::{Attachment, AttachmentKind, CapabilityMode, Session, SubmitOutcome};
use crate::settings::Settings;
use crate::transport::HttpTransport;

pub use paint::Painter;
pub use repl::{ReplCommand, run_chat};

#[derive(Parser, Debug)]
#[command(name = "lawgic", version, about = "Terminal client for the LawGic legal assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Settings file (default: ~/.lawgic/settings.toml)
    #[arg(long, global = true, env = "LAWGIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Display and request language (en, hi)
    #[arg(long, short = 'l', global = true)]
    pub language: Option<Language>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask one question and print the answer
    Ask(AskArgs),
    /// Start an interactive chat (default)
    Chat(ChatArgs),
    /// Normalize and render a backend payload without calling the backend
    Render(RenderArgs),
    /// Check that the backend is reachable
    Health,
}

#[derive(Args, Debug, Default)]
pub struct AskArgs {
    /// quick, document-and-voice or research. Defaults to document-and-voice
    /// when a file is attached.
    #[arg(long, short = 'm')]
    pub mode: Option<CapabilityMode>,

    /// Document to analyze (.pdf, .docx, .txt)
    #[arg(long, short = 'd')]
    pub document: Option<PathBuf>,

    /// Voice note to analyze (.wav, .mp3, .m4a, .ogg)
    #[arg(long)]
    pub voice: Option<PathBuf>,

    /// Print the reply as JSON
    #[arg(long)]
    pub json: bool,

    /// Question text. Read from stdin when omitted and stdin is not a terminal.
    pub text: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Starting mode
    #[arg(long, short = 'm')]
    pub mode: Option<CapabilityMode>,

    /// Do not read or write ~/.lawgic/history
    #[arg(long)]
    pub no_history: bool,
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// JSON payload file, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,

    /// Treat the input as an already normalized document
    #[arg(long)]
    pub raw: bool,

    /// Print display blocks as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            language: self.language,
            timeout_secs: self.timeout,
        }
    }

    fn painter(&self) -> Painter {
        if self.no_color {
            Painter::new(false)
        } else {
            Painter::detect()
        }
    }

    /// Settings file, environment and flags, in increasing precedence.
    pub fn resolve_config(&self) -> Result<ClientConfig> {
        let settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load()?,
        };
        let config = ClientConfig::resolve(&settings)?.with_overrides(&self.overrides())?;
        tracing::debug!(
            api_url = %config.api_url,
            language = %config.language,
            "Resolved configuration"
        );
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let painter = cli.painter();
    match &cli.command {
        Some(Command::Ask(args)) => ask(&cli, args, painter).await,
        Some(Command::Chat(args)) => chat(&cli, args, painter).await,
        None => chat(&cli, &ChatArgs::default(), painter).await,
        Some(Command::Render(args)) => render_offline(&cli, args, painter),
        Some(Command::Health) => health(&cli).await,
    }
}

async fn ask(cli: &Cli, args: &AskArgs, painter: Painter) -> Result<()> {
    let config = cli.resolve_config()?;
    let has_files = args.document.is_some() || args.voice.is_some();
    let mode = args.mode.unwrap_or(if has_files {
        CapabilityMode::DocumentAndVoice
    } else {
        config.default_mode
    });

    let mut session = Session::new(HttpTransport::new(&config)?, config.language, mode);
    let staged = [
        (AttachmentKind::Document, &args.document),
        (AttachmentKind::Voice, &args.voice),
    ];
    for (kind, path) in staged {
        let Some(path) = path else { continue };
        if !kind.accepts(path) {
            bail!(
                "{} is not a supported {kind} file ({})",
                path.display(),
                kind.accepted_extensions().join(", ")
            );
        }
        let attachment = Attachment::from_path(kind, path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        session.attach(attachment)?;
    }
    session.drain_notifications();

    let text = if args.text.is_empty() && !io::stdin().is_tty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read question from stdin")?;
        buffer
    } else {
        args.text.join(" ")
    };
    session.set_compose(text);

    let outcome = session.submit().await?;
    let mut out = io::stdout();
    if let Some(reply) = session.transcript().last() {
        if args.json {
            serde_json::to_writer_pretty(&mut out, reply)?;
            writeln!(out)?;
        } else {
            painter.paint_message(&mut out, reply)?;
        }
    }
    let mut err = io::stderr();
    for notice in session.drain_notifications() {
        painter.paint_notification(&mut err, &notice)?;
    }

    match outcome {
        SubmitOutcome::Answered => Ok(()),
        SubmitOutcome::Failed(e) => Err(e.into()),
    }
}

async fn chat(cli: &Cli, args: &ChatArgs, painter: Painter) -> Result<()> {
    let config = cli.resolve_config()?;
    let mode = args.mode.unwrap_or(config.default_mode);
    let mut session = Session::new(HttpTransport::new(&config)?, config.language, mode);

    let history = (!args.no_history)
        .then(|| dirs::home_dir().map(|home| home.join(".lawgic").join("history")))
        .flatten();
    run_chat(&mut session, painter, history.as_deref()).await
}

fn render_offline(cli: &Cli, args: &RenderArgs, painter: Painter) -> Result<()> {
    let raw = if args.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input))?
    };

    let catalog = Catalog::for_language(render_language(cli));

    let document = if args.raw {
        raw
    } else {
        let value = serde_json::from_str::<BackendValue>(&raw)
            .unwrap_or_else(|_| BackendValue::String(raw.clone()));
        normalize(&value, catalog)
    };
    let blocks = render(&document, catalog);

    let mut out = io::stdout();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &blocks)?;
        writeln!(out)?;
    } else {
        painter.paint_blocks(&mut out, &blocks)?;
    }
    Ok(())
}

/// Offline rendering needs no backend, so a broken configuration is logged
/// and the default language used.
fn render_language(cli: &Cli) -> Language {
    if let Some(language) = cli.language {
        return language;
    }
    match cli.resolve_config() {
        Ok(config) => config.language,
        Err(e) => {
            tracing::warn!("Ignoring configuration for offline render: {:#}", e);
            Language::default()
        }
    }
}

async fn health(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let transport = HttpTransport::new(&config)?;
    match transport.health().await {
        Ok(message) => {
            println!("{} is up: {message}", transport.base_url());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("{} is not reachable", transport.base_url())),
    }
}
