//! Terminal rendering of display blocks.

use std::io::{self, Write};

use crossterm::style::{Color, ContentStyle, Stylize};
use crossterm::tty::IsTty;

use crate::response::{DisplayBlock, HeaderIcon, InlineSpan, InlineText};
use crate::session::{ChatMessage, Notification, NotificationLevel, Role};

/// Glyph and accent color for a heading category.
fn icon_style(icon: HeaderIcon) -> (&'static str, Color) {
    match icon {
        HeaderIcon::Document => ("📄", Color::Blue),
        HeaderIcon::Alert => ("⚠", Color::Red),
        HeaderIcon::Legal => ("⚖", Color::Magenta),
        HeaderIcon::Book => ("📖", Color::DarkCyan),
        HeaderIcon::Shield => ("🛡", Color::Green),
        HeaderIcon::Check => ("✓", Color::Green),
        HeaderIcon::People => ("👥", Color::DarkYellow),
        HeaderIcon::Briefcase => ("💼", Color::Yellow),
        HeaderIcon::Calendar => ("📅", Color::Cyan),
        HeaderIcon::Generic => ("§", Color::White),
    }
}

/// Writes blocks, messages and notices to a terminal or any writer.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color only when stdout is a terminal.
    pub fn detect() -> Self {
        Self::new(io::stdout().is_tty())
    }

    fn styled(&self, text: &str, style: ContentStyle) -> String {
        if self.color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn inline(&self, text: &InlineText, base: ContentStyle) -> String {
        text.spans()
            .iter()
            .map(|span| match span {
                InlineSpan::Text(text) => self.styled(text, base),
                InlineSpan::Strong(text) => self.styled(text, base.bold()),
            })
            .collect()
    }

    pub fn paint_blocks<W: Write>(
        &self,
        out: &mut W,
        blocks: &[DisplayBlock],
    ) -> io::Result<()> {
        let plain = ContentStyle::new();
        for block in blocks {
            match block {
                DisplayBlock::Heading { label, icon, body } => {
                    let (glyph, color) = icon_style(*icon);
                    let header =
                        self.styled(&format!("{glyph} {label}"), plain.with(color).bold());
                    match body {
                        Some(body) => writeln!(out, "{header} {}", self.inline(body, plain))?,
                        None => writeln!(out, "{header}")?,
                    }
                }
                DisplayBlock::Bullet { text } => {
                    let marker = self.styled("•", plain.cyan());
                    writeln!(out, "  {marker} {}", self.inline(text, plain))?;
                }
                DisplayBlock::NumberedItem { number, text } => {
                    let badge = self.styled(&format!("[{number}]"), plain.cyan().bold());
                    writeln!(out, "  {badge} {}", self.inline(text, plain))?;
                }
                DisplayBlock::Citation { text } => {
                    writeln!(
                        out,
                        "  {} {}",
                        self.styled("│", plain.dark_grey()),
                        self.inline(text, plain.italic())
                    )?;
                }
                DisplayBlock::Paragraph { text } => writeln!(out, "{}", self.inline(text, plain))?,
                DisplayBlock::Spacer => writeln!(out)?,
            }
        }
        Ok(())
    }

    pub fn paint_message<W: Write>(&self, out: &mut W, message: &ChatMessage) -> io::Result<()> {
        match message.role {
            Role::User => {
                let label = format!("you {} ›", message.created_at.format("%H:%M"));
                let indent = label.chars().count();
                let prefix = self.styled(&label, ContentStyle::new().dark_grey());
                for (index, line) in message.content.lines().enumerate() {
                    if index == 0 {
                        writeln!(out, "{prefix} {line}")?;
                    } else {
                        writeln!(out, "{:indent$} {line}", "")?;
                    }
                }
                Ok(())
            }
            Role::Assistant => {
                self.paint_blocks(out, &message.blocks)?;
                writeln!(out)
            }
        }
    }

    pub fn paint_notification<W: Write>(
        &self,
        out: &mut W,
        notice: &Notification,
    ) -> io::Result<()> {
        let line = match notice.level {
            NotificationLevel::Success => {
                self.styled(&format!("✓ {}", notice.message), ContentStyle::new().green())
            }
            NotificationLevel::Error => {
                self.styled(&format!("✗ {}", notice.message), ContentStyle::new().red())
            }
        };
        writeln!(out, "{line}")
    }

    pub fn paint_hint<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        writeln!(out, "{}", self.styled(text, ContentStyle::new().dark_grey()))
    }
}
