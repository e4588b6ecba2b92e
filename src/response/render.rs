//! Line-oriented markup parser producing display blocks.
//!
//! Each source line maps to exactly one block, in source order. A line is
//! classified by the first rule that matches:
//!
//! 1. `**Header**[:] remainder` -> [`DisplayBlock::Heading`]
//! 2. blank -> [`DisplayBlock::Spacer`]
//! 3. `•`/`-` after leading whitespace -> [`DisplayBlock::Bullet`]
//! 4. `1. text` -> [`DisplayBlock::NumberedItem`]
//! 5. contains ` v. ` or ` vs. ` -> [`DisplayBlock::Citation`]
//! 6. anything else -> [`DisplayBlock::Paragraph`]

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::i18n::Catalog;
use crate::response::labels::LabelTranslator;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*([^*]+?):?\*\*:?\s*(.*)$").expect("valid heading regex")
});
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s").expect("valid numbered item regex"));
static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid numbered prefix regex"));
static EMPHASIS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*").expect("valid emphasis regex"));

const BULLET_MARKERS: [char; 2] = ['•', '-'];
const CITATION_MARKERS: [&str; 2] = [" v. ", " vs. "];

/// Icon category for a heading, derived from keywords in the raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderIcon {
    Document,
    Alert,
    Legal,
    Book,
    Shield,
    Check,
    People,
    Briefcase,
    Calendar,
    Generic,
}

/// Keyword groups in priority order; first containing match wins.
const ICON_RULES: &[(&[&str], HeaderIcon)] = &[
    (&["document", "summary"], HeaderIcon::Document),
    (&["risk", "warning"], HeaderIcon::Alert),
    (&["case", "legal"], HeaderIcon::Legal),
    (&["statute", "law"], HeaderIcon::Book),
    (&["compliance", "regulation"], HeaderIcon::Shield),
    (&["recommend", "next"], HeaderIcon::Check),
    (&["jurisdiction", "court"], HeaderIcon::People),
    (&["remed", "action"], HeaderIcon::Briefcase),
    (&["development", "recent"], HeaderIcon::Calendar),
];

pub fn categorize(header: &str) -> HeaderIcon {
    let lower = header.to_lowercase();
    ICON_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, icon)| *icon)
        .unwrap_or(HeaderIcon::Generic)
}

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    Text(String),
    Strong(String),
}

/// Inline content of a block: plain and emphasized runs in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InlineText(pub Vec<InlineSpan>);

impl InlineText {
    pub fn spans(&self) -> &[InlineSpan] {
        &self.0
    }

    pub fn has_emphasis(&self) -> bool {
        self.0.iter().any(|span| matches!(span, InlineSpan::Strong(_)))
    }
}

/// One rendered unit of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBlock {
    Heading {
        label: String,
        icon: HeaderIcon,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<InlineText>,
    },
    Bullet {
        text: InlineText,
    },
    NumberedItem {
        number: String,
        text: InlineText,
    },
    /// Line that names a case, e.g. `Roe v. Wade`.
    Citation {
        text: InlineText,
    },
    Paragraph {
        text: InlineText,
    },
    Spacer,
}

/// Parse `document` into display blocks, translating heading labels with
/// `catalog`.
pub fn render(document: &str, catalog: &Catalog) -> Vec<DisplayBlock> {
    let translator = LabelTranslator::new(catalog);
    document
        .split('\n')
        .map(|line| classify_line(line, &translator))
        .collect()
}

fn classify_line(line: &str, translator: &LabelTranslator<'_>) -> DisplayBlock {
    if let Some(caps) = HEADING.captures(line) {
        let header = caps.get(1).map_or("", |m| m.as_str()).trim();
        let remainder = caps.get(2).map_or("", |m| m.as_str());
        return DisplayBlock::Heading {
            label: translator.translate(header),
            icon: categorize(header),
            body: (!remainder.is_empty()).then(|| render_inline(remainder)),
        };
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return DisplayBlock::Spacer;
    }

    if let Some(rest) = line.trim_start().strip_prefix(BULLET_MARKERS) {
        return DisplayBlock::Bullet {
            text: render_inline(rest.trim_start()),
        };
    }

    if let Some(caps) = NUMBERED.captures(line) {
        let number = caps[1].to_string();
        let text = NUMBERED_PREFIX.replace(line, "");
        return DisplayBlock::NumberedItem {
            number,
            text: render_inline(&text),
        };
    }

    if CITATION_MARKERS.iter().any(|marker| line.contains(marker)) {
        return DisplayBlock::Citation {
            text: render_inline(line),
        };
    }

    DisplayBlock::Paragraph {
        text: render_inline(line),
    }
}

/// Split `text` into plain and `**emphasized**` runs. Unbalanced or stray
/// `**` stay literal.
pub fn render_inline(text: &str) -> InlineText {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for found in EMPHASIS_RUN.find_iter(text) {
        push_segment(&mut spans, &text[cursor..found.start()]);
        push_segment(&mut spans, found.as_str());
        cursor = found.end();
    }
    push_segment(&mut spans, &text[cursor..]);
    InlineText(spans)
}

fn push_segment(spans: &mut Vec<InlineSpan>, segment: &str) {
    if segment.is_empty() {
        return;
    }
    if segment.len() >= 4 && segment.starts_with("**") && segment.ends_with("**") {
        spans.push(InlineSpan::Strong(segment[2..segment.len() - 2].to_string()));
    } else {
        spans.push(InlineSpan::Text(segment.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{
        DisplayBlock, HeaderIcon, InlineSpan, InlineText, categorize, render, render_inline,
    };
    use crate::i18n::{Catalog, Language};
    use crate::response::normalize::normalize;

    fn en() -> &'static Catalog {
        Catalog::for_language(Language::English)
    }

    fn text(s: &str) -> InlineText {
        InlineText(vec![InlineSpan::Text(s.to_string())])
    }

    #[test]
    fn disclaimer_line_is_a_single_heading() {
        let blocks = render("**Disclaimer:** This is not legal advice.", en());
        assert_eq!(
            blocks,
            vec![DisplayBlock::Heading {
                label: "Disclaimer".to_string(),
                icon: HeaderIcon::Generic,
                body: Some(text("This is not legal advice.")),
            }]
        );
        let DisplayBlock::Heading { body: Some(body), .. } = &blocks[0] else {
            panic!("expected heading with body");
        };
        assert!(!body.has_emphasis());
    }

    #[test]
    fn heading_label_is_translated_with_active_catalog() {
        let blocks = render(
            "**Disclaimer:** This is not legal advice.",
            Catalog::for_language(Language::Hindi),
        );
        let DisplayBlock::Heading { label, .. } = &blocks[0] else {
            panic!("expected heading");
        };
        assert_eq!(label, "अस्वीकरण");
    }

    #[test]
    fn title_only_heading_has_no_body() {
        let blocks = render("**Legal Research Summary**", en());
        assert_eq!(
            blocks,
            vec![DisplayBlock::Heading {
                label: "Legal Research Summary".to_string(),
                icon: HeaderIcon::Document,
                body: None,
            }]
        );
    }

    #[test]
    fn bullets_keep_source_order() {
        let blocks = render("- tenant rights\n- notice period", en());
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Bullet {
                    text: text("tenant rights")
                },
                DisplayBlock::Bullet {
                    text: text("notice period")
                },
            ]
        );
    }

    #[test]
    fn indented_bullet_marker_is_stripped() {
        let blocks = render("   • keep receipts", en());
        assert_eq!(
            blocks,
            vec![DisplayBlock::Bullet {
                text: text("keep receipts")
            }]
        );
    }

    #[test]
    fn case_name_becomes_citation() {
        let blocks = render("Roe v. Wade established...", en());
        assert_eq!(
            blocks,
            vec![DisplayBlock::Citation {
                text: text("Roe v. Wade established...")
            }]
        );
        assert!(matches!(
            render("Smith vs. Jones (2019)", en())[0],
            DisplayBlock::Citation { .. }
        ));
    }

    #[test]
    fn heading_wins_over_citation() {
        let blocks = render("**Roe v. Wade**: privacy", en());
        assert!(
            matches!(&blocks[0], DisplayBlock::Heading { label, .. } if label == "Roe v. Wade"),
            "got {blocks:?}"
        );
    }

    #[test]
    fn numbered_items_need_a_space_after_the_dot() {
        let blocks = render("2. File the answer\n2.5 percent late fee", en());
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::NumberedItem {
                    number: "2".to_string(),
                    text: text("File the answer"),
                },
                DisplayBlock::Paragraph {
                    text: text("2.5 percent late fee")
                },
            ]
        );
    }

    #[test]
    fn blank_lines_become_spacers() {
        let blocks = render("First\n\n   \nSecond", en());
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], DisplayBlock::Spacer);
        assert_eq!(blocks[2], DisplayBlock::Spacer);
    }

    #[test]
    fn inline_emphasis_alternates_with_text() {
        assert_eq!(
            render_inline("Pay **rent** on **time**."),
            InlineText(vec![
                InlineSpan::Text("Pay ".to_string()),
                InlineSpan::Strong("rent".to_string()),
                InlineSpan::Text(" on ".to_string()),
                InlineSpan::Strong("time".to_string()),
                InlineSpan::Text(".".to_string()),
            ])
        );
    }

    #[test]
    fn stray_markers_stay_literal() {
        assert_eq!(render_inline("a ** b"), text("a ** b"));
        assert_eq!(render_inline("**unclosed"), text("**unclosed"));
        assert_eq!(render_inline("***"), text("***"));
        assert_eq!(
            render_inline("****"),
            InlineText(vec![InlineSpan::Strong(String::new())])
        );
    }

    #[test]
    fn categorize_follows_priority_order() {
        assert_eq!(categorize("Document Risk"), HeaderIcon::Document);
        assert_eq!(categorize("Risk Assessment"), HeaderIcon::Alert);
        assert_eq!(categorize("Case Law"), HeaderIcon::Legal);
        assert_eq!(categorize("Relevant Laws"), HeaderIcon::Book);
        assert_eq!(categorize("Compliance Issues"), HeaderIcon::Shield);
        assert_eq!(categorize("Next Steps"), HeaderIcon::Check);
        assert_eq!(categorize("Court Decisions"), HeaderIcon::People);
        assert_eq!(categorize("Available Remedies"), HeaderIcon::Briefcase);
        assert_eq!(categorize("Action Required"), HeaderIcon::Briefcase);
        assert_eq!(categorize("Recent Developments"), HeaderIcon::Calendar);
        assert_eq!(categorize("Disclaimer"), HeaderIcon::Generic);
    }

    #[test]
    fn normalized_mapping_renders_one_heading_per_entry() {
        let value = json!({"summary": "ok", "risk": "low", "next_steps": "sign"});
        let blocks = render(&normalize(&value, en()), en());
        let headings = blocks
            .iter()
            .filter(|b| matches!(b, DisplayBlock::Heading { .. }))
            .count();
        assert_eq!(headings, 3);
    }

    #[test]
    fn blocks_serialize_with_type_tags() {
        let blocks = render("**Risk:** **high**\n", en());
        let value = serde_json::to_value(&blocks).expect("serialize");
        assert_eq!(
            value,
            json!([
                {
                    "type": "heading",
                    "label": "Risk",
                    "icon": "alert",
                    "body": [{"kind": "strong", "text": "high"}]
                },
                {"type": "spacer"}
            ])
        );
    }
}
