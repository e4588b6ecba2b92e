//! Converts arbitrary backend payloads into a markup document.
//!
//! The document convention is line oriented:
//! - `**Label:** value` starts a titled block (`**Label:**` on its own line
//!   when the value spans several lines),
//! - `• item` is a bullet,
//! - `**text**` inside a line is emphasis.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Number, Value};

use crate::i18n::Catalog;
use crate::response::labels::LabelTranslator;

/// Untyped payload returned by the analysis backend.
///
/// `serde_json` is built with `preserve_order`, so mapping entries iterate in
/// payload order.
pub type BackendValue = Value;

/// Emitted for an absent or null payload.
pub const NO_INSIGHTS: &str = "No insights were returned from the backend.";

const BULLET: &str = "• ";

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_-]+").expect("valid separator regex"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static WORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w").expect("valid word-start regex"));

/// Render `value` as a markup document using `catalog` for labels and
/// placeholder messages.
pub fn normalize(value: &BackendValue, catalog: &Catalog) -> String {
    normalize_with(value, &LabelTranslator::new(catalog))
}

fn normalize_with(value: &BackendValue, translator: &LabelTranslator<'_>) -> String {
    match value {
        Value::Null => NO_INSIGHTS.to_string(),
        Value::String(text) => normalize_string(text, translator),
        Value::Number(number) => number_text(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => {
            if items.is_empty() {
                return translator.catalog().text("common.no_items");
            }
            items
                .iter()
                .map(|item| {
                    let rendered = normalize_with(item, translator);
                    if rendered.starts_with(BULLET) {
                        rendered
                    } else {
                        format!("{BULLET}{rendered}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::Object(entries) => {
            if entries.is_empty() {
                return translator.catalog().text("common.no_details");
            }
            entries
                .iter()
                .map(|(key, value)| {
                    let label = display_label(key, translator);
                    let rendered = normalize_with(value, translator);
                    if rendered.contains('\n') {
                        format!("**{label}:**\n{rendered}")
                    } else {
                        format!("**{label}:** {rendered}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}

/// Strings that look like a JSON array or object are parsed and rendered as
/// structure. Anything else, including look-alikes that fail to parse, is
/// returned untouched.
fn normalize_string(text: &str, translator: &LabelTranslator<'_>) -> String {
    let trimmed = text.trim();
    if looks_like_json(trimmed)
        && let Ok(parsed) = serde_json::from_str::<Value>(trimmed)
    {
        return normalize_with(&parsed, translator);
    }
    text.to_string()
}

/// Bracket sniffing only. Plain prose wrapped in matching brackets also
/// qualifies; the parse attempt decides.
pub fn looks_like_json(trimmed: &str) -> bool {
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
            (float as i64).to_string()
        }
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

fn display_label(key: &str, translator: &LabelTranslator<'_>) -> String {
    let spaced = key.to_lowercase().replace('_', " ");
    translator
        .lookup(&spaced)
        .unwrap_or_else(|| start_case(key))
}

/// `risk_level` -> `Risk Level`, `next--steps` -> `Next Steps`.
pub fn start_case(value: &str) -> String {
    let spaced = SEPARATOR_RUNS.replace_all(value, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&spaced, " ");
    WORD_START
        .replace_all(collapsed.trim(), |caps: &Captures<'_>| caps[0].to_uppercase())
        .into_owned()
}

/// Parts of an assistant reply, assembled into one document.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSections<'a> {
    /// Mode-specific heading, e.g. "Legal Research Summary".
    pub title: &'a str,
    /// Backend echo of the submitted input.
    pub input: Option<&'a str>,
    pub prediction: &'a BackendValue,
    /// Backend reference for stored documents.
    pub reference_id: Option<&'a str>,
}

/// Title, input echo, normalized prediction and reference id, separated by
/// blank lines. Empty sections are skipped.
pub fn compose_response(sections: &ResponseSections<'_>, catalog: &Catalog) -> String {
    let mut parts = Vec::with_capacity(4);

    if !sections.title.is_empty() {
        parts.push(format!("**{}**", sections.title));
    }

    if let Some(input) = sections.input.filter(|input| !input.is_empty()) {
        parts.push(format!(
            "**{}:**\n{}",
            catalog.text("common.input_summary"),
            input
        ));
    }

    let prediction = normalize(sections.prediction, catalog);
    if !prediction.is_empty() {
        parts.push(prediction);
    }

    if let Some(reference) = sections.reference_id {
        parts.push(format!(
            "{}: {}",
            catalog.text("common.reference_id"),
            reference
        ));
    }

    parts.join("\n\n")
}
