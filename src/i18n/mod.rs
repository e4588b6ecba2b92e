//! Localized label catalogs.
//!
//! A [`Catalog`] is a read-only `key -> text` table. The built-in catalogs are
//! embedded TOML files flattened into dotted keys (`[response] risk = ".."`
//! becomes `response.risk`). Callers pass a catalog by reference at call
//! time, so swapping the display language never touches text that has
//! already been rendered.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Display and request language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Hindi];

    /// Code sent to the backend in the `language` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "हिन्दी",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "hi" | "hindi" => Ok(Self::Hindi),
            other => Err(format!("unsupported language '{other}' (expected 'en' or 'hi')")),
        }
    }
}

/// Read-only lookup of localized strings.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

static ENGLISH: LazyLock<Catalog> =
    LazyLock::new(|| Catalog::embedded(Language::English, include_str!("en.toml")));
static HINDI: LazyLock<Catalog> =
    LazyLock::new(|| Catalog::embedded(Language::Hindi, include_str!("hi.toml")));

impl Catalog {
    /// Built-in catalog for `language`.
    pub fn for_language(language: Language) -> &'static Catalog {
        match language {
            Language::English => &ENGLISH,
            Language::Hindi => &HINDI,
        }
    }

    /// Build a catalog from explicit pairs. Used to inject minimal catalogs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a TOML document of (possibly nested) string tables.
    pub fn from_toml(raw: &str) -> Result<Self, String> {
        let table: toml::Table =
            toml::from_str(raw).map_err(|e| format!("invalid catalog TOML: {}", e))?;
        let mut entries = HashMap::new();
        flatten_into(&mut entries, None, &table)?;
        Ok(Self { entries })
    }

    fn embedded(language: Language, raw: &str) -> Self {
        match Self::from_toml(raw) {
            Ok(catalog) => catalog,
            Err(e) => {
                // Labels pass through untranslated with an empty catalog.
                tracing::error!("Built-in {} catalog failed to load: {}", language, e);
                Self::default()
            }
        }
    }

    /// Localized text for `key`, if the catalog has it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Localized text for `key`, or the key itself when missing.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn flatten_into(
    out: &mut HashMap<String, String>,
    prefix: Option<&str>,
    table: &toml::Table,
) -> Result<(), String> {
    for (key, value) in table {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            toml::Value::String(text) => {
                out.insert(full_key, text.clone());
            }
            toml::Value::Table(nested) => flatten_into(out, Some(&full_key), nested)?,
            other => {
                return Err(format!(
                    "catalog key '{}' must be a string or table, found {}",
                    full_key,
                    other.type_str()
                ));
            }
        }
    }
    Ok(())
}
