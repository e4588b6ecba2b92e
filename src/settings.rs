//! User settings persisted as TOML under `~/.lawgic/settings.toml`.
//!
//! Settings are the lowest configuration layer. Environment variables override
//! them when the runtime [`crate::config::ClientConfig`] is resolved.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the analysis backend.
    pub api_url: String,
    /// Display and request language code.
    pub language: String,
    /// Transport timeout for a single request.
    pub request_timeout_secs: u64,
    /// Capability mode a new session starts in.
    pub default_mode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            language: "en".to_string(),
            request_timeout_secs: 120,
            default_mode: "quick".to_string(),
        }
    }
}

impl Settings {
    /// `~/.lawgic/settings.toml`, falling back to the working directory when
    /// no home directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lawgic")
            .join("settings.toml")
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::Settings;
    use crate::error::ConfigError;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings =
            Settings::load_from(&dir.path().join("absent.toml")).expect("defaults expected");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "language = \"hi\"\nrequest_timeout_secs = 30").expect("write");

        let settings = Settings::load_from(file.path()).expect("settings");
        assert_eq!(settings.language, "hi");
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.api_url, super::DEFAULT_API_URL);
        assert_eq!(settings.default_mode, "quick");
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "language = [").expect("write");

        let err = Settings::load_from(file.path()).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }
}
