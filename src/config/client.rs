use std::time::Duration;

use url::Url;

use crate::config::helpers::{parse_string_env, parse_u64_env};
use crate::error::ConfigError;
use crate::i18n::Language;
use crate::session::CapabilityMode;
use crate::settings::Settings;

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL. The path always ends with `/` so endpoint paths join
    /// underneath it.
    pub api_url: Url,
    pub language: Language,
    pub request_timeout: Duration,
    pub default_mode: CapabilityMode,
}

fn validate_api_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "LAWGIC_API_URL".to_string(),
            message: "API URL must not be empty".to_string(),
        });
    }

    let mut url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        key: "LAWGIC_API_URL".to_string(),
        message: format!("not a valid URL: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: "LAWGIC_API_URL".to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidValue {
            key: "LAWGIC_API_URL".to_string(),
            message: "API URL must include a host".to_string(),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn validate_timeout(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "LAWGIC_TIMEOUT_SECS".to_string(),
            message: "timeout must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

impl ClientConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let api_url = validate_api_url(&parse_string_env(
            "LAWGIC_API_URL",
            settings.api_url.clone(),
        )?)?;

        let language_raw = parse_string_env("LAWGIC_LANGUAGE", settings.language.clone())?;
        let language = language_raw
            .parse::<Language>()
            .map_err(|message| ConfigError::InvalidValue {
                key: "LAWGIC_LANGUAGE".to_string(),
                message,
            })?;

        let request_timeout = validate_timeout(parse_u64_env(
            "LAWGIC_TIMEOUT_SECS",
            settings.request_timeout_secs,
        )?)?;

        let mode_raw = parse_string_env("LAWGIC_DEFAULT_MODE", settings.default_mode.clone())?;
        let default_mode = mode_raw
            .parse::<CapabilityMode>()
            .map_err(|message| ConfigError::InvalidValue {
                key: "LAWGIC_DEFAULT_MODE".to_string(),
                message,
            })?;

        Ok(Self {
            api_url,
            language,
            request_timeout,
            default_mode,
        })
    }
}

/// Command-line flags, applied after the settings file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub language: Option<Language>,
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(raw) = &overrides.api_url {
            self.api_url = validate_api_url(raw)?;
        }
        if let Some(language) = overrides.language {
            self.language = language;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.request_timeout = validate_timeout(secs)?;
        }
        Ok(self)
    }
}
