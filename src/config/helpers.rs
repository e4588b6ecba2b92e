use crate::error::ConfigError;

/// Read an environment variable, treating empty values as unset.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid UTF-8".to_string(),
        }),
    }
}

pub(crate) fn parse_string_env(key: &str, default: String) -> Result<String, ConfigError> {
    Ok(optional_env(key)?
        .map(|v| v.trim().to_string())
        .unwrap_or(default))
}

pub(crate) fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_env(key)? {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected an unsigned integer: {e}"),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{optional_env, parse_string_env, parse_u64_env};

    const UNSET: &str = "LAWGIC_TEST_SURELY_UNSET_VARIABLE";

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(optional_env(UNSET).expect("ok"), None);
        assert_eq!(
            parse_string_env(UNSET, "fallback".to_string()).expect("ok"),
            "fallback"
        );
        assert_eq!(parse_u64_env(UNSET, 42).expect("ok"), 42);
    }
}
