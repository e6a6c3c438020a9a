//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! reported at once rather than stopping at the first.

use thiserror::Error;

use crate::config::schema::TraceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} contains invalid characters: {value:?}")]
    InvalidName { field: &'static str, value: String },

    #[error("unknown log level: {0:?}")]
    UnknownLogLevel(String),
}

/// Validates a parsed configuration.
pub fn validate_config(config: &TraceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_param("tracing.timing_param", &config.tracing.timing_param, &mut errors);
    check_param(
        "tracing.query_text_param",
        &config.tracing.query_text_param,
        &mut errors,
    );

    let name = &config.server.name;
    if !name.chars().all(is_name_char) {
        errors.push(ValidationError::InvalidName {
            field: "server.name",
            value: name.clone(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_param(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::Empty { field });
    } else if !value.chars().all(is_name_char) {
        errors.push(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&TraceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TraceConfig::default();
        config.tracing.timing_param = String::new();
        config.tracing.query_text_param = "s&x".into();
        config.server.name = "my server".into();
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors[0],
            ValidationError::Empty {
                field: "tracing.timing_param"
            }
        );
        assert!(errors[3].to_string().contains("loud"));
    }
}
