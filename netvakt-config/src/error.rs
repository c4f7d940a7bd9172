//! Configuration loading and validation errors.

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Everything that can go wrong while assembling a [`crate::NetvaktConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// One or more fields failed validation after extraction.
    #[error("invalid configuration:\n{}", render_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// A provider failed to parse or merge.
    #[error("configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

fn render_errors(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let detail = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            lines.push(format!("  {field}: {detail}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 10))]
        value: u32,
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err: ConfigError = Sample { value: 99 }.validate().unwrap_err().into();
        assert!(err.to_string().contains("value"));
    }
}
