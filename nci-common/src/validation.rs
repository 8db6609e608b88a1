//! Configuration validation.
//!
//! Checks ranges and cross-field constraints before a pipeline run, so a bad
//! parameter is reported once instead of producing a meaningless series.

use thiserror::Error;

use crate::config::{Config, LexiconConfig, ObservabilityConfig, PipelineConfig};
use crate::logging::{LOG_FORMATS, LOG_LEVELS};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if let Err(e) = self.pipeline.validate() {
            errors.push(e);
        }

        if let Err(e) = self.lexicon.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        if !LOG_FORMATS.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", LOG_FORMATS.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.ma == 0 {
            return Err(ValidationError::InvalidValue {
                field: "pipeline.ma".into(),
                reason: "moving-average window must be at least 1".into(),
            });
        }

        for (field, w) in [("pipeline.w1", self.w1), ("pipeline.w2", self.w2), ("pipeline.w3", self.w3)] {
            if !w.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "weight must be a finite number".into(),
                });
            }
        }

        if let (Some(start), Some(end)) = (self.win_start, self.win_end) {
            if start > end {
                return Err(ValidationError::Conflict {
                    reason: format!("reference window starts ({}) after it ends ({})", start, end),
                });
            }
        }

        if self.top_n == 0 {
            return Err(ValidationError::InvalidValue {
                field: "pipeline.top_n".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if matches!(self.focus.as_deref(), Some(f) if f.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: "pipeline.focus".into(),
                reason: "must not be blank; omit it to disable the sub-filter".into(),
            });
        }

        Ok(())
    }
}

impl Validate for LexiconConfig {
    fn validate(&self) -> ValidationResult<()> {
        let lists = [
            ("lexicon.justify", &self.justify),
            ("lexicon.deter", &self.deter),
            ("lexicon.escalate", &self.escalate),
            ("lexicon.anchors", &self.anchors),
            ("lexicon.keywords", &self.keywords),
        ];

        for (field, list) in lists {
            if let Some(terms) = list {
                if terms.iter().any(|t| t.is_empty()) {
                    return Err(ValidationError::InvalidValue {
                        field: field.into(),
                        reason: "terms must not be empty strings".into(),
                    });
                }
            }
        }

        Ok(())
    }
}
