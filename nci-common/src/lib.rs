//! NCI Common - Shared configuration, errors and logging for the NCI workspace.
//!
//! This crate provides:
//! - Configuration types and loading (pipeline parameters, lexicon overrides)
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod config_loader;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, LexiconConfig, Mode, ObservabilityConfig, PipelineConfig, PrimaryMetric, SeriesView,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, Mode, PipelineConfig, PrimaryMetric, SeriesView};
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::logging::init_logging;
    pub use crate::validation::{Validate, ValidationError};
}
