//! Configuration management for NCI tools.
//!
//! The CLI reads a JSON configuration file at `~/.nci/config.json`, optionally
//! merged with a sibling `lexicon.json` (see [`crate::config_loader`]).
//!
//! # Configuration Priority
//!
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (NCI_* prefix)
//! 3. Explicit config file values
//! 4. Default values
//!
//! # Environment Variable Mapping
//!
//! - `NCI_LOG_LEVEL` → observability.log_level
//! - `NCI_LOG_FORMAT` → observability.log_format
//! - `NCI_MA` → pipeline.ma
//! - `NCI_LEAD` → pipeline.lead

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".nci"),
        |dirs| dirs.home_dir().join(".nci"),
    )
}

// ============================================================================
// Pipeline Selectors
// ============================================================================

/// How a day's raw per-category count is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Lexicon hit counts on relevant sentences, volatility pipeline.
    #[default]
    HitCount,
    /// One pre-assigned category label per record, standardized pipeline.
    Label,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HitCount => write!(f, "hit_count"),
            Self::Label => write!(f, "label"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit_count" | "hit-count" | "hits" => Ok(Self::HitCount),
            "label" | "labels" => Ok(Self::Label),
            other => Err(format!("unknown mode '{}': expected hit_count or label", other)),
        }
    }
}

/// Primary metric `f1` feeding the volatility pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryMetric {
    /// One per retained record
    #[default]
    Docs,
    /// General keyword hits on retained sentences
    Keywords,
    /// Retained text length in thousands of characters
    Chars,
    /// Sum of the three bag hit counts
    Intent,
}

impl fmt::Display for PrimaryMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Docs => "docs",
            Self::Keywords => "keywords",
            Self::Chars => "chars",
            Self::Intent => "intent",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PrimaryMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docs" => Ok(Self::Docs),
            "keywords" => Ok(Self::Keywords),
            "chars" => Ok(Self::Chars),
            "intent" => Ok(Self::Intent),
            other => Err(format!(
                "unknown primary metric '{}': expected docs, keywords, chars or intent",
                other
            )),
        }
    }
}

/// Which output series a consumer should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesView {
    #[default]
    All,
    Nci,
    Justify,
    Deter,
    Escalate,
}

impl FromStr for SeriesView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "nci" => Ok(Self::Nci),
            "justify" => Ok(Self::Justify),
            "deter" => Ok(Self::Deter),
            "escalate" => Ok(Self::Escalate),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// Runtime parameters of the record-to-index pipeline.
///
/// Every field takes part in the result cache key, so any change triggers a
/// full recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Moving-average window in days (>= 1)
    #[serde(default = "default_ma")]
    pub ma: usize,

    /// Lead-time shift in days; positive pulls future values earlier
    #[serde(default)]
    pub lead: i64,

    /// Reference window start for min-max normalization (default: first day)
    #[serde(default)]
    pub win_start: Option<NaiveDate>,

    /// Reference window end for min-max normalization (default: last day)
    #[serde(default)]
    pub win_end: Option<NaiveDate>,

    /// Composite weight for s1 / justify
    #[serde(default = "default_w1")]
    pub w1: f64,

    /// Composite weight for s2 / deter
    #[serde(default = "default_w2")]
    pub w2: f64,

    /// Composite weight for s3 / escalate
    #[serde(default = "default_w3")]
    pub w3: f64,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub primary_metric: PrimaryMetric,

    /// Apply log10(count + 1) before standardizing (label mode only)
    #[serde(default = "default_true")]
    pub log_transform: bool,

    /// Drop records that open with a reporter question
    #[serde(default = "default_true")]
    pub drop_reporter_questions: bool,

    #[serde(default)]
    pub view: SeriesView,

    /// Number of terms per category in the frequency report
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Optional sub-filter: only records whose text or source contains this
    /// string contribute counts. The calendar still spans every record.
    #[serde(default)]
    pub focus: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ma: default_ma(),
            lead: 0,
            win_start: None,
            win_end: None,
            w1: default_w1(),
            w2: default_w2(),
            w3: default_w3(),
            mode: Mode::default(),
            primary_metric: PrimaryMetric::default(),
            log_transform: true,
            drop_reporter_questions: true,
            view: SeriesView::default(),
            top_n: default_top_n(),
            focus: None,
        }
    }
}

impl PipelineConfig {
    /// Composite weights as a tuple.
    pub fn weights(&self) -> (f64, f64, f64) {
        (self.w1, self.w2, self.w3)
    }
}

fn default_ma() -> usize {
    7
}

fn default_w1() -> f64 {
    0.4
}

fn default_w2() -> f64 {
    0.3
}

fn default_w3() -> f64 {
    0.3
}

fn default_top_n() -> usize {
    10
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Lexicon Overrides
// ============================================================================

/// Optional replacements for the built-in term lists.
///
/// A `None` list keeps the built-in default; an empty list disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LexiconConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deter: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalate: Option<Vec<String>>,

    /// Topical anchor vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Vec<String>>,

    /// General keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets capped at `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub lexicon: LexiconConfig,
}

impl Config {
    /// Load configuration from the default directory.
    ///
    /// A missing directory yields the defaults.
    pub fn load() -> Result<Self> {
        let dir = config_dir();
        if !dir.exists() {
            tracing::debug!("Config directory not found, using defaults");
            return Ok(Self::default());
        }

        crate::config_loader::load_modular_config(Some(dir.clone()))
            .and_then(Self::from_value)
            .with_context(|| format!("Failed to parse config from {}", dir.display()))
            .map_err(config_error)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))
            .map_err(config_error)?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
            .map_err(config_error)
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Deserialize from an already merged JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).context("Invalid configuration structure")
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("NCI_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("NCI_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(ma) = std::env::var("NCI_MA") {
            if let Ok(v) = ma.trim().parse() {
                self.pipeline.ma = v;
            }
        }
        if let Ok(lead) = std::env::var("NCI_LEAD") {
            if let Ok(v) = lead.trim().parse() {
                self.pipeline.lead = v;
            }
        }
    }

}

/// Tag a load failure as a configuration error so callers can tell it apart.
fn config_error(e: anyhow::Error) -> anyhow::Error {
    crate::Error::Config(format!("{:#}", e)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_pipeline_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.ma, 7);
        assert_eq!(cfg.lead, 0);
        assert_eq!(cfg.weights(), (0.4, 0.3, 0.3));
        assert_eq!(cfg.mode, Mode::HitCount);
        assert_eq!(cfg.primary_metric, PrimaryMetric::Docs);
        assert!(cfg.drop_reporter_questions);
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "pipeline": { "ma": 3, "lead": -2, "mode": "label", "win_start": "2022-08-01" },
            "observability": { "level": "debug" }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.pipeline.ma, 3);
        assert_eq!(cfg.pipeline.lead, -2);
        assert_eq!(cfg.pipeline.mode, Mode::Label);
        assert_eq!(
            cfg.pipeline.win_start,
            NaiveDate::from_ymd_opt(2022, 8, 1)
        );
        assert_eq!(cfg.pipeline.w1, 0.4);
        assert_eq!(cfg.observability.log_level, "debug");
        assert_eq!(cfg.observability.log_format, "pretty");
        assert!(cfg.lexicon.justify.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"pipeline": {"primary_metric": "intent"}, "lexicon": {"anchors": ["台灣"]}}"#,
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.pipeline.primary_metric, PrimaryMetric::Intent);
        assert_eq!(loaded.lexicon.anchors, Some(vec!["台灣".to_string()]));
        assert_eq!(loaded.pipeline.ma, 7);
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.json")).unwrap_err();
        let cause = err.downcast_ref::<crate::Error>().unwrap();
        assert!(cause.is_config());
        assert_eq!(cause.exit_code(), 78);
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_with_env(Some(&path)).unwrap_err();
        let cause = err.downcast_ref::<crate::Error>().unwrap();
        assert_eq!(cause.exit_code(), 78);
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test_case("docs", PrimaryMetric::Docs)]
    #[test_case("Keywords", PrimaryMetric::Keywords)]
    #[test_case(" chars ", PrimaryMetric::Chars)]
    #[test_case("intent", PrimaryMetric::Intent)]
    fn test_primary_metric_from_str(input: &str, expected: PrimaryMetric) {
        assert_eq!(input.parse::<PrimaryMetric>().unwrap(), expected);
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [Mode::HitCount, Mode::Label] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert!("volatility".parse::<Mode>().is_err());
    }
}
