#![forbid(unsafe_code)]

//! Platform-independent parsing of the JS options object.
//!
//! The wasm layer stringifies whatever the host passed (`JSON.stringify`) and
//! hands the text here, so option handling is tested natively. Besides the
//! [`ContainerConfig`] fields this accepts `logLevel` (`off`, `error`, `warn`,
//! `info`, `debug`, `trace`; default `warn`).

use rcq_core::{ConfigError, ContainerConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

/// Default console verbosity.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::WARN;

/// Errors from parsing host options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Invalid container configuration.
    Config(ConfigError),
    /// Unrecognized `logLevel` value.
    LogLevel(String),
}

impl core::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(err) => err.fmt(f),
            Self::LogLevel(value) => write!(f, "unknown logLevel: {value:?}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::LogLevel(_) => None,
        }
    }
}

impl From<ConfigError> for OptionsError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Parsed host options.
#[derive(Debug, Clone, PartialEq)]
pub struct WebOptions {
    pub config: ContainerConfig,
    pub log_level: LevelFilter,
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            config: ContainerConfig::default(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawWebOptions {
    log_level: Option<String>,
}

/// Parse stringified host options. `None` means the host passed nothing.
pub fn parse_web_options(json: Option<&str>) -> Result<WebOptions, OptionsError> {
    let Some(json) = json.filter(|json| !json.trim().is_empty()) else {
        return Ok(WebOptions::default());
    };

    let config = ContainerConfig::from_json(json)?;
    let raw: RawWebOptions = serde_json::from_str(json)
        .map_err(|e| OptionsError::Config(ConfigError::Json(e.to_string())))?;
    let log_level = match raw.log_level {
        Some(level) => level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| OptionsError::LogLevel(level))?,
        None => DEFAULT_LOG_LEVEL,
    };

    Ok(WebOptions { config, log_level })
}
