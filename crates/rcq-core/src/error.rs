#![forbid(unsafe_code)]

//! Error types for the fallible parsers.

/// Errors from parsing a per-element breakpoint payload.
///
/// The resolver swallows these and falls back to the defaults; they surface
/// only through [`parse_breakpoints`](crate::breakpoint::parse_breakpoints).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointParseError {
    /// Payload is not valid JSON.
    Json(String),
    /// Payload parsed, but to something other than an object.
    NotAnObject(&'static str),
}

impl core::fmt::Display for BreakpointParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::NotAnObject(kind) => write!(f, "expected a JSON object, found {kind}"),
        }
    }
}

impl std::error::Error for BreakpointParseError {}

/// Errors from building a [`ContainerConfig`](crate::config::ContainerConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Options payload is not valid JSON or has a field of the wrong type.
    Json(String),
    /// An attribute name is not a bare identifier usable as `[name]`.
    InvalidAttribute { field: &'static str, value: String },
    /// No attribute left to read per-element breakpoints from.
    EmptyAttributeList,
    /// Unknown matching policy name.
    UnknownPolicy(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "invalid options: {msg}"),
            Self::InvalidAttribute { field, value } => {
                write!(f, "invalid attribute name for {field}: {value:?}")
            }
            Self::EmptyAttributeList => f.write_str("breakpointAttributes must not be empty"),
            Self::UnknownPolicy(name) => write!(f, "unknown matching policy: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}
