#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! [`ContainerConfig`] is built either with `Default` plus the `with_*`
//! builders, or from a JSON options object (every field optional, camelCase):
//!
//! ```json
//! {
//!   "selectionAttribute": "data-responsive-container",
//!   "breakpointAttributes": ["data-breakpoints", "data-responsive-container"],
//!   "defaultBreakpoints": { "container-sm": 0, "container-md": 420 },
//!   "policy": "exclusive-range",
//!   "debounceMs": 100,
//!   "classifyOnRegister": true
//! }
//! ```
//!
//! Unknown keys are ignored so hosts can keep their own settings (such as
//! `logLevel`) in the same object.

use core::time::Duration;

use serde::Deserialize;

use crate::breakpoint::BreakpointMap;
use crate::classes::MatchPolicy;
use crate::error::ConfigError;

/// Marker attribute that opts an element into observation.
pub const DEFAULT_SELECTION_ATTRIBUTE: &str = "data-responsive-container";
/// Dedicated per-element breakpoint attribute, consulted first.
pub const DEFAULT_BREAKPOINT_ATTRIBUTE: &str = "data-breakpoints";
/// Window that coalesces bursts of structural-change notifications.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Configuration shared by the resolver, class updater, and lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    /// Attribute whose presence selects a container.
    pub selection_attribute: String,
    /// Attributes holding per-element breakpoint JSON, in lookup order.
    pub breakpoint_attributes: Vec<String>,
    /// Breakpoints for elements without usable configuration.
    pub default_breakpoints: BreakpointMap,
    /// Width → class matching policy.
    pub policy: MatchPolicy,
    /// Debounce window for change-triggered reconciliation.
    pub debounce: Duration,
    /// Classify newly registered containers synchronously instead of waiting
    /// for the observer's first callback.
    pub classify_on_register: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            selection_attribute: DEFAULT_SELECTION_ATTRIBUTE.to_owned(),
            breakpoint_attributes: vec![
                DEFAULT_BREAKPOINT_ATTRIBUTE.to_owned(),
                DEFAULT_SELECTION_ATTRIBUTE.to_owned(),
            ],
            default_breakpoints: BreakpointMap::defaults(),
            policy: MatchPolicy::default(),
            debounce: DEFAULT_DEBOUNCE,
            classify_on_register: true,
        }
    }
}

/// Wire form of [`ContainerConfig`]; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawOptions {
    selection_attribute: Option<String>,
    breakpoint_attributes: Option<Vec<String>>,
    default_breakpoints: Option<BreakpointMap>,
    policy: Option<String>,
    debounce_ms: Option<u64>,
    classify_on_register: Option<bool>,
}

impl ContainerConfig {
    /// Parse a JSON options object over the defaults, then validate.
    ///
    /// An empty or whitespace-only payload yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawOptions =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(attribute) = raw.selection_attribute {
            // The marker doubles as a payload attribute unless overridden too.
            for slot in &mut config.breakpoint_attributes {
                if slot == DEFAULT_SELECTION_ATTRIBUTE {
                    slot.clone_from(&attribute);
                }
            }
            config.selection_attribute = attribute;
        }
        if let Some(attributes) = raw.breakpoint_attributes {
            config.breakpoint_attributes = attributes;
        }
        if let Some(defaults) = raw.default_breakpoints {
            config.default_breakpoints = defaults;
        }
        if let Some(policy) = raw.policy {
            config.policy = policy.parse()?;
        }
        if let Some(ms) = raw.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(classify) = raw.classify_on_register {
            config.classify_on_register = classify;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check attribute names; they end up inside a `[name]` selector.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_attribute_name("selectionAttribute", &self.selection_attribute)?;
        if self.breakpoint_attributes.is_empty() {
            return Err(ConfigError::EmptyAttributeList);
        }
        for attribute in &self.breakpoint_attributes {
            check_attribute_name("breakpointAttributes", attribute)?;
        }
        Ok(())
    }

    /// CSS selector matching every container, e.g. `[data-responsive-container]`.
    #[must_use]
    pub fn selector(&self) -> String {
        format!("[{}]", self.selection_attribute)
    }

    /// Set the selection attribute.
    #[must_use]
    pub fn with_selection_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.selection_attribute = attribute.into();
        self
    }

    /// Replace the breakpoint attribute lookup order.
    #[must_use]
    pub fn with_breakpoint_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breakpoint_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the default breakpoints.
    #[must_use]
    pub fn with_default_breakpoints(mut self, defaults: BreakpointMap) -> Self {
        self.default_breakpoints = defaults;
        self
    }

    /// Set the matching policy.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the reconciliation debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Toggle synchronous classification at registration.
    #[must_use]
    pub fn with_classify_on_register(mut self, enabled: bool) -> Self {
        self.classify_on_register = enabled;
        self
    }
}

/// Names must be a bare CSS identifier (`[A-Za-z_][A-Za-z0-9_-]*`) so that
/// `[name]` is a valid selector without escaping.
fn check_attribute_name(field: &'static str, name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidAttribute {
            field,
            value: name.to_owned(),
        })
    }
}
