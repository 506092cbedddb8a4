#![forbid(unsafe_code)]

//! Breakpoint maps, sorted breakpoint sets, and the per-element resolver.
//!
//! A [`BreakpointMap`] is what authors write: class name → minimum width, in
//! source order. A [`BreakpointSet`] is what the class updater consumes: the
//! same entries sorted ascending by threshold. Sets are rebuilt on every
//! evaluation and never cached, so attribute edits take effect on the next
//! resize without any invalidation.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::config::ContainerConfig;
use crate::element::ContainerElement;
use crate::error::BreakpointParseError;

/// Class applied to the narrowest default band.
pub const CONTAINER_SM: &str = "container-sm";
/// Class applied to the medium default band.
pub const CONTAINER_MD: &str = "container-md";
/// Class applied to the large default band.
pub const CONTAINER_LG: &str = "container-lg";
/// Class applied to the widest default band.
pub const CONTAINER_XL: &str = "container-xl";

/// Default thresholds, in CSS pixels, for elements without configuration.
pub const DEFAULT_BREAKPOINTS: [(&str, f64); 4] = [
    (CONTAINER_SM, 0.0),
    (CONTAINER_MD, 420.0),
    (CONTAINER_LG, 768.0),
    (CONTAINER_XL, 1024.0),
];

/// A class name and the minimum width at which it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub name: String,
    pub threshold: f64,
}

impl Breakpoint {
    #[must_use]
    pub fn new(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }
}

/// Class name → threshold mapping in source (insertion) order.
///
/// Only finite, non-negative thresholds are stored. Re-inserting an existing
/// name updates its threshold in place, the way assigning to an existing
/// object key does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakpointMap {
    entries: Vec<(String, f64)>,
}

impl BreakpointMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The four `container-*` defaults.
    #[must_use]
    pub fn defaults() -> Self {
        DEFAULT_BREAKPOINTS.iter().copied().collect()
    }

    /// Insert or update `name`. Returns `false` if the threshold was rejected.
    pub fn insert(&mut self, name: impl Into<String>, threshold: f64) -> bool {
        if !threshold.is_finite() || threshold < 0.0 {
            return false;
        }
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = threshold,
            None => self.entries.push((name, threshold)),
        }
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|&(_, threshold)| threshold)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, threshold)| (name.as_str(), *threshold))
    }

    /// Build from a parsed JSON object, skipping entries that are not usable
    /// thresholds (strings, booleans, nested values, negative numbers).
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut map = Self::new();
        for (name, value) in object {
            let accepted = value
                .as_f64()
                .is_some_and(|threshold| map.insert(name.as_str(), threshold));
            if !accepted {
                tracing::trace!(class = %name, value = %value, "skipping non-numeric breakpoint");
            }
        }
        map
    }

    /// Sort into a [`BreakpointSet`]. Equal thresholds keep insertion order.
    #[must_use]
    pub fn to_set(&self) -> BreakpointSet {
        let mut breakpoints: Vec<Breakpoint> = self
            .entries
            .iter()
            .map(|(name, threshold)| Breakpoint::new(name.clone(), *threshold))
            .collect();
        breakpoints.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        BreakpointSet { breakpoints }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for BreakpointMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, threshold) in iter {
            map.insert(name, threshold);
        }
        map
    }
}

impl<'de> Deserialize<'de> for BreakpointMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_json_object(&object))
    }
}

/// Breakpoints for one element, sorted ascending by threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakpointSet {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointSet {
    #[must_use]
    pub fn as_slice(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.breakpoints.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Class names in threshold order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.breakpoints.iter().map(|bp| bp.name.as_str())
    }
}

impl<'a> IntoIterator for &'a BreakpointSet {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.breakpoints.iter()
    }
}

/// Parse a per-element payload such as `{"small":400,"large":800}`.
pub fn parse_breakpoints(raw: &str) -> Result<BreakpointMap, BreakpointParseError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| BreakpointParseError::Json(e.to_string()))?;
    match value {
        Value::Object(object) => Ok(BreakpointMap::from_json_object(&object)),
        other => Err(BreakpointParseError::NotAnObject(json_kind(&other))),
    }
}

/// Resolve the sorted breakpoint set for `element`.
///
/// Attributes named by [`ContainerConfig::breakpoint_attributes`] are tried in
/// order; the first one holding a JSON object wins. Absent elements, absent or
/// empty attributes, and payloads that fail to parse all fall through to
/// [`ContainerConfig::default_breakpoints`]. Never fails.
#[must_use]
pub fn resolve<E>(element: Option<&E>, config: &ContainerConfig) -> BreakpointSet
where
    E: ContainerElement + ?Sized,
{
    if let Some(element) = element {
        for attribute in &config.breakpoint_attributes {
            let Some(raw) = element.attribute(attribute) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            match parse_breakpoints(&raw) {
                Ok(map) => return map.to_set(),
                Err(err) => {
                    tracing::debug!(%attribute, error = %err, "ignoring breakpoint attribute");
                }
            }
        }
    }
    config.default_breakpoints.to_set()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeElement;
    use pretty_assertions::assert_eq;

    fn pairs(set: &BreakpointSet) -> Vec<(&str, f64)> {
        set.iter()
            .map(|bp| (bp.name.as_str(), bp.threshold))
            .collect()
    }

    #[test]
    fn no_element_resolves_sorted_defaults() {
        let set = resolve::<FakeElement>(None, &ContainerConfig::default());
        assert_eq!(
            pairs(&set),
            vec![
                ("container-sm", 0.0),
                ("container-md", 420.0),
                ("container-lg", 768.0),
                ("container-xl", 1024.0),
            ]
        );
    }

    #[test]
    fn element_without_configuration_resolves_defaults() {
        let element = FakeElement::new().with_attribute("data-responsive-container", "");
        let set = resolve(Some(&element), &ContainerConfig::default());
        assert_eq!(set, BreakpointMap::defaults().to_set());
    }

    #[test]
    fn custom_breakpoints_are_sorted_by_threshold() {
        let element = FakeElement::new().with_attribute(
            "data-responsive-container",
            r#"{"small":400,"huge":1440,"large":800}"#,
        );
        let set = resolve(Some(&element), &ContainerConfig::default());
        assert_eq!(
            pairs(&set),
            vec![("small", 400.0), ("large", 800.0), ("huge", 1440.0)]
        );
    }

    #[test]
    fn data_breakpoints_takes_priority_over_marker_payload() {
        let element = FakeElement::new()
            .with_attribute("data-breakpoints", r#"{"wide":900}"#)
            .with_attribute("data-responsive-container", r#"{"narrow":100}"#);
        let set = resolve(Some(&element), &ContainerConfig::default());
        assert_eq!(pairs(&set), vec![("wide", 900.0)]);
    }

    #[test]
    fn malformed_payload_falls_through_to_next_attribute() {
        let element = FakeElement::new()
            .with_attribute("data-breakpoints", "{not json")
            .with_attribute("data-responsive-container", r#"{"narrow":100}"#);
        let set = resolve(Some(&element), &ContainerConfig::default());
        assert_eq!(pairs(&set), vec![("narrow", 100.0)]);
    }

    #[test]
    fn boolean_like_marker_values_fall_back_to_defaults() {
        for raw in ["true", "false", "1", "\"yes\"", "[1,2]", "null"] {
            let element = FakeElement::new().with_attribute("data-responsive-container", raw);
            let set = resolve(Some(&element), &ContainerConfig::default());
            assert_eq!(set, BreakpointMap::defaults().to_set(), "payload {raw}");
        }
    }

    #[test]
    fn equal_thresholds_keep_source_order() {
        let map = parse_breakpoints(r#"{"b":10,"a":10,"c":5}"#).unwrap();
        assert_eq!(pairs(&map.to_set()), vec![("c", 5.0), ("b", 10.0), ("a", 10.0)]);
    }

    #[test]
    fn unusable_values_are_skipped() {
        let map =
            parse_breakpoints(r#"{"small":400,"medium":"x","neg":-1,"nested":{},"large":2501.5}"#)
                .unwrap();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("small", 400.0), ("large", 2501.5)]
        );
    }

    #[test]
    fn parse_reports_non_object_kind() {
        assert_eq!(
            parse_breakpoints("true"),
            Err(BreakpointParseError::NotAnObject("a boolean"))
        );
        assert!(matches!(
            parse_breakpoints("{"),
            Err(BreakpointParseError::Json(_))
        ));
    }

    #[test]
    fn insert_updates_existing_name_in_place() {
        let mut map: BreakpointMap = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert!(map.insert("a", 3.0));
        assert!(!map.insert("c", f64::NAN));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", 3.0), ("b", 2.0)]);
        assert_eq!(map.get("a"), Some(3.0));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn custom_defaults_from_config_are_used() {
        let config = ContainerConfig::default()
            .with_default_breakpoints([("narrow", 0.0), ("wide", 600.0)].into_iter().collect());
        let set = resolve::<FakeElement>(None, &config);
        assert_eq!(pairs(&set), vec![("narrow", 0.0), ("wide", 600.0)]);
    }
}
