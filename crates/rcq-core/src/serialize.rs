#![forbid(unsafe_code)]

//! Authoring helper: serialize breakpoints into an attribute-safe payload.

use serde_json::{Map, Value};

/// Serialize a class → threshold mapping for use as an HTML attribute value.
///
/// Entries whose value is not a JSON number are dropped. Key order and number
/// formatting are preserved (`400` stays `400`). The JSON text is then
/// attribute-escaped, so `{small: 400}` becomes `{&quot;small&quot;:400}`.
#[must_use]
pub fn responsive_container_breakpoints(mapping: &Map<String, Value>) -> String {
    let numeric: Map<String, Value> = mapping
        .iter()
        .filter(|(_, value)| value.is_number())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    escape_attribute(&Value::Object(numeric).to_string())
}

/// Escape `& < > " '` for a double- or single-quoted attribute value.
#[must_use]
pub fn escape_attribute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}
