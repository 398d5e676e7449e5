//! Best-effort structured decode for JSON buried in LLM output.
//!
//! LLMs wrap JSON in markdown fences, prose, and the occasional control
//! character even when told not to. This module isolates the cleanup so
//! parsing fragility never leaks into business logic.
//!
//! Contract: [`parse_json`] returns the parsed value or
//! `MalformedResponse`; [`parse_json_or_default`] returns the parsed
//! value or the type's default, never an error.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// Strip markdown code fences, locate the outermost JSON boundaries,
/// and remove ASCII control characters.
pub fn clean_json_text(raw: &str) -> String {
    let text = raw.trim();

    // Strip markdown code fences
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    let text = text.trim();

    // Locate the outermost object or array boundaries; LLMs often wrap
    // the payload in prose before and after.
    let bounded = match (text.find(['{', '[']), text.rfind(['}', ']'])) {
        (Some(start), Some(end)) if end >= start => &text[start..=end],
        _ => text,
    };

    // Control characters inside string literals break serde_json
    bounded
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Clean and parse JSON from free-text LLM output.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> ProviderResult<T> {
    let cleaned = clean_json_text(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| ProviderError::malformed(format!("JSON parse failed: {}", e)))
}

/// Clean and parse JSON, falling back to the type's default on failure.
/// Never returns an error; the failed parse is logged.
pub fn parse_json_or_default<T: DeserializeOwned + Default>(raw: &str) -> T {
    match parse_json(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Falling back to default after unparseable response");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default)]
        items: Vec<String>,
    }

    #[test]
    fn test_plain_json_passes_through() {
        let parsed: Payload = parse_json(r#"{"items": ["a", "b"]}"#).unwrap();
        assert_eq!(parsed.items, vec!["a", "b"]);
    }

    #[test]
    fn test_strips_code_fences() {
        let raw = "```json\n{\"items\": [\"a\"]}\n```";
        let parsed: Payload = parse_json(raw).unwrap();
        assert_eq!(parsed.items, vec!["a"]);
    }

    #[test]
    fn test_extracts_json_from_prose() {
        let raw = "Here is the result you asked for: {\"items\": [\"x\"]} hope it helps!";
        let parsed: Payload = parse_json(raw).unwrap();
        assert_eq!(parsed.items, vec!["x"]);
    }

    #[test]
    fn test_strips_control_characters() {
        let raw = "{\"items\": [\"a\u{0008}b\"]}";
        let parsed: Payload = parse_json(raw).unwrap();
        assert_eq!(parsed.items, vec!["ab"]);
    }

    #[test]
    fn test_array_payload() {
        let raw = "```json\n[\"one\", \"two\"]\n```";
        let parsed: Vec<String> = parse_json(raw).unwrap();
        assert_eq!(parsed, vec!["one", "two"]);
    }

    #[test]
    fn test_garbage_returns_malformed() {
        let result: ProviderResult<Payload> = parse_json("not json at all");
        assert!(result.unwrap_err().is_malformed());
    }

    #[test]
    fn test_or_default_never_errors() {
        let parsed: Payload = parse_json_or_default("complete garbage");
        assert_eq!(parsed, Payload::default());
    }
}
