use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::ParserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Json,
    Yaml,
}

impl PayloadEncoding {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(PayloadEncoding::Json),
            "yml" | "yaml" => Some(PayloadEncoding::Yaml),
            _ => None,
        }
    }
}

/// Decodes raw snapshot text into a JSON value tree the adapters understand.
pub fn decode_payload(text: &str, encoding: PayloadEncoding) -> Result<Value, ParserError> {
    match encoding {
        PayloadEncoding::Json => {
            serde_json::from_str(text).map_err(|source| ParserError::Json { source })
        }
        PayloadEncoding::Yaml => serde_yaml::from_str(&strip_non_printable(text))
            .map_err(|source| ParserError::Yaml { source }),
    }
}

// The ccfddl feeds occasionally carry control characters the YAML reader rejects.
fn strip_non_printable(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r' | '\u{85}'))
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(u64),
    Text(String),
}

fn numeric_to<T: TryFrom<u64>>(value: Numeric) -> Result<T, String> {
    let raw = match value {
        Numeric::Int(n) => n,
        Numeric::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|err| format!("'{}' is not a whole number: {err}", text.trim()))?,
    };
    T::try_from(raw).map_err(|_| format!("{raw} is out of range"))
}

pub(crate) fn de_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    numeric_to(Numeric::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

pub(crate) fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    numeric_to(Numeric::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Drops null or blank grades; an organisation with no grade is simply absent.
pub(crate) fn collect_rankings(raw: BTreeMap<String, Option<String>>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(org, grade)| clean_optional(grade).map(|grade| (org, grade)))
        .collect()
}

pub(crate) fn entry_label(entry: &Value, field: &str, index: usize) -> String {
    entry
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"))
}

pub(crate) fn describe_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters_but_keeps_line_breaks() {
        assert_eq!(strip_non_printable("a\u{7}b\tc\nd"), "ab\tc\nd");
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(PayloadEncoding::from_extension("YML"), Some(PayloadEncoding::Yaml));
        assert_eq!(PayloadEncoding::from_extension("json"), Some(PayloadEncoding::Json));
        assert_eq!(PayloadEncoding::from_extension("csv"), None);
    }
}
