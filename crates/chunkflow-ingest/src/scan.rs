//! Regex-schema metadata scanning
//!
//! A schema declares typed properties, each optionally carrying a scan
//! pattern. The scanner reports only properties whose pattern matched and
//! whose first candidate coerced cleanly to the declared type; absent keys
//! stay absent, never null.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Declared properties to scan text for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSchema {
    /// Property name to specification
    #[serde(default)]
    pub properties: HashMap<String, PropertySpec>,
}

/// One declared property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Declared value type
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Scanning directives; properties without a `scan_regex` are never scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_data: Option<ScanAux>,
}

/// Value type a property coerces to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Scanning directives for one property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanAux {
    /// Pattern to search the text with
    #[serde(default)]
    pub scan_regex: Option<String>,
    /// Capture-expansion template applied to each match (default: whole match)
    #[serde(default)]
    pub scan_replace: Option<String>,
    /// Whether a scanned value may replace an existing one when the caller
    /// merges records; not consulted by the scanner itself
    #[serde(default)]
    pub scan_overwrite: Option<bool>,
}

/// Scan text against a schema, returning the matched, typed properties
///
/// A pattern that fails to compile is a configuration error and propagates;
/// a pattern that compiles but never matches silently omits its key.
pub fn scan_metadata(text: &str, schema: &MetadataSchema) -> Result<Map<String, Value>> {
    let mut record = Map::new();

    for (name, spec) in &schema.properties {
        let aux = match &spec.aux_data {
            Some(aux) => aux,
            None => continue,
        };
        let pattern = match &aux.scan_regex {
            Some(pattern) => pattern,
            None => continue,
        };

        let regex = Regex::new(pattern)?;
        let replace = aux.scan_replace.as_deref().unwrap_or("$0");

        let candidate = regex.captures_iter(text).next().map(|caps| {
            let mut expanded = String::new();
            caps.expand(replace, &mut expanded);
            expanded
        });

        if let Some(candidate) = candidate {
            if let Some(value) = coerce(&candidate, spec.property_type) {
                record.insert(name.clone(), value);
            } else {
                tracing::debug!(
                    "Property '{}' matched but '{}' did not parse as {:?}",
                    name,
                    candidate,
                    spec.property_type
                );
            }
        }
    }

    Ok(record)
}

/// Coerce an extracted candidate to the declared type
fn coerce(raw: &str, property_type: PropertyType) -> Option<Value> {
    match property_type {
        PropertyType::String => Some(Value::String(raw.to_string())),
        PropertyType::Integer => raw
            .replace(',', "")
            .trim()
            .parse::<i64>()
            .ok()
            .map(Value::from),
        PropertyType::Number => raw
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        PropertyType::Boolean => {
            let lowered = raw.trim().to_lowercase();
            Some(Value::Bool(matches!(
                lowered.as_str(),
                "true" | "yes" | "y" | "1"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn schema(entries: &[(&str, PropertyType, Option<(&str, Option<&str>)>)]) -> MetadataSchema {
        let mut properties = HashMap::new();
        for &(name, property_type, scan) in entries {
            properties.insert(
                name.to_string(),
                PropertySpec {
                    property_type,
                    aux_data: scan.map(|(regex, replace)| ScanAux {
                        scan_regex: Some(regex.to_string()),
                        scan_replace: replace.map(str::to_string),
                        scan_overwrite: None,
                    }),
                },
            );
        }
        MetadataSchema { properties }
    }

    #[test]
    fn test_number_with_thousands_separators() {
        let schema = schema(&[(
            "amount",
            PropertyType::Number,
            Some((r"\$([\d,]+\.\d{2})", Some("$1"))),
        )]);
        let record = scan_metadata("Total: $1,234.56", &schema).unwrap();
        assert_eq!(record.get("amount"), Some(&Value::from(1234.56)));
    }

    #[test]
    fn test_property_without_scan_regex_is_never_scanned() {
        let schema = schema(&[("notes", PropertyType::String, None)]);
        let record = scan_metadata("notes everywhere", &schema).unwrap();
        assert!(!record.contains_key("notes"));
    }

    #[test]
    fn test_unmatched_pattern_omits_key() {
        let schema = schema(&[(
            "invoice",
            PropertyType::String,
            Some((r"INV-\d+", None)),
        )]);
        let record = scan_metadata("no invoices here", &schema).unwrap();
        assert!(!record.contains_key("invoice"));
        assert!(record.is_empty());
    }

    #[test]
    fn test_default_replace_is_whole_match() {
        let schema = schema(&[(
            "invoice",
            PropertyType::String,
            Some((r"INV-\d+", None)),
        )]);
        let record = scan_metadata("ref INV-0042 attached", &schema).unwrap();
        assert_eq!(record.get("invoice"), Some(&Value::from("INV-0042")));
    }

    #[test]
    fn test_first_match_wins() {
        let schema = schema(&[(
            "code",
            PropertyType::String,
            Some((r"[A-Z]{3}-\d+", None)),
        )]);
        let record = scan_metadata("ABC-1 then XYZ-2", &schema).unwrap();
        assert_eq!(record.get("code"), Some(&Value::from("ABC-1")));
    }

    #[test]
    fn test_integer_strips_separators() {
        let schema = schema(&[(
            "population",
            PropertyType::Integer,
            Some((r"pop: ([\d,]+)", Some("$1"))),
        )]);
        let record = scan_metadata("pop: 8,336,817", &schema).unwrap();
        assert_eq!(record.get("population"), Some(&Value::from(8_336_817i64)));
    }

    #[test]
    fn test_unparseable_number_omits_key() {
        let schema = schema(&[(
            "total",
            PropertyType::Integer,
            Some((r"total: (\w+)", Some("$1"))),
        )]);
        let record = scan_metadata("total: unknown", &schema).unwrap();
        assert!(!record.contains_key("total"));
    }

    #[test]
    fn test_boolean_truthy_forms() {
        for (input, expected) in [
            ("approved: YES", true),
            ("approved: y", true),
            ("approved: 1", true),
            ("approved: True", true),
            ("approved: no", false),
        ] {
            let schema = schema(&[(
                "approved",
                PropertyType::Boolean,
                Some((r"approved: (\w+)", Some("$1"))),
            )]);
            let record = scan_metadata(input, &schema).unwrap();
            assert_eq!(record.get("approved"), Some(&Value::Bool(expected)), "{input}");
        }
    }

    #[test]
    fn test_malformed_pattern_propagates() {
        let schema = schema(&[(
            "broken",
            PropertyType::String,
            Some((r"([unclosed", None)),
        )]);
        let err = scan_metadata("anything", &schema).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }
}
