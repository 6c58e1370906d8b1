//! Turning raw backend output into typed tool results.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use playground_generation::OutputSchema;
use playground_shared::{Conforming, ExtractedRecord, PlaygroundError, Result};

/// Locate the outermost `[...]` span in free text and parse it as JSON.
///
/// The match is greedy: it runs from the first `[` to the last `]`.
pub fn extract_json_array(text: &str) -> Result<Value> {
    static ARRAY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

    let fragment = ARRAY_RE
        .find(text)
        .ok_or_else(|| PlaygroundError::extraction("No valid JSON array found in response"))?;

    serde_json::from_str(fragment.as_str())
        .map_err(|e| PlaygroundError::extraction(format!("Response JSON could not be parsed: {e}")))
}

/// Accept an array of objects and backfill every requested field that is
/// absent with `""`. Keys the model added beyond `fields` are kept.
pub fn into_records(value: Value, fields: &[String]) -> Result<Vec<ExtractedRecord>> {
    let Value::Array(items) = value else {
        return Err(PlaygroundError::extraction("Expected a JSON array of objects"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(mut record) => {
                for field in fields {
                    record
                        .entry(field.clone())
                        .or_insert_with(|| Value::String(String::new()));
                }
                Ok(record)
            }
            _ => Err(PlaygroundError::extraction(format!(
                "Expected an object at position {i} of the JSON array"
            ))),
        })
        .collect()
}

/// Check `value` against `schema` and attach a typed view. The value itself is
/// kept as returned.
pub fn conforming<T: DeserializeOwned>(schema: &OutputSchema, value: Value) -> Result<Conforming<T>> {
    schema.validate(&value).map_err(|e| {
        PlaygroundError::Generation(format!("response did not match the declared schema: {e}"))
    })?;

    Conforming::from_value(value).map_err(|e| {
        PlaygroundError::Generation(format!("response did not match the declared schema: {e}"))
    })
}
