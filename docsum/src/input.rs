//! Input canonicalization.
//!
//! The pipeline accepts either JSON text or any serializable value. Values are first
//! stringified, then everything is parsed back into a [`serde_json::Value`] so that the
//! normalizer always starts from the same canonical form.

use crate::error::SummaryError;
use serde::Serialize;
use serde_json::Value;

/// Serialize a value to pretty JSON text.
pub fn stringify_content<T: Serialize + ?Sized>(content: &T) -> Result<String, SummaryError> {
    serde_json::to_string_pretty(content).map_err(|e| SummaryError::InvalidInput(e.to_string()))
}

/// Parse JSON text into a value.
pub fn parse_content(content: &str) -> Result<Value, SummaryError> {
    serde_json::from_str(content).map_err(|e| SummaryError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_stringify_then_parse() {
        let text = stringify_content(&serde_json::json!({"rowOrder": []})).unwrap();
        let value = parse_content(&text).unwrap();
        assert!(value.get("rowOrder").is_some());
    }

    #[test]
    fn test_unserializable_input() {
        let mut content = HashMap::new();
        content.insert((1, 2), "tuple keys are not valid JSON object keys");
        let err = stringify_content(&content).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_content("invalid json").unwrap_err();
        assert!(matches!(err, SummaryError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse content"));
    }
}
