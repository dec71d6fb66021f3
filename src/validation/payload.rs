//! Structured error payload handed to the API layer.
//!
//! Transport concerns (status codes, headers) stay with the caller; this is
//! only the body.

use super::{ValidationIssue, ValidationResult};
use serde::Serialize;

/// Body returned for a validated edit.
///
/// ```json
/// {
///   "errorType": "ValidationError",
///   "message": "Term validation failed with 1 error(s)",
///   "errors": [{ "field": "term", "issue": "duplicate", "value": "mri",
///                "message": "...", "existingTermId": "1", "existingTerm": "MRI" }],
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload<'a> {
    /// `null` when the result is valid
    pub error_type: Option<&'static str>,
    pub message: String,
    pub errors: &'a [ValidationIssue],
    pub warnings: &'a [ValidationIssue],
}

impl<'a> ErrorPayload<'a> {
    pub fn from_result(result: &'a ValidationResult) -> Self {
        let (error_type, message) = if result.is_valid() {
            (
                None,
                format!(
                    "Term accepted with {} warning(s)",
                    result.warnings.len()
                ),
            )
        } else {
            (
                Some("ValidationError"),
                format!(
                    "Term validation failed with {} error(s)",
                    result.errors.len()
                ),
            )
        };

        Self {
            error_type,
            message,
            errors: &result.errors,
            warnings: &result.warnings,
        }
    }

    /// Serialize to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // A struct of strings and string lists always serializes
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::validation::validate_term;
    use serde_json::json;

    #[test]
    fn test_duplicate_payload_shape() {
        let existing = vec![Term::new("1", "radiology", "MRI", "magnetic resonance imaging")];
        let result = validate_term(&existing, "radiology", "mri", "MRI", None, false);
        let value = result.to_error_payload().to_json();

        assert_eq!(value["errorType"], "ValidationError");
        let errors = value["errors"].as_array().unwrap();
        let duplicate = errors.iter().find(|e| e["issue"] == "duplicate").unwrap();
        assert_eq!(duplicate["field"], "term");
        assert_eq!(duplicate["value"], "mri");
        assert_eq!(duplicate["existingTermId"], "1");
        assert_eq!(duplicate["existingTerm"], "MRI");
    }

    #[test]
    fn test_cycle_payload_carries_chain() {
        let result = validate_term(&[], "radiology", "test", "test", None, false);
        let value = result.to_error_payload().to_json();
        assert_eq!(value["errors"][0]["issue"], "circularReference");
        assert_eq!(value["errors"][0]["chain"], json!(["test", "test"]));
    }

    #[test]
    fn test_length_payload_carries_bounds() {
        let result = validate_term(&[], "radiology", &"a".repeat(201), "x", None, false);
        let issue = &result.to_error_payload().to_json()["errors"][0];
        assert_eq!(issue["issue"], "tooLong");
        assert_eq!(issue["maxLength"], 200);
        assert_eq!(issue["actualLength"], 201);
    }

    #[test]
    fn test_valid_payload_has_no_error_type() {
        let result = validate_term(&[], "radiology", " MRI", "magnetic resonance", None, false);
        let value = result.to_error_payload().to_json();
        assert!(value["errorType"].is_null());
        assert_eq!(value["errors"], json!([]));
        assert_eq!(value["warnings"][0]["issue"], "whitespaceTrimmed");
        assert!(value["warnings"][0].get("extra").is_none());
    }
}
