//! Shape checks for a single term/replacement pair.

use super::{Field, IssueExtra, IssueKind, ValidationIssue, ValidationResult};
use crate::config::ValidationConfig;
use crate::term::char_len;

/// Check emptiness, surrounding whitespace and length of both halves.
///
/// Lengths are counted in Unicode scalar values on the trimmed text. Any
/// code point is accepted once those constraints hold.
pub fn check_format(term: &str, replacement: &str, config: &ValidationConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_field(
        &mut result,
        Field::Term,
        term,
        config.term_min_length,
        config.term_max_length,
    );
    check_field(
        &mut result,
        Field::Replacement,
        replacement,
        config.replacement_min_length,
        config.replacement_max_length,
    );

    result
}

fn check_field(result: &mut ValidationResult, field: Field, raw: &str, min: usize, max: usize) {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        result.push(ValidationIssue::new(
            field,
            IssueKind::EmptyOrWhitespace,
            raw,
            format!("{} cannot be empty or whitespace only", capitalized(field)),
        ));
        return;
    }

    if trimmed.len() != raw.len() {
        result.push(ValidationIssue::new(
            field,
            IssueKind::WhitespaceTrimmed,
            raw,
            format!("Leading/trailing whitespace was trimmed from {}", field),
        ));
    }

    let len = char_len(trimmed);
    let kind = if len < min {
        IssueKind::TooShort
    } else if len > max {
        IssueKind::TooLong
    } else {
        return;
    };

    let message = match kind {
        IssueKind::TooShort => format!(
            "{} must be at least {} characters (got {})",
            capitalized(field),
            min,
            len
        ),
        _ => format!(
            "{} must be at most {} characters (got {})",
            capitalized(field),
            max,
            len
        ),
    };

    result.push(
        ValidationIssue::new(field, kind, trimmed, message).with_extra(IssueExtra::Length {
            min_length: min,
            max_length: max,
            actual_length: len,
        }),
    );
}

fn capitalized(field: Field) -> &'static str {
    match field {
        Field::Term => "Term",
        Field::Replacement => "Replacement",
    }
}
