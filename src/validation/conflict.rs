//! Substring conflict warnings.
//!
//! Containment is checked on normalized text without word boundaries, so it
//! flags more than the matcher would ever treat as overlapping. These are
//! hints for a human editor and never block an edit.

use super::{Field, IssueExtra, IssueKind, ValidationIssue, ValidationResult};
use crate::term::{normalize, visible, Term};

/// Warn about every active term of `lexicon_id` that contains, or is
/// contained in, `candidate`. Equal terms are left to the uniqueness check.
pub fn detect_conflicts(
    existing: &[Term],
    lexicon_id: &str,
    candidate: &str,
    exclude_id: Option<&str>,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    let normalized = normalize(candidate);
    if normalized.is_empty() {
        return result;
    }

    for other in visible(existing, lexicon_id, exclude_id) {
        let other_normalized = other.normalized_term();
        if other_normalized.is_empty() || other_normalized == normalized {
            continue;
        }

        let (kind, message) = if normalized.contains(&other_normalized) {
            (
                IssueKind::ContainsExistingTerm,
                format!(
                    "Term '{}' contains existing term '{}'",
                    candidate.trim(),
                    other.term
                ),
            )
        } else if other_normalized.contains(&normalized) {
            (
                IssueKind::ContainedInExistingTerm,
                format!(
                    "Term '{}' is contained in existing term '{}'",
                    candidate.trim(),
                    other.term
                ),
            )
        } else {
            continue;
        };

        result.push(
            ValidationIssue::new(Field::Term, kind, candidate.trim(), message).with_extra(
                IssueExtra::ExistingTerm {
                    existing_term_id: other.id.clone(),
                    existing_term: other.term.clone(),
                },
            ),
        );
    }

    result
}
