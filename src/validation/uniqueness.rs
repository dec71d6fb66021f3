//! Case-insensitive duplicate detection within a lexicon.

use super::{Field, IssueExtra, IssueKind, ValidationIssue, ValidationResult};
use crate::term::{normalize, visible, Term};

/// Report a `duplicate` error when an active term of `lexicon_id` (other than
/// `exclude_id`) has the same normalized form as `candidate`.
pub fn check_uniqueness(
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

    if let Some(found) =
        visible(existing, lexicon_id, exclude_id).find(|t| t.normalized_term() == normalized)
    {
        result.push(
            ValidationIssue::new(
                Field::Term,
                IssueKind::Duplicate,
                candidate.trim(),
                format!(
                    "Term '{}' already exists in lexicon '{}' as '{}'",
                    candidate.trim(),
                    lexicon_id,
                    found.term
                ),
            )
            .with_extra(IssueExtra::ExistingTerm {
                existing_term_id: found.id.clone(),
                existing_term: found.term.clone(),
            }),
        );
    }

    result
}
