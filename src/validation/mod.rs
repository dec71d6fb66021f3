//! Lexicon term validation.
//!
//! Every edit to a lexicon goes through [`Validator::validate_term`] before it
//! is persisted. The checks run in a fixed order and all of them report into
//! one [`ValidationResult`], so a single response lists everything wrong with
//! a candidate at once:
//!
//! 1. format (emptiness, whitespace, length)
//! 2. uniqueness (case-insensitive duplicate terms)
//! 3. circular references through the replacement graph
//! 4. substring conflicts (warnings only, optional)
//!
//! Data problems are never `Err`; they are issues inside the result.

pub mod conflict;
pub mod cycle;
pub mod format;
pub mod payload;
pub mod uniqueness;

use crate::config::ValidationConfig;
use crate::term::Term;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error};

pub use conflict::detect_conflicts;
pub use cycle::detect_cycle;
pub use format::check_format;
pub use payload::ErrorPayload;
pub use uniqueness::check_uniqueness;

/// Which half of a term/replacement pair an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Term,
    Replacement,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Term => write!(f, "term"),
            Field::Replacement => write!(f, "replacement"),
        }
    }
}

/// Closed set of issue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    EmptyOrWhitespace,
    TooShort,
    TooLong,
    Duplicate,
    CircularReference,
    ContainsExistingTerm,
    ContainedInExistingTerm,
    WhitespaceTrimmed,
}

impl IssueKind {
    /// Whether an issue of this kind blocks persistence.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            IssueKind::ContainsExistingTerm
                | IssueKind::ContainedInExistingTerm
                | IssueKind::WhitespaceTrimmed
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::EmptyOrWhitespace => "emptyOrWhitespace",
            IssueKind::TooShort => "tooShort",
            IssueKind::TooLong => "tooLong",
            IssueKind::Duplicate => "duplicate",
            IssueKind::CircularReference => "circularReference",
            IssueKind::ContainsExistingTerm => "containsExistingTerm",
            IssueKind::ContainedInExistingTerm => "containedInExistingTerm",
            IssueKind::WhitespaceTrimmed => "whitespaceTrimmed",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue-specific context, flattened into the issue when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IssueExtra {
    /// The existing term a duplicate or conflict refers to
    #[serde(rename_all = "camelCase")]
    ExistingTerm {
        existing_term_id: String,
        existing_term: String,
    },

    /// Full cycle in traversal order, closed (first == last)
    Cycle { chain: Vec<String> },

    /// Length bounds that were violated
    #[serde(rename_all = "camelCase")]
    Length {
        min_length: usize,
        max_length: usize,
        actual_length: usize,
    },
}

/// One problem found with a candidate term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: Field,
    #[serde(rename = "issue")]
    pub kind: IssueKind,
    pub value: String,
    pub message: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub extra: Option<IssueExtra>,
}

impl ValidationIssue {
    pub fn new(
        field: Field,
        kind: IssueKind,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            kind,
            value: value.into(),
            message: message.into(),
            extra: None,
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: IssueExtra) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Cycle chain, when this is a circular reference.
    #[must_use]
    pub fn chain(&self) -> Option<&[String]> {
        match &self.extra {
            Some(IssueExtra::Cycle { chain }) => Some(chain),
            _ => None,
        }
    }

    /// Id of the existing term a duplicate or conflict refers to.
    #[must_use]
    pub fn existing_term_id(&self) -> Option<&str> {
        match &self.extra {
            Some(IssueExtra::ExistingTerm {
                existing_term_id, ..
            }) => Some(existing_term_id),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.field, self.message)
    }
}

/// Outcome of validating one candidate.
///
/// Errors block persistence, warnings never do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an issue as an error or warning according to its kind.
    pub fn push(&mut self, issue: ValidationIssue) {
        if issue.kind.is_blocking() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }

    /// Append another result, keeping its ordering after ours.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// First error or warning of the given kind.
    #[must_use]
    pub fn find(&self, kind: IssueKind) -> Option<&ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .find(|i| i.kind == kind)
    }

    #[must_use]
    pub fn has(&self, kind: IssueKind) -> bool {
        self.find(kind).is_some()
    }

    /// Map to the structured payload the API layer sends back.
    #[must_use]
    pub fn to_error_payload(&self) -> ErrorPayload<'_> {
        ErrorPayload::from_result(self)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return write!(f, "valid");
        }
        let mut first = true;
        for issue in self.errors.iter().chain(self.warnings.iter()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Validator composing all term checks.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Override the conflict-check flag (bulk imports turn it off).
    #[must_use]
    pub fn with_conflict_checks(mut self, enabled: bool) -> Self {
        self.config.check_conflicts = enabled;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate one candidate against the existing terms of `lexicon_id`.
    ///
    /// `exclude_id` names the term being updated, so it is not compared
    /// against itself. Format errors do not stop the remaining checks; only
    /// an empty term (or replacement, for the cycle check) skips the checks
    /// that need it.
    pub fn validate_term(
        &self,
        existing: &[Term],
        lexicon_id: &str,
        term: &str,
        replacement: &str,
        exclude_id: Option<&str>,
    ) -> ValidationResult {
        if lexicon_id.is_empty() {
            error!("validate_term called without a lexicon id");
            debug_assert!(!lexicon_id.is_empty(), "lexicon id is required");
        }

        let mut result = check_format(term, replacement, &self.config);

        let term = term.trim();
        let replacement_trimmed = replacement.trim();

        if !term.is_empty() {
            result.merge(check_uniqueness(existing, lexicon_id, term, exclude_id));
        }

        if !term.is_empty() && !replacement_trimmed.is_empty() {
            result.merge(detect_cycle(
                existing,
                lexicon_id,
                term,
                replacement_trimmed,
                exclude_id,
            ));
        }

        if self.config.check_conflicts && !term.is_empty() {
            result.merge(detect_conflicts(existing, lexicon_id, term, exclude_id));
        }

        debug!(
            "Validated '{}' in '{}': {} errors, {} warnings",
            term,
            lexicon_id,
            result.errors.len(),
            result.warnings.len()
        );

        result
    }

    /// Validate a batch of candidates in input order.
    ///
    /// Each candidate is checked against the existing terms plus every
    /// earlier candidate of the batch, so duplicates and cycles within the
    /// batch are caught too. Earlier candidates get synthetic ids of the
    /// form `batch:<index>`.
    pub fn validate_bulk<T, R>(
        &self,
        existing: &[Term],
        lexicon_id: &str,
        candidates: &[(T, R)],
    ) -> BTreeMap<usize, ValidationResult>
    where
        T: AsRef<str>,
        R: AsRef<str>,
    {
        let mut pool: Vec<Term> = existing.to_vec();
        let mut results = BTreeMap::new();

        for (index, (term, replacement)) in candidates.iter().enumerate() {
            let (term, replacement) = (term.as_ref(), replacement.as_ref());
            let result = self.validate_term(&pool, lexicon_id, term, replacement, None);

            if !term.trim().is_empty() {
                pool.push(Term::new(
                    batch_id(index),
                    lexicon_id,
                    term.trim(),
                    replacement.trim(),
                ));
            }
            results.insert(index, result);
        }

        let rejected = results.values().filter(|r| !r.is_valid()).count();
        debug!(
            "Bulk validation of {} candidates in '{}': {} rejected",
            candidates.len(),
            lexicon_id,
            rejected
        );

        results
    }
}

/// Synthetic id given to an earlier candidate of the same batch.
pub fn batch_id(index: usize) -> String {
    format!("batch:{}", index)
}

/// Validate one candidate with default length limits.
pub fn validate_term(
    existing: &[Term],
    lexicon_id: &str,
    term: &str,
    replacement: &str,
    exclude_id: Option<&str>,
    check_conflicts: bool,
) -> ValidationResult {
    Validator::default()
        .with_conflict_checks(check_conflicts)
        .validate_term(existing, lexicon_id, term, replacement, exclude_id)
}

/// Validate a batch with default length limits.
pub fn validate_bulk_terms<T, R>(
    existing: &[Term],
    lexicon_id: &str,
    candidates: &[(T, R)],
    check_conflicts: bool,
) -> BTreeMap<usize, ValidationResult>
where
    T: AsRef<str>,
    R: AsRef<str>,
{
    Validator::default()
        .with_conflict_checks(check_conflicts)
        .validate_bulk(existing, lexicon_id, candidates)
}
