//! Lexicorrect library exports for the CLI, integration tests and fuzzing.
//!
//! The engine has two halves:
//! - [`validation`] checks a candidate term/replacement pair against a
//!   snapshot of a lexicon (format, uniqueness, cycles, substring conflicts).
//! - [`matcher`] applies a resolved lexicon to free text with word-boundary
//!   matching, longest-term priority and case preservation.
//!
//! [`store`] persists lexicons to disk and memoizes resolved mappings.

pub mod config;
pub mod matcher;
pub mod store;
pub mod term;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::Config;
pub use matcher::{apply_corrections, Corrector, ResolvedLexicon};
pub use store::{LexiconStore, StoreError};
pub use term::{Term, TermSource};
pub use validation::{
    validate_bulk_terms, validate_term, IssueKind, ValidationIssue, ValidationResult, Validator,
};
