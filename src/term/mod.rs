//! Term data model shared by the validator and the matcher.
//!
//! A lexicon has no entity of its own: it is the set of active terms that
//! share a lexicon id. All equality between terms goes through
//! [`normalize`], never through the surface text.

use serde::{Deserialize, Serialize};

/// A single term -> replacement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Stable identity, used to exclude "self" when validating an update
    pub id: String,

    /// Namespace this term belongs to (e.g. "radiology")
    #[serde(rename = "lexicon")]
    pub lexicon_id: String,

    /// Surface string to match, as authored
    pub term: String,

    /// Output string, as authored
    pub replacement: String,

    /// Soft-delete flag; inactive terms are invisible to every check
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Term {
    pub fn new(
        id: impl Into<String>,
        lexicon_id: impl Into<String>,
        term: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lexicon_id: lexicon_id.into(),
            term: term.into(),
            replacement: replacement.into(),
            active: true,
        }
    }

    /// Lowercase, trimmed form of the term.
    #[must_use]
    pub fn normalized_term(&self) -> String {
        normalize(&self.term)
    }

    /// Whether this term takes part in checks for `lexicon_id`, ignoring
    /// the term with id `exclude_id` (the one being updated).
    #[must_use]
    pub fn is_visible_in(&self, lexicon_id: &str, exclude_id: Option<&str>) -> bool {
        self.active && self.lexicon_id == lexicon_id && exclude_id != Some(self.id.as_str())
    }
}

/// Normalize a term for comparison: trim, then lowercase.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Length in Unicode scalar values, which is what every length limit counts.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Read-only view of the terms of one lexicon.
///
/// Implementations must hand out a consistent snapshot: the returned list is
/// owned by the caller and nothing may append to it during a check.
pub trait TermSource {
    /// Active terms of `lexicon_id`.
    fn snapshot(&self, lexicon_id: &str) -> Vec<Term>;
}

impl TermSource for [Term] {
    fn snapshot(&self, lexicon_id: &str) -> Vec<Term> {
        self.iter()
            .filter(|t| t.is_visible_in(lexicon_id, None))
            .cloned()
            .collect()
    }
}

impl TermSource for Vec<Term> {
    fn snapshot(&self, lexicon_id: &str) -> Vec<Term> {
        self.as_slice().snapshot(lexicon_id)
    }
}

/// Active terms of `lexicon_id` except `exclude_id`, in input order.
pub(crate) fn visible<'a, 'b>(
    terms: &'a [Term],
    lexicon_id: &'b str,
    exclude_id: Option<&'b str>,
) -> impl Iterator<Item = &'a Term> + 'b
where
    'a: 'b,
{
    terms
        .iter()
        .filter(move |t| t.is_visible_in(lexicon_id, exclude_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  MRI Scan "), "mri scan");
        assert_eq!(normalize("T-Cell"), "t-cell");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_non_latin() {
        assert_eq!(normalize("ΣΗΜΑ"), "σημα");
        // Scripts without case are left alone
        assert_eq!(normalize(" سی تی اسکن "), "سی تی اسکن");
    }

    #[test]
    fn test_char_len_counts_scalars_not_bytes() {
        assert_eq!(char_len("mri"), 3);
        assert_eq!(char_len("اسکن"), 4);
        assert!("اسکن".len() > 4);
    }

    #[test]
    fn test_visibility() {
        let mut term = Term::new("1", "radiology", "MRI", "magnetic resonance imaging");
        assert!(term.is_visible_in("radiology", None));
        assert!(!term.is_visible_in("cardiology", None));
        assert!(!term.is_visible_in("radiology", Some("1")));
        assert!(term.is_visible_in("radiology", Some("2")));

        term.active = false;
        assert!(!term.is_visible_in("radiology", None));
    }

    #[test]
    fn test_snapshot_filters_lexicon_and_inactive() {
        let mut inactive = Term::new("3", "radiology", "CT", "computed tomography");
        inactive.active = false;
        let terms = vec![
            Term::new("1", "radiology", "MRI", "magnetic resonance imaging"),
            Term::new("2", "cardiology", "ECG", "electrocardiogram"),
            inactive,
        ];

        let snapshot = terms.snapshot("radiology");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "1");
    }

    #[test]
    fn test_deserialize_defaults_active() {
        let term: Term = toml::from_str(
            r#"
id = "7"
lexicon = "radiology"
term = "MRI"
replacement = "magnetic resonance imaging"
"#,
        )
        .unwrap();
        assert!(term.active);
        assert_eq!(term.lexicon_id, "radiology");
        assert_eq!(term.normalized_term(), "mri");
    }
}
