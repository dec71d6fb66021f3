//! Resolved term -> replacement mapping used at correction time.

use crate::term::{normalize, Term};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Lexicon-mapping errors.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Invalid lexicon mapping: {0}")]
    InvalidMapping(String),

    #[error("Failed to parse lexicon mapping: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One resolved mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    /// Normalized term, unique within the lexicon
    pub key: String,
    /// Term as authored, trimmed. Lowercasing is not always reversible
    /// ("İ" becomes "i" plus a combining dot), so matching needs both forms.
    pub surface: String,
    pub replacement: String,
}

/// Flattened mapping from normalized term to replacement.
///
/// Keys are unique. Insertion order is kept because it breaks ties between
/// keys of equal length when rules are ordered for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLexicon {
    entries: Vec<LexiconEntry>,
    index: HashMap<String, usize>,
}

impl ResolvedLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the active terms of `lexicon_id`.
    pub fn from_terms(terms: &[Term], lexicon_id: &str) -> Self {
        terms
            .iter()
            .filter(|t| t.is_visible_in(lexicon_id, None))
            .map(|t| (t.term.as_str(), t.replacement.as_str()))
            .collect()
    }

    /// Build from a JSON object of `term: replacement` pairs.
    ///
    /// Entries whose value is not a string are skipped with a warning.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, LexiconError> {
        let object = value.as_object().ok_or_else(|| {
            LexiconError::InvalidMapping("expected an object of term/replacement pairs".into())
        })?;

        let mut lexicon = Self::new();
        for (key, value) in object {
            match value.as_str() {
                Some(replacement) => {
                    lexicon.insert(key, replacement);
                }
                None => warn!("Skipping lexicon entry '{}': value is not a string", key),
            }
        }
        Ok(lexicon)
    }

    /// Parse a JSON document, see [`ResolvedLexicon::from_json`].
    pub fn from_json_str(json: &str) -> Result<Self, LexiconError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    /// Insert or overwrite a mapping. Blank keys or replacements are skipped
    /// with a warning and `false` is returned.
    pub fn insert(&mut self, term: &str, replacement: &str) -> bool {
        let key = normalize(term);
        if key.is_empty() || replacement.trim().is_empty() {
            warn!("Skipping blank lexicon entry '{}' -> '{}'", term, replacement);
            return false;
        }

        let surface = term.trim().to_string();
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.surface = surface;
                entry.replacement = replacement.to_string();
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(LexiconEntry {
                    key,
                    surface,
                    replacement: replacement.to_string(),
                });
            }
        }
        true
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.index
            .get(&normalize(term))
            .map(|&i| self.entries[i].replacement.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, replacement)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.replacement.as_str()))
    }

    /// Full entries in insertion order.
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }
}

impl<K, V> FromIterator<(K, V)> for ResolvedLexicon
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut lexicon = Self::new();
        for (term, replacement) in iter {
            lexicon.insert(term.as_ref(), replacement.as_ref());
        }
        lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_are_normalized() {
        let lexicon: ResolvedLexicon = [(" MRI ", "magnetic resonance imaging")]
            .into_iter()
            .collect();
        assert_eq!(lexicon.get("mri"), Some("magnetic resonance imaging"));
        assert_eq!(lexicon.get("MRI"), Some("magnetic resonance imaging"));
        assert_eq!(lexicon.iter().next().unwrap().0, "mri");
    }

    #[test]
    fn test_duplicate_key_overwrites_in_place() {
        let lexicon: ResolvedLexicon = [("ct", "CT"), ("mri", "MRI"), ("CT", "computed tomography")]
            .into_iter()
            .collect();
        assert_eq!(lexicon.len(), 2);
        let keys: Vec<&str> = lexicon.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ct", "mri"]);
        assert_eq!(lexicon.get("ct"), Some("computed tomography"));
    }

    #[test]
    fn test_surface_form_is_kept_beside_key() {
        let lexicon: ResolvedLexicon = [
            (" İstanbul ", "Istanbul city"),
            ("mri", "MRI"),
            ("MRI", "MR imaging"),
        ]
        .into_iter()
        .collect();
        let entries = lexicon.entries();
        assert_eq!(entries[0].key, "i\u{307}stanbul");
        assert_eq!(entries[0].surface, "İstanbul");
        assert_eq!(lexicon.get("İstanbul"), Some("Istanbul city"));
        // Overwrites take the latest surface form too
        assert_eq!(entries[1].surface, "MRI");
        assert_eq!(entries[1].replacement, "MR imaging");
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let mut lexicon = ResolvedLexicon::new();
        assert!(!lexicon.insert("  ", "x"));
        assert!(!lexicon.insert("x", " "));
        assert!(lexicon.is_empty());
    }

    #[test]
    fn test_from_terms_uses_active_terms_of_lexicon() {
        let mut retired = Term::new("3", "radiology", "PET", "positron emission tomography");
        retired.active = false;
        let terms = vec![
            Term::new("1", "radiology", "MRI", "magnetic resonance imaging"),
            Term::new("2", "cardiology", "ECG", "electrocardiogram"),
            retired,
        ];
        let lexicon = ResolvedLexicon::from_terms(&terms, "radiology");
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.get("mri"), Some("magnetic resonance imaging"));
    }

    #[test]
    fn test_from_json_skips_non_string_values() {
        let value = json!({
            "mri": "MRI",
            "ct": 42,
            "pet": null,
            "us": ["ultrasound"],
            "ecg": "ECG"
        });
        let lexicon = ResolvedLexicon::from_json(&value).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get("ecg"), Some("ECG"));
        assert!(lexicon.get("ct").is_none());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            ResolvedLexicon::from_json(&json!(["mri", "MRI"])),
            Err(LexiconError::InvalidMapping(_))
        ));
        assert!(matches!(
            ResolvedLexicon::from_json_str("{not json"),
            Err(LexiconError::ParseError(_))
        ));
    }
}
