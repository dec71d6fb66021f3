//! File-backed lexicon store.
//!
//! Persists terms of every lexicon in one TOML file and memoizes the resolved
//! mapping per lexicon. Every edit is validated before it is written, and
//! every write or reload invalidates the memoized mappings.
//!
//! # File Format
//!
//! ```toml
//! [[terms]]
//! id = "1"
//! lexicon = "radiology"
//! term = "MRI"
//! replacement = "magnetic resonance imaging"
//! active = true
//!
//! [[terms]]
//! id = "2"
//! lexicon = "radiology"
//! term = "CT"
//! replacement = "computed tomography"
//! active = false   # soft-deleted
//! ```

use crate::matcher::ResolvedLexicon;
use crate::term::{Term, TermSource};
use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

/// Store-related errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read lexicon file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse lexicon file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize lexicon file: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Term not found: {0}")]
    TermNotFound(String),

    #[error("Batch of {size} terms exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Term rejected:\n{0}")]
    Rejected(ValidationResult),
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    terms: Vec<Term>,
}

/// Parse lexicon file contents into terms.
pub fn parse_terms(contents: &str) -> Result<Vec<Term>, StoreError> {
    let file: LexiconFile = toml::from_str(contents)?;
    Ok(file.terms)
}

#[derive(Debug, Deserialize)]
struct ImportEntry {
    term: String,
    replacement: String,
}

#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default)]
    terms: Vec<ImportEntry>,
}

/// Parse an import file: `[[terms]]` entries with only `term` and
/// `replacement`. Other keys are ignored, so an exported lexicon file can be
/// imported into another lexicon as-is.
pub fn parse_import(contents: &str) -> Result<Vec<(String, String)>, StoreError> {
    let file: ImportFile = toml::from_str(contents)?;
    Ok(file
        .terms
        .into_iter()
        .map(|e| (e.term, e.replacement))
        .collect())
}

/// Lexicon store backed by a TOML file.
pub struct LexiconStore {
    /// Path to the lexicon file
    path: PathBuf,
    /// All terms, including inactive ones, in file order
    terms: Vec<Term>,
    /// Validator run before every edit
    validator: Validator,
    /// Last modification time of the file
    last_modified: Option<SystemTime>,
    /// Memoized resolved mappings per lexicon id
    resolved: RwLock<HashMap<String, Arc<ResolvedLexicon>>>,
}

impl LexiconStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>, validator: Validator) -> Result<Self, StoreError> {
        let mut store = Self {
            path: path.into(),
            terms: Vec::new(),
            validator,
            last_modified: None,
            resolved: RwLock::new(HashMap::new()),
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// (Re)load terms from the file.
    ///
    /// Returns Ok(true) if loaded, Ok(false) if the file doesn't exist.
    pub fn load(&mut self) -> Result<bool, StoreError> {
        if !self.path.exists() {
            debug!("Lexicon file not found: {}", self.path.display());
            self.terms.clear();
            self.last_modified = None;
            self.invalidate();
            return Ok(false);
        }

        let modified = fs::metadata(&self.path)?.modified().ok();
        let contents = fs::read_to_string(&self.path)?;
        self.terms = parse_terms(&contents)?;
        self.last_modified = modified;
        self.invalidate();

        info!(
            "Loaded {} terms ({} active) from {}",
            self.terms.len(),
            self.terms.iter().filter(|t| t.active).count(),
            self.path.display()
        );
        Ok(true)
    }

    /// Check if the file has changed and reload if necessary.
    ///
    /// Returns true if reloaded.
    pub fn check_reload(&mut self) -> Result<bool, StoreError> {
        if !self.path.exists() {
            return Ok(false);
        }

        let modified = fs::metadata(&self.path)?.modified().ok();
        if modified == self.last_modified {
            return Ok(false);
        }

        info!("Lexicon file changed, reloading...");
        self.load()?;
        Ok(true)
    }

    /// All terms, including inactive ones.
    pub fn all_terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn find(&self, id: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    /// Ids of lexicons that have at least one active term.
    pub fn lexicons(&self) -> Vec<String> {
        self.terms
            .iter()
            .filter(|t| t.active)
            .map(|t| t.lexicon_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Resolved mapping of `lexicon_id`, memoized until the next change.
    pub fn resolved(&self, lexicon_id: &str) -> Arc<ResolvedLexicon> {
        if let Some(hit) = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(lexicon_id)
        {
            return Arc::clone(hit);
        }

        let lexicon = Arc::new(ResolvedLexicon::from_terms(&self.terms, lexicon_id));
        debug!(
            "Resolved lexicon '{}' with {} entries",
            lexicon_id,
            lexicon.len()
        );
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(lexicon_id.to_string(), Arc::clone(&lexicon));
        lexicon
    }

    fn invalidate(&self) {
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Validate a candidate against the current snapshot without storing it.
    pub fn validate(
        &self,
        lexicon_id: &str,
        term: &str,
        replacement: &str,
        exclude_id: Option<&str>,
    ) -> ValidationResult {
        self.validator
            .validate_term(&self.terms, lexicon_id, term, replacement, exclude_id)
    }

    /// Validate and persist a new term.
    ///
    /// The returned result may still carry warnings.
    pub fn add_term(
        &mut self,
        lexicon_id: &str,
        term: &str,
        replacement: &str,
    ) -> Result<(Term, ValidationResult), StoreError> {
        let result = self.validate(lexicon_id, term, replacement, None);
        if !result.is_valid() {
            return Err(StoreError::Rejected(result));
        }

        let new_term = Term::new(self.next_id(), lexicon_id, term.trim(), replacement.trim());
        self.terms.push(new_term.clone());
        self.save()?;

        info!(
            "Added term '{}' -> '{}' to '{}'",
            new_term.term, new_term.replacement, lexicon_id
        );
        Ok((new_term, result))
    }

    /// Validate and persist new text for an existing active term.
    pub fn update_term(
        &mut self,
        id: &str,
        term: &str,
        replacement: &str,
    ) -> Result<ValidationResult, StoreError> {
        let lexicon_id = match self.find(id) {
            Some(existing) if existing.active => existing.lexicon_id.clone(),
            _ => return Err(StoreError::TermNotFound(id.to_string())),
        };

        let result = self.validate(&lexicon_id, term, replacement, Some(id));
        if !result.is_valid() {
            return Err(StoreError::Rejected(result));
        }

        if let Some(existing) = self.terms.iter_mut().find(|t| t.id == id) {
            existing.term = term.trim().to_string();
            existing.replacement = replacement.trim().to_string();
        }
        self.save()?;

        info!("Updated term {} in '{}'", id, lexicon_id);
        Ok(result)
    }

    /// Soft-delete a term. Inactive terms stay in the file.
    pub fn deactivate(&mut self, id: &str) -> Result<(), StoreError> {
        let term = self
            .terms
            .iter_mut()
            .find(|t| t.id == id && t.active)
            .ok_or_else(|| StoreError::TermNotFound(id.to_string()))?;
        term.active = false;
        self.save()?;

        info!("Deactivated term {}", id);
        Ok(())
    }

    /// Bulk-validate `candidates` for `lexicon_id` and persist the valid ones
    /// in input order. Results are keyed by input index.
    pub fn import<T, R>(
        &mut self,
        lexicon_id: &str,
        candidates: &[(T, R)],
    ) -> Result<BTreeMap<usize, ValidationResult>, StoreError>
    where
        T: AsRef<str>,
        R: AsRef<str>,
    {
        let max = self.validator.config().max_batch_size;
        if candidates.len() > max {
            return Err(StoreError::BatchTooLarge {
                size: candidates.len(),
                max,
            });
        }

        let results = self
            .validator
            .validate_bulk(&self.terms, lexicon_id, candidates);

        let mut last_id = self.max_numeric_id();
        let mut accepted = 0;
        for (index, (term, replacement)) in candidates.iter().enumerate() {
            if results.get(&index).is_some_and(ValidationResult::is_valid) {
                last_id += 1;
                self.terms.push(Term::new(
                    last_id.to_string(),
                    lexicon_id,
                    term.as_ref().trim(),
                    replacement.as_ref().trim(),
                ));
                accepted += 1;
            }
        }

        if accepted > 0 {
            self.save()?;
        }
        info!(
            "Imported {} of {} terms into '{}'",
            accepted,
            candidates.len(),
            lexicon_id
        );
        Ok(results)
    }

    /// Write all terms back to the file.
    pub fn save(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = LexiconFile {
            terms: self.terms.clone(),
        };
        fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        self.last_modified = fs::metadata(&self.path)?.modified().ok();
        self.invalidate();

        debug!("Lexicon saved to {}", self.path.display());
        Ok(())
    }

    fn max_numeric_id(&self) -> u64 {
        self.terms
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    fn next_id(&self) -> String {
        (self.max_numeric_id() + 1).to_string()
    }
}

impl TermSource for LexiconStore {
    fn snapshot(&self, lexicon_id: &str) -> Vec<Term> {
        self.terms.snapshot(lexicon_id)
    }
}
