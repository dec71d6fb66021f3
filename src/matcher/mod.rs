//! Lexicon-driven correction of transcribed text.
//!
//! Keys of a [`ResolvedLexicon`] are matched literally, case-insensitively
//! and only as whole words. Rules are applied longest key first over one
//! evolving buffer; text produced by a replacement is locked so shorter keys
//! never match inside it or replace it again.
//!
//! Word characters are Unicode-aware: letters and digits of any script,
//! `_`, combining marks, and the zero-width (non-)joiners that sit inside
//! Persian and Arabic words.

pub mod case;
pub mod lexicon;

pub use case::{classify, reconstruct, CaseShape};
pub use lexicon::{LexiconEntry, LexiconError, ResolvedLexicon};

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;

const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Whether `c` continues a word for boundary purposes.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || is_combining_mark(c)
        || c == ZERO_WIDTH_NON_JOINER
        || c == ZERO_WIDTH_JOINER
}

fn is_boundary(neighbour: Option<char>) -> bool {
    neighbour.map_or(true, |c| !is_word_char(c))
}

/// Literal pattern for an entry. The surface form is added as an
/// alternative when lowercasing changed more than ASCII case, since the
/// normalized key alone may not fold back to the authored text.
fn literal_pattern(entry: &LexiconEntry) -> String {
    let key = regex::escape(&entry.key);
    if entry.surface.is_empty() || entry.surface.eq_ignore_ascii_case(&entry.key) {
        return key;
    }
    let surface = regex::escape(&entry.surface);
    if entry.surface.chars().count() >= entry.key.chars().count() {
        format!("{}|{}", surface, key)
    } else {
        format!("{}|{}", key, surface)
    }
}

/// Compiled replacement rule for efficient matching.
#[derive(Debug, Clone)]
struct ReplacementRule {
    /// Normalized lexicon key
    key: String,
    /// Literal, case-insensitive pattern for the key and its surface form
    pattern: Regex,
    /// Replacement text as authored
    replacement: String,
}

/// A piece of the evolving text buffer.
#[derive(Debug)]
struct Segment {
    text: String,
    /// Produced by a replacement; never matched again
    locked: bool,
}

/// Result of a correction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub text: String,
    pub replacements: usize,
}

/// Compiled form of a resolved lexicon.
///
/// Build once per lexicon snapshot and reuse for every text block.
#[derive(Debug, Clone, Default)]
pub struct Corrector {
    /// Sorted by key length in characters, longest first; ties keep
    /// lexicon order
    rules: Vec<ReplacementRule>,
}

impl Corrector {
    pub fn new(lexicon: &ResolvedLexicon) -> Self {
        let mut rules: Vec<ReplacementRule> = lexicon
            .entries()
            .iter()
            .filter_map(|entry| {
                match RegexBuilder::new(&literal_pattern(entry))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(pattern) => Some(ReplacementRule {
                        key: entry.key.clone(),
                        pattern,
                        replacement: entry.replacement.clone(),
                    }),
                    Err(e) => {
                        warn!("Skipping lexicon key '{}': {}", entry.key, e);
                        None
                    }
                }
            })
            .collect();

        rules.sort_by_key(|rule| std::cmp::Reverse(rule.key.chars().count()));

        debug!("Compiled {} correction rules", rules.len());
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply all rules to `text`.
    pub fn apply(&self, text: &str) -> String {
        self.apply_with_stats(text).text
    }

    /// Apply all rules to `text` and report how many spans were replaced.
    pub fn apply_with_stats(&self, text: &str) -> Correction {
        if self.rules.is_empty() || text.is_empty() {
            return Correction {
                text: text.to_string(),
                replacements: 0,
            };
        }

        let mut segments = vec![Segment {
            text: text.to_string(),
            locked: false,
        }];
        let mut total = 0;

        for rule in &self.rules {
            let (next, count) = rule.apply(segments);
            segments = next;
            if count > 0 {
                debug!(
                    "Replaced '{}' -> '{}' ({} times)",
                    rule.key, rule.replacement, count
                );
                total += count;
            }
        }

        if total > 0 {
            debug!("Applied {} lexicon replacements", total);
        }

        Correction {
            text: segments.into_iter().map(|s| s.text).collect(),
            replacements: total,
        }
    }
}

impl ReplacementRule {
    /// Run this rule over every unlocked segment.
    fn apply(&self, segments: Vec<Segment>) -> (Vec<Segment>, usize) {
        let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
        let mut count = 0;
        let mut rest = segments.into_iter().peekable();

        while let Some(segment) = rest.next() {
            if segment.locked {
                out.push(segment);
                continue;
            }
            let before = out.last().and_then(|s| s.text.chars().next_back());
            let after = rest.peek().and_then(|s| s.text.chars().next());
            count += self.split(&segment.text, before, after, &mut out);
        }

        (out, count)
    }

    /// Replace whole-word matches in one unlocked segment, pushing the
    /// resulting pieces onto `out`. `before`/`after` are the characters
    /// adjacent to the segment in the buffer.
    fn split(
        &self,
        text: &str,
        before: Option<char>,
        after: Option<char>,
        out: &mut Vec<Segment>,
    ) -> usize {
        let mut count = 0;
        let mut pos = 0;
        let mut last = 0;

        while pos < text.len() {
            let Some(m) = self.pattern.find_at(text, pos) else {
                break;
            };

            let prev = if m.start() == 0 {
                before
            } else {
                text[..m.start()].chars().next_back()
            };
            let next = if m.end() == text.len() {
                after
            } else {
                text[m.end()..].chars().next()
            };

            if m.is_empty() || !is_boundary(prev) || !is_boundary(next) {
                // Retry one character further on
                pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }

            push_unlocked(out, &text[last..m.start()]);
            out.push(Segment {
                text: reconstruct(m.as_str(), &self.replacement),
                locked: true,
            });
            count += 1;
            last = m.end();
            pos = m.end();
        }

        push_unlocked(out, &text[last..]);
        count
    }
}

fn push_unlocked(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(segment) if !segment.locked => segment.text.push_str(text),
        _ => out.push(Segment {
            text: text.to_string(),
            locked: false,
        }),
    }
}

/// Apply `lexicon` to `text` in one shot.
///
/// Returns `text` unchanged when the lexicon is empty. Never fails.
pub fn apply_corrections(text: &str, lexicon: &ResolvedLexicon) -> String {
    if lexicon.is_empty() {
        return text.to_string();
    }
    Corrector::new(lexicon).apply(text)
}
