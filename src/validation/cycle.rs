//! Circular reference detection through the replacement graph.
//!
//! Nodes are normalized terms of one lexicon. There is an edge `a -> b` when
//! the term `a` is replaced by text that normalizes to another term `b`, i.e.
//! the output of one rule would be picked up again by another. The graph is
//! rebuilt from the snapshot on every call and never stored.

use super::{Field, IssueExtra, IssueKind, ValidationIssue, ValidationResult};
use crate::term::{normalize, visible, Term};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const NO_EDGES: &[String] = &[];

/// Replacement graph of one lexicon with a candidate edit applied.
struct ReplacementGraph<'a> {
    /// normalized term -> outgoing edges (normalized replacements)
    edges: HashMap<String, Vec<String>>,
    /// normalized term -> text shown in a cycle chain
    labels: HashMap<String, &'a str>,
}

impl<'a> ReplacementGraph<'a> {
    fn build(
        existing: &'a [Term],
        lexicon_id: &str,
        exclude_id: Option<&str>,
        candidate: (&'a str, &str),
    ) -> Self {
        let mut labels: HashMap<String, &'a str> = HashMap::new();
        let (candidate_term, _) = candidate;
        labels.insert(normalize(candidate_term), candidate_term.trim());

        let terms: Vec<(String, String)> = visible(existing, lexicon_id, exclude_id)
            .map(|t| {
                labels
                    .entry(t.normalized_term())
                    .or_insert_with(|| t.term.trim());
                (t.normalized_term(), normalize(&t.replacement))
            })
            .collect();

        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (from, to) in terms {
            if labels.contains_key(&to) {
                edges.entry(from).or_default().push(to);
            }
        }

        Self { edges, labels }
    }

    fn successors(&self, node: &str) -> &[String] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(NO_EDGES)
    }

    fn label<'s>(&'s self, node: &'s str) -> &'s str {
        self.labels.get(node).copied().unwrap_or(node)
    }

    fn is_term(&self, node: &str) -> bool {
        self.labels.contains_key(node)
    }

    /// Depth-first search from `start` whose first step is `first`, looking
    /// for a path that returns to `start`. Each node is expanded at most
    /// once, so the search terminates even if the stored data already has a
    /// cycle that does not involve `start`.
    fn find_cycle(&self, start: &str, first: &str) -> Option<Vec<String>> {
        let first_step = [first.to_string()];
        let mut visited: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = vec![start];
        let mut stack = vec![first_step.iter()];

        while let Some(frontier) = stack.last_mut() {
            match frontier.next() {
                Some(next) if next == start => {
                    path.push(start);
                    return Some(path.iter().map(|n| self.label(n).to_string()).collect());
                }
                Some(next) => {
                    if visited.insert(next.as_str()) {
                        path.push(next.as_str());
                        stack.push(self.successors(next).iter());
                    }
                }
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }

        None
    }
}

/// Report a `circularReference` error when adding `term -> replacement` to
/// `lexicon_id` would close a loop through the replacement graph.
///
/// Self-reference (`term` and `replacement` normalize to the same text) is the
/// shortest such loop and is found by the same search.
pub fn detect_cycle(
    existing: &[Term],
    lexicon_id: &str,
    term: &str,
    replacement: &str,
    exclude_id: Option<&str>,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    let start = normalize(term);
    let target = normalize(replacement);
    if start.is_empty() || target.is_empty() {
        return result;
    }

    let graph = ReplacementGraph::build(existing, lexicon_id, exclude_id, (term, replacement));
    if !graph.is_term(&target) {
        return result;
    }

    if let Some(chain) = graph.find_cycle(&start, &target) {
        debug!("Cycle in '{}': {}", lexicon_id, chain.join(" -> "));
        result.push(
            ValidationIssue::new(
                Field::Replacement,
                IssueKind::CircularReference,
                replacement.trim(),
                format!("Circular reference detected: {}", chain.join(" -> ")),
            )
            .with_extra(IssueExtra::Cycle { chain }),
        );
    }

    result
}
