//! Context composition
//!
//! Joins retrieved chunks into the single prompt context handed to the
//! completion gateway, and collects the distinct source filenames for
//! citation.

use std::collections::HashSet;

use crate::vector_store::QueryMatch;

/// A composed prompt context plus its contributing sources
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedContext {
    /// Chunk texts joined with a blank line, in retrieval order
    pub context: String,
    /// Distinct source filenames across all matches, first-appearance order
    pub sources: Vec<String>,
}

impl ComposedContext {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

/// Compose the first `limit` matches into a context string.
///
/// Sources are collected from every match, not just the first `limit`, so a
/// response can cite documents even when their chunks fell outside the
/// context window. Matches without metadata contribute nothing.
pub fn compose_context(matches: &[QueryMatch], limit: usize) -> ComposedContext {
    let context = matches
        .iter()
        .take(limit)
        .filter_map(|m| m.metadata.as_ref())
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut seen = HashSet::new();
    let sources = matches
        .iter()
        .filter_map(|m| m.metadata.as_ref())
        .filter(|m| seen.insert(m.filename.clone()))
        .map(|m| m.filename.clone())
        .collect();

    ComposedContext { context, sources }
}
