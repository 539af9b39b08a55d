//! Run metrics.
//!
//! `Matcher::run` returns only violations; `Matcher::run_with_metrics` also
//! returns the per-phase timings and per-rule match counts collected here.
//! The counts are cheap (one integer per trie node) and are always tracked;
//! only the timings are extra.

use crate::Violation;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Build + evaluate + complete.
    pub total: Duration,
    /// Time spent building the trie.
    pub build: Duration,
    /// Time spent walking the trie and evaluating expressions.
    pub evaluate: Duration,
    /// Time spent looking for required rules that never matched.
    pub complete: Duration,
    /// Number of trie nodes, root included.
    pub nodes: usize,
    /// Number of metrics evaluated.
    pub metrics: usize,
}

/// Matcher output bundled with timing and coverage.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub violations: Vec<Violation>,
    /// Matched count of each rule's node, indexed like the rule slice.
    pub coverage: Vec<usize>,
    pub metrics: RunMetrics,
}
