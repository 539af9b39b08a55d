//! Matching metrics against a rule set.
//!
//! A run has three phases:
//!
//! ```text
//! (1) build     Matcher::new          rules -> RuleTrie
//! (2) evaluate  Matcher::evaluate     one trie walk per metric
//!                 - no node / internal node   -> Unexpected
//!                 - terminal node             -> matched += 1, then OR over rules;
//!                                                if none accepts, one OutOfRange
//!                                                per attached rule
//! (3) complete  Matcher::complete     required terminal nodes with matched == 0
//!                                     -> one Missing per attached rule
//! ```
//!
//! Phase (3) must only run after every metric went through phase (2); the
//! `run*` methods take the whole metric slice to keep that ordering.
//!
//! Output is deterministic: phase (2) follows metric order, phase (3) follows
//! `RuleTrie::terminals`.

use super::metrics::{RunMetrics, RunResult};
use super::trie::RuleTrie;
use crate::{Metric, Rule, Violation, ViolationKinds};
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "matcher";

/// Evaluates metrics against one immutable rule set.
///
/// Usage: create with `Matcher::new(&rules)`, then either call `run(&metrics)`
/// or drive `evaluate` per metric followed by a single `complete`.
#[derive(Debug)]
pub struct Matcher<'r> {
    rules: &'r [Rule],
    trie: RuleTrie,
    /// Kinds of violations to emit.
    report: ViolationKinds,
    build: Duration,
}

impl<'r> Matcher<'r> {
    pub fn new(rules: &'r [Rule]) -> Self {
        let start = Instant::now();
        let trie = RuleTrie::build(rules);
        Matcher { rules, trie, report: ViolationKinds::all(), build: start.elapsed() }
    }

    /// Restrict emitted violations to `kinds`. Matching itself is unaffected.
    pub fn with_report(mut self, kinds: ViolationKinds) -> Self {
        self.report = kinds;
        self
    }

    /// Evaluate one metric, appending any violation to `out`.
    pub fn evaluate(&mut self, metric: &Metric, out: &mut Vec<Violation>) {
        let node_id = match self.trie.lookup(&metric.path) {
            Some(id) if self.trie.node(id).is_terminal() => id,
            _ => {
                log::trace!(target: LOG_TARGET, "no rule covers {}", metric.path);
                self.emit(out, || Violation::Unexpected { metric: metric.clone() });
                return;
            }
        };

        let node = self.trie.node_mut(node_id);
        node.matched += 1;
        let rules = self.rules;
        let node = self.trie.node(node_id);
        if node.rules.iter().any(|&id| rules[id].accepts(metric.value)) {
            return;
        }

        log::trace!(target: LOG_TARGET, "{} rejected by {} rule(s)", metric, node.rules.len());
        if self.report.contains(ViolationKinds::OUT_OF_RANGE) {
            out.extend(
                node.rules.iter().map(|&id| Violation::OutOfRange { rule: rules[id].clone(), metric: metric.clone() }),
            );
        }
    }

    /// Report required rules whose node never matched.
    ///
    /// Call once, after all metrics have been evaluated.
    pub fn complete(&self, out: &mut Vec<Violation>) {
        for id in self.trie.terminals() {
            let node = self.trie.node(id);
            if !node.required || node.matched > 0 {
                continue;
            }
            for &rule_id in &node.rules {
                log::trace!(target: LOG_TARGET, "required rule {} never matched", self.rules[rule_id]);
                self.emit(out, || Violation::Missing { rule: self.rules[rule_id].clone() });
            }
        }
    }

    /// Matched count of the node each rule is attached to, in rule order.
    pub fn coverage(&self) -> Vec<usize> {
        (0..self.rules.len()).map(|id| self.trie.node(self.trie.node_of(id)).matched).collect()
    }

    /// Evaluate `metrics`, complete the run, and return timing details.
    pub fn run_with_metrics(mut self, metrics: &[Metric]) -> RunResult {
        let mut violations = Vec::new();

        let evaluate_start = Instant::now();
        for metric in metrics {
            self.evaluate(metric, &mut violations);
        }
        let evaluate = evaluate_start.elapsed();

        let complete_start = Instant::now();
        self.complete(&mut violations);
        let complete = complete_start.elapsed();

        log::debug!(
            target: LOG_TARGET,
            "{} metrics against {} rules: {} violations",
            metrics.len(),
            self.rules.len(),
            violations.len()
        );

        let metrics = RunMetrics {
            total: self.build + evaluate + complete,
            build: self.build,
            evaluate,
            complete,
            nodes: self.trie.len(),
            metrics: metrics.len(),
        };
        RunResult { violations, coverage: self.coverage(), metrics }
    }

    /// Evaluate `metrics` and complete the run.
    ///
    /// Convenience wrapper that discards timing details.
    pub fn run(self, metrics: &[Metric]) -> Vec<Violation> {
        self.run_with_metrics(metrics).violations
    }

    fn emit(&self, out: &mut Vec<Violation>, violation: impl FnOnce() -> Violation) {
        let violation = violation();
        if self.report.contains(violation.kind()) {
            out.push(violation);
        }
    }
}
