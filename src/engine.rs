//! Rule parsing and matching engine.
//!
//! Verification is a two-stage pipeline: rule text is parsed once into an
//! ordered `Vec<Rule>`, then each batch of metrics is matched against a trie
//! derived from those rules.
//!
//! ```text
//! rule text ── Lexer ── Parser::parse_rule (lexer.rs, parser.rs)
//!                              │
//!                              v
//!                          Vec<Rule>
//!                              │  RuleTrie::build             (trie.rs)
//!                              v
//!                   Matcher::run_with_metrics                 (matcher.rs)
//!                     - walk trie per metric (exact stem first,
//!                       wildcard as fallback)
//!                     - OR-evaluate rules attached to the node
//!                     - report required nodes never matched
//!                              │
//!                              v
//!                        Vec<Violation>
//! ```
//!
//! ## Responsibilities by module
//!
//! - `lexer.rs`: character-level scanning with one character of lookahead.
//! - `parser.rs`: line grammar (`[~]path [op number {, op number}]`).
//! - `trie.rs`: path trie keyed by stem; terminal nodes hold rule ids and the
//!   per-node `matched` counter.
//! - `matcher.rs`: evaluation of metrics and the completion phase.
//! - `metrics.rs`: timing and coverage data for a run.
//!
//! ## Logging
//!
//! Parsing and matching emit `log` records under the `parser`, `trie` and
//! `matcher` targets; enable them with `RUST_LOG=debug` (or `trace`).

#[path = "engine/lexer.rs"]
mod lexer;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/trie.rs"]
mod trie;

pub use matcher::Matcher;
pub use parser::{Parser, parse_single_rule};
