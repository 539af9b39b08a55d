//! Rule-driven verification of Graphite plaintext metrics.
//!
//! A rule file declares which metric paths must (or may) appear and which
//! values are acceptable for them:
//!
//! ```text
//! // comment
//! local.random.diceroll   >0, <=6
//! local.thermal.*.temp    <=100000   // `*` or `#` matches one stem
//! ~local.network.tx.bytes >0         // `~` marks the path optional
//! local.uptime                       // presence only
//! ```
//!
//! Lines sharing a path pattern form an OR: a value is accepted when every
//! expression of at least one of them holds.
//!
//! ```
//! use metricrule::{Metric, Violation, match_metrics, parse_rules};
//!
//! let rules = parse_rules("a.b.c >=0\nd.e.f\n").unwrap();
//! let metrics = vec![Metric::new("a.b.c", 1.0, Default::default())];
//!
//! let violations = match_metrics(&rules, &metrics);
//! assert!(matches!(&violations[..], [Violation::Missing { rule }] if rule.path == "d.e.f"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

#[macro_use]
mod macros;
mod api;
mod decode;
mod engine;
mod error;
mod graphdef;

pub use api::{
    MatchDetails, MatchResult, MatchResultVerbose, Options, RuleCoverage, match_metrics, match_metrics_verbose_with,
    match_metrics_with, parse_rules, read_rules,
};
pub use decode::{parse_metrics, read_metrics};
pub use error::{DecodeError, DecodeErrorKind, Error, ParseError, ParseErrorKind, Result};
pub use graphdef::{GraphDef, GraphDefMetric, GraphDefs, generate_rules, read_graph_defs, render_rules};

/// Normalized wildcard stem. `#` in a rule path is stored as this marker.
pub const WILDCARD: &str = "*";

/// Stems that are read as wildcards in rule paths.
const WILDCARD_STEMS: [&str; 2] = ["*", "#"];

// --- Expressions ------------------------------------------------------------

/// Comparison operator of an [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl Operator {
    /// Textual form used in rule files and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
        }
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::LessThan => lhs < rhs,
            Operator::LessEqual => lhs <= rhs,
            Operator::GreaterThan => lhs > rhs,
            Operator::GreaterEqual => lhs >= rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterEqual),
            other => Err(ParseErrorKind::ExpectedOperator(other.to_string())),
        }
    }
}

/// A single numeric constraint, e.g. `<=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expr {
    pub op: Operator,
    pub value: f64,
}

impl Expr {
    pub fn new(op: Operator, value: f64) -> Self {
        Expr { op, value }
    }

    /// Returns true when `value` satisfies this constraint.
    pub fn is_satisfied(&self, value: f64) -> bool {
        self.op.holds(value, self.value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `f64`'s `Display` is the shortest representation that round-trips.
        write!(f, "{}{}", self.op, self.value)
    }
}

// --- Rules ------------------------------------------------------------------

/// One line of a rule file: a dotted path pattern, a required flag and zero or
/// more constraints that must all hold.
///
/// With no expressions the rule only checks that the path exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Whether the path must be observed at least once.
    pub required: bool,
    /// Dot separated path; stems `*` and `#` are wildcards.
    pub path: String,
    pub exprs: Vec<Expr>,
}

impl Rule {
    pub fn new(path: impl Into<String>, required: bool, exprs: Vec<Expr>) -> Self {
        Rule { required, path: path.into(), exprs }
    }

    /// Path stems with `#` normalized to [`WILDCARD`].
    pub fn stems(&self) -> impl Iterator<Item = &str> + '_ {
        self.path.split('.').map(|stem| if WILDCARD_STEMS.contains(&stem) { WILDCARD } else { stem })
    }

    /// Returns true when every expression holds for `value`.
    pub fn accepts(&self, value: f64) -> bool {
        self.exprs.iter().all(|e| e.is_satisfied(value))
    }

    /// Render the rule in rule-file syntax (`[~]path<TAB>op v, op v`).
    ///
    /// The output parses back to an equal rule.
    pub fn to_rule_line(&self) -> String {
        let flag = if self.required { "" } else { "~" };
        if self.exprs.is_empty() {
            return format!("{flag}{}", self.path);
        }
        let exprs: Vec<String> = self.exprs.iter().map(Expr::to_string).collect();
        format!("{flag}{}\t{}", self.path, exprs.join(", "))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.required {
            f.write_str("~")?;
        }
        write!(f, "{}[", self.path)?;
        for (i, e) in self.exprs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{e}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for Rule {
    type Err = ParseError;

    /// Parse exactly one rule; blank input or a second rule is an error.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        engine::parse_single_rule(s)
    }
}

// --- Metrics ----------------------------------------------------------------

/// An observed data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub path: String,
    pub value: f64,
    /// Not consulted by matching.
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(path: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Metric { path: path.into(), value, timestamp }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.value, self.timestamp.timestamp())
    }
}

// --- Violations -------------------------------------------------------------

bitflags::bitflags! {
    /// Set of violation kinds; used to select which ones get reported.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViolationKinds: u8 {
        const OUT_OF_RANGE = 1 << 0;
        const MISSING      = 1 << 1;
        const UNEXPECTED   = 1 << 2;
    }
}

/// A mismatch between the rule set and the observed metrics.
///
/// Violations are results, not errors: callers may collect them across many
/// inputs before deciding on an overall outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The metric matched `rule`'s path but its value was rejected by it.
    OutOfRange { rule: Rule, metric: Metric },
    /// A required rule was never matched by any metric.
    Missing { rule: Rule },
    /// The metric is not covered by any rule.
    Unexpected { metric: Metric },
}

impl Violation {
    pub fn kind(&self) -> ViolationKinds {
        match self {
            Violation::OutOfRange { .. } => ViolationKinds::OUT_OF_RANGE,
            Violation::Missing { .. } => ViolationKinds::MISSING,
            Violation::Unexpected { .. } => ViolationKinds::UNEXPECTED,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match self {
            Violation::OutOfRange { rule, .. } | Violation::Missing { rule } => Some(rule),
            Violation::Unexpected { .. } => None,
        }
    }

    pub fn metric(&self) -> Option<&Metric> {
        match self {
            Violation::OutOfRange { metric, .. } | Violation::Unexpected { metric } => Some(metric),
            Violation::Missing { .. } => None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OutOfRange { rule, metric } => write!(f, "metric {metric} is out of range for rule {rule}"),
            Violation::Missing { rule } => write!(f, "rule {rule} did not match any metric"),
            Violation::Unexpected { metric } => write!(f, "found unexpected metric {metric}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_display() {
        let cases: Vec<(Rule, &str)> = vec![
            (rule!(~ "a.b.c", [< 3.0]), "~a.b.c[<3]"),
            (rule!("a.b.c", [< 3.0]), "a.b.c[<3]"),
            (rule!("a.b.c", [< 3.0, <= 2.15, > 0.0, >= -3.0]), "a.b.c[<3,<=2.15,>0,>=-3]"),
            (rule!("custom.disk.writes.bytes", [<= 0.0, >= 512.0]), "custom.disk.writes.bytes[<=0,>=512]"),
            (rule!(~ "custom.net.#.tx", [> 0.0]), "~custom.net.#.tx[>0]"),
            (rule!("local.uptime"), "local.uptime[]"),
        ];
        for (rule, want) in cases {
            assert_eq!(rule.to_string(), want, "{rule:?}");
        }
    }

    #[test]
    fn expressions_evaluate_boundaries() {
        // (expr, value, expected)
        let cases = [
            (expr!(< 3.0), 2.0, true),
            (expr!(< 3.0), 3.0, false),
            (expr!(<= 3.0), 3.0, true),
            (expr!(> 3.0), 3.1, true),
            (expr!(> 3.0), 3.0, false),
            (expr!(>= 3.0), 3.0, true),
            (expr!(>= 3.0), 2.9, false),
        ];
        for (e, value, expected) in cases {
            assert_eq!(e.is_satisfied(value), expected, "{e} with {value}");
        }
    }

    #[test]
    fn rule_without_exprs_accepts_anything() {
        let r = rule!("a.b");
        assert!(r.accepts(f64::MIN));
        assert!(r.accepts(0.0));
    }

    #[test]
    fn stems_normalize_both_wildcards() {
        let r = rule!("a.#.c.*.e");
        assert_eq!(r.stems().collect::<Vec<_>>(), vec!["a", "*", "c", "*", "e"]);
    }

    #[test]
    fn rule_line_parses_back() {
        let rules = [rule!("a.b.c", [>= 0.0, <= 100.0]), rule!(~ "x.#.y"), rule!(~ "p.q", [> -1.5])];
        for r in rules {
            let line = r.to_rule_line();
            let parsed: Rule = line.parse().unwrap();
            assert_eq!(parsed, r, "{line}");
        }
    }

    #[test]
    fn operator_round_trips_through_text() {
        for op in [Operator::LessThan, Operator::LessEqual, Operator::GreaterThan, Operator::GreaterEqual] {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("=<".parse::<Operator>().is_err());
    }

    #[test]
    fn violation_accessors() {
        let m = Metric::new("a.b", 1.0, DateTime::UNIX_EPOCH);
        let v = Violation::Unexpected { metric: m.clone() };
        assert_eq!(v.kind(), ViolationKinds::UNEXPECTED);
        assert_eq!(v.metric(), Some(&m));
        assert!(v.rule().is_none());
        assert_eq!(v.to_string(), "found unexpected metric a.b 1 0");
    }
}
