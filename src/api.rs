use crate::engine::{Matcher, Parser};
use crate::{Metric, ParseError, Rule, Violation, ViolationKinds};
use std::io::Read;
use std::time::Duration;

/// Options that affect what a match run reports.
#[derive(Debug, Clone)]
pub struct Options {
    /// Violation kinds to report. Defaults to all of them.
    pub report: ViolationKinds,
}

impl Default for Options {
    fn default() -> Self {
        Options { report: ViolationKinds::all() }
    }
}

/// Result from [`match_metrics_with`].
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub violations: Vec<Violation>,
    /// Total elapsed time spent building the trie and matching.
    pub elapsed: Duration,
}

/// How often a rule's path was matched during a run.
///
/// Co-located rules (same path pattern) share a count.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCoverage {
    pub rule: Rule,
    pub matched: usize,
}

/// Additional details returned by [`match_metrics_verbose_with`].
#[derive(Debug, Clone)]
pub struct MatchDetails {
    pub total: Duration,
    pub build: Duration,
    pub evaluate: Duration,
    pub complete: Duration,
    /// Trie size, root included.
    pub nodes: usize,
    /// Per-rule match counts, in rule order.
    pub coverage: Vec<RuleCoverage>,
}

/// Result from [`match_metrics_verbose_with`].
#[derive(Debug, Clone)]
pub struct MatchResultVerbose {
    pub violations: Vec<Violation>,
    pub elapsed: Duration,
    pub details: MatchDetails,
}

/// Parse rule-definition text.
///
/// # Example
/// ```
/// use metricrule::parse_rules;
///
/// let rules = parse_rules("// disks\ncustom.disks.#.reads.bytes >=0\n").unwrap();
/// assert_eq!(rules[0].to_string(), "custom.disks.#.reads.bytes[>=0]");
/// ```
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, ParseError> {
    Parser::new(text).parse_all()
}

/// Read a whole rule file from `reader` and parse it.
pub fn read_rules(mut reader: impl Read) -> crate::Result<Vec<Rule>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse_rules(&text)?)
}

/// Match `metrics` against `rules` and return every violation.
///
/// Never fails; empty inputs yield an empty result.
pub fn match_metrics(rules: &[Rule], metrics: &[Metric]) -> Vec<Violation> {
    Matcher::new(rules).run(metrics)
}

/// Match with `options`, also reporting the elapsed time.
pub fn match_metrics_with(rules: &[Rule], metrics: &[Metric], options: &Options) -> MatchResult {
    let run = Matcher::new(rules).with_report(options.report).run_with_metrics(metrics);
    MatchResult { violations: run.violations, elapsed: run.metrics.total }
}

/// Match with `options` and return timing and coverage details.
pub fn match_metrics_verbose_with(rules: &[Rule], metrics: &[Metric], options: &Options) -> MatchResultVerbose {
    let run = Matcher::new(rules).with_report(options.report).run_with_metrics(metrics);

    let coverage = rules
        .iter()
        .zip(run.coverage)
        .map(|(rule, matched)| RuleCoverage { rule: rule.clone(), matched })
        .collect();

    let details = MatchDetails {
        total: run.metrics.total,
        build: run.metrics.build,
        evaluate: run.metrics.evaluate,
        complete: run.metrics.complete,
        nodes: run.metrics.nodes,
        coverage,
    };

    MatchResultVerbose { violations: run.violations, elapsed: run.metrics.total, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn metric(path: &str, value: f64) -> Metric {
        Metric::new(path, value, DateTime::UNIX_EPOCH)
    }

    #[test]
    fn read_rules_parses_a_stream() {
        let rules = read_rules("a.b >1\n~c.d\n".as_bytes()).unwrap();
        assert_eq!(rules, vec![rule!("a.b", [> 1.0]), rule!(~ "c.d")]);
    }

    #[test]
    fn read_rules_surfaces_parse_errors() {
        let err = read_rules("a.b >".as_bytes()).unwrap_err();
        assert!(matches!(err, crate::Error::Parse(ref e) if e.line() == 1), "{err}");
    }

    #[test]
    fn match_with_options_filters_kinds() {
        let rules = vec![rule!("a.b", [> 1.0]), rule!("c.d")];
        let metrics = vec![metric("a.b", 0.0), metric("x", 0.0)];
        let options = Options { report: ViolationKinds::MISSING | ViolationKinds::OUT_OF_RANGE };

        let res = match_metrics_with(&rules, &metrics, &options);
        assert_eq!(
            res.violations,
            vec![
                Violation::OutOfRange { rule: rules[0].clone(), metric: metrics[0].clone() },
                Violation::Missing { rule: rules[1].clone() },
            ]
        );
    }

    #[test]
    fn verbose_includes_coverage_in_rule_order() {
        let rules = vec![rule!("a.#"), rule!("b")];
        let metrics = vec![metric("a.x", 0.0), metric("a.y", 0.0)];

        let res = match_metrics_verbose_with(&rules, &metrics, &Options::default());
        assert_eq!(res.elapsed, res.details.total);
        assert_eq!(
            res.details.coverage,
            vec![RuleCoverage { rule: rules[0].clone(), matched: 2 }, RuleCoverage { rule: rules[1].clone(), matched: 0 }]
        );
        assert_eq!(res.violations, vec![Violation::Missing { rule: rules[1].clone() }]);
    }

    #[test]
    fn rule_count_matches_line_count() {
        let text: String = (0..50).map(|i| format!("m{i}.value >={i}, <{}\n", i + 10)).collect();
        let rules = parse_rules(&text).unwrap();
        assert_eq!(rules.len(), 50);
        assert!(rules.iter().enumerate().all(|(i, r)| r.path == format!("m{i}.value")));
    }
}
