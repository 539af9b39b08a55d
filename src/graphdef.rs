//! Rule generation from graph definitions.
//!
//! A graph definition document groups metric names under a graph key:
//!
//! ```text
//! {"graphs": {"custom.disks": {"unit": "bytes", "metrics": [{"name": "reads"}]}}}
//! ```
//!
//! Every metric becomes a required `<key>.<name>` rule bounded below by zero,
//! and above by 100 for `percentage` graphs.

use crate::Rule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

const LOG_TARGET: &str = "graphdef";

const PERCENTAGE: &str = "percentage";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDefs {
    #[serde(default)]
    pub graphs: BTreeMap<String, GraphDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDef {
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub metrics: Vec<GraphDefMetric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphDefMetric {
    pub name: String,
}

/// Decode a graph definition document from `reader`.
pub fn read_graph_defs(reader: impl Read) -> crate::Result<GraphDefs> {
    Ok(serde_json::from_reader(reader)?)
}

/// One rule per graph metric, graphs in key order.
pub fn generate_rules(defs: &GraphDefs) -> Vec<Rule> {
    let rules: Vec<Rule> = defs
        .graphs
        .iter()
        .flat_map(|(key, graph)| {
            graph.metrics.iter().map(move |metric| {
                let path = format!("{key}.{}", metric.name);
                if graph.unit == PERCENTAGE { rule!(path, [>= 0.0, <= 100.0]) } else { rule!(path, [>= 0.0]) }
            })
        })
        .collect();
    log::debug!(target: LOG_TARGET, "generated {} rules from {} graphs", rules.len(), defs.graphs.len());
    rules
}

/// Render rules in rule-file form, one per line.
pub fn render_rules(rules: &[Rule]) -> String {
    rules.iter().map(|rule| rule.to_rule_line() + "\n").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_rules;

    const DOC: &str = r#"{
        "graphs": {
            "custom.memory": {"unit": "percentage", "metrics": [{"name": "used"}, {"name": "free"}]},
            "custom.disks.#": {"unit": "bytes", "metrics": [{"name": "reads"}]}
        }
    }"#;

    #[test]
    fn generates_bounded_rules_in_key_order() {
        let defs = read_graph_defs(DOC.as_bytes()).unwrap();
        let rules = generate_rules(&defs);
        assert_eq!(
            rules,
            vec![
                rule!("custom.disks.#.reads", [>= 0.0]),
                rule!("custom.memory.used", [>= 0.0, <= 100.0]),
                rule!("custom.memory.free", [>= 0.0, <= 100.0]),
            ]
        );
    }

    #[test]
    fn rendered_rules_parse_back() {
        let rules = generate_rules(&read_graph_defs(DOC.as_bytes()).unwrap());
        let text = render_rules(&rules);
        assert_eq!(
            text,
            "custom.disks.#.reads\t>=0\ncustom.memory.used\t>=0, <=100\ncustom.memory.free\t>=0, <=100\n"
        );
        assert_eq!(parse_rules(&text).unwrap(), rules);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let defs = read_graph_defs(r#"{"graphs": {"a": {}}}"#.as_bytes()).unwrap();
        assert!(generate_rules(&defs).is_empty());
        assert!(generate_rules(&read_graph_defs("{}".as_bytes()).unwrap()).is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = read_graph_defs("{\"graphs\": [".as_bytes()).unwrap_err();
        assert!(matches!(err, crate::Error::GraphDef(_)), "{err}");
    }
}
