//! Path trie built from a rule set.
//!
//! Each rule path is inserted stem by stem; the rule's index is attached to the
//! node reached by its last stem. Nodes live in an arena (`Vec<TrieNode>`) and
//! refer to their children by index, so the tree needs no shared ownership.
//!
//! ```text
//! rules:  custom.disks.#.reads   custom.disks.sda.reads   custom.uptime
//!
//! root ─ custom ─┬─ disks ─┬─ sda ── reads   [rule 1]
//!                │         └─ *   ── reads   [rule 0]
//!                └─ uptime                   [rule 2]
//! ```
//!
//! ## Invariants
//!
//! - `NodeId` 0 is the root; it never carries rules (a path has at least one
//!   stem).
//! - A node is *terminal* iff it has at least one rule attached. Terminal
//!   nodes may still have children when a longer pattern shares the prefix.
//! - `required` is true iff any attached rule is required.
//! - `matched` is the only state mutated after construction.

use crate::{Rule, WILDCARD};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "trie";

/// Index into [`RuleTrie::nodes`].
pub(crate) type NodeId = usize;

/// Index into the rule slice the trie was built from.
pub(crate) type RuleId = usize;

#[derive(Debug, Default)]
pub(crate) struct TrieNode {
    /// Literal stems. Ordered so that traversal is deterministic.
    children: BTreeMap<String, NodeId>,
    wildcard: Option<NodeId>,
    pub(crate) rules: Vec<RuleId>,
    pub(crate) required: bool,
    pub(crate) matched: usize,
}

impl TrieNode {
    pub(crate) fn is_terminal(&self) -> bool {
        !self.rules.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct RuleTrie {
    nodes: Vec<TrieNode>,
    /// Terminal node of each rule, indexed by `RuleId`.
    rule_nodes: Vec<NodeId>,
}

impl RuleTrie {
    const ROOT: NodeId = 0;

    /// Build the trie; rule ids are positions in `rules`.
    pub(crate) fn build(rules: &[Rule]) -> Self {
        let mut trie = RuleTrie { nodes: vec![TrieNode::default()], rule_nodes: Vec::with_capacity(rules.len()) };
        for (id, rule) in rules.iter().enumerate() {
            trie.insert(rule, id);
        }
        log::debug!(target: LOG_TARGET, "built trie with {} nodes from {} rules", trie.nodes.len(), rules.len());
        trie
    }

    fn insert(&mut self, rule: &Rule, id: RuleId) {
        let mut current = Self::ROOT;
        for stem in rule.stems() {
            let next = if stem == WILDCARD {
                self.nodes[current].wildcard
            } else {
                self.nodes[current].children.get(stem).copied()
            };
            current = match next {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    if stem == WILDCARD {
                        self.nodes[current].wildcard = Some(child);
                    } else {
                        self.nodes[current].children.insert(stem.to_string(), child);
                    }
                    child
                }
            };
        }
        let node = &mut self.nodes[current];
        node.rules.push(id);
        node.required |= rule.required;
        self.rule_nodes.push(current);
    }

    /// Walk the trie along `path`.
    ///
    /// At every depth an exact stem wins; the wildcard child is only a
    /// fallback, and there is no backtracking once a branch is chosen.
    /// The returned node may be internal; callers check [`TrieNode::is_terminal`].
    pub(crate) fn lookup(&self, path: &str) -> Option<NodeId> {
        let mut current = Self::ROOT;
        for stem in path.split('.') {
            let node = &self.nodes[current];
            current = node.children.get(stem).copied().or(node.wildcard)?;
        }
        Some(current)
    }

    pub(crate) fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TrieNode {
        &mut self.nodes[id]
    }

    /// Terminal node the rule is attached to.
    pub(crate) fn node_of(&self, rule: RuleId) -> NodeId {
        self.rule_nodes[rule]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Terminal nodes in depth-first pre-order; literal children in lexical
    /// order, then the wildcard child.
    pub(crate) fn terminals(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_terminal() {
                out.push(id);
            }
            // Pushed in reverse so they pop in forward order (stack is LIFO).
            stack.extend(node.wildcard);
            stack.extend(node.children.values().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(paths: &[&str]) -> Vec<Rule> {
        paths.iter().map(|p| rule!(*p)).collect()
    }

    #[test]
    fn exact_stem_beats_wildcard() {
        let rules = rules(&["a.b.c", "a.*.c"]);
        let trie = RuleTrie::build(&rules);

        let exact = trie.lookup("a.b.c").unwrap();
        assert_eq!(trie.node(exact).rules, vec![0]);

        let wild = trie.lookup("a.x.c").unwrap();
        assert_eq!(trie.node(wild).rules, vec![1]);
    }

    #[test]
    fn hash_and_star_share_a_node() {
        let rules = rules(&["a.#.c", "a.*.c"]);
        let trie = RuleTrie::build(&rules);
        let id = trie.lookup("a.anything.c").unwrap();
        assert_eq!(trie.node(id).rules, vec![0, 1]);
        assert_eq!(trie.node_of(0), trie.node_of(1));
        // root, a, *, c
        assert_eq!(trie.len(), 4);
    }

    #[test]
    fn no_backtracking_into_wildcard() {
        // `a.b` exists literally, so `a.b.z` never falls back to `a.*.z`.
        let rules = rules(&["a.b.c", "a.*.z"]);
        let trie = RuleTrie::build(&rules);
        assert_eq!(trie.lookup("a.b.z"), None);
    }

    #[test]
    fn prefix_lands_on_internal_node() {
        let rules = rules(&["custom.metric1.value"]);
        let trie = RuleTrie::build(&rules);
        let id = trie.lookup("custom.metric1").unwrap();
        assert!(!trie.node(id).is_terminal());
        assert_eq!(trie.lookup("custom.metric1.value.extra"), None);
    }

    #[test]
    fn required_if_any_rule_is_required() {
        let rules = vec![rule!(~ "a.b"), rule!("a.b"), rule!(~ "c.d")];
        let trie = RuleTrie::build(&rules);
        assert!(trie.node(trie.lookup("a.b").unwrap()).required);
        assert!(!trie.node(trie.lookup("c.d").unwrap()).required);
    }

    #[test]
    fn terminals_are_depth_first_and_ordered() {
        let rules = rules(&["b.y", "a.*", "a.z", "a", "b.x"]);
        let trie = RuleTrie::build(&rules);
        let order: Vec<Vec<RuleId>> = trie.terminals().into_iter().map(|id| trie.node(id).rules.clone()).collect();
        assert_eq!(order, vec![vec![3], vec![2], vec![1], vec![4], vec![0]]);
    }
}
