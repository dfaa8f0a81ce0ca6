//! Grammar properties checked before building an LL(1) table.

use crate::{
    grammar::{display_symbols, Grammar},
    symbol::Symbol,
    types::{Map, Set},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRecursionInfo {
    pub has_left_recursion: bool,
    /// Every left-recursive cycle, e.g. `A->B->A`.
    pub loops: Set<String>,
}

/// Two rules of one nonterminal starting with the same symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonPrefix {
    pub nonterminal: String,
    pub rule1: String,
    pub rule2: String,
    pub prefix: Vec<Symbol>,
}

impl fmt::Display for CommonPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: `{}' and `{}' share `{}'",
            self.nonterminal,
            self.rule1,
            self.rule2,
            display_symbols(&self.prefix)
        )
    }
}

/// Find the cycles of nonterminals reachable from themselves through the
/// first symbols of their rules.
#[tracing::instrument(skip_all)]
pub fn left_recursion_info(grammar: &Grammar) -> LeftRecursionInfo {
    let mut edges: Map<&str, Set<&str>> = Map::default();
    for (_, n) in grammar.nonterminals() {
        let successors = edges.entry(n.name()).or_default();
        for rule in n.rules() {
            if rule.is_epsilon() {
                continue;
            }
            if let Some(Symbol::Nonterminal { name, .. }) = rule.items().first() {
                successors.insert(name.as_str());
            }
        }
    }

    let mut loops = Set::default();
    for (_, n) in grammar.nonterminals() {
        let mut search = LoopSearch {
            edges: &edges,
            start: n.name(),
            stack: vec![],
            loops: &mut loops,
        };
        search.visit(n.name());
    }
    for l in &loops {
        tracing::trace!("left recursion: {}", l);
    }

    LeftRecursionInfo {
        has_left_recursion: !loops.is_empty(),
        loops,
    }
}

struct LoopSearch<'a, 'g> {
    edges: &'a Map<&'g str, Set<&'g str>>,
    start: &'g str,
    stack: Vec<&'g str>,
    loops: &'a mut Set<String>,
}

impl<'g> LoopSearch<'_, 'g> {
    fn visit(&mut self, name: &'g str) {
        self.stack.push(name);
        let edges = self.edges;
        if let Some(successors) = edges.get(name) {
            for &next in successors {
                if next == self.start {
                    let mut path = self.stack.join("->");
                    path.push_str("->");
                    path.push_str(next);
                    self.loops.insert(path);
                } else if !self.stack.contains(&next) {
                    self.visit(next);
                }
            }
        }
        self.stack.pop();
    }
}

/// Find every pair of rules of one nonterminal sharing a non-empty prefix.
#[tracing::instrument(skip_all)]
pub fn common_prefix_info(grammar: &Grammar) -> Vec<CommonPrefix> {
    let mut result = vec![];
    for (_, n) in grammar.nonterminals() {
        let rules = n.rules();
        for (i, rule1) in rules.iter().enumerate() {
            for rule2 in &rules[i + 1..] {
                let len = rule1
                    .items()
                    .iter()
                    .zip(rule2.items())
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > 0 {
                    result.push(CommonPrefix {
                        nonterminal: n.name().to_owned(),
                        rule1: rule1.raw().to_owned(),
                        rule2: rule2.raw().to_owned(),
                        prefix: rule1.items()[..len].to_vec(),
                    });
                }
            }
        }
    }
    result
}
