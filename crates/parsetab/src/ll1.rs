//! LL(1) predictive parse tables.

use crate::{
    diagnostics::{common_prefix_info, left_recursion_info, CommonPrefix},
    first_follow::{FirstSets, FollowSets},
    grammar::{Grammar, NonterminalID, RuleRef},
    symbol::Symbol,
    types::Map,
    util::join,
};
use parsetab_runtime::{PredictiveTable, Production, SymbolRole};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LL1Error {
    #[error("the grammar is left recursive: {}", join(loops, ", "))]
    LeftRecursion { loops: Vec<String> },

    #[error("the rules have common prefixes: {}", join(prefixes, "; "))]
    CommonPrefix { prefixes: Vec<CommonPrefix> },

    #[error(
        "LL(1) conflict at {} on `{}' between `{}' and `{}'",
        nonterminal,
        lookahead,
        rule1,
        rule2
    )]
    Conflict {
        nonterminal: String,
        lookahead: String,
        rule1: String,
        rule2: String,
    },
}

/// The predictive parse table `M[A, a]`.
#[derive(Debug)]
pub struct LL1Table {
    grammar: Grammar,
    first: FirstSets,
    follow: FollowSets,
    table: Map<NonterminalID, Map<Symbol, u32>>,
}

impl LL1Table {
    /// Build the LL(1) table of a grammar.
    ///
    /// Left recursion and common prefixes are rejected before the table is
    /// filled in.
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar) -> Result<Self, LL1Error> {
        let info = left_recursion_info(grammar);
        if info.has_left_recursion {
            let mut loops: Vec<_> = info.loops.into_iter().collect();
            loops.sort_unstable();
            return Err(LL1Error::LeftRecursion { loops });
        }
        let prefixes = common_prefix_info(grammar);
        if !prefixes.is_empty() {
            return Err(LL1Error::CommonPrefix { prefixes });
        }

        let first = FirstSets::new(grammar);
        let follow = FollowSets::new(grammar, &first);

        let mut table: Map<NonterminalID, Map<Symbol, u32>> = Map::default();
        for (r, n, rule) in grammar.rules() {
            let follow_set = follow.get(n.name()).into_iter().flatten();
            let lookaheads: Vec<Symbol> = if rule.is_epsilon() {
                follow_set.cloned().collect()
            } else {
                let first_set = first.first_of_sequence(rule.items());
                let nullable = first_set.contains(&Symbol::Epsilon);
                let mut lookaheads: Vec<_> = first_set
                    .into_iter()
                    .filter(|s| *s != Symbol::Epsilon)
                    .collect();
                if nullable {
                    lookaheads.extend(follow_set.cloned());
                }
                lookaheads
            };

            let row = table.entry(r.nonterminal).or_default();
            for lookahead in lookaheads {
                match row.get(&lookahead) {
                    Some(&existing) if existing == r.rule => (),
                    Some(&existing) => {
                        return Err(LL1Error::Conflict {
                            nonterminal: n.name().to_owned(),
                            lookahead: lookahead.descriptor(),
                            rule1: n.rules()[existing as usize].raw().to_owned(),
                            rule2: rule.raw().to_owned(),
                        });
                    }
                    None => {
                        tracing::trace!("M[{}, {}] = {}", n.name(), lookahead, rule.raw());
                        row.insert(lookahead, r.rule);
                    }
                }
            }
        }
        tracing::debug!("LL(1) table: {} rows", table.len());

        Ok(Self {
            grammar: grammar.clone(),
            first,
            follow,
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    pub fn follow_sets(&self) -> &FollowSets {
        &self.follow
    }

    /// Return the rule predicted for `nonterminal` when `lookahead` is next.
    pub fn get(&self, nonterminal: NonterminalID, lookahead: &Symbol) -> Option<RuleRef> {
        let rule = *self.table.get(&nonterminal)?.get(lookahead)?;
        Some(RuleRef { nonterminal, rule })
    }
}

impl fmt::Display for LL1Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# LL(1) table of `{}'", self.grammar.name())?;
        for (id, row) in &self.table {
            let n = self.grammar.nonterminal(*id);
            writeln!(f, "\n#### {}", n.name())?;
            for (lookahead, rule) in row {
                writeln!(f, "- {} => {}", lookahead, n.rules()[*rule as usize].raw())?;
            }
        }
        Ok(())
    }
}

impl PredictiveTable for LL1Table {
    type Symbol = Symbol;
    type Rule = RuleRef;

    fn start_symbol(&self) -> Symbol {
        Symbol::nonterminal(self.grammar.start_name())
    }

    fn endmarker(&self) -> Symbol {
        Symbol::Endmarker
    }

    fn resolve(&self, descriptor: &str) -> Option<Symbol> {
        self.grammar.resolve(descriptor).ok()
    }

    fn role(&self, symbol: &Symbol) -> SymbolRole {
        match symbol {
            Symbol::Nonterminal { .. } => SymbolRole::Nonterminal,
            Symbol::Endmarker => SymbolRole::Endmarker,
            _ => SymbolRole::Token,
        }
    }

    fn predict(&self, top: &Symbol, lookahead: &Symbol) -> Option<RuleRef> {
        self.get(self.grammar.id_of(top)?, lookahead)
    }

    fn expansion(&self, rule: RuleRef) -> &[Symbol] {
        self.grammar.rule(rule).items()
    }

    fn production(&self, rule: RuleRef) -> Production<'_> {
        let r = self.grammar.rule(rule);
        Production {
            nonterminal: self.grammar.nonterminal(rule.nonterminal).name(),
            raw: r.raw(),
            arity: r.len(),
        }
    }
}
