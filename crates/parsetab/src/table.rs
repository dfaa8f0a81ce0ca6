//! LR-family parse tables with conflict detection.

use crate::{
    grammar::{Grammar, NonterminalID, RuleRef},
    lr0::{Graph, LR0Item, StateID},
    symbol::Symbol,
    types::Map,
    util::display_fn,
};
use parsetab_runtime::{ParseAction, Production, ShiftReduceTable};
use std::fmt;

/// The LR construction used to build a table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParserClass {
    Slr1,
    Lalr1,
    Lr1,
}

impl fmt::Display for ParserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slr1 => f.write_str("SLR(1)"),
            Self::Lalr1 => f.write_str("LALR(1)"),
            Self::Lr1 => f.write_str("LR(1)"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateID),
    Reduce(RuleRef),
    Accept,
}

/// Two actions claiming one table cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error(
        "shift-reduce conflict in {:?} on `{}' between shift and `{}': the grammar is not {}",
        state,
        symbol,
        rule,
        class
    )]
    ShiftReduce {
        class: ParserClass,
        state: StateID,
        symbol: String,
        rule: String,
    },

    #[error(
        "reduce-reduce conflict in {:?} on `{}' between `{}' and `{}': the grammar is not {}",
        state,
        symbol,
        rule1,
        rule2,
        class
    )]
    ReduceReduce {
        class: ParserClass,
        state: StateID,
        symbol: String,
        rule1: String,
        rule2: String,
    },
}

/// ACTION and GOTO tables of an LR-family parser.
#[derive(Debug)]
pub struct LrTable {
    class: ParserClass,
    grammar: Grammar,
    start: StateID,
    actions: Map<StateID, Map<Symbol, Action>>,
    gotos: Map<StateID, Map<NonterminalID, StateID>>,
}

impl LrTable {
    pub fn class(&self) -> ParserClass {
        self.class
    }

    /// The augmented grammar the table was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn start(&self) -> StateID {
        self.start
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Return `ACTION[state, symbol]`.
    pub fn action(&self, state: StateID, symbol: &Symbol) -> Option<Action> {
        self.actions.get(&state)?.get(symbol).copied()
    }

    /// Return `GOTO[state, nonterminal]`.
    pub fn goto(&self, state: StateID, nonterminal: NonterminalID) -> Option<StateID> {
        self.gotos.get(&state)?.get(&nonterminal).copied()
    }

    pub fn actions(&self) -> &Map<StateID, Map<Symbol, Action>> {
        &self.actions
    }

    pub fn gotos(&self) -> &Map<StateID, Map<NonterminalID, StateID>> {
        &self.gotos
    }
}

impl fmt::Display for LrTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.grammar;
        writeln!(f, "# {} table of `{}'", self.class, g.name())?;
        for (id, actions) in &self.actions {
            writeln!(f, "\n#### State {:?}", id)?;
            writeln!(f, "## actions")?;
            for (symbol, action) in actions {
                match action {
                    Action::Shift(next) => writeln!(f, "- {} => shift({:?})", symbol, next)?,
                    Action::Reduce(r) => {
                        writeln!(f, "- {} => reduce({})", symbol, display_rule(g, *r))?
                    }
                    Action::Accept => writeln!(f, "- {} => accept", symbol)?,
                }
            }
            if let Some(gotos) = self.gotos.get(id).filter(|gotos| !gotos.is_empty()) {
                writeln!(f, "## gotos")?;
                for (n, next) in gotos {
                    writeln!(f, "- {} => goto({:?})", g.nonterminal(*n).name(), next)?;
                }
            }
        }
        Ok(())
    }
}

/// `E -> :E + :T`
pub(crate) fn display_rule(g: &Grammar, r: RuleRef) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        write!(
            f,
            "{} -> {}",
            g.nonterminal(r.nonterminal).name(),
            g.rule(r).raw()
        )
    })
}

/// Accumulates table cells, failing on the first conflict.
pub(crate) struct TableBuilder<'g> {
    class: ParserClass,
    grammar: &'g Grammar,
    actions: Map<StateID, Map<Symbol, Action>>,
    gotos: Map<StateID, Map<NonterminalID, StateID>>,
}

impl<'g> TableBuilder<'g> {
    /// `grammar` must be the augmented grammar the automaton was built from.
    pub(crate) fn new(class: ParserClass, grammar: &'g Grammar) -> Self {
        Self {
            class,
            grammar,
            actions: Map::default(),
            gotos: Map::default(),
        }
    }

    /// Emit shift actions for token transitions and gotos for nonterminal transitions.
    pub(crate) fn transitions(&mut self, graph: &Graph) -> Result<(), ConflictError> {
        for (&state, edges) in graph {
            self.actions.entry(state).or_default();
            for (symbol, &next) in edges {
                match self.grammar.id_of(symbol) {
                    Some(n) => {
                        self.gotos.entry(state).or_default().insert(n, next);
                    }
                    None => self.insert(state, symbol.unaliased(), Action::Shift(next))?,
                }
            }
        }
        Ok(())
    }

    /// Emit the reduce actions of a reduce-ready item.
    ///
    /// The augmented start item accepts on the endmarker instead.
    pub(crate) fn reduce<'s, I>(
        &mut self,
        state: StateID,
        item: &LR0Item,
        lookaheads: I,
    ) -> Result<(), ConflictError>
    where
        I: IntoIterator<Item = &'s Symbol>,
    {
        if item.nonterminal == self.grammar.start() {
            return self.insert(state, Symbol::Endmarker, Action::Accept);
        }
        for lookahead in lookaheads {
            self.insert(state, lookahead.unaliased(), Action::Reduce(item.rule_ref()))?;
        }
        Ok(())
    }

    fn insert(&mut self, state: StateID, symbol: Symbol, action: Action) -> Result<(), ConflictError> {
        let accept_rule = RuleRef {
            nonterminal: self.grammar.start(),
            rule: 0,
        };
        let cells = self.actions.entry(state).or_default();
        let existing = match cells.get(&symbol) {
            None => {
                tracing::trace!("{:?} on {}: {:?}", state, symbol, action);
                cells.insert(symbol, action);
                return Ok(());
            }
            Some(existing) if *existing == action => return Ok(()),
            Some(existing) => *existing,
        };

        let g = self.grammar;
        let reduced = |action: Action| match action {
            Action::Reduce(r) => Some(r),
            Action::Accept => Some(accept_rule),
            Action::Shift(..) => None,
        };
        let err = match (reduced(existing), reduced(action)) {
            (Some(r1), Some(r2)) => ConflictError::ReduceReduce {
                class: self.class,
                state,
                symbol: symbol.descriptor(),
                rule1: display_rule(g, r1).to_string(),
                rule2: display_rule(g, r2).to_string(),
            },
            (Some(r), None) | (None, Some(r)) => ConflictError::ShiftReduce {
                class: self.class,
                state,
                symbol: symbol.descriptor(),
                rule: display_rule(g, r).to_string(),
            },
            // a single transition per symbol
            (None, None) => return Ok(()),
        };
        tracing::debug!("{}", err);
        Err(err)
    }

    pub(crate) fn finish(mut self, start: StateID) -> LrTable {
        self.actions.sort_keys();
        tracing::debug!("{} table: {} states", self.class, self.actions.len());
        LrTable {
            class: self.class,
            grammar: self.grammar.clone(),
            start,
            actions: self.actions,
            gotos: self.gotos,
        }
    }
}

impl ShiftReduceTable for LrTable {
    type State = StateID;
    type Symbol = Symbol;
    type Reduce = RuleRef;

    fn initial_state(&self) -> StateID {
        self.start
    }

    fn resolve(&self, descriptor: &str) -> Option<Symbol> {
        self.grammar.resolve(descriptor).ok()
    }

    fn action(&self, current: StateID, lookahead: &Symbol) -> Option<ParseAction<StateID, RuleRef>> {
        Some(match LrTable::action(self, current, lookahead)? {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(r) => ParseAction::Reduce(r),
            Action::Accept => ParseAction::Accept,
        })
    }

    fn goto(&self, current: StateID, reduce: RuleRef) -> Option<StateID> {
        LrTable::goto(self, current, reduce.nonterminal)
    }

    fn production(&self, reduce: RuleRef) -> Production<'_> {
        let rule = self.grammar.rule(reduce);
        Production {
            nonterminal: self.grammar.nonterminal(reduce.nonterminal).name(),
            raw: rule.raw(),
            arity: rule.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lr0::LR0Automaton, slr};

    #[test]
    fn display_table() {
        // S -> ( :S ) | x
        let g = Grammar::define("parens", |g| {
            g.rule("S", "( :S )")?;
            g.rule("S", "x")?;
            Ok(())
        })
        .unwrap();
        let table = slr::build(&LR0Automaton::new(&g)).unwrap();
        let rendered = table.to_string();
        assert!(rendered.starts_with("# SLR(1) table of `parens'\n"));
        assert!(rendered.contains("#### State S#000\n## actions\n"));
        assert!(rendered.contains("- :endmarker => accept\n"));
        assert!(rendered.contains("- ) => reduce(S -> x)\n"));
        assert!(rendered.contains("- S => goto("));
    }

    #[test]
    fn conflict_messages() {
        let err = ConflictError::ShiftReduce {
            class: ParserClass::Lalr1,
            state: StateID::from_raw(3),
            symbol: "=".into(),
            rule: "R -> :L".into(),
        };
        assert_eq!(
            err.to_string(),
            "shift-reduce conflict in S#003 on `=' between shift and `R -> :L': the grammar is not LALR(1)"
        );
    }
}
