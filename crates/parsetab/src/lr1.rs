//! LR(1) items and the canonical LR(1) automaton.

use crate::{
    first_follow::FirstSets,
    grammar::{Grammar, RuleRef},
    lr0::{Graph, LR0Item, StateID},
    symbol::Symbol,
    types::{Map, Set, Worklist},
    util::{display_fn, to_id},
};
use std::fmt;

/// The lookahead carried by an LR(1) item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookahead {
    Symbol(Symbol),
    /// Stands for "whatever lookahead the kernel item will carry" while
    /// computing LALR(1) lookaheads. It never collides with a grammar symbol.
    Sentinel,
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
            Self::Sentinel => f.write_str("#"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub core: LR0Item,
    pub lookahead: Lookahead,
}

impl LR1Item {
    /// `name/rule/dot/lookahead`
    pub fn key(&self, g: &Grammar) -> String {
        format!("{}/{}", self.core.key(g), self.lookahead)
    }

    /// `E -> :E . + :T, :endmarker`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| write!(f, "{}, {}", self.core.display(g), self.lookahead))
    }
}

/// Calculate the LR(1) closure of the specified items, in canonical order.
///
/// For `A -> α . X β, a` every rule `X -> γ` is added with each lookahead in
/// `FIRST(β a)`.
pub fn closure(
    g: &Grammar,
    first: &FirstSets,
    items: impl IntoIterator<Item = LR1Item>,
) -> Vec<LR1Item> {
    let mut pending: Worklist<LR1Item> = items.into_iter().collect();
    while let Some(item) = pending.pop() {
        if let Some(next) = item.core.next_symbol(g).and_then(|s| g.id_of(s)) {
            let first_of_rest = first.first_of_sequence(item.core.rest(g));
            let mut lookaheads = vec![];
            for symbol in &first_of_rest {
                match symbol {
                    Symbol::Epsilon => lookaheads.push(item.lookahead.clone()),
                    symbol => lookaheads.push(Lookahead::Symbol(symbol.clone())),
                }
            }
            for rule in 0..g.nonterminal(next).rules().len() {
                let core = LR0Item::start(RuleRef {
                    nonterminal: next,
                    rule: to_id(rule),
                });
                for lookahead in &lookaheads {
                    pending.push(LR1Item {
                        core,
                        lookahead: lookahead.clone(),
                    });
                }
            }
        }
    }
    let mut res: Vec<_> = pending.into_visited().into_iter().collect();
    res.sort_unstable();
    res
}

/// Advance the dot over `symbol` and return the LR(1) closure of the result.
pub fn goto(g: &Grammar, first: &FirstSets, items: &[LR1Item], symbol: &Symbol) -> Vec<LR1Item> {
    let advanced: Vec<_> = items
        .iter()
        .filter(|item| item.core.next_symbol(g) == Some(symbol))
        .map(|item| LR1Item {
            core: item.core.advance(),
            lookahead: item.lookahead.clone(),
        })
        .collect();
    if advanced.is_empty() {
        return vec![];
    }
    closure(g, first, advanced)
}

/// The canonical collection of LR(1) item sets.
#[derive(Debug)]
pub struct LR1Automaton {
    grammar: Grammar,
    first: FirstSets,
    states: Set<Vec<LR1Item>>,
    start: StateID,
    graph: Graph,
}

impl LR1Automaton {
    /// Build the automaton of the augmented form of `grammar`.
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar) -> Self {
        let grammar = grammar.augment();
        let first = FirstSets::new(&grammar);
        let symbols = grammar.all_symbols();

        let mut states = Set::<Vec<LR1Item>>::default();
        let mut graph = Graph::default();

        let start_item = LR1Item {
            core: LR0Item::start(RuleRef {
                nonterminal: grammar.start(),
                rule: 0,
            }),
            lookahead: Lookahead::Symbol(Symbol::Endmarker),
        };
        let (start, _) = states.insert_full(closure(&grammar, &first, [start_item]));
        let start = StateID::from_raw(to_id(start));

        let mut pending: Worklist<StateID> = Some(start).into_iter().collect();
        while let Some(current) = pending.pop() {
            let mut edges = Map::default();
            for symbol in &symbols {
                let next_items = match states.get_index(current.index()) {
                    Some(items) => goto(&grammar, &first, items, symbol),
                    None => continue,
                };
                if next_items.is_empty() {
                    continue;
                }
                let (next, inserted) = states.insert_full(next_items);
                let next = StateID::from_raw(to_id(next));
                if inserted {
                    tracing::trace!("discovered {:?} from {:?} over {}", next, current, symbol);
                    pending.push(next);
                }
                edges.insert(symbol.clone(), next);
            }
            graph.insert(current, edges);
        }
        graph.sort_keys();

        tracing::debug!("LR(1) automaton: {} states", states.len());

        Self {
            grammar,
            first,
            states,
            start,
            graph,
        }
    }

    /// The augmented grammar this automaton was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    pub fn start(&self) -> StateID {
        self.start
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &[LR1Item])> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, items)| (StateID::from_raw(to_id(i)), &items[..]))
    }

    pub fn items(&self, state: StateID) -> &[LR1Item] {
        self.states
            .get_index(state.index())
            .map_or(&[][..], |items| &items[..])
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn transition(&self, state: StateID, symbol: &Symbol) -> Option<StateID> {
        self.graph.get(&state)?.get(symbol).copied()
    }

    pub fn closure(&self, items: impl IntoIterator<Item = LR1Item>) -> Vec<LR1Item> {
        closure(&self.grammar, &self.first, items)
    }

    pub fn goto(&self, items: &[LR1Item], symbol: &Symbol) -> Vec<LR1Item> {
        goto(&self.grammar, &self.first, items, symbol)
    }

    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            for (id, items) in self.states() {
                writeln!(f, "## {:?}", id)?;
                for item in items {
                    writeln!(f, "- {}", item.display(&self.grammar))?;
                }
                if let Some(edges) = self.graph.get(&id) {
                    for (symbol, next) in edges {
                        writeln!(f, "  {} => {:?}", symbol, next)?;
                    }
                }
            }
            Ok(())
        })
    }
}
