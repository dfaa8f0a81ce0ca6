//! Canonical LR(0) item-set automaton.

use crate::{
    grammar::{Grammar, NonterminalID, RuleRef},
    symbol::Symbol,
    types::{Map, Set, Worklist},
    util::{display_fn, to_id},
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);
impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}
impl StateID {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Transitions of an automaton, keyed by unaliased symbols.
pub type Graph = Map<StateID, Map<Symbol, StateID>>;

/// The LR(0) item, a.k.a. LR item core.
///
/// Items order by nonterminal, rule and dot; a sorted item vector is the
/// canonical form of an item set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub nonterminal: NonterminalID,
    pub rule: u32,
    pub dot: u32,
}

impl LR0Item {
    /// The item with the dot at the beginning of the specified rule.
    pub fn start(rule: RuleRef) -> Self {
        Self {
            nonterminal: rule.nonterminal,
            rule: rule.rule,
            dot: 0,
        }
    }

    pub fn rule_ref(&self) -> RuleRef {
        RuleRef {
            nonterminal: self.nonterminal,
            rule: self.rule,
        }
    }

    /// Return the symbol after the dot, or `None` when the item is reduce-ready.
    pub fn next_symbol<'g>(&self, g: &'g Grammar) -> Option<&'g Symbol> {
        g.rule(self.rule_ref()).items().get(self.dot as usize)
    }

    /// Return the symbols after the symbol next to the dot.
    pub fn rest<'g>(&self, g: &'g Grammar) -> &'g [Symbol] {
        let items = g.rule(self.rule_ref()).items();
        items.get(self.dot as usize + 1..).unwrap_or(&[])
    }

    pub fn is_reduce_ready(&self, g: &Grammar) -> bool {
        self.next_symbol(g).is_none()
    }

    pub fn advance(&self) -> Self {
        Self {
            dot: self.dot + 1,
            ..*self
        }
    }

    /// `name/rule/dot`
    pub fn key(&self, g: &Grammar) -> String {
        format!(
            "{}/{}/{}",
            g.nonterminal(self.nonterminal).name(),
            self.rule,
            self.dot
        )
    }

    /// `E -> :E . + :T`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let rule = g.rule(self.rule_ref());
            write!(f, "{} ->", g.nonterminal(self.nonterminal).name())?;
            for (i, symbol) in rule.items().iter().enumerate() {
                if i == self.dot as usize {
                    f.write_str(" .")?;
                }
                write!(f, " {}", symbol)?;
            }
            if rule.items().len() == self.dot as usize {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// Calculate the closure of the specified items, in canonical order.
pub fn closure(g: &Grammar, items: impl IntoIterator<Item = LR0Item>) -> Vec<LR0Item> {
    let mut pending: Worklist<LR0Item> = items.into_iter().collect();
    while let Some(item) = pending.pop() {
        let Some(next) = item.next_symbol(g).and_then(|s| g.id_of(s)) else {
            continue;
        };
        for rule in 0..g.nonterminal(next).rules().len() {
            pending.push(LR0Item {
                nonterminal: next,
                rule: to_id(rule),
                dot: 0,
            });
        }
    }
    let mut res: Vec<_> = pending.into_visited().into_iter().collect();
    res.sort_unstable();
    res
}

/// Advance the dot over `symbol` and return the closure of the result.
///
/// An empty result means that there is no such transition.
pub fn goto(g: &Grammar, items: &[LR0Item], symbol: &Symbol) -> Vec<LR0Item> {
    let advanced: Vec<_> = items
        .iter()
        .filter(|item| item.next_symbol(g) == Some(symbol))
        .map(LR0Item::advance)
        .collect();
    if advanced.is_empty() {
        return vec![];
    }
    closure(g, advanced)
}

/// The canonical collection of LR(0) item sets.
#[derive(Debug)]
pub struct LR0Automaton {
    grammar: Grammar,
    states: Set<Vec<LR0Item>>,
    start: StateID,
    graph: Graph,
}

impl LR0Automaton {
    /// Build the automaton of the augmented form of `grammar`.
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar) -> Self {
        let grammar = grammar.augment();
        let symbols = grammar.all_symbols();

        let mut states = Set::<Vec<LR0Item>>::default();
        let mut graph = Graph::default();

        let start_rule = RuleRef {
            nonterminal: grammar.start(),
            rule: 0,
        };
        let (start, _) = states.insert_full(closure(&grammar, [LR0Item::start(start_rule)]));
        let start = StateID(to_id(start));

        let mut pending: Worklist<StateID> = Some(start).into_iter().collect();
        while let Some(current) = pending.pop() {
            let mut edges = Map::default();
            for symbol in &symbols {
                let next_items = match states.get_index(current.index()) {
                    Some(items) => goto(&grammar, items, symbol),
                    None => continue,
                };
                if next_items.is_empty() {
                    continue;
                }
                let (next, inserted) = states.insert_full(next_items);
                let next = StateID(to_id(next));
                if inserted {
                    tracing::trace!("discovered {:?} from {:?} over {}", next, current, symbol);
                    pending.push(next);
                }
                edges.insert(symbol.clone(), next);
            }
            graph.insert(current, edges);
        }
        graph.sort_keys();

        tracing::debug!("LR(0) automaton: {} states", states.len());

        Self {
            grammar,
            states,
            start,
            graph,
        }
    }

    /// The augmented grammar this automaton was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
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

    pub fn states(&self) -> impl Iterator<Item = (StateID, &[LR0Item])> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, items)| (StateID(to_id(i)), &items[..]))
    }

    pub fn items(&self, state: StateID) -> &[LR0Item] {
        self.states
            .get_index(state.index())
            .map_or(&[][..], |items| &items[..])
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Return the state reached from `state` over `symbol`.
    pub fn transition(&self, state: StateID, symbol: &Symbol) -> Option<StateID> {
        self.graph.get(&state)?.get(symbol).copied()
    }

    pub fn closure(&self, items: impl IntoIterator<Item = LR0Item>) -> Vec<LR0Item> {
        closure(&self.grammar, items)
    }

    pub fn goto(&self, items: &[LR0Item], symbol: &Symbol) -> Vec<LR0Item> {
        goto(&self.grammar, items, symbol)
    }

    /// Return the state holding exactly the specified items.
    pub fn find(&self, items: &[LR0Item]) -> Option<StateID> {
        self.states
            .get_index_of(items)
            .map(|i| StateID(to_id(i)))
    }

    /// Whether `item` is a kernel item, i.e. its dot is not at the beginning
    /// or it is the augmented start item.
    pub fn is_kernel(&self, item: &LR0Item) -> bool {
        item.dot != 0 || item.nonterminal == self.grammar.start()
    }

    pub fn kernels(&self, state: StateID) -> impl Iterator<Item = &LR0Item> + '_ {
        self.items(state)
            .iter()
            .filter(move |item| self.is_kernel(item))
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
