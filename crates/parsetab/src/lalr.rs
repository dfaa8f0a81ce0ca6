//! LALR(1) parse tables, by lookahead propagation over the LR(0) automaton.

use crate::{
    cascade::CascadeSetMap,
    first_follow::{FirstSets, SymbolSet},
    grammar::RuleRef,
    lr0::{LR0Automaton, LR0Item, StateID},
    lr1::{self, LR1Item, Lookahead},
    symbol::Symbol,
    table::{ConflictError, LrTable, ParserClass, TableBuilder},
    types::Map,
};

/// The item of a particular state.
pub type ItemKey = (StateID, LR0Item);

/// Compute the LALR(1) lookaheads of an LR(0) automaton.
///
/// The result is keyed by every kernel item and every reduce-ready item.
/// For each kernel item `K` of a state `S`, the closure of `[K, #]` is taken:
///
/// * an item `A -> α . X β, a` spreads `a` to `A -> α X . β` in `goto(S, X)`,
/// * a reduce-ready item `A -> α ., a` keeps `a` in `S` itself,
///
/// where a concrete `a` is generated spontaneously and `#` stands for the
/// lookaheads of `K`, i.e. a propagation edge from `K`.
#[tracing::instrument(skip_all)]
pub fn lookaheads(lr0: &LR0Automaton) -> Map<ItemKey, SymbolSet> {
    let g = lr0.grammar();
    let first = FirstSets::new(g);

    let mut buckets = CascadeSetMap::<ItemKey, SymbolSet>::new();
    let start_item = LR0Item::start(RuleRef {
        nonterminal: g.start(),
        rule: 0,
    });
    buckets.add((lr0.start(), start_item), Symbol::Endmarker);

    for (state, _) in lr0.states() {
        for kernel in lr0.kernels(state) {
            let source = (state, *kernel);
            buckets.bucket_mut(source);

            let closure = lr1::closure(
                g,
                &first,
                [LR1Item {
                    core: *kernel,
                    lookahead: Lookahead::Sentinel,
                }],
            );
            for item in closure {
                let target = match item.core.next_symbol(g) {
                    None => (state, item.core),
                    Some(symbol) => match lr0.transition(state, symbol) {
                        Some(next) => (next, item.core.advance()),
                        None => continue,
                    },
                };
                match item.lookahead {
                    Lookahead::Symbol(symbol) => {
                        tracing::trace!(
                            "spontaneous: {} on {} in {:?}",
                            symbol,
                            target.1.display(g),
                            target.0
                        );
                        buckets.add(target, symbol);
                    }
                    Lookahead::Sentinel => {
                        tracing::trace!(
                            "propagate: {} in {:?} => {} in {:?}",
                            source.1.display(g),
                            source.0,
                            target.1.display(g),
                            target.0
                        );
                        buckets.add_edge(source, target);
                    }
                }
            }
        }
    }

    buckets.cascade()
}

/// Build the LALR(1) table of an LR(0) automaton.
#[tracing::instrument(skip_all)]
pub fn build(lr0: &LR0Automaton) -> Result<LrTable, ConflictError> {
    let g = lr0.grammar();
    let lookaheads = lookaheads(lr0);

    let mut builder = TableBuilder::new(ParserClass::Lalr1, g);
    builder.transitions(lr0.graph())?;
    for (state, items) in lr0.states() {
        for item in items.iter().filter(|item| item.is_reduce_ready(g)) {
            let set = lookaheads.get(&(state, *item));
            builder.reduce(state, item, set.into_iter().flatten())?;
        }
    }
    Ok(builder.finish(lr0.start()))
}
