//! SLR(1) parse tables.

use crate::{
    first_follow::{FirstSets, FollowSets},
    lr0::LR0Automaton,
    table::{ConflictError, LrTable, ParserClass, TableBuilder},
};

/// Build the SLR(1) table of an LR(0) automaton.
///
/// Every reduce-ready item reduces on the FOLLOW set of its nonterminal.
#[tracing::instrument(skip_all)]
pub fn build(lr0: &LR0Automaton) -> Result<LrTable, ConflictError> {
    let g = lr0.grammar();
    let first = FirstSets::new(g);
    let follow = FollowSets::new(g, &first);

    let mut builder = TableBuilder::new(ParserClass::Slr1, g);
    builder.transitions(lr0.graph())?;
    for (state, items) in lr0.states() {
        for item in items.iter().filter(|item| item.is_reduce_ready(g)) {
            let name = g.nonterminal(item.nonterminal).name();
            let lookaheads = follow.get(name).into_iter().flatten();
            builder.reduce(state, item, lookaheads)?;
        }
    }
    Ok(builder.finish(lr0.start()))
}
