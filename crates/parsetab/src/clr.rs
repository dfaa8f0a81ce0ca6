//! Canonical LR(1) parse tables.

use crate::{
    lr1::{LR1Automaton, Lookahead},
    table::{ConflictError, LrTable, ParserClass, TableBuilder},
};

/// Build the canonical LR(1) table of an LR(1) automaton.
#[tracing::instrument(skip_all)]
pub fn build(lr1: &LR1Automaton) -> Result<LrTable, ConflictError> {
    let g = lr1.grammar();

    let mut builder = TableBuilder::new(ParserClass::Lr1, g);
    builder.transitions(lr1.graph())?;
    for (state, items) in lr1.states() {
        for item in items.iter().filter(|item| item.core.is_reduce_ready(g)) {
            let Lookahead::Symbol(lookahead) = &item.lookahead else {
                continue;
            };
            builder.reduce(state, &item.core, Some(lookahead))?;
        }
    }
    Ok(builder.finish(lr1.start()))
}
