//! Grammar analysis and LR-family / LL(1) parse table construction.

pub mod actions;
pub mod cascade;
pub mod clr;
pub mod diagnostics;
pub mod first_follow;
pub mod grammar;
pub mod lalr;
pub mod ll1;
pub mod lr0;
pub mod lr1;
pub mod slr;
pub mod symbol;
pub mod syntax;
pub mod table;
pub mod types;
pub mod util;

pub use parsetab_runtime as runtime;

use crate::{
    grammar::Grammar,
    ll1::{LL1Error, LL1Table},
    lr0::LR0Automaton,
    lr1::LR1Automaton,
    table::{ConflictError, LrTable, ParserClass},
};

pub fn build_lr0_automaton(grammar: &Grammar) -> LR0Automaton {
    LR0Automaton::new(grammar)
}

pub fn build_slr1_table(grammar: &Grammar) -> Result<LrTable, ConflictError> {
    slr::build(&LR0Automaton::new(grammar))
}

pub fn build_lalr1_table(grammar: &Grammar) -> Result<LrTable, ConflictError> {
    lalr::build(&LR0Automaton::new(grammar))
}

pub fn build_lr1_table(grammar: &Grammar) -> Result<LrTable, ConflictError> {
    clr::build(&LR1Automaton::new(grammar))
}

pub fn build_ll1_table(grammar: &Grammar) -> Result<LL1Table, LL1Error> {
    LL1Table::new(grammar)
}

/// Build the parse table of the specified LR construction.
pub fn build_lr_table(grammar: &Grammar, class: ParserClass) -> Result<LrTable, ConflictError> {
    match class {
        ParserClass::Slr1 => build_slr1_table(grammar),
        ParserClass::Lalr1 => build_lalr1_table(grammar),
        ParserClass::Lr1 => build_lr1_table(grammar),
    }
}
