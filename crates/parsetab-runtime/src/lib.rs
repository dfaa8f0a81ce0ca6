//! Table-driven runtimes for `parsetab` parse tables.

pub mod definition;
pub mod parser;
pub mod predictive;
pub mod trace;

pub use crate::{
    definition::{ParseAction, PredictiveTable, Production, ShiftReduceTable, SymbolRole},
    parser::{Reducer, ShiftReduceParser},
    predictive::PredictiveParser,
    trace::{SyntaxError, TraceEvent},
};
