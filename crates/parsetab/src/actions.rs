//! Semantic actions attached to production rules.

use crate::grammar::{Grammar, RuleRef};
use parsetab_runtime::Reducer;
use std::{any::Any, fmt, sync::Arc};

/// The dynamically typed value threaded through a parse.
pub type Value = Box<dyn Any>;

/// A callback invoked with the values of a rule's symbols when it is reduced.
#[derive(Clone)]
pub struct SemanticAction(Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>);

impl SemanticAction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: Vec<Value>) -> Value {
        (self.0)(args)
    }
}

impl fmt::Debug for SemanticAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SemanticAction(..)")
    }
}

/// [`Reducer`] invoking the semantic actions of a grammar.
///
/// Shifted tokens become `String` values holding their descriptor. A rule
/// without an action passes a single argument through unchanged and packs
/// any other number of arguments into a `Vec<Value>`.
#[derive(Debug)]
pub struct SemanticReducer<'g> {
    grammar: &'g Grammar,
}

impl<'g> SemanticReducer<'g> {
    /// `grammar` must be the grammar the parse table was built from,
    /// i.e. `LrTable::grammar()`.
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }
}

impl Reducer<RuleRef> for SemanticReducer<'_> {
    type Value = Value;

    fn shift(&mut self, descriptor: &str) -> Value {
        Box::new(descriptor.to_owned())
    }

    fn reduce(&mut self, rule: RuleRef, mut args: Vec<Value>) -> Value {
        match self.grammar.rule(rule).action() {
            Some(action) => action.call(args),
            None if args.len() == 1 => args.remove(0),
            None => Box::new(args),
        }
    }
}
