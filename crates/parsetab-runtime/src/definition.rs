//! Parse table definitions consumed by the runtimes.

use std::fmt;

/// The production rule that a table refers to when reducing or predicting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Production<'a> {
    /// The name of the left-hand side nonterminal.
    pub nonterminal: &'a str,
    /// The source text of the right-hand side.
    pub raw: &'a str,
    /// The number of symbols in the right-hand side.
    pub arity: usize,
}

/// The action that a shift-reduce table stores in one of its cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TReduce> {
    /// Consume the lookahead token and transition to the specified state.
    Shift(TState),
    /// Reduce by the specified production rule without consuming the lookahead.
    Reduce(TReduce),
    Accept,
}

/// The trait for abstracting the generated LR-family parse table.
pub trait ShiftReduceTable {
    /// The number to identify the state of LR automaton.
    type State: Copy + fmt::Debug;

    /// The resolved form of a token descriptor.
    type Symbol: fmt::Debug;

    /// The handle of a production rule stored in reduce actions.
    type Reduce: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Resolve a token descriptor into a lookahead symbol.
    fn resolve(&self, descriptor: &str) -> Option<Self::Symbol>;

    /// Return the action stored at the specified state and lookahead symbol.
    ///
    /// `None` means the cell is empty, i.e. a syntax error.
    fn action(
        &self,
        current: Self::State,
        lookahead: &Self::Symbol,
    ) -> Option<ParseAction<Self::State, Self::Reduce>>;

    /// Return the state reached from `current` after reducing by `reduce`.
    fn goto(&self, current: Self::State, reduce: Self::Reduce) -> Option<Self::State>;

    fn production(&self, reduce: Self::Reduce) -> Production<'_>;
}

impl<T: ?Sized> ShiftReduceTable for &T
where
    T: ShiftReduceTable,
{
    type State = T::State;
    type Symbol = T::Symbol;
    type Reduce = T::Reduce;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn resolve(&self, descriptor: &str) -> Option<Self::Symbol> {
        (**self).resolve(descriptor)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: &Self::Symbol,
    ) -> Option<ParseAction<Self::State, Self::Reduce>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, reduce: Self::Reduce) -> Option<Self::State> {
        (**self).goto(current, reduce)
    }

    fn production(&self, reduce: Self::Reduce) -> Production<'_> {
        (**self).production(reduce)
    }
}

impl<T: ?Sized> ShiftReduceTable for std::sync::Arc<T>
where
    T: ShiftReduceTable,
{
    type State = T::State;
    type Symbol = T::Symbol;
    type Reduce = T::Reduce;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn resolve(&self, descriptor: &str) -> Option<Self::Symbol> {
        (**self).resolve(descriptor)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: &Self::Symbol,
    ) -> Option<ParseAction<Self::State, Self::Reduce>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, reduce: Self::Reduce) -> Option<Self::State> {
        (**self).goto(current, reduce)
    }

    fn production(&self, reduce: Self::Reduce) -> Production<'_> {
        (**self).production(reduce)
    }
}

/// How the predictive runtime treats a symbol on top of its stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SymbolRole {
    /// Expanded by consulting the table.
    Nonterminal,
    /// Matched against the current token.
    Token,
    /// The bottom of the stack; matched against the end of input.
    Endmarker,
}

/// The trait for abstracting the generated LL(1) parse table.
pub trait PredictiveTable {
    /// The grammar symbol pushed onto the parser stack.
    ///
    /// Equality must be structural, so that a resolved token matches the
    /// symbol expected by the stack.
    type Symbol: Clone + PartialEq + fmt::Debug;

    /// The handle of a production rule stored in table cells.
    type Rule: Copy;

    fn start_symbol(&self) -> Self::Symbol;

    fn endmarker(&self) -> Self::Symbol;

    /// Resolve a token descriptor into a grammar symbol.
    fn resolve(&self, descriptor: &str) -> Option<Self::Symbol>;

    fn role(&self, symbol: &Self::Symbol) -> SymbolRole;

    /// Return the rule to expand `top` with when `lookahead` is the next token.
    fn predict(&self, top: &Self::Symbol, lookahead: &Self::Symbol) -> Option<Self::Rule>;

    /// Return the right-hand side symbols of the specified rule.
    fn expansion(&self, rule: Self::Rule) -> &[Self::Symbol];

    fn production(&self, rule: Self::Rule) -> Production<'_>;
}

impl<T: ?Sized> PredictiveTable for &T
where
    T: PredictiveTable,
{
    type Symbol = T::Symbol;
    type Rule = T::Rule;

    fn start_symbol(&self) -> Self::Symbol {
        (**self).start_symbol()
    }

    fn endmarker(&self) -> Self::Symbol {
        (**self).endmarker()
    }

    fn resolve(&self, descriptor: &str) -> Option<Self::Symbol> {
        (**self).resolve(descriptor)
    }

    fn role(&self, symbol: &Self::Symbol) -> SymbolRole {
        (**self).role(symbol)
    }

    fn predict(&self, top: &Self::Symbol, lookahead: &Self::Symbol) -> Option<Self::Rule> {
        (**self).predict(top, lookahead)
    }

    fn expansion(&self, rule: Self::Rule) -> &[Self::Symbol] {
        (**self).expansion(rule)
    }

    fn production(&self, rule: Self::Rule) -> Production<'_> {
        (**self).production(rule)
    }
}
