//! Observable steps emitted by the runtimes.

use std::fmt;

/// One step taken by a runtime.
///
/// The `Display` form is the textual trace, e.g. `shift`,
/// `reduce by F -> :id`, `apply E -> :T :E_1`, `match :id`, `accept`, `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The shift-reduce runtime consumed a token.
    Shift,
    /// The shift-reduce runtime reduced by a rule.
    Reduce { nonterminal: String, rule: String },
    /// The predictive runtime expanded a nonterminal.
    Apply { nonterminal: String, rule: String },
    /// The predictive runtime matched the stack top against a token.
    Match { token: String },
    Accept,
    /// The runtime stopped at a syntax error.
    Error(SyntaxError),
}

impl TraceEvent {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(..))
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift => f.write_str("shift"),
            Self::Reduce { nonterminal, rule } => write!(f, "reduce by {} -> {}", nonterminal, rule),
            Self::Apply { nonterminal, rule } => write!(f, "apply {} -> {}", nonterminal, rule),
            Self::Match { token } => write!(f, "match {}", token),
            Self::Accept => f.write_str("accept"),
            Self::Error(..) => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("cannot resolve token descriptor `{}'", _0)]
    UnresolvedDescriptor(String),

    #[error("unexpected token `{}' in state {}", descriptor, state)]
    UnexpectedToken { state: String, descriptor: String },

    #[error("missing goto entry for `{}' in state {}", nonterminal, state)]
    MissingGoto { state: String, nonterminal: String },

    #[error("expected `{}' but found `{}'", expected, found)]
    Mismatch { expected: String, found: String },

    #[error("no rule of `{}' predicts `{}'", nonterminal, descriptor)]
    NoPrediction {
        nonterminal: String,
        descriptor: String,
    },

    #[error("the input ended before it was accepted")]
    UnexpectedEndOfInput,

    #[error("the parser stack is empty")]
    EmptyStack,
}
