//! The shift-reduce parser driven by an LR-family parse table.

use crate::{
    definition::{ParseAction, ShiftReduceTable},
    trace::{SyntaxError, TraceEvent},
};

/// The hook invoked with semantic values while parsing.
///
/// The value of a shifted token is produced by `shift`; the values popped off
/// the stack by a reduction are passed to `reduce` in left-to-right order.
pub trait Reducer<TReduce> {
    type Value;

    fn shift(&mut self, descriptor: &str) -> Self::Value;

    fn reduce(&mut self, rule: TReduce, args: Vec<Self::Value>) -> Self::Value;
}

/// The parser driven based on the generated parse table.
///
/// The parser keeps no state between calls and can be reused for any number
/// of inputs.
#[derive(Debug)]
pub struct ShiftReduceParser<TDef> {
    definition: TDef,
}

impl<TDef> ShiftReduceParser<TDef>
where
    TDef: ShiftReduceTable,
{
    /// Create an instance of `ShiftReduceParser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &TDef {
        &self.definition
    }

    /// Return a lazy sequence of the steps taken on the specified descriptors.
    ///
    /// The sequence ends after the first `accept` or `error` event.
    pub fn trace<I>(&self, descriptors: I) -> Trace<'_, TDef, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Trace {
            definition: &self.definition,
            descriptors: descriptors.into_iter(),
            state_stack: vec![self.definition.initial_state()],
            lookahead: None,
            finished: false,
        }
    }

    /// Parse the specified descriptors, threading semantic values through
    /// `reducer`, and return the value of the accepted start symbol.
    pub fn parse_with<I, R>(&self, descriptors: I, reducer: &mut R) -> Result<R::Value, SyntaxError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        R: Reducer<TDef::Reduce>,
    {
        let mut state_stack = vec![self.definition.initial_state()];
        let mut value_stack: Vec<R::Value> = vec![];

        for descriptor in descriptors {
            let descriptor = descriptor.as_ref();
            let lookahead = self
                .definition
                .resolve(descriptor)
                .ok_or_else(|| SyntaxError::UnresolvedDescriptor(descriptor.to_owned()))?;

            loop {
                match step(&self.definition, &mut state_stack, descriptor, &lookahead)? {
                    Step::Shift => {
                        value_stack.push(reducer.shift(descriptor));
                        break;
                    }
                    Step::Reduce(reduce) => {
                        let arity = self.definition.production(reduce).arity;
                        let at = value_stack
                            .len()
                            .checked_sub(arity)
                            .ok_or(SyntaxError::EmptyStack)?;
                        let args = value_stack.split_off(at);
                        value_stack.push(reducer.reduce(reduce, args));
                    }
                    Step::Accept => return value_stack.pop().ok_or(SyntaxError::EmptyStack),
                }
            }
        }

        Err(SyntaxError::UnexpectedEndOfInput)
    }
}

/// Lazy sequence of the steps taken by [`ShiftReduceParser`].
#[derive(Debug)]
pub struct Trace<'p, TDef, I>
where
    TDef: ShiftReduceTable,
{
    definition: &'p TDef,
    descriptors: I,
    state_stack: Vec<TDef::State>,
    lookahead: Option<(String, TDef::Symbol)>,
    finished: bool,
}

impl<TDef, I> Trace<'_, TDef, I>
where
    TDef: ShiftReduceTable,
    I: Iterator,
    I::Item: AsRef<str>,
{
    fn advance(&mut self) -> Result<TraceEvent, SyntaxError> {
        if self.lookahead.is_none() {
            let descriptor = self
                .descriptors
                .next()
                .ok_or(SyntaxError::UnexpectedEndOfInput)?;
            let descriptor = descriptor.as_ref().to_owned();
            let symbol = self
                .definition
                .resolve(&descriptor)
                .ok_or_else(|| SyntaxError::UnresolvedDescriptor(descriptor.clone()))?;
            self.lookahead = Some((descriptor, symbol));
        }
        let Some((descriptor, symbol)) = &self.lookahead else {
            return Err(SyntaxError::UnexpectedEndOfInput);
        };

        match step(self.definition, &mut self.state_stack, descriptor, symbol)? {
            Step::Shift => {
                self.lookahead = None;
                Ok(TraceEvent::Shift)
            }
            Step::Reduce(reduce) => {
                let production = self.definition.production(reduce);
                Ok(TraceEvent::Reduce {
                    nonterminal: production.nonterminal.to_owned(),
                    rule: production.raw.to_owned(),
                })
            }
            Step::Accept => Ok(TraceEvent::Accept),
        }
    }
}

impl<TDef, I> Iterator for Trace<'_, TDef, I>
where
    TDef: ShiftReduceTable,
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = TraceEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let event = self.advance().unwrap_or_else(TraceEvent::Error);
        if event.is_accept() || event.is_error() {
            self.finished = true;
        }
        Some(event)
    }
}

enum Step<TReduce> {
    Shift,
    Reduce(TReduce),
    Accept,
}

/// Perform one transition of the LR automaton on the current lookahead.
fn step<TDef>(
    definition: &TDef,
    state_stack: &mut Vec<TDef::State>,
    descriptor: &str,
    lookahead: &TDef::Symbol,
) -> Result<Step<TDef::Reduce>, SyntaxError>
where
    TDef: ShiftReduceTable,
{
    let current = *state_stack.last().ok_or(SyntaxError::EmptyStack)?;

    match definition.action(current, lookahead) {
        Some(ParseAction::Shift(next)) => {
            tracing::trace!("shift {:?} in {:?} --> {:?}", lookahead, current, next);
            state_stack.push(next);
            Ok(Step::Shift)
        }

        Some(ParseAction::Reduce(reduce)) => {
            let production = definition.production(reduce);
            tracing::trace!(
                "reduce by {} -> {} in {:?}",
                production.nonterminal,
                production.raw,
                current
            );
            if production.arity >= state_stack.len() {
                return Err(SyntaxError::EmptyStack);
            }
            state_stack.truncate(state_stack.len() - production.arity);

            let top = *state_stack.last().ok_or(SyntaxError::EmptyStack)?;
            let next = definition
                .goto(top, reduce)
                .ok_or_else(|| SyntaxError::MissingGoto {
                    state: format!("{:?}", top),
                    nonterminal: production.nonterminal.to_owned(),
                })?;
            state_stack.push(next);
            Ok(Step::Reduce(reduce))
        }

        Some(ParseAction::Accept) => Ok(Step::Accept),

        None => Err(SyntaxError::UnexpectedToken {
            state: format!("{:?}", current),
            descriptor: descriptor.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Production;

    /// Hand-written SLR(1) table of `S -> ( S ) | x`.
    ///
    /// ```text
    /// 0: ( => s2, x => s3, S => 1
    /// 1: $ => accept
    /// 2: ( => s2, x => s3, S => 4
    /// 3: ) => r1, $ => r1
    /// 4: ) => s5
    /// 5: ) => r0, $ => r0
    /// ```
    struct Parens;

    const RULES: [Production<'static>; 2] = [
        Production {
            nonterminal: "S",
            raw: "( :S )",
            arity: 3,
        },
        Production {
            nonterminal: "S",
            raw: "x",
            arity: 1,
        },
    ];

    impl ShiftReduceTable for Parens {
        type State = u8;
        type Symbol = char;
        type Reduce = usize;

        fn initial_state(&self) -> u8 {
            0
        }

        fn resolve(&self, descriptor: &str) -> Option<char> {
            match descriptor {
                "(" => Some('('),
                ")" => Some(')'),
                "x" => Some('x'),
                ":endmarker" => Some('$'),
                _ => None,
            }
        }

        fn action(&self, current: u8, lookahead: &char) -> Option<ParseAction<u8, usize>> {
            use ParseAction::*;
            match (current, lookahead) {
                (0 | 2, '(') => Some(Shift(2)),
                (0 | 2, 'x') => Some(Shift(3)),
                (1, '$') => Some(Accept),
                (3, ')' | '$') => Some(Reduce(1)),
                (4, ')') => Some(Shift(5)),
                (5, ')' | '$') => Some(Reduce(0)),
                _ => None,
            }
        }

        fn goto(&self, current: u8, _: usize) -> Option<u8> {
            match current {
                0 => Some(1),
                2 => Some(4),
                _ => None,
            }
        }

        fn production(&self, reduce: usize) -> Production<'_> {
            RULES[reduce]
        }
    }

    fn trace(input: &str) -> Vec<String> {
        let parser = ShiftReduceParser::new(Parens);
        parser
            .trace(input.split_whitespace())
            .map(|event| event.to_string())
            .collect()
    }

    #[test]
    fn trace_nested() {
        assert_eq!(
            trace("( x ) :endmarker"),
            [
                "shift",
                "shift",
                "reduce by S -> x",
                "shift",
                "reduce by S -> ( :S )",
                "accept"
            ]
        );
    }

    #[test]
    fn trace_stops_at_error() {
        let parser = ShiftReduceParser::new(Parens);
        let events: Vec<_> = parser.trace(["(", "x", ":endmarker"]).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events.last(),
            Some(TraceEvent::Error(SyntaxError::UnexpectedToken { descriptor, .. })) if descriptor == ":endmarker"
        ));
    }

    #[test]
    fn trace_unresolved_descriptor() {
        let parser = ShiftReduceParser::new(Parens);
        let events: Vec<_> = parser.trace(["y"]).collect();
        assert_eq!(
            events,
            [TraceEvent::Error(SyntaxError::UnresolvedDescriptor(
                "y".into()
            ))]
        );
    }

    #[test]
    fn trace_missing_endmarker() {
        assert_eq!(trace("x"), ["shift", "error"]);
    }

    #[test]
    fn parser_is_reusable() {
        let parser = ShiftReduceParser::new(Parens);
        assert!(parser.trace(["x", "x"]).any(|e| e.is_error()));
        assert!(parser.trace(["x", ":endmarker"]).any(|e| e.is_accept()));
    }

    struct Depth;
    impl Reducer<usize> for Depth {
        type Value = usize;

        fn shift(&mut self, _: &str) -> usize {
            0
        }

        fn reduce(&mut self, rule: usize, args: Vec<usize>) -> usize {
            match rule {
                0 => args[1] + 1,
                _ => 0,
            }
        }
    }

    #[test]
    fn parse_with_reducer() {
        let parser = ShiftReduceParser::new(Parens);
        let depth = parser
            .parse_with("( ( x ) ) :endmarker".split_whitespace(), &mut Depth)
            .unwrap();
        assert_eq!(depth, 2);

        let err = parser
            .parse_with("( x".split_whitespace(), &mut Depth)
            .unwrap_err();
        assert_eq!(err, SyntaxError::UnexpectedEndOfInput);
    }
}
