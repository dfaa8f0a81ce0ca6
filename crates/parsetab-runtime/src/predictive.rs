//! The predictive stack machine driven by an LL(1) table.

use crate::{
    definition::{PredictiveTable, SymbolRole},
    trace::{SyntaxError, TraceEvent},
};

#[derive(Debug)]
pub struct PredictiveParser<TDef> {
    definition: TDef,
}

impl<TDef> PredictiveParser<TDef>
where
    TDef: PredictiveTable,
{
    pub fn new(definition: TDef) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &TDef {
        &self.definition
    }

    /// Return a lazy sequence of the steps taken on the specified descriptors.
    ///
    /// The sequence ends after the first `accept` or `error` event.
    pub fn trace<I>(&self, descriptors: I) -> PredictiveTrace<'_, TDef, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        PredictiveTrace {
            definition: &self.definition,
            descriptors: descriptors.into_iter(),
            stack: vec![self.definition.endmarker(), self.definition.start_symbol()],
            lookahead: None,
            finished: false,
        }
    }
}

#[derive(Debug)]
pub struct PredictiveTrace<'p, TDef, I>
where
    TDef: PredictiveTable,
{
    definition: &'p TDef,
    descriptors: I,
    stack: Vec<TDef::Symbol>,
    lookahead: Option<(String, TDef::Symbol)>,
    finished: bool,
}

impl<TDef, I> PredictiveTrace<'_, TDef, I>
where
    TDef: PredictiveTable,
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
        let Some((descriptor, lookahead)) = &self.lookahead else {
            return Err(SyntaxError::UnexpectedEndOfInput);
        };

        let top = self.stack.last().ok_or(SyntaxError::EmptyStack)?;
        match self.definition.role(top) {
            SymbolRole::Nonterminal => {
                let rule = self.definition.predict(top, lookahead).ok_or_else(|| {
                    SyntaxError::NoPrediction {
                        nonterminal: format!("{:?}", top),
                        descriptor: descriptor.clone(),
                    }
                })?;
                tracing::trace!("expand {:?} on {:?}", top, lookahead);
                self.stack.pop();
                self.stack
                    .extend(self.definition.expansion(rule).iter().rev().cloned());
                let production = self.definition.production(rule);
                Ok(TraceEvent::Apply {
                    nonterminal: production.nonterminal.to_owned(),
                    rule: production.raw.to_owned(),
                })
            }

            SymbolRole::Token => {
                if top != lookahead {
                    return Err(SyntaxError::Mismatch {
                        expected: format!("{:?}", top),
                        found: descriptor.clone(),
                    });
                }
                self.stack.pop();
                let token = descriptor.clone();
                self.lookahead = None;
                Ok(TraceEvent::Match { token })
            }

            SymbolRole::Endmarker => {
                if top != lookahead {
                    return Err(SyntaxError::Mismatch {
                        expected: format!("{:?}", top),
                        found: descriptor.clone(),
                    });
                }
                Ok(TraceEvent::Accept)
            }
        }
    }
}

impl<TDef, I> Iterator for PredictiveTrace<'_, TDef, I>
where
    TDef: PredictiveTable,
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
