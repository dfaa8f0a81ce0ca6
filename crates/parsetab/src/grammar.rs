//! Grammar types.

use crate::{
    actions::{SemanticAction, Value},
    symbol::{Alias, Symbol},
    syntax::{self, RawSymbol, RuleSyntaxError, Stmt},
    types::{Map, Set},
    util::{join, to_id},
};
use std::{fmt, fs, io, path::Path, str::FromStr};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u32,
}
impl NonterminalID {
    #[inline]
    const fn new(raw: u32) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.raw as usize
    }
}
impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N#{:03}", self.raw)
    }
}

/// The position of a production rule in the grammar.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleRef {
    pub nonterminal: NonterminalID,
    pub rule: u32,
}
impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R#{:03}/{}", self.nonterminal.raw, self.rule)
    }
}

#[derive(Debug, Clone)]
pub struct Terminal {
    name: String,
    pattern: String,
}
impl Terminal {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The regular expression which the lexer matches this terminal with.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// A production rule in grammar.
#[derive(Debug, Clone)]
pub struct Rule {
    raw: String,
    is_epsilon: bool,
    items: Vec<Symbol>,
    action: Option<SemanticAction>,
}
impl Rule {
    pub const EPSILON_RAW: &'static str = "ϵ";

    /// The source text of this rule.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this rule derives the empty string directly.
    pub fn is_epsilon(&self) -> bool {
        self.is_epsilon
    }

    /// Return the right-hand side of this production.
    pub fn items(&self) -> &[Symbol] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn action(&self) -> Option<&SemanticAction> {
        self.action.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct Nonterminal {
    name: String,
    rules: Vec<Rule>,
}
impl Nonterminal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// The grammar definition used to derive the parser tables.
///
/// A `Grammar` is immutable once defined; every reference in its rules has
/// been resolved to a declared terminal or nonterminal.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    start: NonterminalID,
    terminals: Map<String, Terminal>,
    nonterminals: Map<String, Nonterminal>,
    augmented: bool,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## grammar: {}", self.name)?;

        writeln!(f, "\n## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{} = {}", terminal.name, terminal.pattern)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for (id, nonterminal) in self.nonterminals() {
            write!(f, "{}", nonterminal.name)?;
            if id == self.start {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for (_, nonterminal, rule) in self.rules() {
            writeln!(f, "{} -> {}", nonterminal.name, rule.raw)?;
        }

        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = GrammarDefError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let file = syntax::parse_grammar(source)?;
        let name = file.name.unwrap_or_else(|| "grammar".into());
        Grammar::define(&name, |def| {
            for stmt in file.stmts {
                match stmt {
                    Stmt::Token { name, pattern } => def.terminal(&name, &pattern)?,
                    Stmt::Start(name) => def.start(&name),
                    Stmt::Rule { nonterminal, text } => def.rule(&nonterminal, &text)?,
                }
            }
            Ok(())
        })
    }
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, GrammarDefError> {
        let source = fs::read_to_string(path).map_err(GrammarDefError::IO)?;
        source.parse()
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(name: &str, f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            name: name.to_owned(),
            terminals: Map::default(),
            nonterminals: Map::default(),
            start: None,
        };
        f(&mut def)?;
        def.end()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NonterminalID {
        self.start
    }

    pub fn start_name(&self) -> &str {
        &self.nonterminal(self.start).name
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> + '_ {
        self.terminals.values()
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &Nonterminal)> + '_ {
        self.nonterminals
            .values()
            .enumerate()
            .map(|(i, n)| (NonterminalID::new(to_id(i)), n))
    }

    pub fn nonterminal(&self, id: NonterminalID) -> &Nonterminal {
        &self.nonterminals[id.index()]
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .get_index_of(name)
            .map(|i| NonterminalID::new(to_id(i)))
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains_key(name)
    }

    pub fn rule(&self, r: RuleRef) -> &Rule {
        &self.nonterminal(r.nonterminal).rules[r.rule as usize]
    }

    /// Iterate over every production rule in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleRef, &Nonterminal, &Rule)> + '_ {
        self.nonterminals().flat_map(|(id, n)| {
            n.rules.iter().enumerate().map(move |(i, rule)| {
                let r = RuleRef {
                    nonterminal: id,
                    rule: to_id(i),
                };
                (r, n, rule)
            })
        })
    }

    /// Return the ID of the nonterminal referenced by `symbol`.
    pub fn id_of(&self, symbol: &Symbol) -> Option<NonterminalID> {
        match symbol {
            Symbol::Nonterminal { name, .. } => self.nonterminal_id(name),
            _ => None,
        }
    }

    /// Resolve a descriptor into the symbol it denotes.
    pub fn resolve(&self, descriptor: &str) -> Result<Symbol, ResolveError> {
        match descriptor {
            Symbol::ENDMARKER => return Ok(Symbol::Endmarker),
            Symbol::EPSILON => return Ok(Symbol::Epsilon),
            _ => (),
        }
        let (alias, name) = match descriptor.split_once(':') {
            None => return Ok(Symbol::literal(descriptor)),
            Some(("", rest)) => match rest.strip_prefix(':') {
                Some(name) => (Alias::Default, name),
                None => (Alias::Unnamed, rest),
            },
            Some((alias, name)) => (Alias::Named(alias.to_owned()), name),
        };
        let name = name.to_owned();
        if self.terminals.contains_key(&name) {
            Ok(Symbol::Terminal { name, alias })
        } else if self.nonterminals.contains_key(&name) {
            Ok(Symbol::Nonterminal { name, alias })
        } else {
            Err(ResolveError(descriptor.to_owned()))
        }
    }

    /// Return every symbol usable as an automaton edge: terminals, nonterminals
    /// and the literals actually used by some rule.
    pub fn all_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self
            .terminals
            .keys()
            .map(|name| Symbol::terminal(name.clone()))
            .chain(
                self.nonterminals
                    .keys()
                    .map(|name| Symbol::nonterminal(name.clone())),
            )
            .collect();
        symbols.extend(self.literals());
        symbols
    }

    /// Return the distinct literals used in rules, in order of appearance.
    pub fn literals(&self) -> Vec<Symbol> {
        let mut seen = Set::default();
        for (_, _, rule) in self.rules() {
            for item in &rule.items {
                if let Symbol::Literal(..) = item {
                    seen.insert(item.clone());
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Whether this grammar is the result of [`augment`](Self::augment).
    ///
    /// A user-defined start symbol is never treated as the augmented one, so
    /// its rules are reduced (and their actions invoked) like any other rule.
    pub fn is_augmented(&self) -> bool {
        self.augmented
    }

    /// Return the augmented form of this grammar.
    ///
    /// The result is a copy when the grammar is already augmented. Otherwise
    /// a fresh start nonterminal `$S` with the single rule `:S` is prepended,
    /// so it gets the first ID.
    pub fn augment(&self) -> Grammar {
        if self.is_augmented() {
            return self.clone();
        }

        let mut name = String::from("$S");
        while self.terminals.contains_key(&name) || self.nonterminals.contains_key(&name) {
            name.push('\'');
        }
        let start_name = self.start_name().to_owned();

        let mut nonterminals = Map::default();
        nonterminals.insert(
            name.clone(),
            Nonterminal {
                name,
                rules: vec![Rule {
                    raw: format!(":{}", start_name),
                    is_epsilon: false,
                    items: vec![Symbol::nonterminal(start_name)],
                    action: None,
                }],
            },
        );
        nonterminals.extend(
            self.nonterminals
                .iter()
                .map(|(name, n)| (name.clone(), n.clone())),
        );

        Grammar {
            name: self.name.clone(),
            start: NonterminalID::new(0),
            terminals: self.terminals.clone(),
            nonterminals,
            augmented: true,
        }
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    name: String,
    terminals: Map<String, Terminal>,
    nonterminals: Map<String, Vec<PendingRule>>,
    start: Option<String>,
}

#[derive(Debug)]
struct PendingRule {
    raw: String,
    items: Vec<RawSymbol>,
    action: Option<SemanticAction>,
}

impl GrammarDef {
    /// Declare a terminal symbol with the pattern its lexer matches.
    pub fn terminal(&mut self, name: &str, pattern: &str) -> Result<(), GrammarDefError> {
        if !syntax::is_valid_name(name) {
            return Err(GrammarDefError::InvalidName(name.to_owned()));
        }
        if self.terminals.contains_key(name) {
            return Err(GrammarDefError::DuplicateTerminal(name.to_owned()));
        }
        self.terminals.insert(
            name.to_owned(),
            Terminal {
                name: name.to_owned(),
                pattern: pattern.to_owned(),
            },
        );
        Ok(())
    }

    /// Append a production rule written in the rule mini-language.
    pub fn rule(&mut self, nonterminal: &str, text: &str) -> Result<(), GrammarDefError> {
        self.push_rule(nonterminal, text, None)
    }

    /// Append a production rule carrying a semantic action.
    pub fn rule_with_action<F>(
        &mut self,
        nonterminal: &str,
        text: &str,
        action: F,
    ) -> Result<(), GrammarDefError>
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        self.push_rule(nonterminal, text, Some(SemanticAction::new(action)))
    }

    /// Append an epsilon rule.
    pub fn epsilon(&mut self, nonterminal: &str) -> Result<(), GrammarDefError> {
        self.push_rule(nonterminal, "", None)
    }

    /// Specify the start symbol for this grammar.
    ///
    /// The first nonterminal which received a rule is used when omitted.
    pub fn start(&mut self, name: &str) {
        self.start.replace(name.to_owned());
    }

    fn push_rule(
        &mut self,
        nonterminal: &str,
        text: &str,
        action: Option<SemanticAction>,
    ) -> Result<(), GrammarDefError> {
        if !syntax::is_valid_name(nonterminal) {
            return Err(GrammarDefError::InvalidName(nonterminal.to_owned()));
        }
        let text = text.trim();
        let items = if text == Rule::EPSILON_RAW {
            vec![]
        } else {
            syntax::parse_rule(text).map_err(|source| GrammarDefError::Rule {
                nonterminal: nonterminal.to_owned(),
                raw: text.to_owned(),
                source,
            })?
        };
        let raw = if items.is_empty() {
            Rule::EPSILON_RAW.to_owned()
        } else {
            text.to_owned()
        };
        self.nonterminals
            .entry(nonterminal.to_owned())
            .or_default()
            .push(PendingRule { raw, items, action });
        Ok(())
    }

    fn end(self) -> Result<Grammar, GrammarDefError> {
        for name in self.nonterminals.keys() {
            if self.terminals.contains_key(name) {
                return Err(GrammarDefError::NameClash(name.clone()));
            }
        }

        let start = match &self.start {
            Some(start) => self
                .nonterminals
                .get_index_of(start)
                .ok_or_else(|| GrammarDefError::UnknownStart(start.clone()))?,
            None if self.nonterminals.is_empty() => return Err(GrammarDefError::Empty),
            None => 0,
        };

        let mut nonterminals = Map::default();
        for (name, pending) in &self.nonterminals {
            let mut rules = Vec::with_capacity(pending.len());
            for rule in pending {
                let items = rule
                    .items
                    .iter()
                    .map(|item| self.resolve_raw(item))
                    .collect::<Result<Vec<_>, String>>()
                    .map_err(|missing| GrammarDefError::Unresolved {
                        nonterminal: name.clone(),
                        rule: rule.raw.clone(),
                        name: missing,
                    })?;
                rules.push(Rule {
                    raw: rule.raw.clone(),
                    is_epsilon: items.is_empty(),
                    items,
                    action: rule.action.clone(),
                });
            }
            nonterminals.insert(
                name.clone(),
                Nonterminal {
                    name: name.clone(),
                    rules,
                },
            );
        }

        tracing::debug!(
            "defined grammar `{}': {} terminals, {} nonterminals",
            self.name,
            self.terminals.len(),
            nonterminals.len()
        );

        Ok(Grammar {
            name: self.name,
            start: NonterminalID::new(to_id(start)),
            terminals: self.terminals,
            nonterminals,
            augmented: false,
        })
    }

    fn resolve_raw(&self, item: &RawSymbol) -> Result<Symbol, String> {
        match item {
            RawSymbol::Literal(chars) => Ok(Symbol::literal(chars.clone())),
            RawSymbol::Reference { name, alias } => {
                let (name, alias) = (name.clone(), alias.clone());
                if self.terminals.contains_key(&name) {
                    Ok(Symbol::Terminal { name, alias })
                } else if self.nonterminals.contains_key(&name) {
                    Ok(Symbol::Nonterminal { name, alias })
                } else {
                    Err(name)
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("IO error: {}", _0)]
    IO(io::Error),

    #[error("syntax error at {}", _0)]
    Syntax(#[from] syntax::FileSyntaxError),

    #[error("invalid rule `{} -> {}': {}", nonterminal, raw, source)]
    Rule {
        nonterminal: String,
        raw: String,
        source: RuleSyntaxError,
    },

    #[error("incorrect symbol name: `{}'", _0)]
    InvalidName(String),

    #[error("the terminal `{}' has already been defined", _0)]
    DuplicateTerminal(String),

    #[error("`{}' is declared as both a terminal and a nonterminal", _0)]
    NameClash(String),

    #[error("unknown start symbol: `{}'", _0)]
    UnknownStart(String),

    #[error("`{}' in rule `{} -> {}' is neither a terminal nor a nonterminal", name, nonterminal, rule)]
    Unresolved {
        nonterminal: String,
        rule: String,
        name: String,
    },

    #[error("the grammar has no nonterminal symbols")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot resolve {}", _0)]
pub struct ResolveError(pub String);

/// Render a symbol sequence as space separated descriptors.
pub(crate) fn display_symbols(symbols: &[Symbol]) -> impl fmt::Display + '_ {
    join(symbols, " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Grammar {
        Grammar::define("arithmetic", |g| {
            g.terminal("id", "[a-z]+")?;
            g.rule("E", ":E + :T")?;
            g.rule("E", ":T")?;
            g.rule("T", ":T * :F")?;
            g.rule("T", ":F")?;
            g.rule("F", "( :E )")?;
            g.rule("F", ":id")?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn define_resolves_references() {
        let g = arithmetic();
        assert_eq!(g.start_name(), "E");
        let e = g.nonterminal(g.start());
        assert_eq!(e.rules().len(), 2);
        assert_eq!(
            e.rules()[0].items(),
            [
                Symbol::nonterminal("E"),
                Symbol::literal("+"),
                Symbol::nonterminal("T"),
            ]
        );
        let f = g.nonterminal_id("F").unwrap();
        assert_eq!(
            g.rule(RuleRef {
                nonterminal: f,
                rule: 1
            })
            .items(),
            [Symbol::terminal("id")]
        );
    }

    #[test]
    fn define_errors() {
        let err = Grammar::define("", |g| g.rule("E", ":X")).unwrap_err();
        assert!(matches!(err, GrammarDefError::Unresolved { name, .. } if name == "X"));

        let err = Grammar::define("", |g| {
            g.terminal("id", "x")?;
            g.terminal("id", "y")
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateTerminal(..)));

        let err = Grammar::define("", |g| {
            g.terminal("E", "x")?;
            g.rule("E", "x")
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::NameClash(..)));

        let err = Grammar::define("", |g| {
            g.rule("E", "x")?;
            g.start("S");
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::UnknownStart(..)));

        let err = Grammar::define("", |_| Ok(())).unwrap_err();
        assert!(matches!(err, GrammarDefError::Empty));

        let err = Grammar::define("", |g| g.rule("E", r"\x")).unwrap_err();
        assert!(matches!(err, GrammarDefError::Rule { .. }));
    }

    #[test]
    fn epsilon_rules() {
        let g = Grammar::define("", |g| {
            g.rule("A", "a :A")?;
            g.epsilon("A")?;
            g.rule("A", "ϵ")?;
            Ok(())
        })
        .unwrap();
        let a = g.nonterminal(g.start());
        assert!(!a.rules()[0].is_epsilon());
        assert!(a.rules()[1].is_epsilon());
        assert_eq!(a.rules()[1].raw(), "ϵ");
        assert!(a.rules()[2].is_epsilon());
        assert!(a.rules()[2].is_empty());
    }

    #[test]
    fn resolve_descriptors() {
        let g = arithmetic();
        assert_eq!(g.resolve(":id").unwrap(), Symbol::terminal("id"));
        assert_eq!(g.resolve("::E").unwrap(), Symbol::nonterminal("E"));
        assert_eq!(
            g.resolve("a:id").unwrap().alias(),
            Some(&Alias::Named("a".into()))
        );
        assert_eq!(g.resolve("+").unwrap(), Symbol::literal("+"));
        assert_eq!(g.resolve(":endmarker").unwrap(), Symbol::Endmarker);
        assert_eq!(g.resolve(":epsilon").unwrap(), Symbol::Epsilon);
        assert_eq!(
            g.resolve(":nope").unwrap_err().to_string(),
            "cannot resolve :nope"
        );
    }

    #[test]
    fn all_symbols_in_order() {
        let g = arithmetic();
        let symbols: Vec<_> = g.all_symbols().iter().map(|s| s.descriptor()).collect();
        assert_eq!(symbols, [":id", ":E", ":T", ":F", "+", "*", "(", ")"]);
    }

    #[test]
    fn augment_prepends_fresh_start() {
        let g = arithmetic();
        assert!(!g.is_augmented());
        let aug = g.augment();
        assert!(aug.is_augmented());
        assert_eq!(aug.start_name(), "$S");
        assert_eq!(aug.nonterminal(aug.start()).rules()[0].raw(), ":E");
        assert_eq!(aug.augment().nonterminals().count(), 4);
    }

    #[test]
    fn augment_avoids_name_collision() {
        let g = Grammar::define("", |g| {
            g.rule("$S", ":A :A")?;
            g.rule("A", "a")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(g.augment().start_name(), "$S'");
    }

    #[test]
    fn unit_start_rule_is_augmented_anyway() {
        let g = Grammar::define("", |g| {
            g.rule("S", ":A")?;
            g.rule("A", "a")?;
            Ok(())
        })
        .unwrap();
        assert!(!g.is_augmented());

        let aug = g.augment();
        assert!(aug.is_augmented());
        assert_eq!(aug.start_name(), "$S");
        let s = aug.nonterminal_id("S").unwrap();
        assert_eq!(aug.nonterminal(s).rules()[0].raw(), ":A");
    }

    #[test]
    fn ids_beyond_u16() {
        let g = Grammar::define("", |g| {
            for i in 0..65540 {
                g.rule(&format!("N{}", i), "x")?;
            }
            Ok(())
        })
        .unwrap();
        let id = g.nonterminal_id("N65537").unwrap();
        assert_eq!(id.index(), 65537);
        assert_eq!(g.nonterminal(id).name(), "N65537");
        assert_eq!(format!("{:?}", id), "N#65537");
        let (last, n, _) = g.rules().last().unwrap();
        assert_eq!(last.nonterminal.index(), 65539);
        assert_eq!(n.name(), "N65539");
    }

    #[test]
    fn from_str() {
        let g: Grammar = "%grammar lvrv\n\
                          %token id [a-z]+\n\
                          S -> :L = :R\n\
                          S -> :R\n\
                          L -> * :R\n\
                          L -> :id\n\
                          R -> :L\n"
            .parse()
            .unwrap();
        assert_eq!(g.name(), "lvrv");
        assert_eq!(g.rules().count(), 5);
        assert!(g.to_string().contains("S (start)"));
    }
}
