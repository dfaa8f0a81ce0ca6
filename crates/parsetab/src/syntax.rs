//! Rule mini-language and grammar file syntax.

use crate::symbol::Alias;

/// A rule symbol before the grammar's declarations are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSymbol {
    /// `:name`, `::name` or `alias:name`; resolved to a terminal or a nonterminal later.
    Reference { name: String, alias: Alias },
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSyntaxError {
    #[error("invalid colon in `{}'", _0)]
    InvalidColon(String),

    #[error("escape can only be applied to a colon or a backslash, found `{}'", _0.escape_default())]
    InvalidEscape(char),

    #[error("`{}' is not a valid character of symbol names", _0.escape_default())]
    InvalidNameChar(char),

    #[error("missing symbol name after `{}'", _0)]
    EmptyName(String),

    #[error("the rule ends with a dangling backslash")]
    DanglingEscape,
}

/// Translate the text of a rule into its raw symbols.
///
/// An empty result denotes an epsilon rule.
pub fn parse_rule(text: &str) -> Result<Vec<RawSymbol>, RuleSyntaxError> {
    let mut symbols = vec![];
    let mut scanner = RuleScanner::default();
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            if !matches!(ch, ':' | '\\') {
                return Err(RuleSyntaxError::InvalidEscape(ch));
            }
            escaped = false;
            scanner.push_char(ch)?;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            ':' => scanner.colon()?,
            ch if ch.is_whitespace() => scanner.flush(&mut symbols)?,
            ch => scanner.push_char(ch)?,
        }
    }
    if escaped {
        return Err(RuleSyntaxError::DanglingEscape);
    }
    scanner.flush(&mut symbols)?;

    Ok(symbols)
}

#[derive(Default)]
struct RuleScanner {
    /// Literal characters, or the alias once a colon has been seen.
    head: String,
    /// `Some` after the first colon of a reference.
    name: Option<String>,
    default_alias: bool,
}

impl RuleScanner {
    fn colon(&mut self) -> Result<(), RuleSyntaxError> {
        match &self.name {
            None => {
                self.name = Some(String::new());
                Ok(())
            }
            // `::name`
            Some(name) if name.is_empty() && self.head.is_empty() && !self.default_alias => {
                self.default_alias = true;
                Ok(())
            }
            Some(name) => Err(RuleSyntaxError::InvalidColon(format!(
                "{}:{}:",
                self.head, name
            ))),
        }
    }

    fn push_char(&mut self, ch: char) -> Result<(), RuleSyntaxError> {
        match &mut self.name {
            Some(name) => {
                if !is_name_char(ch) {
                    return Err(RuleSyntaxError::InvalidNameChar(ch));
                }
                name.push(ch);
            }
            None => self.head.push(ch),
        }
        Ok(())
    }

    fn flush(&mut self, symbols: &mut Vec<RawSymbol>) -> Result<(), RuleSyntaxError> {
        let head = std::mem::take(&mut self.head);
        match self.name.take() {
            Some(name) => {
                let default_alias = std::mem::take(&mut self.default_alias);
                if name.is_empty() {
                    return Err(RuleSyntaxError::EmptyName(format!("{}:", head)));
                }
                let alias = if default_alias {
                    Alias::Default
                } else if head.is_empty() {
                    Alias::Unnamed
                } else {
                    Alias::Named(head)
                };
                symbols.push(RawSymbol::Reference { name, alias });
            }
            None if !head.is_empty() => symbols.push(RawSymbol::Literal(head)),
            None => (),
        }
        Ok(())
    }
}

/// Whether `ch` may appear in the name of a terminal or a nonterminal.
pub fn is_name_char(ch: char) -> bool {
    ch == '$' || ch == '-' || unicode_ident::is_xid_continue(ch)
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// A parsed grammar file.
#[derive(Debug, Default)]
pub struct GrammarFile {
    pub name: Option<String>,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `%token NAME PATTERN`
    Token { name: String, pattern: String },
    /// `%start NAME`
    Start(String),
    /// `NAME -> RULE TEXT`
    Rule { nonterminal: String, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {}", line, message)]
pub struct FileSyntaxError {
    pub line: usize,
    pub message: String,
}

/// Parse the line-oriented grammar file format.
///
/// ```text
/// # comment
/// %grammar arithmetic
/// %token id [a-z]+
/// %start E
/// E -> :E + :T
/// E -> :T
/// ```
pub fn parse_grammar(source: &str) -> Result<GrammarFile, FileSyntaxError> {
    let span = tracing::trace_span!("parse_grammar");
    let _entered = span.enter();

    let mut file = GrammarFile::default();
    for (index, line) in source.lines().enumerate() {
        let error = |message: String| FileSyntaxError {
            line: index + 1,
            message,
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(directive) = line.strip_prefix('%') {
            let (keyword, rest) = directive
                .split_once(char::is_whitespace)
                .map(|(k, r)| (k, r.trim()))
                .unwrap_or((directive, ""));
            match keyword {
                "grammar" => {
                    if rest.is_empty() {
                        return Err(error("missing grammar name".into()));
                    }
                    file.name = Some(rest.to_owned());
                }
                "token" => {
                    let (name, pattern) = rest
                        .split_once(char::is_whitespace)
                        .map(|(n, p)| (n, p.trim()))
                        .ok_or_else(|| error("expected `%token NAME PATTERN'".into()))?;
                    file.stmts.push(Stmt::Token {
                        name: name.to_owned(),
                        pattern: pattern.to_owned(),
                    });
                }
                "start" => {
                    if rest.is_empty() || rest.contains(char::is_whitespace) {
                        return Err(error("expected `%start NAME'".into()));
                    }
                    file.stmts.push(Stmt::Start(rest.to_owned()));
                }
                keyword => return Err(error(format!("unknown directive `%{}'", keyword))),
            }
            continue;
        }

        let (nonterminal, text) = line
            .split_once("->")
            .ok_or_else(|| error("expected `NAME -> RULE'".into()))?;
        let nonterminal = nonterminal.trim();
        if nonterminal.is_empty() || nonterminal.contains(char::is_whitespace) {
            return Err(error(format!(
                "invalid left-hand side `{}'",
                nonterminal
            )));
        }
        tracing::trace!("rule {} -> {}", nonterminal, text.trim());
        file.stmts.push(Stmt::Rule {
            nonterminal: nonterminal.to_owned(),
            text: text.trim().to_owned(),
        });
    }

    Ok(file)
}
