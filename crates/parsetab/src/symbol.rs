//! Grammar symbols and their textual descriptors.

use std::{cmp::Ordering, fmt, hash::Hash};

/// The alias attached to a terminal or nonterminal reference inside a rule.
///
/// Aliases tell repeated occurrences of one symbol apart; they never take
/// part in symbol equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Alias {
    /// `:name`
    #[default]
    Unnamed,
    /// `::name`
    Default,
    /// `alias:name`
    Named(String),
}

#[derive(Clone)]
pub enum Symbol {
    Terminal { name: String, alias: Alias },
    Nonterminal { name: String, alias: Alias },
    /// An inline token spelled directly in a rule.
    Literal(String),
    Epsilon,
    Endmarker,
}

impl Symbol {
    pub const ENDMARKER: &'static str = ":endmarker";
    pub const EPSILON: &'static str = ":epsilon";

    pub fn terminal(name: impl Into<String>) -> Self {
        Self::Terminal {
            name: name.into(),
            alias: Alias::Unnamed,
        }
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self::Nonterminal {
            name: name.into(),
            alias: Alias::Unnamed,
        }
    }

    pub fn literal(chars: impl Into<String>) -> Self {
        Self::Literal(chars.into())
    }

    /// Return the name of a terminal or nonterminal.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Terminal { name, .. } | Self::Nonterminal { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&Alias> {
        match self {
            Self::Terminal { alias, .. } | Self::Nonterminal { alias, .. } => Some(alias),
            _ => None,
        }
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Self::Nonterminal { .. })
    }

    /// Whether this symbol is consumed from the input, i.e. a terminal or a literal.
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Terminal { .. } | Self::Literal(..))
    }

    /// Return the same symbol without its alias.
    pub fn unaliased(&self) -> Self {
        match self {
            Self::Terminal { name, .. } => Self::terminal(name.clone()),
            Self::Nonterminal { name, .. } => Self::nonterminal(name.clone()),
            other => other.clone(),
        }
    }

    /// Return the textual descriptor of this symbol.
    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    fn key(&self) -> (u8, &str) {
        match self {
            Self::Terminal { name, .. } => (0, name),
            Self::Nonterminal { name, .. } => (1, name),
            Self::Literal(chars) => (2, chars),
            Self::Epsilon => (3, ""),
            Self::Endmarker => (4, ""),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal { name, alias } | Self::Nonterminal { name, alias } => match alias {
                Alias::Unnamed => write!(f, ":{}", name),
                Alias::Default => write!(f, "::{}", name),
                Alias::Named(alias) => write!(f, "{}:{}", alias, name),
            },
            Self::Literal(chars) => f.write_str(chars),
            Self::Epsilon => f.write_str(Self::EPSILON),
            Self::Endmarker => f.write_str(Self::ENDMARKER),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
