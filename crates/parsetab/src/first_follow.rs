//! Calculation of nullable symbols, FIRST sets and FOLLOW sets.

use crate::{
    cascade::CascadeSetMap,
    grammar::Grammar,
    symbol::Symbol,
    types::{Map, Set},
};

pub type SymbolSet = Set<Symbol>;

/// Calculate the names of the nonterminals deriving the empty string.
pub fn nullables(grammar: &Grammar) -> Set<String> {
    let mut nulls: Set<String> = grammar
        .rules()
        .filter(|(_, _, rule)| rule.is_epsilon())
        .map(|(_, n, _)| n.name().to_owned())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (_, n, rule) in grammar.rules() {
            if nulls.contains(n.name()) {
                continue;
            }
            let is_rhs_nullable = rule.items().iter().all(|symbol| match symbol {
                Symbol::Nonterminal { name, .. } => nulls.contains(name),
                _ => false,
            });
            if is_rhs_nullable {
                nulls.insert(n.name().to_owned());
                changed = true;
            }
        }
    }

    nulls
}

/// FIRST sets of every nonterminal in a grammar.
///
/// A set holds terminals and literals, plus `Epsilon` exactly when the
/// nonterminal is nullable.
#[derive(Debug, Clone)]
pub struct FirstSets {
    nulls: Set<String>,
    sets: Map<String, SymbolSet>,
}

impl FirstSets {
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar) -> Self {
        let nulls = nullables(grammar);

        let mut buckets = CascadeSetMap::<String, SymbolSet>::new();
        for (_, n) in grammar.nonterminals() {
            buckets.bucket_mut(n.name().to_owned());
        }

        // X -> Y1 Y2 ... Yn: FIRST(X) includes FIRST(Yi) as long as Y1 ... Y(i-1) are nullable.
        for (_, n, rule) in grammar.rules() {
            for symbol in rule.items() {
                match symbol {
                    Symbol::Nonterminal { name, .. } => {
                        buckets.add_edge(name.clone(), n.name().to_owned());
                        if !nulls.contains(name) {
                            break;
                        }
                    }
                    _ => {
                        buckets.add(n.name().to_owned(), symbol.unaliased());
                        break;
                    }
                }
            }
        }

        let mut sets = buckets.cascade();
        for name in &nulls {
            if let Some(set) = sets.get_mut(name) {
                set.insert(Symbol::Epsilon);
            }
        }
        for (name, set) in &sets {
            tracing::trace!("FIRST({}) = {:?}", name, set);
        }

        Self { nulls, sets }
    }

    pub fn is_nullable(&self, name: &str) -> bool {
        self.nulls.contains(name)
    }

    pub fn nullables(&self) -> &Set<String> {
        &self.nulls
    }

    /// Return `FIRST(name)`.
    pub fn get(&self, name: &str) -> Option<&SymbolSet> {
        self.sets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolSet)> + '_ {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// `FIRST(Y1 Y2 ... Yn)`
    ///
    /// Collects every token reachable while the scanned prefix is nullable,
    /// and adds `Epsilon` when the whole sequence is nullable.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> SymbolSet {
        let mut res = SymbolSet::default();
        for symbol in symbols {
            match symbol {
                Symbol::Nonterminal { name, .. } => {
                    if let Some(first) = self.sets.get(name) {
                        res.extend(first.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                    }
                    if !self.nulls.contains(name) {
                        return res;
                    }
                }
                Symbol::Epsilon => continue,
                token => {
                    res.insert(token.unaliased());
                    return res;
                }
            }
        }
        res.insert(Symbol::Epsilon);
        res
    }
}

/// FOLLOW sets of every nonterminal in a grammar.
#[derive(Debug, Clone)]
pub struct FollowSets {
    sets: Map<String, SymbolSet>,
}

impl FollowSets {
    #[tracing::instrument(skip_all)]
    pub fn new(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut buckets = CascadeSetMap::<String, SymbolSet>::new();
        for (_, n) in grammar.nonterminals() {
            buckets.bucket_mut(n.name().to_owned());
        }
        buckets.add(grammar.start_name().to_owned(), Symbol::Endmarker);

        // A -> α B β: FOLLOW(B) includes FIRST(β), and FOLLOW(A) if β is nullable.
        for (_, n, rule) in grammar.rules() {
            let items = rule.items();
            for (i, symbol) in items.iter().enumerate() {
                let Symbol::Nonterminal { name, .. } = symbol else {
                    continue;
                };
                let first_of_beta = first.first_of_sequence(&items[i + 1..]);
                for s in &first_of_beta {
                    if *s == Symbol::Epsilon {
                        if n.name() != name {
                            buckets.add_edge(n.name().to_owned(), name.clone());
                        }
                    } else {
                        buckets.add(name.clone(), s.clone());
                    }
                }
            }
        }

        let sets = buckets.cascade();
        for (name, set) in &sets {
            tracing::trace!("FOLLOW({}) = {:?}", name, set);
        }
        Self { sets }
    }

    /// Return `FOLLOW(name)`.
    pub fn get(&self, name: &str) -> Option<&SymbolSet> {
        self.sets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolSet)> + '_ {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(set: &SymbolSet) -> Vec<String> {
        let mut items: Vec<_> = set.iter().map(|s| s.descriptor()).collect();
        items.sort();
        items
    }

    fn left_recursion_removed() -> Grammar {
        Grammar::define("", |g| {
            g.terminal("id", "[a-zA-Z0-9]+")?;
            g.rule("E", ":T :E_1")?;
            g.rule("E_1", "+ :T :E_1")?;
            g.epsilon("E_1")?;
            g.rule("T", ":F :T_1")?;
            g.rule("T_1", "* :F :T_1")?;
            g.epsilon("T_1")?;
            g.rule("F", "( ::E )")?;
            g.rule("F", "::id")?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn nullable_symbols() {
        let g = Grammar::define("", |g| {
            g.rule("A", ":B :C")?;
            g.rule("B", "b")?;
            g.epsilon("B")?;
            g.rule("C", ":B")?;
            g.rule("D", "d :A")?;
            Ok(())
        })
        .unwrap();
        let nulls: Vec<_> = {
            let mut v: Vec<_> = nullables(&g).into_iter().collect();
            v.sort();
            v
        };
        assert_eq!(nulls, ["A", "B", "C"]);
    }

    #[test]
    fn first_sets_of_left_recursion_removed() {
        let g = left_recursion_removed();
        let first = FirstSets::new(&g);
        assert_eq!(first.len(), 5);
        assert_eq!(descriptors(first.get("E").unwrap()), ["(", ":id"]);
        assert_eq!(descriptors(first.get("E_1").unwrap()), ["+", ":epsilon"]);
        assert_eq!(descriptors(first.get("T").unwrap()), ["(", ":id"]);
        assert_eq!(descriptors(first.get("T_1").unwrap()), ["*", ":epsilon"]);
        assert_eq!(descriptors(first.get("F").unwrap()), ["(", ":id"]);
    }

    #[test]
    fn follow_sets_of_left_recursion_removed() {
        let g = left_recursion_removed();
        let first = FirstSets::new(&g);
        let follow = FollowSets::new(&g, &first);
        assert_eq!(follow.len(), 5);
        assert_eq!(descriptors(follow.get("E").unwrap()), [")", ":endmarker"]);
        assert_eq!(descriptors(follow.get("E_1").unwrap()), [")", ":endmarker"]);
        assert_eq!(
            descriptors(follow.get("T").unwrap()),
            [")", "+", ":endmarker"]
        );
        assert_eq!(
            descriptors(follow.get("T_1").unwrap()),
            [")", "+", ":endmarker"]
        );
        assert_eq!(
            descriptors(follow.get("F").unwrap()),
            [")", "*", "+", ":endmarker"]
        );
    }

    #[test]
    fn first_sets_with_left_recursion() {
        let g = Grammar::define("simple-arithmetic", |g| {
            g.terminal("addop", r"\+|-")?;
            g.terminal("mulop", r"\*|/")?;
            g.terminal("number", "[0-9]+")?;
            g.rule("exp", ":exp :addop :term")?;
            g.rule("exp", "::term")?;
            g.rule("term", ":term :mulop :factor")?;
            g.rule("term", "::factor")?;
            g.rule("factor", "( ::exp )")?;
            g.rule("factor", "::number")?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&g);
        assert_eq!(first.len(), 3);
        for name in ["exp", "term", "factor"] {
            assert_eq!(descriptors(first.get(name).unwrap()), ["(", ":number"]);
        }
    }

    #[test]
    fn first_sets_without_tokens() {
        let g = Grammar::define("", |g| {
            g.rule("A", ":B :C :D")?;
            g.rule("A", ":C")?;
            g.rule("B", ":D :A")?;
            g.rule("B", ":D :D :A")?;
            g.rule("C", ":B :B")?;
            g.rule("D", ":A")?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&g);
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|(_, set)| set.is_empty()));
    }

    #[test]
    fn first_of_sequences() {
        let g = left_recursion_removed();
        let first = FirstSets::new(&g);

        let seq = [Symbol::nonterminal("T_1"), Symbol::nonterminal("E_1")];
        assert_eq!(
            descriptors(&first.first_of_sequence(&seq)),
            ["*", "+", ":epsilon"]
        );

        let seq = [Symbol::nonterminal("T_1"), Symbol::literal(")")];
        assert_eq!(descriptors(&first.first_of_sequence(&seq)), [")", "*"]);

        let seq = [Symbol::nonterminal("E_1"), Symbol::Endmarker];
        assert_eq!(
            descriptors(&first.first_of_sequence(&seq)),
            ["+", ":endmarker"]
        );

        assert_eq!(descriptors(&first.first_of_sequence(&[])), [":epsilon"]);
    }
}
