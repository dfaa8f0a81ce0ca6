//! Grammar definitions for integration tests.
#![allow(dead_code)]

use parsetab::grammar::{GrammarDef, GrammarDefError};

/// E -> E + T | T; T -> T * F | F; F -> ( E ) | id
pub fn arithmetic(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    g.terminal("id", "[a-zA-Z0-9]+")?;
    g.rule("E", ":E + :T")?;
    g.rule("E", ":T")?;
    g.rule("T", ":T * :F")?;
    g.rule("T", ":F")?;
    g.rule("F", "( :E )")?;
    g.rule("F", ":id")?;
    Ok(())
}

/// `arithmetic` without left recursion.
pub fn left_recursion_removed(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    g.terminal("id", "[a-zA-Z0-9]+")?;
    g.rule("E", ":T :E_1")?;
    g.rule("E_1", "+ :T :E_1")?;
    g.epsilon("E_1")?;
    g.rule("T", ":F :T_1")?;
    g.rule("T_1", "* :F :T_1")?;
    g.epsilon("T_1")?;
    g.rule("F", "( :E )")?;
    g.rule("F", ":id")?;
    Ok(())
}

/// S -> L = R | R; L -> * R | id; R -> L
///
/// LALR(1) but not SLR(1).
pub fn lvrv(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    g.terminal("id", "[a-z]+")?;
    g.rule("S", ":L = :R")?;
    g.rule("S", ":R")?;
    g.rule("L", "* :R")?;
    g.rule("L", ":id")?;
    g.rule("R", ":L")?;
    Ok(())
}

/// S -> a A d | b B d | a B e | b A e; A -> c; B -> c
///
/// LR(1) but not LALR(1).
pub fn lr1_not_lalr1(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    g.rule("S", "a :A d")?;
    g.rule("S", "b :B d")?;
    g.rule("S", "a :B e")?;
    g.rule("S", "b :A e")?;
    g.rule("A", "c")?;
    g.rule("B", "c")?;
    Ok(())
}

/// A list with optional separators, exercising epsilon rules.
pub fn args(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    g.terminal("ident", "[a-z]+")?;
    g.rule("call", ":ident ( :args )")?;
    g.rule("args", ":arg :rest")?;
    g.epsilon("args")?;
    g.rule("rest", ", :arg :rest")?;
    g.epsilon("rest")?;
    g.rule("arg", ":ident")?;
    g.rule("arg", ":call")?;
    Ok(())
}

pub const ARITHMETIC_FILE: &str = "\
# Dragon book, Grammar 4.1
%grammar arithmetic
%token id [a-zA-Z0-9]+
%start E
E -> :E + :T
E -> :T
T -> :T * :F
T -> :F
F -> ( :E )
F -> :id
";
