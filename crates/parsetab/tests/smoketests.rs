mod common;

use parsetab::{
    build_lr0_automaton, build_lr_table,
    grammar::{Grammar, GrammarDef, GrammarDefError},
    table::ParserClass,
};
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn smoketest_grammar(f: impl FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>) {
    init_tracing();
    let grammar = Grammar::define("smoketest", f).unwrap();
    eprintln!("grammar:\n{}", grammar);
    eprintln!();
    let lr0 = build_lr0_automaton(&grammar);
    eprintln!("LR(0) automaton:\n---\n{}", lr0.display());
    for class in [ParserClass::Slr1, ParserClass::Lalr1, ParserClass::Lr1] {
        match build_lr_table(&grammar, class) {
            Ok(table) => {
                let rendered = table.to_string();
                assert!(rendered.contains("=> accept"));
                eprintln!("{}", rendered);
            }
            Err(err) => eprintln!("{}: {}", class, err),
        }
    }
}

#[test]
fn smoketest_arithmetic() {
    smoketest_grammar(common::arithmetic);
}

#[test]
fn smoketest_left_recursion_removed() {
    smoketest_grammar(common::left_recursion_removed);
}

#[test]
fn smoketest_lvrv() {
    smoketest_grammar(common::lvrv);
}

#[test]
fn smoketest_lr1_not_lalr1() {
    smoketest_grammar(common::lr1_not_lalr1);
}

#[test]
fn smoketest_args() {
    smoketest_grammar(common::args);
}
