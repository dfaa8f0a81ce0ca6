use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use parsetab::{
    build_ll1_table, build_lr_table,
    diagnostics::{common_prefix_info, left_recursion_info},
    first_follow::{FirstSets, FollowSets, SymbolSet},
    grammar::Grammar,
    lr0::LR0Automaton,
    runtime::{PredictiveParser, ShiftReduceParser, TraceEvent},
    symbol::Symbol,
    table::ParserClass,
    types::Set,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Class {
    Slr1,
    Lalr1,
    Lr1,
    Ll1,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path of grammar definition file.
    input: PathBuf,

    /// The kind of parse table to build.
    #[arg(long, value_enum, default_value = "lalr1")]
    class: Class,

    /// Print FIRST/FOLLOW sets, left recursion and common prefixes.
    #[arg(long)]
    diagnostics: bool,

    /// Print the item sets of the LR(0) automaton.
    #[arg(long)]
    automaton: bool,

    /// Parse whitespace separated token descriptors with the built table.
    #[arg(long, value_name = "DESCRIPTORS")]
    parse: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::trace!("CLI args = {:?}", args);

    let grammar = Grammar::from_file(&args.input)
        .with_context(|| format!("failed to load the grammar from {}", args.input.display()))?;
    println!("{}", grammar);

    let unreachable = unreachable_nonterminals(&grammar);
    if !unreachable.is_empty() {
        println!(
            "[warning] The following nonterminals are unreachable from the start symbol: {:?}",
            unreachable
        );
    }

    if args.diagnostics {
        print_diagnostics(&grammar);
    }
    if args.automaton {
        let lr0 = LR0Automaton::new(&grammar);
        println!("# LR(0) automaton ({} states)", lr0.len());
        println!("{}", lr0.display());
    }

    let descriptors: Option<Vec<String>> = args.parse.as_deref().map(|input| {
        let mut descriptors: Vec<String> = input.split_whitespace().map(String::from).collect();
        if descriptors.last().map(String::as_str) != Some(Symbol::ENDMARKER) {
            descriptors.push(Symbol::ENDMARKER.to_owned());
        }
        descriptors
    });

    let trace: Option<Vec<TraceEvent>> = match args.class {
        Class::Ll1 => {
            let table = build_ll1_table(&grammar).context("failed to build the LL(1) table")?;
            println!("{}", table);
            descriptors.map(|descriptors| PredictiveParser::new(&table).trace(descriptors).collect())
        }
        class => {
            let class = match class {
                Class::Slr1 => ParserClass::Slr1,
                Class::Lr1 => ParserClass::Lr1,
                _ => ParserClass::Lalr1,
            };
            let table = build_lr_table(&grammar, class)
                .with_context(|| format!("failed to build the {} table", class))?;
            println!("{}", table);
            descriptors
                .map(|descriptors| ShiftReduceParser::new(&table).trace(descriptors).collect())
        }
    };

    if let Some(trace) = trace {
        println!("# trace");
        for event in &trace {
            println!("- {}", event);
        }
        if let Some(TraceEvent::Error(err)) = trace.last() {
            anyhow::bail!("syntax error: {}", err);
        }
    }

    Ok(())
}

fn print_diagnostics(grammar: &Grammar) {
    let first = FirstSets::new(grammar);
    let follow = FollowSets::new(grammar, &first);

    println!("# FIRST");
    for (name, set) in first.iter() {
        println!("- {}: {}", name, display_set(set));
    }
    println!("# FOLLOW");
    for (name, set) in follow.iter() {
        println!("- {}: {}", name, display_set(set));
    }

    let info = left_recursion_info(grammar);
    println!("# left recursion");
    for l in &info.loops {
        println!("- {}", l);
    }
    println!("# common prefixes");
    for prefix in common_prefix_info(grammar) {
        println!("- {}", prefix);
    }
    println!();
}

fn display_set(set: &SymbolSet) -> String {
    let mut items: Vec<_> = set.iter().map(Symbol::descriptor).collect();
    items.sort();
    items.join(" ")
}

fn unreachable_nonterminals(grammar: &Grammar) -> Vec<String> {
    let mut reachable = Set::default();
    let mut pending = vec![grammar.start()];
    while let Some(id) = pending.pop() {
        if !reachable.insert(id) {
            continue;
        }
        for rule in grammar.nonterminal(id).rules() {
            pending.extend(rule.items().iter().filter_map(|s| grammar.id_of(s)));
        }
    }
    grammar
        .nonterminals()
        .filter(|(id, _)| !reachable.contains(id))
        .map(|(_, n)| n.name().to_owned())
        .collect()
}
