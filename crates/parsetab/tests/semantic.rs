use parsetab::{
    actions::{SemanticReducer, Value},
    build_lalr1_table,
    grammar::Grammar,
    runtime::{ShiftReduceParser, SyntaxError},
};

fn string(value: Value) -> String {
    *value.downcast::<String>().unwrap()
}

fn binary(op: &'static str) -> impl Fn(Vec<Value>) -> Value + Send + Sync {
    move |args| {
        let mut args = args.into_iter();
        let lhs = string(args.next().unwrap());
        let _op = args.next();
        let rhs = string(args.next().unwrap());
        Box::new(format!("({} {} {})", op, lhs, rhs))
    }
}

fn s_expression() -> Grammar {
    Grammar::define("s-expression", |g| {
        g.terminal("id", "[a-z]+")?;
        g.rule_with_action("E", ":E + :T", binary("+"))?;
        g.rule("E", ":T")?;
        g.rule_with_action("T", ":T * :F", binary("*"))?;
        g.rule("T", ":F")?;
        g.rule_with_action("F", "( :E )", |mut args| args.remove(1))?;
        g.rule("F", ":id")?;
        Ok(())
    })
    .unwrap()
}

#[test]
fn values_follow_the_reductions() {
    let table = build_lalr1_table(&s_expression()).unwrap();
    let parser = ShiftReduceParser::new(&table);
    let mut reducer = SemanticReducer::new(table.grammar());

    let value = parser
        .parse_with(":id * :id + :id :endmarker".split_whitespace(), &mut reducer)
        .unwrap();
    assert_eq!(string(value), "(+ (* :id :id) :id)");

    let value = parser
        .parse_with(
            ":id * ( a:id + b:id ) :endmarker".split_whitespace(),
            &mut reducer,
        )
        .unwrap();
    assert_eq!(string(value), "(* :id (+ a:id b:id))");
}

#[test]
fn rules_without_actions_pack_their_arguments() {
    let g = Grammar::define("pair", |g| {
        g.rule("P", "< :X :X >")?;
        g.rule("X", "x")?;
        Ok(())
    })
    .unwrap();
    let table = build_lalr1_table(&g).unwrap();
    let parser = ShiftReduceParser::new(&table);
    let mut reducer = SemanticReducer::new(table.grammar());

    let value = parser
        .parse_with("< x x > :endmarker".split_whitespace(), &mut reducer)
        .unwrap();
    let args: Vec<_> = value
        .downcast::<Vec<Value>>()
        .unwrap()
        .into_iter()
        .map(string)
        .collect();
    assert_eq!(args, ["<", "x", "x", ">"]);
}

#[test]
fn syntax_errors_are_returned() {
    let table = build_lalr1_table(&s_expression()).unwrap();
    let parser = ShiftReduceParser::new(&table);
    let mut reducer = SemanticReducer::new(table.grammar());

    let err = parser
        .parse_with(":id + :endmarker".split_whitespace(), &mut reducer)
        .unwrap_err();
    assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));

    let err = parser
        .parse_with(":id +".split_whitespace(), &mut reducer)
        .unwrap_err();
    assert_eq!(err, SyntaxError::UnexpectedEndOfInput);
}

#[test]
fn unit_start_rule_runs_its_action() {
    let g = Grammar::define("unit-start", |g| {
        g.rule_with_action("S", ":A", |args| {
            let inner = string(args.into_iter().next().unwrap());
            Box::new(format!("S({})", inner))
        })?;
        g.rule("A", "a")?;
        Ok(())
    })
    .unwrap();
    let table = build_lalr1_table(&g).unwrap();
    let parser = ShiftReduceParser::new(&table);

    let trace: Vec<_> = parser
        .trace(["a", ":endmarker"])
        .map(|event| event.to_string())
        .collect();
    assert_eq!(trace, ["shift", "reduce by A -> a", "reduce by S -> :A", "accept"]);

    let mut reducer = SemanticReducer::new(table.grammar());
    let value = parser.parse_with(["a", ":endmarker"], &mut reducer).unwrap();
    assert_eq!(string(value), "S(a)");
}
