mod common;
use common::*;

use expect_test::expect;

#[test]
fn precedence_and_postfix_chains() {
    let actual = dump("bebin f() {\nbede -a * (b + c) % 2 == 1 || f(1, 2).x;\n}");
    expect![[r#"
        f ROOT 1..3
          Return STATEMENT "bede -a * (b + c) % 2 == 1 || f(1, 2).x"
            Logical EXPRESSION "-a * (b + c) % 2 == 1 || f(1, 2).x"
              Binary EXPRESSION "-a * (b + c) % 2 == 1"
                Binary EXPRESSION "-a * (b + c) % 2"
                  Binary EXPRESSION "-a * (b + c)"
                    Unary EXPRESSION "-a"
                      Read EXPRESSION "a"
                    Binary EXPRESSION "b + c"
                      Read EXPRESSION "b"
                      Read EXPRESSION "c"
                  Literal EXPRESSION "2"
                Literal EXPRESSION "1"
              Member EXPRESSION "f(1, 2).x"
                Call EXPRESSION|CALL "f(1, 2)"
                  Read EXPRESSION "f"
                  Literal EXPRESSION "1"
                  Literal EXPRESSION "2"
    "#]]
    .assert_eq(&actual);
}

#[test]
fn literals() {
    use hashem_syntax::ast::{ExprKind, Literal, StmtKind};

    let program = parse_ok("bebin f() { a = 1_000; b = \"salam\"; c = false; }");
    let values: Vec<_> = program.functions[0]
        .body
        .stmts
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Assign { value, .. } => match &value.kind {
                ExprKind::Literal(literal) => literal.clone(),
                other => panic!("expected literal, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        })
        .collect();
    assert_eq!(
        values,
        vec![
            Literal::Int(1000),
            Literal::Str("salam".into()),
            Literal::Bool(false),
        ]
    );
}

#[test]
fn errors_stop_parsing() {
    let cases = [
        ("bebin f(a, a) {}", "duplicate parameter 'a'"),
        ("bebin f() { x = 1 }", "expected ';', found '}'"),
        ("bebin f() { bede 1;", "expected '}', found end of file"),
        ("bebin f() { bede 99999999999999999999; }", "integer literal out of range"),
        ("bebin f() {}\nbebin f() {}", "function 'f' is declared twice"),
        ("bebin f() { age x > 1 bood {} }", "expected '(', found identifier"),
    ];
    for (text, message) in cases {
        let err = parse(&source(text)).unwrap_err();
        assert_eq!(err.message, message, "{text}");
    }
}

#[test]
fn deeply_nested_expressions_parse() {
    let depth = 5_000;
    let text = format!(
        "bebin f() {{ bede {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let program = parse_ok(&text);
    assert_eq!(program.statement_sections()[0].characters().len(), 2 * depth + 6);

    let chain = format!("bebin f() {{ bede {}1{}; }}", "-(".repeat(depth), ")".repeat(depth));
    parse_ok(&chain);
}

#[test]
fn unbalanced_nesting_is_a_parse_error() {
    let depth = 3_000;
    let text = format!("bebin f() {{\n  bede {}1;\n}}", "(".repeat(depth));
    let err = parse(&source(&text)).unwrap_err();
    assert!(err.message.starts_with("expected ')'"), "{}", err.message);
    assert_eq!((err.line, err.column), (2, 3_009));
}
