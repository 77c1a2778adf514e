mod common;

use common::{TestEngine, eval_and_invoke, source};
use expect_test::expect;
use std::thread;

use hashem_runtime::config::DEFAULT_MAX_CALL_DEPTH;
use hashem_runtime::{Context, Engine, EngineConfig, Error, RuntimeError, Source, Value};

fn run_err(text: &str, entry: &str, args: &[Value]) -> Error {
    let test = TestEngine::new();
    let mut context = test.context();
    context.eval(&source(text, "test.hashem")).unwrap();
    context.invoke(entry, args).unwrap_err()
}

#[test]
fn arithmetic_precedence() {
    let (value, _) = eval_and_invoke("bebin main() { bede 1 + 2 * 3 - 4 / 2 + -1; }", "main", &[]);
    assert_eq!(value, Value::Int(4));

    let (value, _) = eval_and_invoke("bebin main() { bede (1 + 2) * 3 % 5; }", "main", &[]);
    assert_eq!(value, Value::Int(4));
}

#[test]
fn string_concatenation() {
    let (value, _) = eval_and_invoke(
        "bebin describe(n) { bede \"n = \" + n; }",
        "describe",
        &[Value::Int(3)],
    );
    assert_eq!(value, Value::from("n = 3"));
}

#[test]
fn loops_with_break_and_continue() {
    let program = "bebin main() {
  sum = 0;
  i = 0;
  ta (true) bood {
    i = i + 1;
    age (i == 5) bood {
      edame;
    }
    age (i > 8) bood {
      beshkan;
    }
    sum = sum + i;
  }
  bede sum;
}";
    let (value, _) = eval_and_invoke(program, "main", &[]);
    assert_eq!(value, Value::Int(31));
}

#[test]
fn else_branches_and_logic() {
    let program = "bebin classify(n) {
  age (n < 0 || n > 100) bood {
    bede \"out\";
  } vagarna age (n % 2 == 0 && !(n == 0)) bood {
    bede \"even\";
  } vagarna {
    bede \"other\";
  }
}";
    let classify = |n| eval_and_invoke(program, "classify", &[Value::Int(n)]).0;
    assert_eq!(classify(-1), Value::from("out"));
    assert_eq!(classify(4), Value::from("even"));
    assert_eq!(classify(0), Value::from("other"));
    assert_eq!(classify(7), Value::from("other"));
}

#[test]
fn bechap_writes_to_engine_output() {
    let program = "bebin main() {
  bechap(\"hello\");
  bechap(1 + 1);
  bechap(unset);
  unset = 1;
}";
    let (value, out) = eval_and_invoke(program, "main", &[]);
    assert_eq!(value, Value::Null);
    assert_eq!(out, "hello\n2\nPOOCH\n");
}

#[test]
fn functions_are_values() {
    let program = "bebin apply(f, x) { bede f(x); }
bebin double(x) { bede x * 2; }
bebin main() { bede apply(double, 21); }";
    let (value, _) = eval_and_invoke(program, "main", &[]);
    assert_eq!(value, Value::Int(42));
}

#[test]
fn recursion() {
    let program = "bebin fib(n) {
  age (n < 2) bood { bede n; }
  bede fib(n - 1) + fib(n - 2);
}";
    let (value, _) = eval_and_invoke(program, "fib", &[Value::Int(15)]);
    assert_eq!(value, Value::Int(610));
}

#[test]
fn missing_return_yields_null() {
    let (value, _) = eval_and_invoke("bebin main() { x = 1; }", "main", &[]);
    assert_eq!(value, Value::Null);
    assert_eq!(value.to_string(), "POOCH");
}

#[test]
fn runtime_errors() {
    let err = run_err("bebin main() { bede 1 / 0; }", "main", &[]);
    assert_eq!(err, Error::Runtime(RuntimeError::DivisionByZero));

    let err = run_err("bebin main() { bede 1 + true; }", "main", &[]);
    expect!["type mismatch: + not applicable to Number and Boolean"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { bede !1; }", "main", &[]);
    expect!["type mismatch: ! not applicable to Number"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { age (1) bood { bede 1; } }", "main", &[]);
    expect!["condition must be a boolean, got Number"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { x = 1; bede x(2); }", "main", &[]);
    expect!["'1' is not callable"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { x = 1; bede x.size; }", "main", &[]);
    expect!["undefined member 'size' on Number"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { beshkan; }", "main", &[]);
    expect!["'beshkan' outside of a loop"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { bede nothing(); }", "main", &[]);
    expect!["undefined function 'nothing'"].assert_eq(&err.to_string());
}

#[test]
fn arity_is_checked() {
    let err = run_err("bebin id(x) { bede x; }", "id", &[]);
    expect!["'id' expects 1 argument(s), got 0"].assert_eq(&err.to_string());

    let err = run_err("bebin main() { bede bechap(1, 2); }", "main", &[]);
    expect!["'bechap' expects 1 argument(s), got 2"].assert_eq(&err.to_string());
}

#[test]
fn deep_recursion_overflows() {
    let config = EngineConfig {
        max_call_depth: 16,
        ..EngineConfig::default()
    };
    let engine = Engine::builder().config(config).out(Vec::new()).build();
    let mut context = Context::new(&engine);
    context
        .eval(&source("bebin down(n) { bede down(n + 1); }", "down.hashem"))
        .unwrap();
    let err = context.invoke("down", &[Value::Int(0)]).unwrap_err();
    assert_eq!(err.as_runtime(), Some(&RuntimeError::StackOverflow(16)));

    // The stack is unwound, so the context stays usable.
    context
        .eval(&source("bebin one() { bede 1; }", "one.hashem"))
        .unwrap();
    assert_eq!(context.invoke("one", &[]).unwrap(), Value::Int(1));
}

const COUNT_DOWN: &str = "bebin down(n) {
  age (n <= 0) bood {
    bede 0;
  }
  bede down(n - 1) + 1;
}";

#[test]
fn default_call_depth_is_reachable() {
    // Plain test-sized thread; the evaluator grows its stack on demand.
    let worker = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let test = TestEngine::new();
            let mut context = test.context();
            context.eval(&source(COUNT_DOWN, "down.hashem")).unwrap();

            let deepest = i64::from(DEFAULT_MAX_CALL_DEPTH) - 1;
            let value = context.invoke("down", &[Value::Int(deepest)]).unwrap();
            assert_eq!(value, Value::Int(deepest));

            let err = context
                .invoke("down", &[Value::Int(deepest + 1)])
                .unwrap_err();
            assert_eq!(
                err.as_runtime(),
                Some(&RuntimeError::StackOverflow(DEFAULT_MAX_CALL_DEPTH))
            );
        })
        .unwrap();
    worker.join().unwrap();
}

#[test]
fn deeply_nested_expressions_evaluate() {
    let depth = 2_000;
    let text = format!(
        "bebin main() {{ bede {}1{}; }}",
        "1 + (".repeat(depth),
        ")".repeat(depth)
    );
    let worker = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || eval_and_invoke(&text, "main", &[]).0)
        .unwrap();
    assert_eq!(worker.join().unwrap(), Value::Int(2_001));
}

#[test]
fn eval_rejects_bad_sources() {
    let test = TestEngine::new();
    let mut context = test.context();

    let err = context
        .eval(&Source::new("js", "bebin main() {}", "main.js"))
        .unwrap_err();
    assert_eq!(err, Error::UnsupportedLanguage("js".into()));

    let err = context
        .eval(&source("bebin main( { bede 1; }", "broken.hashem"))
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "{err:?}");
    assert!(err.as_runtime().is_none());
    assert!(!context.bindings().contains("main"));
}

#[test]
fn contexts_keep_their_own_functions() {
    let test = TestEngine::new();
    let mut first = test.context();
    let mut second = test.context();
    first
        .eval(&source("bebin main() { bede 1; }", "first.hashem"))
        .unwrap();

    assert_eq!(first.invoke("main", &[]).unwrap(), Value::Int(1));
    let err = second.invoke("main", &[]).unwrap_err();
    assert_eq!(err.as_runtime(), Some(&RuntimeError::UndefinedFunction("main".into())));
    assert_eq!(test.engine.loaded_sources().len(), 1);
}
