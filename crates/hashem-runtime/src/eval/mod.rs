//! Evaluator entry point.

use std::sync::Arc;

use hashem_syntax::ast::FunctionDecl;
use hashem_syntax::ensure_sufficient_stack;
use tracing::trace;

use crate::engine::{Engine, FunctionTable};
use crate::error::RuntimeError;
use crate::instrument::probe::{probe_node, Probe};
use crate::memory::CallStack;
use crate::stdlib::StdFunction;
use crate::value::{FunctionRef, Value};

pub(crate) mod expr;
pub(crate) mod ops;
pub(crate) mod stmt;

pub(crate) use expr::eval_expr;
pub(crate) use stmt::{exec_block, StmtResult};

/// Evaluation context shared across expression and statement execution.
pub(crate) struct EvalContext<'a> {
    pub engine: &'a Engine,
    pub functions: &'a FunctionTable,
    pub stack: &'a mut CallStack,
    pub loop_depth: u32,
    pub probe: Probe,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        functions: &'a FunctionTable,
        stack: &'a mut CallStack,
    ) -> Self {
        Self {
            engine,
            functions,
            stack,
            loop_depth: 0,
            probe: Probe::default(),
        }
    }
}

/// Call any executable value.
pub(crate) fn call_value(
    ctx: &mut EvalContext<'_>,
    callee: &Value,
    args: Vec<Value>,
) -> Result<Value, RuntimeError> {
    match callee {
        Value::Function(FunctionRef::User(function)) => {
            call_function(ctx, Arc::clone(function), args)
        }
        Value::Function(FunctionRef::Builtin(builtin)) => call_builtin(ctx, builtin, &args),
        other => Err(RuntimeError::NotCallable(other.to_string().into())),
    }
}

/// Call a user function: push a frame, run the body as a root node and pop
/// the frame again on every exit path.
///
/// Call depth is bounded by `max_call_depth`; the native stack grows as
/// needed to reach it.
pub(crate) fn call_function(
    ctx: &mut EvalContext<'_>,
    function: Arc<FunctionDecl>,
    args: Vec<Value>,
) -> Result<Value, RuntimeError> {
    ensure_sufficient_stack(|| enter_function(ctx, function, args))
}

fn enter_function(
    ctx: &mut EvalContext<'_>,
    function: Arc<FunctionDecl>,
    args: Vec<Value>,
) -> Result<Value, RuntimeError> {
    let limit = ctx.engine.config().max_call_depth;
    if ctx.stack.depth() >= limit {
        return Err(RuntimeError::StackOverflow(limit));
    }
    if args.len() != function.params.len() {
        return Err(RuntimeError::Arity {
            name: function.name.clone(),
            expected: function.params.len(),
            got: args.len(),
        });
    }

    ctx.stack.push_frame(Arc::clone(&function), args);
    trace!(function = %function.name, depth = ctx.stack.depth(), "enter function");
    let barrier = ctx.probe.enter_root();
    let saved_loop_depth = std::mem::replace(&mut ctx.loop_depth, 0);

    let result = probe_node(
        ctx,
        function.tags,
        &function.section,
        |ctx| run_body(ctx, &function),
        |value| Some(value.clone()),
    );

    ctx.loop_depth = saved_loop_depth;
    ctx.probe.leave_root(barrier);
    ctx.stack.pop_frame();
    result
}

fn run_body(ctx: &mut EvalContext<'_>, function: &FunctionDecl) -> Result<Value, RuntimeError> {
    match exec_block(ctx, &function.body)? {
        StmtResult::Return(value) => Ok(value),
        StmtResult::Normal(_) | StmtResult::Break | StmtResult::LoopContinue => Ok(Value::Null),
    }
}

fn call_builtin(
    ctx: &mut EvalContext<'_>,
    builtin: &StdFunction,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    if args.len() != builtin.arity {
        return Err(RuntimeError::Arity {
            name: builtin.name.into(),
            expected: builtin.arity,
            got: args.len(),
        });
    }
    let mut out = ctx.engine.out();
    (builtin.func)(&mut **out, args)
}
