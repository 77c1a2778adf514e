//! Statement execution.

use hashem_syntax::ast::{Binding, Block, Expr, Ident, Stmt, StmtKind};
use hashem_syntax::{ensure_sufficient_stack, ScopeId};

use crate::error::RuntimeError;
use crate::eval::{eval_expr, EvalContext};
use crate::instrument::probe::probe_node;
use crate::value::Value;

/// Statement execution result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StmtResult {
    /// Completed; assignments and expression statements carry their value.
    Normal(Option<Value>),
    Return(Value),
    Break,
    LoopContinue,
}

impl StmtResult {
    /// Value reported to listeners. Control transfers report none.
    fn reported(&self) -> Option<Value> {
        match self {
            StmtResult::Normal(value) => value.clone(),
            StmtResult::Return(_) | StmtResult::Break | StmtResult::LoopContinue => None,
        }
    }
}

/// Execute a statement.
pub(crate) fn exec_stmt(ctx: &mut EvalContext<'_>, stmt: &Stmt) -> Result<StmtResult, RuntimeError> {
    ensure_sufficient_stack(|| exec_stmt_inner(ctx, stmt))
}

fn exec_stmt_inner(ctx: &mut EvalContext<'_>, stmt: &Stmt) -> Result<StmtResult, RuntimeError> {
    match &stmt.kind {
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            if eval_condition(ctx, condition)? {
                exec_block(ctx, then_block)
            } else if let Some(block) = else_block {
                exec_block(ctx, block)
            } else {
                Ok(StmtResult::Normal(None))
            }
        }
        StmtKind::While { condition, body } => {
            ctx.loop_depth += 1;
            let result = run_loop(ctx, condition, body);
            ctx.loop_depth -= 1;
            result
        }
        StmtKind::Block(block) => exec_block(ctx, block),
        _ => probe_node(
            ctx,
            stmt.tags,
            &stmt.section,
            |ctx| exec_simple(ctx, stmt),
            StmtResult::reported,
        ),
    }
}

/// Execute the statements of a block inside its scope.
pub(crate) fn exec_block(
    ctx: &mut EvalContext<'_>,
    block: &Block,
) -> Result<StmtResult, RuntimeError> {
    let previous = enter_scope(ctx, block.scope);
    let mut result = Ok(StmtResult::Normal(None));
    for stmt in &block.stmts {
        match exec_stmt(ctx, stmt) {
            Ok(StmtResult::Normal(_)) => {}
            other => {
                result = other;
                break;
            }
        }
    }
    enter_scope(ctx, previous);
    result
}

fn exec_simple(ctx: &mut EvalContext<'_>, stmt: &Stmt) -> Result<StmtResult, RuntimeError> {
    match &stmt.kind {
        StmtKind::Expr(expr) => Ok(StmtResult::Normal(Some(eval_expr(ctx, expr)?))),
        StmtKind::Assign { target, value } => {
            let value = eval_expr(ctx, value)?;
            store(ctx, target, value.clone());
            Ok(StmtResult::Normal(Some(value)))
        }
        StmtKind::Return(expr) => {
            let value = match expr {
                Some(expr) => eval_expr(ctx, expr)?,
                None => Value::Null,
            };
            Ok(StmtResult::Return(value))
        }
        StmtKind::Break => {
            if ctx.loop_depth == 0 {
                return Err(RuntimeError::InvalidControlFlow("beshkan".into()));
            }
            Ok(StmtResult::Break)
        }
        StmtKind::Continue => {
            if ctx.loop_depth == 0 {
                return Err(RuntimeError::InvalidControlFlow("edame".into()));
            }
            Ok(StmtResult::LoopContinue)
        }
        StmtKind::Debugger => Ok(StmtResult::Normal(None)),
        StmtKind::If { .. } | StmtKind::While { .. } | StmtKind::Block(_) => exec_stmt(ctx, stmt),
    }
}

fn run_loop(
    ctx: &mut EvalContext<'_>,
    condition: &Expr,
    body: &Block,
) -> Result<StmtResult, RuntimeError> {
    while eval_condition(ctx, condition)? {
        match exec_block(ctx, body)? {
            StmtResult::Normal(_) | StmtResult::LoopContinue => {}
            StmtResult::Break => break,
            result @ StmtResult::Return(_) => return Ok(result),
        }
    }
    Ok(StmtResult::Normal(None))
}

fn eval_condition(ctx: &mut EvalContext<'_>, condition: &Expr) -> Result<bool, RuntimeError> {
    let value = eval_expr(ctx, condition)?;
    value
        .as_bool()
        .ok_or_else(|| RuntimeError::ConditionNotBool(value.type_name().into()))
}

fn store(ctx: &mut EvalContext<'_>, target: &Ident, value: Value) {
    let Binding::Local(slot) = target.binding else {
        return;
    };
    if let Some(frame) = ctx.stack.current_frame_mut() {
        frame.set(slot, value);
    }
}

fn enter_scope(ctx: &mut EvalContext<'_>, scope: ScopeId) -> ScopeId {
    match ctx.stack.current_frame_mut() {
        Some(frame) => std::mem::replace(&mut frame.scope, scope),
        None => ScopeId::ROOT,
    }
}
