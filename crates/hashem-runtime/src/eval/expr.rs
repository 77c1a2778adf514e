//! Expression evaluation.

use std::sync::Arc;

use hashem_syntax::ast::{Binding, Expr, ExprKind, Ident, Literal, LogicalOp};
use hashem_syntax::ensure_sufficient_stack;

use crate::error::RuntimeError;
use crate::eval::ops::{apply_binary, apply_unary};
use crate::eval::{call_value, EvalContext};
use crate::instrument::probe::probe_node;
use crate::stdlib;
use crate::value::{FunctionRef, Value};

/// Evaluate an expression.
pub(crate) fn eval_expr(ctx: &mut EvalContext<'_>, expr: &Expr) -> Result<Value, RuntimeError> {
    ensure_sufficient_stack(|| {
        probe_node(
            ctx,
            expr.tags,
            &expr.section,
            |ctx| eval_kind(ctx, expr),
            |value| Some(value.clone()),
        )
    })
}

fn eval_kind(ctx: &mut EvalContext<'_>, expr: &Expr) -> Result<Value, RuntimeError> {
    match &expr.kind {
        ExprKind::Literal(literal) => Ok(literal_value(literal)),
        ExprKind::Read(ident) => read(ctx, ident),
        ExprKind::Binary { op, left, right } => {
            let left = eval_expr(ctx, left)?;
            let right = eval_expr(ctx, right)?;
            apply_binary(*op, left, right)
        }
        ExprKind::Logical { op, left, right } => eval_logical(ctx, *op, left, right),
        ExprKind::Unary { op, operand } => {
            let value = eval_expr(ctx, operand)?;
            apply_unary(*op, value)
        }
        ExprKind::Call { callee, args } => {
            let callee = eval_expr(ctx, callee)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(ctx, arg)?);
            }
            call_value(ctx, &callee, values)
        }
        ExprKind::Member { receiver, name } => {
            let receiver = eval_expr(ctx, receiver)?;
            let Value::Host(host) = &receiver else {
                return Err(RuntimeError::UnknownMember {
                    receiver: receiver.type_name().into(),
                    member: name.clone(),
                });
            };
            host.read_member(name)
                .ok_or_else(|| RuntimeError::UnknownMember {
                    receiver: host.0.display_name().into(),
                    member: name.clone(),
                })
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(value) => Value::Int(*value),
        Literal::Bool(value) => Value::Bool(*value),
        Literal::Str(value) => Value::Str(value.clone()),
    }
}

fn read(ctx: &EvalContext<'_>, ident: &Ident) -> Result<Value, RuntimeError> {
    if let Binding::Local(slot) = ident.binding {
        return Ok(ctx
            .stack
            .current_frame()
            .and_then(|frame| frame.get(slot))
            .cloned()
            .unwrap_or_default());
    }
    if let Some(function) = ctx.functions.get(&ident.name) {
        return Ok(Value::Function(FunctionRef::User(Arc::clone(function))));
    }
    stdlib::lookup(&ident.name)
        .map(|builtin| Value::Function(FunctionRef::Builtin(builtin)))
        .ok_or_else(|| RuntimeError::UndefinedFunction(ident.name.clone()))
}

fn eval_logical(
    ctx: &mut EvalContext<'_>,
    op: LogicalOp,
    left: &Expr,
    right: &Expr,
) -> Result<Value, RuntimeError> {
    let left = eval_expr(ctx, left)?;
    let Some(left) = left.as_bool() else {
        return Err(RuntimeError::type_mismatch(
            op.symbol(),
            left.type_name(),
            "Boolean",
        ));
    };
    let short_circuit = match op {
        LogicalOp::And => !left,
        LogicalOp::Or => left,
    };
    if short_circuit {
        return Ok(Value::Bool(left));
    }
    let right = eval_expr(ctx, right)?;
    right.as_bool().map(Value::Bool).ok_or_else(|| {
        RuntimeError::type_mismatch(op.symbol(), "Boolean", right.type_name())
    })
}
