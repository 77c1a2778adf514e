//! Operator implementations.

use hashem_syntax::ast::{BinaryOp, UnaryOp};
use smol_str::{format_smolstr, SmolStr};

use crate::error::RuntimeError;
use crate::value::Value;

pub fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(v)) => v.checked_neg().map(Value::Int).ok_or(RuntimeError::Overflow),
        (UnaryOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
        (op, value) => Err(RuntimeError::UnaryTypeMismatch {
            op: op.symbol().into(),
            operand: value.type_name().into(),
        }),
    }
}

pub fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Add => match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => checked(a.checked_add(*b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(concat(&left, &right))),
            _ => Err(mismatch(op, &left, &right)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
                return Err(mismatch(op, &left, &right));
            };
            int_arith(op, *a, *b)
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
                return Err(mismatch(op, &left, &right));
            };
            let result = match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            };
            Ok(Value::Bool(result))
        }
    }
}

fn int_arith(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Sub => checked(a.checked_sub(b)),
        BinaryOp::Mul => checked(a.checked_mul(b)),
        BinaryOp::Div if b == 0 => Err(RuntimeError::DivisionByZero),
        BinaryOp::Div => checked(a.checked_div(b)),
        BinaryOp::Mod if b == 0 => Err(RuntimeError::ModuloByZero),
        BinaryOp::Mod => checked(a.checked_rem(b)),
        _ => unreachable!("{op:?} is not integer arithmetic"),
    }
}

fn checked(result: Option<i64>) -> Result<Value, RuntimeError> {
    result.map(Value::Int).ok_or(RuntimeError::Overflow)
}

fn concat(left: &Value, right: &Value) -> SmolStr {
    format_smolstr!("{left}{right}")
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(op.symbol(), left.type_name(), right.type_name())
}
