//! Runtime values.

use std::fmt;
use std::sync::Arc;

use hashem_syntax::ast::FunctionDecl;
use hashem_syntax::SourceSection;
use smol_str::SmolStr;

use crate::stdlib::StdFunction;

/// How `Null` renders; also what an unassigned local reads as.
pub const NULL_DISPLAY: &str = "POOCH";

/// Runtime value representation.
#[derive(Debug, Clone, Default)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(SmolStr),
    /// No value. Locals start out holding it.
    #[default]
    Null,
    Function(FunctionRef),
    Host(HostRef),
}

impl Value {
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn can_execute(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Name of the value's runtime type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Number",
            Value::Bool(_) => "Boolean",
            Value::Str(_) => "String",
            Value::Null => "NULL",
            Value::Function(_) => "Function",
            Value::Host(_) => "Object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Str(value) => f.write_str(value),
            Value::Null => f.write_str(NULL_DISPLAY),
            Value::Function(function) => f.write_str(function.name()),
            Value::Host(host) => f.write_str(host.0.display_name()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<HostRef> for Value {
    fn from(value: HostRef) -> Self {
        Value::Host(value)
    }
}

/// Executable value: a user function or a builtin.
#[derive(Clone)]
pub enum FunctionRef {
    User(Arc<FunctionDecl>),
    Builtin(&'static StdFunction),
}

impl FunctionRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            FunctionRef::User(decl) => &decl.name,
            FunctionRef::Builtin(builtin) => builtin.name,
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            FunctionRef::User(decl) => decl.params.len(),
            FunctionRef::Builtin(builtin) => builtin.arity,
        }
    }

    /// Declaration site of a user function; builtins have none.
    #[must_use]
    pub fn section(&self) -> Option<&SourceSection> {
        match self {
            FunctionRef::User(decl) => Some(&decl.section),
            FunctionRef::Builtin(_) => None,
        }
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionRef::User(a), FunctionRef::User(b)) => {
                Arc::ptr_eq(a, b) || (a.name == b.name && a.section == b.section)
            }
            (FunctionRef::Builtin(a), FunctionRef::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionRef::User(decl) => write!(f, "Function({})", decl.name),
            FunctionRef::Builtin(builtin) => write!(f, "Builtin({})", builtin.name),
        }
    }
}

/// Object supplied by the embedder and reachable from programs through member reads.
pub trait HostObject: Send + Sync {
    /// Read `member`; `None` when the object has no such member.
    fn read_member(&self, member: &str) -> Option<Value>;

    fn display_name(&self) -> &str {
        "Object"
    }
}

/// Shared handle to a [`HostObject`].
#[derive(Clone)]
pub struct HostRef(pub Arc<dyn HostObject>);

impl HostRef {
    pub fn new(object: impl HostObject + 'static) -> Self {
        Self(Arc::new(object))
    }

    #[must_use]
    pub fn read_member(&self, member: &str) -> Option<Value> {
        self.0.read_member(member)
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Host({})", self.0.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_displays_as_pooch() {
        assert_eq!(Value::Null.to_string(), "POOCH");
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn predicates() {
        assert!(Value::Int(2).is_number());
        assert_eq!(Value::Int(2).as_int(), Some(2));
        assert!(Value::Bool(false).is_boolean());
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::from("a").as_int(), None);
        assert!(!Value::Null.can_execute());
    }

    #[test]
    fn equality_is_by_kind() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_eq!(Value::from("x"), Value::Str("x".into()));
    }
}
