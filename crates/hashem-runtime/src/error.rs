//! Runtime errors.

use hashem_syntax::ParseError;
use smol_str::SmolStr;
use thiserror::Error;

/// Runtime errors for evaluation and execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Operand types do not fit the operator.
    #[error("type mismatch: {op} not applicable to {left} and {right}")]
    TypeMismatch {
        op: SmolStr,
        left: SmolStr,
        right: SmolStr,
    },

    /// Unary operator applied to an operand of the wrong type.
    #[error("type mismatch: {op} not applicable to {operand}")]
    UnaryTypeMismatch { op: SmolStr, operand: SmolStr },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Modulo by zero.
    #[error("modulo by zero")]
    ModuloByZero,

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Callee is not a function.
    #[error("'{0}' is not callable")]
    NotCallable(SmolStr),

    /// Invalid argument count for a function call.
    #[error("'{name}' expects {expected} argument(s), got {got}")]
    Arity {
        name: SmolStr,
        expected: usize,
        got: usize,
    },

    /// Undefined function by name.
    #[error("undefined function '{0}'")]
    UndefinedFunction(SmolStr),

    /// Member read on a value that does not expose it.
    #[error("undefined member '{member}' on {receiver}")]
    UnknownMember { receiver: SmolStr, member: SmolStr },

    /// `age`/`ta` condition did not produce a boolean.
    #[error("condition must be a boolean, got {0}")]
    ConditionNotBool(SmolStr),

    /// `beshkan`/`edame` outside a loop.
    #[error("'{0}' outside of a loop")]
    InvalidControlFlow(SmolStr),

    /// Call depth exceeded the configured limit.
    #[error("stack overflow (call depth limit {0})")]
    StackOverflow(u32),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(SmolStr),

    /// Writing to an engine stream failed.
    #[error("i/o error: {0}")]
    Io(SmolStr),
}

impl RuntimeError {
    pub(crate) fn type_mismatch(op: &str, left: &str, right: &str) -> Self {
        Self::TypeMismatch {
            op: op.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string().into())
    }
}

/// Errors surfaced to embedders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The source's language id is not the engine's.
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(SmolStr),
}

impl Error {
    /// The runtime error, if this is not a syntax error.
    #[must_use]
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Self::Runtime(err) => Some(err),
            Self::Parse(_) | Self::UnsupportedLanguage(_) => None,
        }
    }
}
