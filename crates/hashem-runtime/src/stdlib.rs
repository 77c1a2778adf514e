//! Builtin functions.

use std::fmt;
use std::io::Write;

use crate::error::RuntimeError;
use crate::value::Value;

/// Builtin signature; `out` is the engine's output stream.
pub type StdFunc = fn(out: &mut dyn Write, args: &[Value]) -> Result<Value, RuntimeError>;

/// Builtin function metadata.
pub struct StdFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: StdFunc,
}

impl fmt::Debug for StdFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

static BECHAP: StdFunction = StdFunction {
    name: "bechap",
    arity: 1,
    func: bechap,
};

static BUILTINS: [&StdFunction; 1] = [&BECHAP];

/// Find a builtin by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static StdFunction> {
    BUILTINS.iter().copied().find(|builtin| builtin.name == name)
}

/// All builtins, in registration order.
pub fn builtins() -> impl Iterator<Item = &'static StdFunction> {
    BUILTINS.iter().copied()
}

/// Print the argument followed by a newline and return it.
fn bechap(out: &mut dyn Write, args: &[Value]) -> Result<Value, RuntimeError> {
    let value = args.first().cloned().unwrap_or_default();
    writeln!(out, "{value}")?;
    out.flush()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bechap_prints_and_returns_argument() {
        let mut out = Vec::new();
        let builtin = lookup("bechap").unwrap();
        let value = (builtin.func)(&mut out, &[Value::Int(7)]).unwrap();
        assert_eq!(value, Value::Int(7));
        assert_eq!(String::from_utf8(out).unwrap(), "7\n");
    }

    #[test]
    fn unknown_builtin() {
        assert!(lookup("print").is_none());
    }
}
