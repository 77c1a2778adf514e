//! Stack and scope inspection at suspension points.
//!
//! Frames are captured when execution suspends. Scopes share one copy of
//! the frame's slots and walk the function's scope tree on demand.

use std::fmt;
use std::sync::Arc;

use hashem_syntax::ast::FunctionDecl;
use hashem_syntax::{ScopeId, SourceSection};
use smol_str::SmolStr;

use crate::memory::Frame;
use crate::value::Value;

/// One captured call frame.
#[derive(Debug, Clone)]
pub struct DebugStackFrame {
    name: SmolStr,
    section: Option<SourceSection>,
    depth: u32,
    scope: DebugScope,
}

impl DebugStackFrame {
    pub(crate) fn capture(frame: &Frame, depth: u32, section: Option<SourceSection>) -> Self {
        Self {
            name: frame.name().clone(),
            section: section.or_else(|| frame.section.clone()),
            depth,
            scope: DebugScope {
                function: Arc::clone(&frame.function),
                scope: frame.scope,
                slots: Arc::from(frame.slots.as_slice()),
            },
        }
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statement executing in this frame, if known.
    #[must_use]
    pub fn section(&self) -> Option<&SourceSection> {
        self.section.as_ref()
    }

    /// 1 for the outermost invocation.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Innermost block scope active in this frame.
    #[must_use]
    pub fn scope(&self) -> &DebugScope {
        &self.scope
    }
}

/// Variables declared by one block of a captured frame.
#[derive(Clone)]
pub struct DebugScope {
    function: Arc<FunctionDecl>,
    scope: ScopeId,
    slots: Arc<[Value]>,
}

impl DebugScope {
    /// Function name for the function-level scope, `block` for nested blocks.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.scope == ScopeId::ROOT {
            &self.function.name
        } else {
            "block"
        }
    }

    /// Look `name` up in this scope only.
    #[must_use]
    pub fn declared_value(&self, name: &str) -> Option<DebugValue> {
        let slot = self.function.scopes.get(self.scope)?.get(name)?;
        Some(DebugValue {
            name: name.into(),
            value: self.slots.get(slot.index()).cloned().unwrap_or_default(),
        })
    }

    /// Look `name` up in this scope and then its parents.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<DebugValue> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if let Some(value) = scope.declared_value(name) {
                return Some(value);
            }
            current = scope.parent();
        }
        None
    }

    #[must_use]
    pub fn parent(&self) -> Option<DebugScope> {
        let parent = self.function.scopes.parent(self.scope)?;
        Some(DebugScope {
            function: Arc::clone(&self.function),
            scope: parent,
            slots: Arc::clone(&self.slots),
        })
    }

    /// Values declared directly in this scope, in declaration order.
    #[must_use]
    pub fn declared_values(&self) -> Vec<DebugValue> {
        let Some(data) = self.function.scopes.get(self.scope) else {
            return Vec::new();
        };
        data.slots()
            .map(|(name, slot)| DebugValue {
                name: name.clone(),
                value: self.slots.get(slot.index()).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

impl fmt::Debug for DebugScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugScope")
            .field("name", &self.name())
            .field("values", &self.declared_values())
            .finish()
    }
}

/// A named value seen by the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugValue {
    name: SmolStr,
    value: Value,
}

impl DebugValue {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Display form of the value, `POOCH` for null.
    #[must_use]
    pub fn as_string(&self) -> String {
        self.value.to_string()
    }

    /// Locals read as null until their first assignment.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.value.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::CallStack;
    use hashem_syntax::{parse, Source};

    #[test]
    fn scopes_walk_outwards() {
        let source = Source::new(
            "hashemi",
            "bebin f(n) {\n  m = n;\n  {\n    k = m + 1;\n  }\n}",
            "t.hashem",
        );
        let mut program = parse(&source).unwrap();
        let function = Arc::new(program.functions.remove(0));
        let mut stack = CallStack::new();
        stack.push_frame(Arc::clone(&function), vec![Value::Int(4)]);
        let frame = stack.current_frame_mut().unwrap();
        frame.set(function.scopes.lookup(ScopeId::ROOT, "m").unwrap(), Value::Int(4));
        frame.scope = ScopeId(1);

        let captured = DebugStackFrame::capture(stack.current_frame().unwrap(), 1, None);
        let block = captured.scope();
        assert_eq!(block.name(), "block");
        assert!(block.declared_value("k").unwrap().is_unassigned());
        assert_eq!(block.declared_value("k").unwrap().as_string(), "POOCH");
        assert!(block.declared_value("m").is_none());
        assert_eq!(block.resolve("m").unwrap().value(), &Value::Int(4));
        assert!(block.resolve("missing").is_none());

        let root = block.parent().unwrap();
        assert_eq!(root.name(), "f");
        let names: Vec<_> = root
            .declared_values()
            .iter()
            .map(|value| format!("{}={}", value.name(), value.as_string()))
            .collect();
        assert_eq!(names, ["n=4", "m=4"]);
        assert!(root.parent().is_none());
    }
}
