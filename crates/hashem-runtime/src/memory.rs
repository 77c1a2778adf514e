//! Call stack and local frames.

use std::sync::Arc;

use hashem_syntax::ast::FunctionDecl;
use hashem_syntax::{ScopeId, SlotId, SourceSection};
use smol_str::SmolStr;

use crate::value::Value;

/// Frame identifier for call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

/// A local variable frame for one function invocation.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: FrameId,
    pub function: Arc<FunctionDecl>,
    /// Indexed by [`SlotId`]; every slot starts as `Null`.
    pub slots: Vec<Value>,
    /// Innermost block scope being executed.
    pub scope: ScopeId,
    /// Statement currently executing in this frame, tracked while instrumentation is active.
    pub section: Option<SourceSection>,
}

impl Frame {
    #[must_use]
    pub fn name(&self) -> &SmolStr {
        &self.function.name
    }

    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Value> {
        self.slots.get(slot.index())
    }

    pub fn set(&mut self, slot: SlotId, value: Value) -> bool {
        if let Some(entry) = self.slots.get_mut(slot.index()) {
            *entry = value;
            true
        } else {
            false
        }
    }

    /// Look `name` up from the current block scope outwards.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let slot = self.function.scopes.lookup(self.scope, name)?;
        self.get(slot)
    }
}

/// Stack of active invocations.
#[derive(Debug, Default, Clone)]
pub struct CallStack {
    frames: Vec<Frame>,
    next_frame_id: u32,
}

impl CallStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame for `function`, binding `args` to its parameters.
    pub fn push_frame(&mut self, function: Arc<FunctionDecl>, args: Vec<Value>) -> FrameId {
        let id = FrameId(self.next_frame_id);
        self.next_frame_id = self.next_frame_id.wrapping_add(1);
        let mut slots = vec![Value::Null; function.slot_count()];
        for (param, value) in function.params.iter().zip(args) {
            if let Some(slot) = function.scopes.lookup(ScopeId::ROOT, &param.name) {
                slots[slot.index()] = value;
            }
        }
        self.frames.push(Frame {
            id,
            function,
            slots,
            scope: ScopeId::ROOT,
            section: None,
        });
        id
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Frames from the root invocation to the innermost one.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::try_from(self.frames.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
