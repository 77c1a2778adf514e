//! Event dispatch around node evaluation.
//!
//! Input values are collected per binding: a node observed by a binding
//! opens a collector for it, and every observed expression below it that
//! completes normally appends its value to the innermost open collector of
//! the same binding. Function entry hides the caller's collectors, so a
//! callee's expressions never show up as inputs of the call site.

use std::sync::Arc;

use hashem_syntax::{NodeTags, SourceSection};
use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::eval::EvalContext;
use crate::memory::CallStack;
use crate::value::Value;

use super::{Binding, ExecutionEvent, ListenerId};

type Collectors = FxHashMap<ListenerId, Vec<Vec<Value>>>;

/// Per-execution input collection state.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    inputs: Collectors,
}

/// Caller collectors saved while a function body runs.
#[must_use]
pub(crate) struct RootBarrier(Collectors);

impl Probe {
    pub(crate) fn enter_root(&mut self) -> RootBarrier {
        RootBarrier(std::mem::take(&mut self.inputs))
    }

    pub(crate) fn leave_root(&mut self, barrier: RootBarrier) {
        self.inputs = barrier.0;
    }

    fn open(&mut self, id: ListenerId) {
        self.inputs.entry(id).or_default().push(Vec::new());
    }

    fn close(&mut self, id: ListenerId) -> Vec<Value> {
        self.inputs
            .get_mut(&id)
            .and_then(Vec::pop)
            .unwrap_or_default()
    }

    fn feed(&mut self, id: ListenerId, value: Value) {
        if let Some(collector) = self.inputs.get_mut(&id).and_then(|stack| stack.last_mut()) {
            collector.push(value);
        }
    }
}

/// Run `run` for a node with `tags`, reporting enter and return events to
/// every binding that observes it. `outcome` extracts the reported value.
pub(crate) fn probe_node<T>(
    ctx: &mut EvalContext<'_>,
    tags: NodeTags,
    section: &SourceSection,
    run: impl FnOnce(&mut EvalContext<'_>) -> Result<T, RuntimeError>,
    outcome: impl FnOnce(&T) -> Option<Value>,
) -> Result<T, RuntimeError> {
    if !ctx.engine.instrumenter().wants(tags) {
        return run(ctx);
    }
    let snapshot = ctx.engine.instrumenter().snapshot();
    let matched: Vec<&Arc<Binding>> = snapshot
        .iter()
        .filter(|binding| binding.is_active() && binding.filter.tags.intersects(tags))
        .collect();
    if matched.is_empty() {
        return run(ctx);
    }

    if tags.contains(NodeTags::STATEMENT) {
        if let Some(frame) = ctx.stack.current_frame_mut() {
            frame.section = Some(section.clone());
        }
    }

    let collects = !tags.contains(NodeTags::ROOT);
    for binding in &matched {
        if collects && binding.filter.collect_inputs {
            ctx.probe.open(binding.id);
        }
    }

    {
        let stack: &CallStack = ctx.stack;
        for binding in &matched {
            let event = ExecutionEvent {
                tags,
                section,
                root_name: root_name(stack),
                inputs: &[],
                return_value: None,
                exception: None,
                stack,
            };
            binding.sink.on_enter(&event);
        }
    }

    let result = run(ctx);
    let value = result.as_ref().ok().and_then(outcome);

    for binding in &matched {
        let collected = collects && binding.filter.collect_inputs;
        let inputs = if collected {
            ctx.probe.close(binding.id)
        } else {
            Vec::new()
        };
        if binding.is_active() {
            let stack: &CallStack = ctx.stack;
            let event = ExecutionEvent {
                tags,
                section,
                root_name: root_name(stack),
                inputs: &inputs,
                return_value: value.as_ref().filter(|_| binding.filter.collect_return),
                exception: result
                    .as_ref()
                    .err()
                    .filter(|_| binding.filter.collect_exceptions),
                stack,
            };
            binding.sink.on_return(&event);
        }
        if collected && tags.contains(NodeTags::EXPRESSION) {
            if let Some(value) = &value {
                ctx.probe.feed(binding.id, value.clone());
            }
        }
    }

    result
}

fn root_name(stack: &CallStack) -> &str {
    stack.current_frame().map_or("", |frame| frame.name().as_str())
}
