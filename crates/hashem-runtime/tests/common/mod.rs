//! Shared helpers for runtime integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use hashem_runtime::{
    Context, DebuggerSession, Engine, ExecutionEvent, NodeTags, Source, SuspendAnchor,
    SuspendedEvent, Value,
};

pub fn source(text: &str, name: &str) -> Source {
    Source::new("hashemi", text, name)
}

/// In-memory stream shared between the engine and the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Engine wired to in-memory streams.
pub struct TestEngine {
    pub engine: Engine,
    pub out: SharedBuffer,
    pub err: SharedBuffer,
}

impl TestEngine {
    pub fn new() -> Self {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let engine = Engine::builder().out(out.clone()).err(err.clone()).build();
        Self { engine, out, err }
    }

    pub fn context(&self) -> Context {
        Context::new(&self.engine)
    }
}

pub fn eval_and_invoke(text: &str, entry: &str, args: &[Value]) -> (Value, String) {
    let test = TestEngine::new();
    let mut context = test.context();
    context.eval(&source(text, "test.hashem")).unwrap();
    let value = context.invoke(entry, args).unwrap();
    (value, test.out.contents())
}

/// Owned copy of an [`ExecutionEvent`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub entering: bool,
    pub tags: NodeTags,
    pub characters: String,
    pub root_name: String,
    pub inputs: Vec<Value>,
    pub return_value: Option<Value>,
    pub has_exception: bool,
    pub call_depth: u32,
}

impl RecordedEvent {
    pub fn new(event: &ExecutionEvent<'_>, entering: bool) -> Self {
        Self {
            entering,
            tags: event.tags(),
            characters: event.section().characters().to_string(),
            root_name: event.root_name().to_string(),
            inputs: event.input_values().to_vec(),
            return_value: event.return_value().cloned(),
            has_exception: event.exception().is_some(),
            call_depth: event.call_depth(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.tags.contains(NodeTags::ROOT)
    }

    pub fn is_statement(&self) -> bool {
        self.tags.contains(NodeTags::STATEMENT)
    }

    pub fn is_expression(&self) -> bool {
        self.tags.contains(NodeTags::EXPRESSION)
    }
}

pub type EventLog = Arc<Mutex<VecDeque<RecordedEvent>>>;

pub const FACTORIAL: &str = "bebin test() {
  res = fac(2);
  bechap(res);
  bede res;
}
bebin fac(n) {
  age (n <= 1) bood {
    bede 1;
  }
  nMinusOne = n - 1;
  nMOFact = fac(nMinusOne);
  res = n * nMOFact;
  bede res;
}
";

pub const FACTORIAL_WITH_DEBUGGER: &str = "bebin test() {
  res = fac(2);
  bechap(res);
  bede res;
}
bebin fac(n) {
  age (n <= 1) bood {
    bede 1;
  }
  nMinusOne = n - 1;
  nMOFact = fac(nMinusOne);
  debugger;
  res = n * nMOFact;
  bede res;
}
";

pub const INTEROP_COMPUTATION: &str = "bebin test() {
}
bebin interopFunction(notifyHandler) {
  executing = true;
  ta (executing == true || executing) bood {
    executing = notifyHandler.isExecuting;
  }
  bede executing;
}
";

pub const NULL_TEST: &str = "bebin nullTest() {
  res = doNull();
  bede res;
}
bebin doNull() {
}
";

type Action = Box<dyn FnOnce(&mut SuspendedEvent) + Send>;

/// Expected state of a name at a suspension.
#[derive(Debug, Clone, Copy)]
pub enum Local {
    /// Resolves and displays as the given text.
    Is(&'static str),
    /// Declared in a visible scope, not assigned yet.
    Unassigned,
    /// Not declared in any visible scope.
    Absent,
}

/// Callback-mode debugger with a queue of actions, one per suspension.
///
/// Location assertions consume the following queued action in the same
/// suspension, so `assert_location(..)` followed by `step_over(1)` checks a
/// stop and then steps from it.
pub struct DebugHarness {
    pub test: TestEngine,
    pub context: Context,
    pub session: DebuggerSession,
    queue: Arc<Mutex<VecDeque<Action>>>,
}

impl DebugHarness {
    pub fn new() -> Self {
        let test = TestEngine::new();
        let queue: Arc<Mutex<VecDeque<Action>>> = Arc::default();
        let pending = Arc::clone(&queue);
        let session = DebuggerSession::open(&test.engine, move |event| {
            let action = pending.lock().unwrap().pop_front();
            if let Some(action) = action {
                action(event);
            }
        });
        let context = test.context();
        Self {
            test,
            context,
            session,
            queue,
        }
    }

    pub fn push(&self, action: impl FnOnce(&mut SuspendedEvent) + Send + 'static) {
        self.queue.lock().unwrap().push_back(Box::new(action));
    }

    pub fn step_into(&self, count: u32) {
        self.push(move |event| event.prepare_step_into(count));
    }

    pub fn step_over(&self, count: u32) {
        self.push(move |event| event.prepare_step_over(count));
    }

    pub fn step_out(&self) {
        self.push(|event| event.prepare_step_out(1));
    }

    pub fn continue_execution(&self) {
        self.push(SuspendedEvent::prepare_continue);
    }

    /// Queue a check of the next suspension.
    pub fn assert_location(
        &self,
        name: &'static str,
        line: u32,
        anchor: SuspendAnchor,
        code: &'static str,
        expected: &[(&'static str, Local)],
    ) {
        let expected = expected.to_vec();
        let queue = Arc::clone(&self.queue);
        self.push(move |event| {
            let section = event.section();
            assert_eq!(section.start_line(), line, "line of {:?}", section.characters());
            assert_eq!(section.characters(), code);
            assert_eq!(event.anchor(), anchor);

            let frame = event.top_stack_frame().expect("top stack frame");
            assert_eq!(frame.name(), name);
            for (identifier, local) in expected {
                let slot = frame.scope().resolve(identifier);
                match local {
                    Local::Is(text) => {
                        let slot = slot.unwrap_or_else(|| panic!("{identifier} not visible"));
                        assert_eq!(slot.as_string(), text, "value of {identifier}");
                    }
                    Local::Unassigned => {
                        let slot = slot.unwrap_or_else(|| panic!("{identifier} not declared"));
                        assert!(slot.is_unassigned(), "{identifier} should be unassigned, got {slot:?}");
                    }
                    Local::Absent => {
                        assert!(slot.is_none(), "{identifier} should not resolve, got {slot:?}");
                    }
                }
            }

            let next = queue.lock().unwrap().pop_front();
            if let Some(next) = next {
                next(event);
            }
        });
    }

    pub fn eval(&mut self, text: &str, name: &str) {
        self.context.eval(&source(text, name)).unwrap();
    }

    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Value {
        self.context.invoke(name, args).unwrap()
    }

    pub fn assert_executed_ok(&self) {
        let err = self.test.err.contents();
        assert!(err.is_empty(), "{err}");
        let pending = self.queue.lock().unwrap().len();
        assert_eq!(pending, 0, "all queued debugger actions should have run");
    }
}
