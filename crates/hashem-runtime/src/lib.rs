//! `hashem-runtime` - tree-walking evaluator, execution instrumentation and
//! debugger for the Hashem language.
//!
//! ```
//! use hashem_runtime::{Context, Engine, Source, Value};
//!
//! let engine = Engine::builder().out(Vec::new()).build();
//! let mut context = Context::new(&engine);
//! context
//!     .eval(&Source::new(
//!         "hashemi",
//!         "bebin fac(n) { age (n <= 1) bood { bede 1; } bede fac(n - 1) * n; }",
//!         "fac.hashem",
//!     ))
//!     .unwrap();
//! assert_eq!(context.invoke("fac", &[Value::Int(5)]).unwrap(), Value::Int(120));
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

/// Engine configuration.
pub mod config;
/// Debugger sessions, breakpoints and inspection.
pub mod debug;
/// Engine and evaluation contexts.
pub mod engine;
/// Runtime errors.
pub mod error;
mod eval;
/// Execution instrumentation bus.
pub mod instrument;
/// Call stack and frames.
pub mod memory;
/// Builtin functions.
pub mod stdlib;
/// Runtime values.
pub mod value;

pub use config::EngineConfig;
pub use debug::{
    BreakpointId, BreakpointLocation, DebugScope, DebugStackFrame, DebugStop, DebugStopReason,
    DebugValue, DebuggerSession, HitCondition, ResumeAction, SuspendAnchor, SuspendedEvent,
};
pub use engine::{Bindings, Context, Engine, EngineBuilder, LoadedSource};
pub use error::{Error, RuntimeError};
pub use hashem_syntax::{NodeTags, Source, SourceSection};
pub use instrument::{
    EventFilter, ExecutionEvent, ExecutionListener, ExecutionListenerBuilder, ExecutionSink,
    Instrumenter, ListenerHandle, ListenerId,
};
pub use value::{FunctionRef, HostObject, HostRef, Value, NULL_DISPLAY};
