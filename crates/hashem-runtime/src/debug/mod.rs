//! Debugger sessions built on the instrumentation bus.

mod breakpoints;
mod inspect;
mod resolve;
mod session;
mod suspended;
mod trace;
mod types;

pub use inspect::{DebugScope, DebugStackFrame, DebugValue};
pub use resolve::resolve_line;
pub use session::DebuggerSession;
pub use suspended::SuspendedEvent;
pub use types::{
    BreakpointId, BreakpointLocation, DebugBreakpoint, DebugStop, DebugStopReason, HitCondition,
    ResumeAction, SuspendAnchor,
};
