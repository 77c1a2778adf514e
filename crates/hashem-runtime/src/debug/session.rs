//! Debugger session state and suspension handshake.
//!
//! A session is one binding on the engine's instrumenter observing roots,
//! statements and calls. When a statement is about to run (or a stepped
//! call returns) and a stop condition holds, the executing thread builds a
//! [`SuspendedEvent`] and parks until a resume decision arrives: from the
//! session callback on the same thread, or from a controlling thread via
//! [`DebuggerSession::resume`].

use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use hashem_syntax::{NodeTags, SourceSection};
use tracing::debug;

use crate::engine::{Engine, LoadedSource};
use crate::instrument::{EventFilter, ExecutionEvent, ExecutionSink, ListenerId};

use super::breakpoints::matches_breakpoint;
use super::resolve::resolve_line;
use super::trace::{trace_debug, trace_enabled};
use super::{
    BreakpointId, BreakpointLocation, DebugBreakpoint, DebugStackFrame, DebugStop,
    DebugStopReason, HitCondition, ResumeAction, SuspendAnchor, SuspendedEvent,
};

type Callback = Box<dyn FnMut(&mut SuspendedEvent) + Send>;

/// Step behavior while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    /// Count every statement.
    Into,
    /// Count statements at the origin depth or above.
    Over,
    /// Count statements above the origin depth.
    Out,
}

#[derive(Debug, Clone, Copy)]
struct StepState {
    kind: StepKind,
    origin: u32,
    remaining: u32,
}

impl StepState {
    fn from_action(action: ResumeAction, origin: u32) -> Option<Self> {
        let (kind, count) = match action {
            ResumeAction::Continue => return None,
            ResumeAction::StepInto(count) => (StepKind::Into, count),
            ResumeAction::StepOver(count) => (StepKind::Over, count),
            ResumeAction::StepOut(count) => (StepKind::Out, count),
        };
        Some(Self {
            kind,
            origin,
            remaining: count.max(1),
        })
    }

    fn counts(&self, depth: u32) -> bool {
        match self.kind {
            StepKind::Into => true,
            StepKind::Over => depth <= self.origin,
            StepKind::Out => depth < self.origin,
        }
    }
}

enum Mode {
    Callback(parking_lot::Mutex<Callback>),
    Controlled,
}

#[derive(Default)]
struct SessionState {
    breakpoints: Vec<DebugBreakpoint>,
    next_breakpoint: u64,
    step: Option<StepState>,
    suspend_next: bool,
    suspended: bool,
    published: Option<SuspendedEvent>,
    resume: Option<ResumeAction>,
    stops: Vec<DebugStop>,
    last_stop: Option<DebugStop>,
    stop_tx: Option<Sender<DebugStop>>,
}

impl SessionState {
    fn before_statement(
        &mut self,
        section: &SourceSection,
        tags: NodeTags,
        depth: u32,
    ) -> Option<DebugStopReason> {
        if std::mem::take(&mut self.suspend_next) {
            return Some(DebugStopReason::Pause);
        }
        if let Some(step) = self.step.as_mut() {
            if step.counts(depth) {
                step.remaining -= 1;
                if step.remaining == 0 {
                    return Some(DebugStopReason::Step);
                }
            }
        }
        if tags.contains(NodeTags::HALT) {
            return Some(DebugStopReason::Halt);
        }
        matches_breakpoint(&mut self.breakpoints, section).map(|_| DebugStopReason::Breakpoint)
    }
}

struct SessionShared {
    state: Mutex<SessionState>,
    cvar: Condvar,
    mode: Mode,
    trace: bool,
}

impl SessionShared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("debug state poisoned")
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.trace {
            trace_debug(&message());
        }
    }

    /// Park the executing thread until a resume decision is available.
    fn suspend(
        &self,
        event: &ExecutionEvent<'_>,
        anchor: SuspendAnchor,
        reason: DebugStopReason,
    ) {
        let depth = event.call_depth();
        let section = event.section().clone();
        let frames = event
            .frames()
            .zip((1..=depth).rev())
            .enumerate()
            .map(|(index, (frame, frame_depth))| {
                let current = (index == 0).then(|| section.clone());
                DebugStackFrame::capture(frame, frame_depth, current)
            })
            .collect();
        let return_value = match anchor {
            SuspendAnchor::After => event.return_value().cloned(),
            SuspendAnchor::Before => None,
        };
        let mut suspended = SuspendedEvent::new(section.clone(), anchor, reason, frames, return_value);

        let mut state = self.lock();
        assert!(!state.suspended, "debugger session is already suspended");
        state.suspended = true;
        state.step = None;
        state.suspend_next = false;
        self.trace(|| format!("stop reason={reason:?} anchor={anchor:?} at {section} depth={depth}"));
        emit_stop(
            &mut state,
            DebugStop {
                reason,
                section,
                anchor,
                depth,
            },
        );

        let action = match &self.mode {
            Mode::Controlled => {
                state.published = Some(suspended);
                self.cvar.notify_all();
                loop {
                    if let Some(action) = state.resume.take() {
                        break action;
                    }
                    state = self.cvar.wait(state).expect("debug state poisoned");
                }
            }
            Mode::Callback(callback) => {
                drop(state);
                {
                    let mut callback = callback.lock();
                    let callback = &mut *callback;
                    callback(&mut suspended);
                }
                state = self.lock();
                suspended.decision().unwrap_or(ResumeAction::Continue)
            }
        };

        state.suspended = false;
        state.step = StepState::from_action(action, depth);
        self.trace(|| format!("resume action={action:?} depth={depth}"));
    }
}

impl ExecutionSink for SessionShared {
    fn on_enter(&self, event: &ExecutionEvent<'_>) {
        if !event.is_statement() {
            return;
        }
        let reason = self
            .lock()
            .before_statement(event.section(), event.tags(), event.call_depth());
        if let Some(reason) = reason {
            self.suspend(event, SuspendAnchor::Before, reason);
        }
    }

    fn on_return(&self, event: &ExecutionEvent<'_>) {
        let depth = event.call_depth();
        if event.is_root() {
            if depth <= 1 {
                self.lock().step = None;
            }
            return;
        }
        if !event.tags().contains(NodeTags::CALL) || event.return_value().is_none() {
            return;
        }
        let returned_below = self
            .lock()
            .step
            .is_some_and(|step| depth < step.origin);
        if returned_below {
            self.suspend(event, SuspendAnchor::After, DebugStopReason::Step);
        }
    }

    fn on_source_loaded(&self, engine: &Engine, loaded: &LoadedSource) {
        let diagnostics: Vec<String> = {
            let mut state = self.lock();
            state
                .breakpoints
                .iter_mut()
                .filter_map(|breakpoint| bind_line(breakpoint, loaded))
                .collect()
        };
        for diagnostic in diagnostics {
            engine.write_err(&diagnostic);
        }
    }
}

fn emit_stop(state: &mut SessionState, stop: DebugStop) {
    debug!(reason = ?stop.reason, anchor = ?stop.anchor, at = %stop.section, "debugger stop");
    if let Some(sender) = &state.stop_tx {
        let _ = sender.send(stop.clone());
    }
    state.last_stop = Some(stop.clone());
    state.stops.push(stop);
}

/// Bind an unresolved line breakpoint to a statement of `loaded`.
/// Returns a diagnostic when the line holds no statement.
fn bind_line(breakpoint: &mut DebugBreakpoint, loaded: &LoadedSource) -> Option<String> {
    let BreakpointLocation::Line { source, line } = &breakpoint.location else {
        return None;
    };
    if breakpoint.resolved.is_some() || source != loaded.source() {
        return None;
    }
    match resolve_line(loaded, *line) {
        Some(section) => {
            breakpoint.resolved = Some(section);
            None
        }
        None => Some(format!(
            "breakpoint at {}:{line} does not match any statement",
            source.name()
        )),
    }
}

struct SessionInner {
    shared: Arc<SessionShared>,
    engine: Engine,
    id: ListenerId,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.engine.instrumenter().detach(self.id);
    }
}

/// Debugger attached to one engine. Clones share the session.
#[derive(Clone)]
pub struct DebuggerSession {
    inner: Arc<SessionInner>,
}

impl DebuggerSession {
    /// Open a session that hands every suspension to `callback` on the
    /// executing thread.
    pub fn open(engine: &Engine, callback: impl FnMut(&mut SuspendedEvent) + Send + 'static) -> Self {
        Self::attach(engine, Mode::Callback(parking_lot::Mutex::new(Box::new(callback))))
    }

    /// Open a session whose suspensions wait for [`DebuggerSession::resume`].
    #[must_use]
    pub fn open_controlled(engine: &Engine) -> Self {
        Self::attach(engine, Mode::Controlled)
    }

    fn attach(engine: &Engine, mode: Mode) -> Self {
        let shared = Arc::new(SessionShared {
            state: Mutex::new(SessionState::default()),
            cvar: Condvar::new(),
            mode,
            trace: trace_enabled(engine.config()),
        });
        let filter = EventFilter {
            tags: NodeTags::ROOT | NodeTags::STATEMENT | NodeTags::CALL,
            collect_return: true,
            ..EventFilter::default()
        };
        let id = engine
            .instrumenter()
            .attach(filter, Arc::clone(&shared) as Arc<dyn ExecutionSink>);
        debug!(listener = id.0, "opened debugger session");
        Self {
            inner: Arc::new(SessionInner {
                shared,
                engine: engine.clone(),
                id,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.shared.lock()
    }

    /// Install a breakpoint. Line breakpoints bind once their source is loaded.
    pub fn install_breakpoint(&self, location: BreakpointLocation) -> BreakpointId {
        let loaded = self.inner.engine.loaded_sources();
        let (id, diagnostic) = {
            let mut state = self.lock();
            state.next_breakpoint += 1;
            let id = BreakpointId(state.next_breakpoint);
            let mut breakpoint = DebugBreakpoint::new(id, location);
            let diagnostic = loaded
                .iter()
                .find(|entry| entry.source() == breakpoint.location.source())
                .and_then(|entry| bind_line(&mut breakpoint, entry));
            state.breakpoints.push(breakpoint);
            (id, diagnostic)
        };
        if let Some(diagnostic) = diagnostic {
            self.inner.engine.write_err(&diagnostic);
        }
        self.inner
            .shared
            .trace(|| format!("breakpoint {} installed", id.0));
        id
    }

    pub fn remove_breakpoint(&self, id: BreakpointId) -> bool {
        let mut state = self.lock();
        let before = state.breakpoints.len();
        state.breakpoints.retain(|breakpoint| breakpoint.id != id);
        state.breakpoints.len() != before
    }

    pub fn set_breakpoint_enabled(&self, id: BreakpointId, enabled: bool) -> bool {
        self.update_breakpoint(id, |breakpoint| breakpoint.enabled = enabled)
    }

    pub fn set_hit_condition(&self, id: BreakpointId, condition: Option<HitCondition>) -> bool {
        self.update_breakpoint(id, |breakpoint| breakpoint.hit_condition = condition)
    }

    fn update_breakpoint(&self, id: BreakpointId, update: impl FnOnce(&mut DebugBreakpoint)) -> bool {
        let mut state = self.lock();
        match state.breakpoints.iter_mut().find(|breakpoint| breakpoint.id == id) {
            Some(breakpoint) => {
                update(breakpoint);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the installed breakpoints.
    #[must_use]
    pub fn breakpoints(&self) -> Vec<DebugBreakpoint> {
        self.lock().breakpoints.clone()
    }

    pub fn clear_breakpoints(&self) {
        self.lock().breakpoints.clear();
    }

    /// Suspend at the next statement any context of the engine executes.
    pub fn suspend_next_execution(&self) {
        self.lock().suspend_next = true;
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.lock().suspended
    }

    /// Supply the decision for the published suspension.
    ///
    /// # Panics
    ///
    /// Panics when no suspension is waiting for a decision.
    pub fn resume(&self, action: ResumeAction) {
        let mut state = self.lock();
        assert!(
            state.published.take().is_some(),
            "debugger session is not suspended"
        );
        state.resume = Some(action);
        self.inner.shared.cvar.notify_all();
    }

    /// Inspect the published suspension. `inspect` runs with the session
    /// locked and must not call back into the session.
    pub fn with_suspended<T>(&self, inspect: impl FnOnce(&SuspendedEvent) -> T) -> Option<T> {
        self.lock().published.as_ref().map(inspect)
    }

    pub fn set_stop_sender(&self, sender: Sender<DebugStop>) {
        self.lock().stop_tx = Some(sender);
    }

    pub fn clear_stop_sender(&self) {
        self.lock().stop_tx = None;
    }

    #[must_use]
    pub fn last_stop(&self) -> Option<DebugStop> {
        self.lock().last_stop.clone()
    }

    pub fn drain_stops(&self) -> Vec<DebugStop> {
        std::mem::take(&mut self.lock().stops)
    }

    /// Detach from the engine. Further executions run unobserved.
    ///
    /// # Panics
    ///
    /// Panics while execution is suspended in this session.
    pub fn close(&self) {
        assert!(
            !self.is_suspended(),
            "cannot close a suspended debugger session"
        );
        self.inner.engine.instrumenter().detach(self.inner.id);
        debug!(listener = self.inner.id.0, "closed debugger session");
    }
}

impl std::fmt::Debug for DebuggerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebuggerSession")
            .field("listener", &self.inner.id)
            .finish_non_exhaustive()
    }
}
