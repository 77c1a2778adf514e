//! Debug data types.

use hashem_syntax::{Source, SourceSection};

/// Identifies an installed breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BreakpointId(pub u64);

/// Hit count conditions for breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCondition {
    /// Break when hit count equals the target.
    Equal(u64),
    /// Break when hit count is at least the target.
    AtLeast(u64),
    /// Break when hit count is greater than the target.
    GreaterThan(u64),
}

impl HitCondition {
    /// Check whether the hit condition is satisfied.
    #[must_use]
    pub fn is_met(self, hits: u64) -> bool {
        match self {
            HitCondition::Equal(target) => hits == target,
            HitCondition::AtLeast(target) => hits >= target,
            HitCondition::GreaterThan(target) => hits > target,
        }
    }
}

/// Where a breakpoint was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointLocation {
    /// 1-based line; binds to the first statement starting on it.
    Line { source: Source, line: u32 },
    /// Exactly this statement section.
    Section(SourceSection),
}

impl BreakpointLocation {
    #[must_use]
    pub fn line(source: &Source, line: u32) -> Self {
        BreakpointLocation::Line {
            source: source.clone(),
            line,
        }
    }

    #[must_use]
    pub fn section(section: SourceSection) -> Self {
        BreakpointLocation::Section(section)
    }

    #[must_use]
    pub fn source(&self) -> &Source {
        match self {
            BreakpointLocation::Line { source, .. } => source,
            BreakpointLocation::Section(section) => section.source(),
        }
    }
}

/// Breakpoint definition with optional conditions.
#[derive(Debug, Clone)]
pub struct DebugBreakpoint {
    pub id: BreakpointId,
    pub location: BreakpointLocation,
    /// Statement the location bound to, once its source is loaded.
    pub resolved: Option<SourceSection>,
    pub enabled: bool,
    /// Optional hit count condition.
    pub hit_condition: Option<HitCondition>,
    /// Current hit count for this breakpoint.
    pub hits: u64,
}

impl DebugBreakpoint {
    pub(crate) fn new(id: BreakpointId, location: BreakpointLocation) -> Self {
        let resolved = match &location {
            BreakpointLocation::Section(section) => Some(section.clone()),
            BreakpointLocation::Line { .. } => None,
        };
        Self {
            id,
            location,
            resolved,
            enabled: true,
            hit_condition: None,
            hits: 0,
        }
    }
}

/// Stop reason for debugger events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugStopReason {
    /// Paused due to a breakpoint.
    Breakpoint,
    /// Paused due to stepping.
    Step,
    /// Paused at a `debugger` statement.
    Halt,
    /// Paused due to a suspend-next request.
    Pause,
}

/// Whether execution stopped before a statement or after a call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendAnchor {
    Before,
    After,
}

/// How execution continues after a suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    Continue,
    /// Stop at the n-th next statement, entering calls.
    StepInto(u32),
    /// Stop at the n-th next statement of the current function or its callers.
    StepOver(u32),
    /// Stop at the n-th next statement after the current function returned.
    StepOut(u32),
}

/// Notification emitted when execution stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugStop {
    /// Reason for stopping.
    pub reason: DebugStopReason,
    /// Statement or call where execution stopped.
    pub section: SourceSection,
    pub anchor: SuspendAnchor,
    /// Call depth at the stop.
    pub depth: u32,
}
