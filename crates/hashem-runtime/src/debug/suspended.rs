use hashem_syntax::SourceSection;

use crate::value::Value;

use super::{DebugStackFrame, DebugStopReason, ResumeAction, SuspendAnchor};

/// Execution state at a suspension point.
///
/// Handed to the session callback, or published to the controlling thread,
/// while the executing thread is parked. The prepared decision applies
/// when the thread resumes; without one execution continues.
#[derive(Debug)]
pub struct SuspendedEvent {
    section: SourceSection,
    anchor: SuspendAnchor,
    reason: DebugStopReason,
    frames: Vec<DebugStackFrame>,
    return_value: Option<Value>,
    decision: Option<ResumeAction>,
}

impl SuspendedEvent {
    pub(crate) fn new(
        section: SourceSection,
        anchor: SuspendAnchor,
        reason: DebugStopReason,
        frames: Vec<DebugStackFrame>,
        return_value: Option<Value>,
    ) -> Self {
        Self {
            section,
            anchor,
            reason,
            frames,
            return_value,
            decision: None,
        }
    }

    /// Statement about to run, or the call that just returned.
    #[must_use]
    pub fn section(&self) -> &SourceSection {
        &self.section
    }

    #[must_use]
    pub fn anchor(&self) -> SuspendAnchor {
        self.anchor
    }

    #[must_use]
    pub fn reason(&self) -> DebugStopReason {
        self.reason
    }

    /// Innermost frame.
    #[must_use]
    pub fn top_stack_frame(&self) -> Option<&DebugStackFrame> {
        self.frames.first()
    }

    /// Frames from the innermost invocation to the outermost one.
    #[must_use]
    pub fn stack_frames(&self) -> &[DebugStackFrame] {
        &self.frames
    }

    /// Value of the returned call when suspended after it.
    #[must_use]
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    #[must_use]
    pub fn decision(&self) -> Option<ResumeAction> {
        self.decision
    }

    pub fn prepare_continue(&mut self) {
        self.decision = Some(ResumeAction::Continue);
    }

    pub fn prepare_step_into(&mut self, count: u32) {
        self.decision = Some(ResumeAction::StepInto(count));
    }

    pub fn prepare_step_over(&mut self, count: u32) {
        self.decision = Some(ResumeAction::StepOver(count));
    }

    pub fn prepare_step_out(&mut self, count: u32) {
        self.decision = Some(ResumeAction::StepOut(count));
    }
}
