//! Breakpoint evaluation.

use hashem_syntax::SourceSection;

use super::{BreakpointId, DebugBreakpoint};

/// Count a hit on every enabled breakpoint bound to `section` and return the
/// first one whose hit condition is met.
pub(crate) fn matches_breakpoint(
    breakpoints: &mut [DebugBreakpoint],
    section: &SourceSection,
) -> Option<BreakpointId> {
    let mut matched = None;
    for breakpoint in breakpoints.iter_mut() {
        if !breakpoint.enabled || breakpoint.resolved.as_ref() != Some(section) {
            continue;
        }
        breakpoint.hits = breakpoint.hits.saturating_add(1);
        if let Some(hit_condition) = breakpoint.hit_condition {
            if !hit_condition.is_met(breakpoint.hits) {
                continue;
            }
        }
        matched.get_or_insert(breakpoint.id);
    }
    matched
}
