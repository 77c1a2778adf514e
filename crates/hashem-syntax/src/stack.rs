//! Stack growth for deep recursion.
//!
//! The parser, the resolver and the runtime evaluator all recurse over the
//! tree. Nesting depth comes from user programs, so every recursive entry
//! point runs through [`ensure_sufficient_stack`], which grows the native
//! stack on demand instead of overflowing it.

/// If less than this remains, grow the stack.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red
/// zone.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
