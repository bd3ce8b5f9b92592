//! Stack growth for the declare and emit walks.
//!
//! Both walks recurse once per tree level. Parsers happily produce deeply
//! nested expression chains (long `a + b + c + ...` runs, nested ternaries),
//! so each recursive step goes through [`ensure_sufficient_stack`], which
//! grows the stack on native targets when the remaining space gets low.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if fewer than `RED_ZONE` bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
