//! Stack safety for demand-driven evaluation.
//!
//! Forcing a binding may evaluate an instruction that forces another binding,
//! so chains of forward references recurse. The `stacker` crate grows the
//! stack on native targets.

/// Run `f`, first growing the stack by 1 MiB if less than 100 KiB remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 100 * 1024;
    const GROW_BY: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROW_BY, f)
}

/// WASM manages its own stack; demand depth is bounded by `EvalConfig` there.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
