//! Host stack growth for the recursive tree walk.
//!
//! Every Lox call costs several nested Rust frames (`evaluate` → `call_value`
//! → `execute_block` → `execute` → ...), so a few hundred Lox frames can
//! exhaust a 2MB thread. Recursive entry points run through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated stack
//! segment once the remaining space drops below the red zone. The Lox-level
//! limit is then [`Config::max_call_depth`](crate::config::Config) alone.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }
}
