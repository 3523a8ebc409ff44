//! Stack growth guard for deeply nested expressions.
//!
//! Directive expressions are parsed and evaluated recursively, one native
//! frame per bracket or operator level. A macro such as
//! `/*$ ((((((1)))))) $*/` nests cheaply, but generated sources can nest a
//! few thousand levels deep. Wrapping the recursive entry points with
//! [`ensure_sufficient_stack`] keeps those inputs from overflowing.
//!
//! - **Native targets**: grows the stack on demand through `stacker`.
//! - **WASM targets**: plain call.

/// Remaining stack below which a new segment is allocated (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn eval(&self, node: &ExprNode) -> Result<Value, Error> {
///     ensure_sufficient_stack(|| match node {
///         ExprNode::Operator(op, args) => self.eval_operator(*op, args),
///         ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_sum() {
        fn nested(depth: u32) -> i64 {
            ensure_sufficient_stack(|| if depth == 0 { 0 } else { nested(depth - 1) + 1 })
        }

        assert_eq!(nested(50_000), 50_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<i64, String> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
