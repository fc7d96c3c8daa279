//! Compiler-level memory barrier.

use std::sync::atomic::{compiler_fence, Ordering};

/// Stop the compiler from moving or eliding memory accesses across this
/// point.
///
/// Emits no instruction. It gives no atomicity and no cross-core
/// visibility guarantee; pair it with atomics when another core must
/// observe the writes.
#[inline(always)]
pub fn memory_barrier() {
    compiler_fence(Ordering::SeqCst);
}
