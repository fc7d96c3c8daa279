//! Core-local allocation through the dispatch protocol.
//!
//! [`allocate_on_core`] routes an allocation request to the target core so
//! the allocator's entry point runs there. [`HeapAllocator`] is the
//! reference [`CoreAllocator`]: blocks are zero-filled by the allocating
//! core's thread, which under a first-touch NUMA policy places their pages
//! on that core's node.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kvcore_core::{CoreAllocator, CoreContext, CoreId, CoreRuntime, DispatchError};
use kvcore_util::block::WORD;

use crate::dispatch::run_on_core;

/// Allocate `size` bytes from `core`'s local region and hand the block to
/// the caller.
///
/// `Ok(None)` means the allocator could not satisfy the request. It is
/// passed through as is: no retry, no fallback to another core.
///
/// # Aborts
///
/// Aborts the process if `core` differs from `ctx.current` and the caller
/// is not the coordinator (see [`run_on_core`]).
pub fn allocate_on_core<R, A>(
    runtime: &R,
    allocator: &Arc<A>,
    ctx: CoreContext,
    size: usize,
    core: CoreId,
) -> Result<Option<A::Block>, DispatchError>
where
    R: CoreRuntime + ?Sized,
    A: CoreAllocator,
{
    let allocator = Arc::clone(allocator);
    run_on_core(runtime, ctx, core, move |local| {
        allocator.allocate_local(local, size)
    })
}

/// Per-core byte budget.
struct CoreBudget {
    limit: usize,
    used: AtomicUsize,
}

impl CoreBudget {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    fn try_charge(&self, bytes: usize) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&total| total <= self.limit)
            })
            .is_ok()
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Reference core-local allocator with an optional per-core byte budget.
///
/// Every block is padded to a multiple of 8 bytes and the padding counts
/// against the budget, so block contents can be handed straight to
/// `kvcore_util::block::{fixed_copy, fixed_compare}`.
#[derive(Clone)]
pub struct HeapAllocator {
    budgets: Arc<[CoreBudget]>,
}

impl HeapAllocator {
    /// Unbudgeted allocator for `core_count` cores. Requests fail only if
    /// the system allocator does.
    pub fn new(core_count: usize) -> Self {
        Self::with_budget(core_count, usize::MAX)
    }

    /// Allocator that lets each core hold at most `bytes_per_core` bytes
    /// (padding included) in live blocks.
    pub fn with_budget(core_count: usize, bytes_per_core: usize) -> Self {
        let budgets: Vec<CoreBudget> = (0..core_count)
            .map(|_| CoreBudget::new(bytes_per_core))
            .collect();
        Self {
            budgets: budgets.into(),
        }
    }

    /// Bytes currently held in live blocks allocated by `core`.
    pub fn used(&self, core: CoreId) -> usize {
        self.budgets
            .get(core.index())
            .map_or(0, |b| b.used.load(Ordering::Acquire))
    }
}

impl fmt::Debug for HeapAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapAllocator")
            .field("cores", &self.budgets.len())
            .finish()
    }
}

impl CoreAllocator for HeapAllocator {
    type Block = LocalBlock;

    fn allocate_local(&self, ctx: CoreContext, size: usize) -> Option<LocalBlock> {
        let budget = self.budgets.get(ctx.current.index())?;
        let padded = size.checked_add(WORD - 1)? & !(WORD - 1);
        if !budget.try_charge(padded) {
            return None;
        }

        let mut data = Vec::new();
        if data.try_reserve_exact(padded).is_err() {
            budget.release(padded);
            return None;
        }
        // Zeroing here is the first touch of the pages.
        data.resize(padded, 0u8);

        Some(LocalBlock {
            data: data.into_boxed_slice(),
            len: size,
            core: ctx.current,
            budgets: Arc::clone(&self.budgets),
        })
    }
}

/// A zero-initialised block owned by the caller, allocated on one core.
///
/// Returns its bytes to that core's budget when dropped.
pub struct LocalBlock {
    data: Box<[u8]>,
    len: usize,
    core: CoreId,
    budgets: Arc<[CoreBudget]>,
}

impl LocalBlock {
    /// The core whose region this block came from.
    pub fn core(&self) -> CoreId {
        self.core
    }

    /// Requested length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the requested length was zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length including padding to the next multiple of 8.
    pub fn padded_len(&self) -> usize {
        self.data.len()
    }

    /// The whole padded block.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The whole padded block, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for LocalBlock {
    fn drop(&mut self) {
        if let Some(budget) = self.budgets.get(self.core.index()) {
            budget.release(self.data.len());
        }
    }
}

impl fmt::Debug for LocalBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBlock")
            .field("core", &self.core)
            .field("len", &self.len)
            .field("padded_len", &self.data.len())
            .finish()
    }
}
