//! Seams through which the external multi-core runtime and the core-local
//! allocator are consumed.

use crate::error::DispatchError;
use crate::id::{CoreContext, CoreId};

/// A unit of work handed to a remote core.
///
/// The runtime calls it exactly once, on the target core, with the context
/// of that core. Completion is signalled by the job itself (the dispatcher
/// captures a one-shot reply channel), not by the runtime.
pub type Job = Box<dyn FnOnce(CoreContext) + Send + 'static>;

/// The remote-launch surface of a multi-core runtime.
///
/// Implementations own one execution lane per logical core. They do not
/// enforce the coordinator invariant; the dispatcher in `kvcore-exec`
/// checks it before calling [`remote_launch`](CoreRuntime::remote_launch).
pub trait CoreRuntime {
    /// Number of logical cores, including the coordinator.
    fn core_count(&self) -> usize;

    /// Queue `job` to run on `core` and return without waiting.
    ///
    /// Returns [`DispatchError::UnknownCore`] if `core` cannot accept remote
    /// work, or [`DispatchError::RuntimeShutdown`] if the runtime has stopped.
    fn remote_launch(&self, core: CoreId, job: Job) -> Result<(), DispatchError>;

    /// Block until every job launched so far, on every core, has finished.
    fn wait_all(&self);
}

/// Entry point of a core-local memory allocator.
///
/// `allocate_local` is always invoked on the core named by `ctx.current`,
/// which lets implementations pick that core's memory region. `None` is the
/// null handle: the request could not be satisfied.
pub trait CoreAllocator: Send + Sync + 'static {
    /// Owned handle to an allocated region.
    type Block: Send + 'static;

    /// Allocate `size` bytes from the calling core's region.
    fn allocate_local(&self, ctx: CoreContext, size: usize) -> Option<Self::Block>;
}
