//! kvcore: core-affine dispatch and hot-path utilities for a multi-core
//! key-value store.
//!
//! This is the facade crate that re-exports the public API of the kvcore
//! sub-crates. For most users, adding `kvcore` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kvcore::prelude::*;
//! use std::sync::Arc;
//!
//! let pool = CorePool::new(PoolConfig::with_cores(2)).unwrap();
//! let alloc = Arc::new(HeapAllocator::new(2));
//!
//! // A 13-byte record lands in a 16-byte block allocated on core 1.
//! let mut block = pool.allocate_on(&alloc, 13, CoreId(1)).unwrap().unwrap();
//! assert_eq!(block.core(), CoreId(1));
//! assert_eq!(block.padded_len(), roundup8(13));
//!
//! let record = [7u8; 16];
//! fixed_copy(block.as_bytes_mut(), &record, 13);
//! assert!(fixed_compare(block.as_bytes(), &record, 13));
//!
//! let mut rng = Lcg48::new(42);
//! assert_eq!(rng.next_uint32(), 16_159_453);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kvcore-core` | Core IDs, dispatch context, runtime and allocator traits |
//! | [`util`] | `kvcore-util` | Block copy/compare, 48-bit LCG, power-of-two sizing, barrier |
//! | [`exec`] | `kvcore-exec` | Dispatch protocol, thread-backed `CorePool`, `HeapAllocator` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`kvcore-core`).
///
/// Contains [`types::CoreId`], [`types::CoreContext`], the
/// [`types::CoreRuntime`] and [`types::CoreAllocator`] seams, and
/// [`types::DispatchError`].
pub use kvcore_core as types;

/// Hot-path utilities (`kvcore-util`).
///
/// Fixed-block copy and compare, the deterministic LCG, power-of-two
/// rounding, and the compiler barrier.
pub use kvcore_util as util;

/// Dispatch and core-local allocation (`kvcore-exec`).
pub use kvcore_exec as exec;

/// Common imports for typical kvcore usage.
///
/// ```rust
/// use kvcore::prelude::*;
/// ```
pub mod prelude {
    pub use kvcore_core::{
        CoreAllocator, CoreContext, CoreId, CoreRuntime, DispatchError, Job,
    };
    pub use kvcore_exec::{
        allocate_on_core, launch_on_core, run_on_core, ConfigError, CorePool, HeapAllocator,
        LocalBlock, PoolConfig,
    };
    pub use kvcore_util::{
        checked_next_power_of_two, fixed_compare, fixed_copy, memory_barrier, next_double,
        next_power_of_two, next_uint32, roundup8, Lcg48,
    };
}
