//! Core-affine dispatch for kvcore.
//!
//! Runs a function on a chosen logical core and blocks until it finishes.
//! The store uses this to make allocations happen on the core that will
//! own the memory, so the pages land in that core's local region.
//!
//! # Protocol
//!
//! ```text
//! caller (ctx.current)            runtime               target core
//!     |                              |                        |
//!     |-- ctx.current == target? ----------- yes: run f inline, return
//!     |   no: assert ctx is coordinator                       |
//!     |--remote_launch(target, job)->| lane[target].send(job) |
//!     |   blocks on reply_rx         |                  job(ctx on target)
//!     |<----------------- result via bounded(1) reply --------|
//! ```
//!
//! The one-shot reply is the completion signal and the synchronization
//! point: everything the job wrote is visible to the caller once
//! [`run_on_core`] returns.
//!
//! Remote dispatch from any core other than the coordinator is a protocol
//! violation and aborts the process. Recoverable conditions (unknown core,
//! shut-down runtime, lost worker) are reported as [`DispatchError`].
//!
//! [`CorePool`] is a thread-backed [`CoreRuntime`] with one worker thread
//! per non-coordinator core; [`HeapAllocator`] is a budgeted
//! [`CoreAllocator`] whose blocks are padded for the fixed-block ops in
//! `kvcore-util`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod config;
pub mod dispatch;
pub mod pool;
mod worker;

pub use alloc::{allocate_on_core, HeapAllocator, LocalBlock};
pub use config::{ConfigError, PoolConfig};
pub use dispatch::{launch_on_core, run_on_core};
pub use pool::{CorePool, ShutdownReport};

pub use kvcore_core::{CoreAllocator, CoreContext, CoreId, CoreRuntime, DispatchError, Job};
