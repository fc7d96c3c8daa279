//! Core types and traits for kvcore.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: logical core
//! identifiers, the explicit [`CoreContext`] that replaces a runtime's
//! ambient "which core am I on" query, the [`CoreRuntime`] and
//! [`CoreAllocator`] seams through which an external multi-core runtime and
//! core-local allocator are consumed, and the error types of the dispatch
//! protocol.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::DispatchError;
pub use id::{CoreContext, CoreId};
pub use traits::{CoreAllocator, CoreRuntime, Job};
