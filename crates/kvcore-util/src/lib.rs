//! Leaf utilities used on the hot paths of the kvcore store.
//!
//! - [`block`]: copy and compare memory in 8-byte-rounded blocks, with
//!   unrolled word paths for records of up to 32 bytes.
//! - [`raw`]: the same operations over raw pointers, for callers that hold
//!   pointers into record storage. This is the only module in the crate
//!   allowed to contain `unsafe`.
//! - [`rng`]: the 48-bit linear-congruential generator used for sampling
//!   decisions, bit-compatible with `java.util.Random`'s recurrence.
//! - [`pow2`]: power-of-two rounding for allocation sizes.
//! - [`barrier`]: a compiler-only ordering fence.
//!
//! # Rounded blocks
//!
//! Block operations always act on `roundup8(length)` bytes. Record storage
//! is allocated with at least that much room, so the padding past the
//! nominal length is safe to read and overwrite:
//!
//! ```rust
//! use kvcore_util::block::{fixed_compare, fixed_copy, roundup8};
//!
//! let src = [1u8, 2, 3, 4, 5, 0, 0, 0];
//! let mut dest = [0u8; 8];
//! assert_eq!(roundup8(5), 8);
//! fixed_copy(&mut dest, &src, 5);
//! assert!(fixed_compare(&dest, &src, 5));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod barrier;
pub mod block;
pub mod pow2;
pub mod raw;
pub mod rng;

pub use barrier::memory_barrier;
pub use block::{fixed_compare, fixed_copy, roundup8, WORD};
pub use pow2::{checked_next_power_of_two, next_power_of_two};
pub use rng::{next_double, next_uint32, Lcg48};
