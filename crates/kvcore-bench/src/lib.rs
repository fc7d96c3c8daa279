//! Benchmark fixtures for kvcore.
//!
//! - [`record_pair`]: deterministic record buffers for block-op benches
//! - [`RECORD_SIZES`]: record lengths covering every unrolled path plus the
//!   generic fallback

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kvcore_util::block::roundup8;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Nominal record lengths benchmarked: 1–4 words, then larger records
/// that take the generic path.
pub const RECORD_SIZES: [usize; 7] = [7, 16, 24, 32, 48, 128, 1024];

/// Two identical, randomly filled buffers of `roundup8(len)` bytes.
///
/// Contents are drawn from ChaCha8 seeded with `seed`, so runs are
/// comparable across machines.
pub fn record_pair(len: usize, seed: u64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut a = vec![0u8; roundup8(len)];
    rng.fill_bytes(&mut a);
    let b = a.clone();
    (a, b)
}
