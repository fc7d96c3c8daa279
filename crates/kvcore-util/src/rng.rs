//! 48-bit linear-congruential generator.
//!
//! The recurrence is `state = (state * 0x5DEECE66D + 0xB) mod 2^48`, the
//! same one `java.util.Random` and POSIX `drand48` use. Outputs are
//! reproduced bit for bit from the same seed and call sequence, which is
//! what sampling decisions elsewhere in the store rely on for replay.
//!
//! The state lives with the caller. Nothing here is global, and nothing
//! here is synchronized: one state, one writer.

/// LCG multiplier.
pub const MULTIPLIER: u64 = 0x5_DEEC_E66D;

/// LCG increment.
pub const INCREMENT: u64 = 0xB;

/// Mask selecting the 48 significant state bits.
pub const STATE_MASK: u64 = (1 << 48) - 1;

#[inline]
fn advance(state: &mut u64) -> u64 {
    // Wrapping in 2^64 then masking is the same as reducing mod 2^48.
    *state = state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT) & STATE_MASK;
    *state
}

/// Advance `state` and return its top 32 bits (bits 47..16).
#[inline]
pub fn next_uint32(state: &mut u64) -> u32 {
    (advance(state) >> 16) as u32
}

/// Advance `state` and return it scaled by `1 / (2^48 - 1)`.
///
/// The divisor is `2^48 - 1`, not `2^48`. That skews the distribution
/// very slightly and makes `1.0` reachable from exactly one state out of
/// 2^48; it is kept as is so sequences match existing deployments.
#[inline]
pub fn next_double(state: &mut u64) -> f64 {
    advance(state) as f64 / STATE_MASK as f64
}

/// Owned generator state.
///
/// `Lcg48::new(seed)` uses the seed verbatim (no scrambling), so it
/// produces the same sequence as the free functions run on `seed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Create a generator whose state is `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Current raw state.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// See [`next_uint32`].
    #[inline]
    pub fn next_uint32(&mut self) -> u32 {
        next_uint32(&mut self.state)
    }

    /// See [`next_double`].
    #[inline]
    pub fn next_double(&mut self) -> f64 {
        next_double(&mut self.state)
    }
}
