//! Power-of-two rounding for allocation sizes.

/// Smallest power of two that is `>= v`.
///
/// `0` and `1` both map to `1`: no shift is needed to cover either.
///
/// # Panics
///
/// Panics if the result does not fit in `usize`, i.e. `v` is larger than
/// the highest representable power of two.
#[inline]
pub fn next_power_of_two(v: usize) -> usize {
    match checked_next_power_of_two(v) {
        Some(p) => p,
        None => panic!("no power of two >= {v} fits in usize"),
    }
}

/// Like [`next_power_of_two`], but returns `None` on overflow.
#[inline]
pub fn checked_next_power_of_two(v: usize) -> Option<usize> {
    v.checked_next_power_of_two()
}
