//! Copy and compare memory in 8-byte-rounded blocks.
//!
//! Records in the store are small and their sizes cluster, so the common
//! cases (0 to 32 bytes after rounding) are handled by straight-line word
//! moves instead of a call into the generic slice copy. Anything longer
//! falls back to `copy_from_slice` / slice equality.
//!
//! Both operations act on `roundup8(length)` bytes, not `length`. The
//! caller sizes its buffers for that; a buffer shorter than the rounded
//! length is a bug and panics.

/// Width of the unit that block operations move, in bytes.
pub const WORD: usize = 8;

/// Longest rounded length served by the unrolled word paths.
const UNROLLED_MAX: usize = 4 * WORD;

/// Round `length` up to the next multiple of [`WORD`].
#[inline]
pub const fn roundup8(length: usize) -> usize {
    (length + (WORD - 1)) & !(WORD - 1)
}

#[inline(always)]
fn load(buf: &[u8], at: usize) -> u64 {
    let mut word = [0u8; WORD];
    word.copy_from_slice(&buf[at..at + WORD]);
    u64::from_ne_bytes(word)
}

#[inline(always)]
fn store(buf: &mut [u8], at: usize, word: u64) {
    buf[at..at + WORD].copy_from_slice(&word.to_ne_bytes());
}

/// Copy `roundup8(length)` bytes from `src` into `dest`.
///
/// Bytes of `dest` past the rounded length are left untouched.
///
/// # Panics
///
/// Panics if either slice is shorter than `roundup8(length)`.
#[inline]
pub fn fixed_copy(dest: &mut [u8], src: &[u8], length: usize) {
    let length = roundup8(length);
    assert!(
        dest.len() >= length && src.len() >= length,
        "fixed_copy of {length} bytes: dest has {}, src has {}",
        dest.len(),
        src.len()
    );

    match length / WORD {
        0 => {}
        1 => {
            store(dest, 0, load(src, 0));
        }
        2 => {
            store(dest, 0, load(src, 0));
            store(dest, 8, load(src, 8));
        }
        3 => {
            store(dest, 0, load(src, 0));
            store(dest, 8, load(src, 8));
            store(dest, 16, load(src, 16));
        }
        4 => {
            store(dest, 0, load(src, 0));
            store(dest, 8, load(src, 8));
            store(dest, 16, load(src, 16));
            store(dest, 24, load(src, 24));
        }
        _ => dest[..length].copy_from_slice(&src[..length]),
    }
}

/// Whether the first `roundup8(length)` bytes of `a` and `b` are equal.
///
/// A rounded length of zero compares equal.
///
/// # Panics
///
/// Panics if either slice is shorter than `roundup8(length)`.
#[inline]
pub fn fixed_compare(a: &[u8], b: &[u8], length: usize) -> bool {
    let length = roundup8(length);
    assert!(
        a.len() >= length && b.len() >= length,
        "fixed_compare of {length} bytes: lhs has {}, rhs has {}",
        a.len(),
        b.len()
    );

    match length / WORD {
        0 => true,
        1 => load(a, 0) == load(b, 0),
        2 => load(a, 0) == load(b, 0) && load(a, 8) == load(b, 8),
        3 => {
            load(a, 0) == load(b, 0) && load(a, 8) == load(b, 8) && load(a, 16) == load(b, 16)
        }
        4 => {
            load(a, 0) == load(b, 0)
                && load(a, 8) == load(b, 8)
                && load(a, 16) == load(b, 16)
                && load(a, 24) == load(b, 24)
        }
        _ => a[..length] == b[..length],
    }
}

/// Whether a rounded length takes one of the unrolled word paths.
#[inline]
pub const fn is_unrolled(length: usize) -> bool {
    roundup8(length) <= UNROLLED_MAX
}
