//! Pointer-based block operations for callers that already hold raw
//! record pointers (slab offsets, shared-memory mappings).
//!
//! Semantics match [`crate::block`]: `roundup8(length)` bytes are moved or
//! compared, with unrolled word paths up to 32 bytes. Word accesses are
//! unaligned loads and stores, so only byte alignment is required of the
//! pointers.

#![allow(unsafe_code)]

use std::ptr;

use crate::block::{roundup8, WORD};

#[inline(always)]
unsafe fn load(p: *const u8, at: usize) -> u64 {
    // SAFETY: caller guarantees `p + at .. p + at + WORD` is readable.
    unsafe { p.add(at).cast::<u64>().read_unaligned() }
}

#[inline(always)]
unsafe fn copy_word(dest: *mut u8, src: *const u8, at: usize) {
    // SAFETY: caller guarantees both words are in bounds and disjoint.
    unsafe { dest.add(at).cast::<u64>().write_unaligned(load(src, at)) }
}

/// Copy `roundup8(length)` bytes from `src` to `dest`.
///
/// # Safety
///
/// - `src` must be valid for reads of `roundup8(length)` bytes.
/// - `dest` must be valid for writes of `roundup8(length)` bytes.
/// - The two regions must not overlap.
#[inline]
pub unsafe fn fixed_copy_raw(dest: *mut u8, src: *const u8, length: usize) {
    let length = roundup8(length);
    // SAFETY (all arms): every offset below is < length, which the caller
    // guarantees is in bounds for both regions.
    unsafe {
        match length / WORD {
            0 => {}
            1 => {
                copy_word(dest, src, 0);
            }
            2 => {
                copy_word(dest, src, 0);
                copy_word(dest, src, 8);
            }
            3 => {
                copy_word(dest, src, 0);
                copy_word(dest, src, 8);
                copy_word(dest, src, 16);
            }
            4 => {
                copy_word(dest, src, 0);
                copy_word(dest, src, 8);
                copy_word(dest, src, 16);
                copy_word(dest, src, 24);
            }
            _ => ptr::copy_nonoverlapping(src, dest, length),
        }
    }
}

/// Whether the `roundup8(length)` bytes at `a` and `b` are equal.
///
/// # Safety
///
/// Both pointers must be valid for reads of `roundup8(length)` bytes.
#[inline]
pub unsafe fn fixed_compare_raw(a: *const u8, b: *const u8, length: usize) -> bool {
    let length = roundup8(length);
    // SAFETY (all arms): offsets stay below the caller-guaranteed length.
    unsafe {
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
            _ => std::slice::from_raw_parts(a, length) == std::slice::from_raw_parts(b, length),
        }
    }
}
