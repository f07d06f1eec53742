//! 32-bit hashing of offered values.

use std::fmt::Display;

/// Seed shared by every estimator so that hashes of equal values agree across instances.
const SEED: u64 = 0;

/// Hash `bytes` into 32 bits by truncating the 64-bit WyHash digest.
#[inline]
pub fn hash32(bytes: &[u8]) -> u32 {
    wyhash::wyhash(bytes, SEED) as u32
}

/// Hash the canonical string form of `value`.
#[inline]
pub(crate) fn hash_display<T: Display + ?Sized>(value: &T) -> u32 {
    hash32(value.to_string().as_bytes())
}
