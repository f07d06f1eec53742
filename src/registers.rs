//! ## Register set
//! Fixed number of 5-bit registers packed into `u32` words.
//!
//! A 32-bit hash never produces a rank above 31, so 5 bits per register are enough.
//! Six registers share one word and the two highest bits of every word stay unused:
//! - bits 0..4     - register `6 * w`
//! - bits 5..9     - register `6 * w + 1`
//! - ...
//! - bits 25..29   - register `6 * w + 5`
//! - bits 30..31   - unused
//!
//! The set keeps one spare word after the last one addressed by its registers.

use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

use crate::error::EstimatorError;

/// Number of bits used by a single register.
pub const REGISTER_WIDTH: usize = 5;
/// Number of registers stored within one `u32` word.
pub const REGISTERS_PER_WORD: usize = 6;
/// Mask isolating one register once shifted into the lowest bits.
const REGISTER_MASK: u32 = 0x1f;

/// Packed array of `count` registers.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterSet {
    /// Number of registers
    count: usize,
    /// Packed register words
    words: Vec<u32>,
}

impl RegisterSet {
    /// Create new register set with `count` registers set to zero.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            words: vec![0; Self::words_for(count)],
        }
    }

    /// Rebuild register set from previously packed `words`.
    pub fn from_words(count: usize, words: Vec<u32>) -> Result<Self, EstimatorError> {
        let expected = Self::words_for(count);
        if words.len() != expected {
            return Err(EstimatorError::InvalidRegisterWords {
                count,
                expected,
                got: words.len(),
            });
        }
        Ok(Self { count, words })
    }

    /// Number of `u32` words needed to hold `count` registers.
    #[inline]
    pub const fn words_for(count: usize) -> usize {
        count.div_ceil(REGISTERS_PER_WORD) + 1
    }

    /// Word index and bit shift of register at `position`.
    #[inline]
    fn locate(&self, position: usize) -> (usize, usize) {
        debug_assert!(
            position < self.count,
            "register {position} out of range, set holds {} registers",
            self.count
        );
        let word = position / REGISTERS_PER_WORD;
        let shift = REGISTER_WIDTH * (position - word * REGISTERS_PER_WORD);
        (word, shift)
    }

    /// Overwrite register at `position` with the lowest 5 bits of `value`.
    #[inline]
    pub fn set(&mut self, position: usize, value: u32) {
        let (word, shift) = self.locate(position);
        let bits = &mut self.words[word];
        *bits = (*bits & !(REGISTER_MASK << shift)) | ((value & REGISTER_MASK) << shift);
    }

    /// Return value of register at `position`.
    #[inline]
    pub fn get(&self, position: usize) -> u32 {
        let (word, shift) = self.locate(position);
        (self.words[word] >> shift) & REGISTER_MASK
    }

    /// Return number of registers.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Return number of backing `u32` words.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.words.len()
    }

    /// Return packed register words.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Return number of registers still set to zero.
    pub fn zeros(&self) -> usize {
        self.iter().filter(|&r| r == 0).count()
    }

    /// Iterate over register values in index order.
    #[inline]
    pub fn iter(&self) -> Registers<'_> {
        Registers {
            set: self,
            front: 0,
            back: self.count,
        }
    }
}

impl<'a> IntoIterator for &'a RegisterSet {
    type Item = u32;
    type IntoIter = Registers<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Debug for RegisterSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterSet")
            .field("count", &self.count)
            .field("words", &self.words.len())
            .finish()
    }
}

/// Read-only iterator over the values of a [`RegisterSet`].
#[derive(Clone)]
pub struct Registers<'a> {
    set: &'a RegisterSet,
    front: usize,
    back: usize,
}

impl Iterator for Registers<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.front == self.back {
            return None;
        }
        let value = self.set.get(self.front);
        self.front += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Registers<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<u32> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.set.get(self.back))
    }
}

impl ExactSizeIterator for Registers<'_> {}

impl FusedIterator for Registers<'_> {}
