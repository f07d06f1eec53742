//! ## Linear counter
//! Bitmap estimator counting distinct elements by the fraction of bits still unset.
//!
//! Every offered value sets bit `hash mod size`. With `size` bits of which `count`
//! remain unset, the maximum likelihood estimate of the cardinality is
//! `size * ln(size / count)`.
//!
//! Paper: *A Linear-Time Probabilistic Counting Algorithm for Database Applications*
//! by K.-Y. Whang, B. T. Vander-Zanden and H. M. Taylor.

use std::fmt::{Debug, Display, Formatter};

use crate::error::{EstimatorError, MergeError};
use crate::estimator::CardinalityEstimator;
use crate::hash::hash_display;

/// Bitmap based cardinality estimator.
#[derive(Clone, PartialEq, Eq)]
pub struct LinearCounter {
    /// Bitmap, bit `i` is stored as bit `i % 8` of byte `i / 8`
    bits: Vec<u8>,
    /// Bitmap length in bits
    size: usize,
    /// Number of unset bits
    count: usize,
}

impl LinearCounter {
    /// Create new linear counter with a bitmap of `byte_len` bytes.
    pub fn new(byte_len: usize) -> Result<Self, EstimatorError> {
        if byte_len == 0 {
            return Err(EstimatorError::EmptyBitmap);
        }
        log::debug!(
            "created linear counter with {} bits ({byte_len} bytes)",
            byte_len * 8
        );
        Ok(Self {
            bits: vec![0; byte_len],
            size: byte_len * 8,
            count: byte_len * 8,
        })
    }

    /// Create linear counter over an existing bitmap.
    pub fn from_bytes(bits: Vec<u8>) -> Result<Self, EstimatorError> {
        if bits.is_empty() {
            return Err(EstimatorError::EmptyBitmap);
        }
        Ok(Self::with_bits(bits))
    }

    /// Create linear counter over a non-empty bitmap, counting its unset bits.
    fn with_bits(bits: Vec<u8>) -> Self {
        let size = bits.len() * 8;
        let count = size - count_set_bits(&bits);
        Self { bits, size, count }
    }

    /// Return bitmap length in bits.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Return number of bits still unset.
    #[inline]
    pub fn unset_bits(&self) -> usize {
        self.count
    }

    /// Return bitmap bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Return whether every bit of the bitmap is set.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.count == 0
    }

    /// Check that `rhs` has a bitmap as long as `self`.
    #[inline]
    fn check_compatible(&self, rhs: &Self) -> Result<(), MergeError> {
        if rhs.size != self.size {
            return Err(MergeError::SizeMismatch {
                expected: self.size,
                got: rhs.size,
            });
        }
        Ok(())
    }

    /// Merge `rhs` into `self`, leaving `self` untouched when sizes differ.
    pub fn merge(&mut self, rhs: &Self) -> Result<(), MergeError> {
        self.check_compatible(rhs)?;
        for (lhs, rhs) in self.bits.iter_mut().zip(&rhs.bits) {
            *lhs |= *rhs;
        }
        self.count = self.size - count_set_bits(&self.bits);
        log::debug!("merged linear counters with {} bits", self.size);
        Ok(())
    }

    /// Merge all `counters` into a new linear counter over the union of their bitmaps.
    ///
    /// Fails without side effects when `counters` is empty or their sizes differ.
    pub fn merge_all<'a, I>(counters: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let counters: Vec<&Self> = counters.into_iter().collect();
        let (first, rest) = counters.split_first().ok_or(MergeError::Empty)?;
        for counter in rest {
            first.check_compatible(counter)?;
        }

        let mut bits = first.bits.clone();
        for counter in rest {
            for (lhs, rhs) in bits.iter_mut().zip(&counter.bits) {
                *lhs |= *rhs;
            }
        }
        log::debug!(
            "merged {} linear counters with {} bits",
            counters.len(),
            first.size
        );
        Ok(Self::with_bits(bits))
    }
}

impl CardinalityEstimator for LinearCounter {
    #[inline]
    fn offer<T: Display + ?Sized>(&mut self, value: &T) -> bool {
        self.offer_hash(hash_display(value))
    }

    #[inline]
    fn offer_hash(&mut self, hash: u32) -> bool {
        let bit = hash as usize % self.size;
        let mask = 1u8 << (bit % 8);
        let byte = &mut self.bits[bit / 8];
        if *byte & mask != 0 {
            return false;
        }
        *byte |= mask;
        self.count -= 1;
        if self.count == 0 {
            log::warn!(
                "linear counter with {} bits is saturated, estimates are no longer meaningful",
                self.size
            );
        }
        true
    }

    /// Return cardinality estimate.
    ///
    /// A saturated bitmap reports `size * ln(size)`, the estimate of a bitmap
    /// with a single unset bit.
    fn cardinality(&self) -> u64 {
        let size = self.size as f64;
        let count = self.count.max(1) as f64;
        (size * (size / count).ln()).round() as u64
    }

    #[inline]
    fn size_of(&self) -> usize {
        self.bits.len()
    }
}

impl Debug for LinearCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearCounter")
            .field("size", &self.size)
            .field("unset", &self.count)
            .field("estimate", &self.cardinality())
            .finish()
    }
}

/// Target cardinality below which the smallest calibrated bitmap is used.
const MIN_CARDINALITY: i64 = 100;
/// Target cardinality from which bitmap length is extrapolated.
const MAX_CARDINALITY: i64 = 120_000_000;
/// Cardinality per bit for targets from `MAX_CARDINALITY` upwards.
const ABOVE_MAX_FACTOR: i64 = 11;

/// Bitmap length in bits needed to count up to a given cardinality with 1% error.
const ONE_PERCENT_ERROR: [(i64, i64); 49] = [
    (100, 5034),
    (200, 5067),
    (300, 5100),
    (400, 5133),
    (500, 5166),
    (600, 5199),
    (700, 5231),
    (800, 5264),
    (900, 5296),
    (1_000, 5329),
    (2_000, 5647),
    (3_000, 5957),
    (4_000, 6260),
    (5_000, 6556),
    (6_000, 6847),
    (7_000, 7132),
    (8_000, 7412),
    (9_000, 7688),
    (10_000, 7960),
    (20_000, 10506),
    (30_000, 12839),
    (40_000, 15036),
    (50_000, 17134),
    (60_000, 19156),
    (70_000, 21117),
    (80_000, 23029),
    (90_000, 24897),
    (100_000, 26729),
    (200_000, 43710),
    (300_000, 59264),
    (400_000, 73999),
    (500_000, 88175),
    (600_000, 101932),
    (700_000, 115359),
    (800_000, 128514),
    (900_000, 141441),
    (1_000_000, 154171),
    (2_000_000, 274328),
    (3_000_000, 386798),
    (4_000_000, 494794),
    (5_000_000, 599692),
    (6_000_000, 702246),
    (7_000_000, 802931),
    (8_000_000, 902069),
    (9_000_000, 999894),
    (10_000_000, 1096582),
    (50_000_000, 4584297),
    (100_000_000, 8571013),
    (120_000_000, 10112529),
];

/// Builder of [`LinearCounter`]s with a fixed bitmap length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearCounterBuilder {
    /// Bitmap length in bytes
    byte_len: usize,
}

impl LinearCounterBuilder {
    /// Create builder of linear counters with `byte_len` bytes long bitmaps.
    pub fn new(byte_len: usize) -> Self {
        Self { byte_len }
    }

    /// Create builder sized to count up to `max_cardinality` distinct elements with 1% error.
    pub fn one_percent_error(max_cardinality: i64) -> Result<Self, EstimatorError> {
        if max_cardinality <= 0 {
            return Err(EstimatorError::InvalidMaxCardinality(max_cardinality));
        }

        let bits = if max_cardinality <= MIN_CARDINALITY {
            ONE_PERCENT_ERROR[0].1
        } else if max_cardinality >= MAX_CARDINALITY {
            max_cardinality / ABOVE_MAX_FACTOR
        } else {
            // last entry not above the target and the one following it
            let idx = ONE_PERCENT_ERROR.partition_point(|&(c, _)| c <= max_cardinality) - 1;
            let (x0, y0) = ONE_PERCENT_ERROR[idx];
            let (x1, y1) = ONE_PERCENT_ERROR[idx + 1];
            linear_interpolation(max_cardinality, x0, y0, x1, y1)
        };

        let byte_len = (bits as u64).div_ceil(8) as usize;
        log::debug!(
            "sized linear counter for {max_cardinality} distinct elements: {bits} bits ({byte_len} bytes)"
        );
        Ok(Self::new(byte_len))
    }

    /// Return bitmap length in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Build new empty linear counter.
    pub fn build(&self) -> Result<LinearCounter, EstimatorError> {
        LinearCounter::new(self.byte_len)
    }
}

/// Number of set bits in `bits`.
#[inline]
fn count_set_bits(bits: &[u8]) -> usize {
    bits.iter().map(|b| b.count_ones() as usize).sum()
}

/// Value at `x` of the line through `(x0, y0)` and `(x1, y1)`, rounded up.
#[inline]
fn linear_interpolation(x: i64, x0: i64, y0: i64, x1: i64, y1: i64) -> i64 {
    let dy = ((x - x0) * (y1 - y0)) as f64 / (x1 - x0) as f64;
    (y0 as f64 + dy).ceil() as i64
}
