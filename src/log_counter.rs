//! ## Log-style counter
//! Shared machinery of LogLog-family estimators with `m = 2^k` registers.
//!
//! Every offered value is hashed into 32 bits and split into:
//! - top `k` bits      - register (bucket) index `j`
//! - low `32 - k` bits - tail, whose 1-based position of the first set bit is the rank `r`
//!
//! Register `j` holds the maximum rank observed for its bucket, so every register
//! estimates `log2` of the number of distinct values routed to it. How registers are
//! aggregated into a raw estimate is defined by a [`Statistic`]:
//! - [`HarmonicMean`](crate::hyperloglog::HarmonicMean) for HyperLogLog
//! - [`ArithmeticMean`](crate::loglog::ArithmeticMean) for LogLog
//!
//! Raw estimates are corrected for small cardinalities (linear counting over zero
//! registers) and for cardinalities approaching the 32-bit hash space.

use std::fmt::{Debug, Display, Formatter};
use std::mem::size_of;

use crate::error::{EstimatorError, MergeError};
use crate::estimator::CardinalityEstimator;
use crate::hash::hash_display;
use crate::registers::RegisterSet;

/// Minimum supported precision
pub const MIN_PRECISION: u32 = 4;
/// Maximum supported precision
pub const MAX_PRECISION: u32 = 31;
/// Number of bits of a hash
const HASH_BITS: u32 = u32::BITS;
/// Size of the 32-bit hash space, `2^32`
const HASH_SPACE: f64 = 4_294_967_296.0;

/// Register aggregation of a [`LogCounter`].
pub trait Statistic: Clone + Debug + PartialEq {
    /// Squared standard error factor: the relative standard error with `m` registers
    /// is `sqrt(ERROR_FACTOR / m)`.
    const ERROR_FACTOR: f64;

    /// Create statistic for `2^precision` registers currently holding `registers`.
    fn new(precision: u32, registers: &RegisterSet) -> Self;

    /// Raise register `bucket` to `rank`. Only called when `rank` exceeds the current value.
    fn update(&mut self, registers: &mut RegisterSet, bucket: usize, rank: u32);

    /// Compute raw (uncorrected) cardinality estimate.
    fn raw_estimate(&self, registers: &RegisterSet) -> f64;
}

/// LogLog-family estimator with `2^k` registers aggregated by statistic `S`.
#[derive(Clone, PartialEq)]
pub struct LogCounter<S: Statistic> {
    /// Precision parameter `k`
    precision: u32,
    /// Number of registers, `2^k`
    m: usize,
    /// Registers holding maximum observed ranks
    registers: RegisterSet,
    /// Register aggregation
    statistic: S,
}

impl<S: Statistic> LogCounter<S> {
    /// Create new estimator with `2^precision` registers.
    pub fn new(precision: u32) -> Result<Self, EstimatorError> {
        validate_precision(precision)?;
        let m = 1usize << precision;
        let registers = RegisterSet::new(m);
        let statistic = S::new(precision, &registers);
        log::debug!("created log counter with precision {precision} ({m} registers)");
        Ok(Self {
            precision,
            m,
            registers,
            statistic,
        })
    }

    /// Create new estimator with the smallest precision achieving relative standard error `rse`.
    ///
    /// The achieved error is theoretical, practical results follow it closely.
    pub fn with_relative_error(rse: f64) -> Result<Self, EstimatorError> {
        Self::new(required_precision(rse, S::ERROR_FACTOR)?)
    }

    /// Rebuild estimator from previously accumulated `registers`.
    pub fn from_registers(precision: u32, registers: RegisterSet) -> Result<Self, EstimatorError> {
        validate_precision(precision)?;
        let m = 1usize << precision;
        if registers.count() != m {
            return Err(EstimatorError::RegisterCountMismatch {
                expected: m,
                got: registers.count(),
            });
        }
        let statistic = S::new(precision, &registers);
        Ok(Self {
            precision,
            m,
            registers,
            statistic,
        })
    }

    /// Return precision parameter `k`.
    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Return number of registers `m`.
    #[inline]
    pub fn register_count(&self) -> usize {
        self.m
    }

    /// Return registers.
    #[inline]
    pub fn registers(&self) -> &RegisterSet {
        &self.registers
    }

    /// Return register aggregation.
    #[inline]
    pub fn statistic(&self) -> &S {
        &self.statistic
    }

    /// Split `hash` into register index and rank.
    #[inline]
    fn bucket_and_rank(&self, hash: u32) -> (usize, u32) {
        let bucket = (hash >> (HASH_BITS - self.precision)) as usize;
        // an all-zero tail ranks just past its last bit; uncapped it would reach 33,
        // which does not fit a 5-bit register and would wrap to 1
        let tail_bits = HASH_BITS - self.precision;
        let rank = ((hash << self.precision).leading_zeros() + 1).min(tail_bits + 1);
        (bucket, rank)
    }

    /// Apply small and large range corrections to raw estimate `e`.
    fn corrected_estimate(&self, e: f64) -> u64 {
        let m = self.m as f64;
        if e <= 2.5 * m {
            let zeros = self.registers.zeros();
            if zeros > 0 {
                return (m * (m / zeros as f64).ln()).round() as u64;
            }
            e.round() as u64
        } else if e <= HASH_SPACE / 30.0 {
            e.round() as u64
        } else {
            (-HASH_SPACE * (1.0 - e / HASH_SPACE).ln()).round() as u64
        }
    }

    /// Check that `rhs` has as many registers as `self`.
    #[inline]
    fn check_compatible(&self, rhs: &Self) -> Result<(), MergeError> {
        if rhs.m != self.m {
            return Err(MergeError::SizeMismatch {
                expected: self.m,
                got: rhs.m,
            });
        }
        Ok(())
    }

    /// Raise every register to the maximum of both estimators.
    fn merge_registers(&mut self, rhs: &Self) {
        for (idx, rhs_rank) in rhs.registers.iter().enumerate() {
            if rhs_rank > self.registers.get(idx) {
                self.statistic.update(&mut self.registers, idx, rhs_rank);
            }
        }
    }

    /// Merge `rhs` into `self`, leaving `self` untouched when sizes differ.
    pub fn merge(&mut self, rhs: &Self) -> Result<(), MergeError> {
        self.check_compatible(rhs)?;
        self.merge_registers(rhs);
        log::debug!("merged log counters with {} registers", self.m);
        Ok(())
    }

    /// Merge all `counters` into a new estimator.
    ///
    /// Fails without side effects when `counters` is empty or their sizes differ.
    pub fn merge_all<'a, I>(counters: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = &'a Self>,
        S: 'a,
    {
        let counters: Vec<&Self> = counters.into_iter().collect();
        let (first, rest) = counters.split_first().ok_or(MergeError::Empty)?;
        for counter in rest {
            first.check_compatible(counter)?;
        }

        let mut merged = Self::clone(first);
        for counter in rest {
            merged.merge_registers(counter);
        }
        log::debug!(
            "merged {} log counters with {} registers",
            counters.len(),
            merged.m
        );
        Ok(merged)
    }
}

impl<S: Statistic> CardinalityEstimator for LogCounter<S> {
    #[inline]
    fn offer<T: Display + ?Sized>(&mut self, value: &T) -> bool {
        self.offer_hash(hash_display(value))
    }

    #[inline]
    fn offer_hash(&mut self, hash: u32) -> bool {
        let (bucket, rank) = self.bucket_and_rank(hash);
        if rank > self.registers.get(bucket) {
            self.statistic.update(&mut self.registers, bucket, rank);
            return true;
        }
        false
    }

    fn cardinality(&self) -> u64 {
        let e = self.statistic.raw_estimate(&self.registers);
        self.corrected_estimate(e)
    }

    #[inline]
    fn size_of(&self) -> usize {
        self.registers.bucket_count() * size_of::<u32>()
    }
}

impl<S: Statistic> Debug for LogCounter<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCounter")
            .field("precision", &self.precision)
            .field("statistic", &self.statistic)
            .field("estimate", &self.cardinality())
            .field("size", &self.size_of())
            .finish()
    }
}

/// Ensure `precision` is within supported range.
#[inline]
fn validate_precision(precision: u32) -> Result<(), EstimatorError> {
    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return Err(EstimatorError::InvalidPrecision(precision));
    }
    Ok(())
}

/// Smallest precision `k` with `sqrt(error_factor / 2^k) <= rse`.
fn required_precision(rse: f64, error_factor: f64) -> Result<u32, EstimatorError> {
    if !(rse > 0.0 && rse < 1.0) {
        return Err(EstimatorError::InvalidRelativeError(rse));
    }
    let k = ((error_factor.ln() - 2.0 * rse.ln()) / 2f64.ln()).ceil();
    if k > f64::from(MAX_PRECISION) {
        return Err(EstimatorError::InvalidRelativeError(rse));
    }
    Ok((k as u32).max(MIN_PRECISION))
}
