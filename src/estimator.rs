//! Cardinality estimators estimate the number of distinct elements in a stream or
//! dataset without storing the elements themselves.
//!
//! Three estimators are provided:
//! - [`HyperLogLog`]: `2^k` 5-bit registers aggregated by harmonic mean,
//!   relative error `1.04 / sqrt(2^k)`.
//! - [`LogLog`]: `2^k` 5-bit registers aggregated by arithmetic mean,
//!   relative error `1.30 / sqrt(2^k)`.
//! - [`LinearCounter`]: bitmap sized for an expected maximum cardinality.
//!
//! # Memory footprint
//! Log-style estimators pack six registers into each `u32` word and keep one spare word:
//! - k = 4: 16 bytes
//! - k = 10: 688 bytes
//! - k = 12: 2736 bytes
//! - k = 14: 10928 bytes
//!
//! Linear counters use one bit per slot, e.g. 667 bytes for up to 1000 distinct
//! elements with 1% error.
//!
//! # Concurrency
//! Estimators are owned values mutated through `&mut self`. To ingest from several
//! threads, give every thread its own estimator and merge them once ingestion is done.

use std::fmt::Display;

use enum_dispatch::enum_dispatch;

use crate::hyperloglog::HyperLogLog;
use crate::linear::LinearCounter;
use crate::loglog::LogLog;

/// Operations shared by all cardinality estimators.
#[enum_dispatch]
pub trait CardinalityEstimator {
    /// Offer a value, hashing its canonical string form.
    /// Returns whether the estimator state changed.
    fn offer<T: Display + ?Sized>(&mut self, value: &T) -> bool;

    /// Offer a precomputed 32-bit hash.
    ///
    /// The hash must come from [`hash32`](crate::hash32) for estimates to stay
    /// consistent with values offered through [`offer`](Self::offer).
    fn offer_hash(&mut self, hash: u32) -> bool;

    /// Return cardinality estimate.
    fn cardinality(&self) -> u64;

    /// Return size of the packed estimator state in bytes.
    fn size_of(&self) -> usize;
}

/// Any of the supported estimators, dispatching [`CardinalityEstimator`] statically.
#[enum_dispatch(CardinalityEstimator)]
#[derive(Clone, Debug, PartialEq)]
pub enum Estimator {
    HyperLogLog(HyperLogLog),
    LogLog(LogLog),
    Linear(LinearCounter),
}

impl Estimator {
    /// Return name of the underlying estimator.
    pub fn name(&self) -> &'static str {
        match self {
            Estimator::HyperLogLog(_) => "hyperloglog",
            Estimator::LogLog(_) => "loglog",
            Estimator::Linear(_) => "linear",
        }
    }
}
