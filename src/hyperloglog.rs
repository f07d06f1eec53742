//! ## HyperLogLog
//! Log-style counter aggregating registers with a harmonic mean:
//! - `Z = sum(2^-M[i])` over all `m` registers
//! - `E = alpha_m * m^2 / Z`
//!
//! The harmonic sum is computed when the estimate is requested, so raising a register
//! is a plain overwrite.
//!
//! Expected error: `1.04 / sqrt(m)`, e.g.
//! - k = 10: 1.04 / sqrt(2^10) = 3.25%
//! - k = 12: 1.04 / sqrt(2^12) = 1.62%
//! - k = 14: 1.04 / sqrt(2^14) = 0.81%
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

use crate::log_counter::{LogCounter, Statistic};
use crate::registers::RegisterSet;

/// HyperLogLog cardinality estimator.
pub type HyperLogLog = LogCounter<HarmonicMean>;

/// Harmonic mean aggregation of HyperLogLog registers.
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicMean {
    /// Bias correction constant multiplied by `m^2`
    alpha_mm: f64,
}

impl HarmonicMean {
    /// Return bias correction constant multiplied by `m^2`.
    #[inline]
    pub fn alpha_mm(&self) -> f64 {
        self.alpha_mm
    }
}

impl Statistic for HarmonicMean {
    const ERROR_FACTOR: f64 = 1.0816;

    fn new(precision: u32, _registers: &RegisterSet) -> Self {
        let m = 1u64 << precision;
        Self {
            alpha_mm: alpha(m) * (m as f64) * (m as f64),
        }
    }

    #[inline]
    fn update(&mut self, registers: &mut RegisterSet, bucket: usize, rank: u32) {
        registers.set(bucket, rank);
    }

    fn raw_estimate(&self, registers: &RegisterSet) -> f64 {
        let sum: f64 = registers
            .iter()
            .map(|rank| 1.0 / ((1u64 << rank) as f64))
            .sum();
        self.alpha_mm / sum
    }
}

/// Parameter for bias correction with `m` registers
#[inline]
fn alpha(m: u64) -> f64 {
    // fixed values for tiny register counts, below the 16 registers of the lowest precision
    match m {
        4 => 0.673,
        5 => 0.697,
        6 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}
