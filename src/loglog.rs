//! ## LogLog
//! Log-style counter aggregating registers with an arithmetic mean:
//! - `E = alpha_m * m * 2^(sum(M[i]) / m)`
//!
//! The register sum is kept up to date on every register change by adding the
//! difference between the new and the old rank, so estimation never rescans the
//! registers for it.
//!
//! Expected error: `1.30 / sqrt(m)`.
//!
//! Paper: *Loglog Counting of Large Cardinalities* by M. Durand and P. Flajolet.

use crate::log_counter::{LogCounter, Statistic};
use crate::registers::RegisterSet;

/// LogLog cardinality estimator.
pub type LogLog = LogCounter<ArithmeticMean>;

/// Bias correction constant `alpha_m` for `m = 2^k`, `k` in [0..6] range.
///
/// Computed as `(gamma(-1/m) * (1 - 2^(1/m)) / ln(2))^-m`.
const ALPHA: [f64; 7] = [
    0.0,
    0.222839630027075,
    0.312015983556785,
    0.354890690500987,
    0.376032697405068,
    0.386541248923512,
    0.391781118798575,
];

/// Limit of `alpha_m` as `m` grows, used for `m >= 128` without detectable bias.
const ALPHA_INFINITY: f64 = 0.39701;

/// Arithmetic mean aggregation of LogLog registers.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticMean {
    /// Number of registers
    m: usize,
    /// Bias correction constant multiplied by `m`
    m_alpha: f64,
    /// Sum of all register values
    sum: u64,
}

impl ArithmeticMean {
    /// Return bias correction constant multiplied by `m`.
    #[inline]
    pub fn m_alpha(&self) -> f64 {
        self.m_alpha
    }

    /// Return sum of all register values.
    #[inline]
    pub fn sum(&self) -> u64 {
        self.sum
    }
}

impl Statistic for ArithmeticMean {
    const ERROR_FACTOR: f64 = 1.69;

    fn new(precision: u32, registers: &RegisterSet) -> Self {
        let m = 1usize << precision;
        let alpha = ALPHA
            .get(precision as usize)
            .copied()
            .unwrap_or(ALPHA_INFINITY);
        Self {
            m,
            m_alpha: m as f64 * alpha,
            sum: registers.iter().map(u64::from).sum(),
        }
    }

    #[inline]
    fn update(&mut self, registers: &mut RegisterSet, bucket: usize, rank: u32) {
        let old_rank = registers.get(bucket);
        // callers only ever raise a register
        self.sum += u64::from(rank - old_rank);
        registers.set(bucket, rank);
    }

    fn raw_estimate(&self, _registers: &RegisterSet) -> f64 {
        let mean = self.sum as f64 / self.m as f64;
        (self.m_alpha * mean.exp2()).round()
    }
}
