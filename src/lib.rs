//! `loglog-estimators` estimates the number of distinct elements in a stream or dataset
//! using HyperLogLog, LogLog and linear counting, with a small fixed memory footprint
//! and mergeable state.
//!
//! ```
//! use loglog_estimators::{CardinalityEstimator, HyperLogLog};
//!
//! let mut lhs = HyperLogLog::with_relative_error(0.01).unwrap();
//! let mut rhs = HyperLogLog::with_relative_error(0.01).unwrap();
//! for i in 0..1000 {
//!     lhs.offer(&i);
//!     rhs.offer(&(i + 500));
//! }
//! let merged = HyperLogLog::merge_all([&lhs, &rhs]).unwrap();
//! let estimate = merged.cardinality();
//! assert!((1450..=1550).contains(&estimate));
//! ```
pub mod error;
pub mod estimator;
mod hash;
pub mod hyperloglog;
pub mod linear;
pub mod log_counter;
pub mod loglog;
pub mod registers;
#[cfg(feature = "with_serde")]
mod serde;

pub use error::{EstimatorError, MergeError};
pub use estimator::{CardinalityEstimator, Estimator};
pub use hash::hash32;
pub use hyperloglog::{HarmonicMean, HyperLogLog};
pub use linear::{LinearCounter, LinearCounterBuilder};
pub use log_counter::{LogCounter, Statistic};
pub use loglog::{ArithmeticMean, LogLog};
pub use registers::RegisterSet;
