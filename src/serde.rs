//! # Serde module for estimators
//!
//! Estimators are serialized as their raw state only, everything derived from it is
//! recomputed during deserialization:
//! - `RegisterSet` as a `(count, words)` tuple
//! - `LogCounter` (`HyperLogLog`, `LogLog`) as a `(precision, words)` tuple, the
//!   statistic (bias constant, register sum) is rebuilt from the registers
//! - `LinearCounter` as its bitmap bytes, the number of unset bits is recounted
//!
//! Deserialization rejects state that could not have been produced by an estimator,
//! such as an out of range precision or a register word count not matching it.
use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EstimatorError;
use crate::linear::LinearCounter;
use crate::log_counter::{LogCounter, Statistic, MAX_PRECISION, MIN_PRECISION};
use crate::registers::RegisterSet;

impl Serialize for RegisterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.count())?;
        tup.serialize_element(self.words())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for RegisterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (count, words): (usize, Vec<u32>) = Deserialize::deserialize(deserializer)?;
        RegisterSet::from_words(count, words).map_err(Error::custom)
    }
}

impl<S: Statistic> Serialize for LogCounter<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(self.registers().words())?;
        tup.end()
    }
}

impl<'de, S: Statistic> Deserialize<'de> for LogCounter<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (precision, words): (u32, Vec<u32>) = Deserialize::deserialize(deserializer)?;
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::custom(EstimatorError::InvalidPrecision(precision)));
        }
        let registers = RegisterSet::from_words(1 << precision, words).map_err(Error::custom)?;
        LogCounter::from_registers(precision, registers).map_err(Error::custom)
    }
}

impl Serialize for LinearCounter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LinearCounter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits: Vec<u8> = Deserialize::deserialize(deserializer)?;
        LinearCounter::from_bytes(bits).map_err(Error::custom)
    }
}
