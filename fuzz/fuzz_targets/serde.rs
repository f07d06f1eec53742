#![no_main]

use libfuzzer_sys::fuzz_target;
use loglog_estimators::{CardinalityEstimator, HyperLogLog, LinearCounter, LogLog};

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = serde_json::from_slice::<HyperLogLog>(data) {
        estimator.offer(&1);
        let serialized = serde_json::to_vec(&estimator).unwrap();
        assert_eq!(serde_json::from_slice::<HyperLogLog>(&serialized).unwrap(), estimator);
    }
    if let Ok(mut estimator) = serde_json::from_slice::<LogLog>(data) {
        estimator.offer(&1);
        let serialized = serde_json::to_vec(&estimator).unwrap();
        assert_eq!(serde_json::from_slice::<LogLog>(&serialized).unwrap(), estimator);
    }
    if let Ok(mut estimator) = serde_json::from_slice::<LinearCounter>(data) {
        estimator.offer(&1);
        assert!(estimator.cardinality() > 0);
    }
});
