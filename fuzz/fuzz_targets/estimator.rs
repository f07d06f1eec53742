#![no_main]

use libfuzzer_sys::fuzz_target;
use loglog_estimators::{hash32, CardinalityEstimator, HyperLogLog, LinearCounter, LogLog};
use wyhash::wyhash;

fn offer_chunks<E: CardinalityEstimator>(estimator: &mut E, data: &[u8]) {
    for chunk in data.chunks(4) {
        estimator.offer_hash(hash32(chunk));
        assert!(estimator.cardinality() > 0);
        assert!(estimator.size_of() > 0);
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut hll1 = HyperLogLog::new(10).unwrap();
    let mut hll2 = HyperLogLog::new(10).unwrap();
    offer_chunks(&mut hll1, first_half);
    offer_chunks(&mut hll2, second_half);
    let merged = HyperLogLog::merge_all([&hll1, &hll2]).unwrap();
    hll1.merge(&hll2).unwrap();
    assert_eq!(merged, hll1);
    assert!(hll1.cardinality() > 0);

    let mut loglog1 = LogLog::new(10).unwrap();
    let mut loglog2 = LogLog::new(10).unwrap();
    offer_chunks(&mut loglog1, first_half);
    offer_chunks(&mut loglog2, second_half);
    loglog1.merge(&loglog2).unwrap();
    assert!(loglog1.cardinality() > 0);

    let mut linear1 = LinearCounter::new(64).unwrap();
    let mut linear2 = LinearCounter::new(64).unwrap();
    offer_chunks(&mut linear1, first_half);
    offer_chunks(&mut linear2, second_half);
    linear1.merge(&linear2).unwrap();
    assert!(linear1.cardinality() > 0);
});
