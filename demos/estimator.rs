use loglog_estimators::{CardinalityEstimator, Estimator, HyperLogLog, LinearCounterBuilder, LogLog};

fn main() {
    let mut hll1 = HyperLogLog::with_relative_error(0.02).unwrap();
    for i in 0..10 {
        hll1.offer(&i);
    }
    println!("hll1 estimate = {}", hll1.cardinality());

    let mut hll2 = HyperLogLog::with_relative_error(0.02).unwrap();
    for i in 10..15 {
        hll2.offer(&i);
    }
    println!("hll2 estimate = {}", hll2.cardinality());

    hll1.merge(&hll2).unwrap();
    println!("merged estimate = {}", hll1.cardinality());

    let mut estimators: Vec<Estimator> = vec![
        HyperLogLog::new(12).unwrap().into(),
        LogLog::new(12).unwrap().into(),
        LinearCounterBuilder::one_percent_error(100_000)
            .unwrap()
            .build()
            .unwrap()
            .into(),
    ];
    for i in 0..100_000 {
        let item = format!("user-{}", i % 50_000);
        for estimator in estimators.iter_mut() {
            estimator.offer(&item);
        }
    }
    for estimator in &estimators {
        println!(
            "{} estimate = {}, size_of = {} bytes",
            estimator.name(),
            estimator.cardinality(),
            estimator.size_of()
        );
    }
}
