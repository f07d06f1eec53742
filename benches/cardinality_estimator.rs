#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::hash::BuildHasherDefault;

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use hyperloglogplus::HyperLogLog as HyperLogLogTrait;
use loglog_estimators::{CardinalityEstimator, LinearCounterBuilder};
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use wyhash::WyHash;

/// Offer and estimate operations are benchmarked against cardinalities ranging from 0 to
/// `DEFAULT_MAX_CARDINALITY` or environment variable `N` (if defined) with cardinality doubled
/// with every iteration as [0, 1, 2, ..., N].
const DEFAULT_MAX_CARDINALITY: usize = 256;

/// Precision of the log-style estimators under benchmark.
const PRECISION: u32 = 12;

/// Cardinality the linear counter is sized for.
const LINEAR_TARGET: i64 = 1 << 20;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let bench_results_path = std::env::var("BENCH_RESULTS_PATH").unwrap_or_else(|_| {
        format!("{}/target", env!("CARGO_MANIFEST_DIR"))
    });
    let max_cardinality = std::env::var("N")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CARDINALITY);

    let cardinalities: Vec<usize> = std::iter::once(0)
        .chain((0..).map(|c| 1 << c))
        .take_while(|&c| c <= max_cardinality)
        .collect();

    let mut group = c.benchmark_group("offer");
    for &cardinality in &cardinalities {
        group.throughput(Throughput::Elements(cardinality.max(1) as u64));
        bench_offer::<HyperLogLog>(&mut group, cardinality);
        bench_offer::<LogLog>(&mut group, cardinality);
        bench_offer::<LinearCounter>(&mut group, cardinality);
        bench_offer::<HyperLogLogPlus>(&mut group, cardinality);
        bench_offer::<ProbabilisticCollections>(&mut group, cardinality);
    }
    group.finish();

    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));
    for &cardinality in &cardinalities {
        bench_estimate::<HyperLogLog>(&mut group, cardinality);
        bench_estimate::<LogLog>(&mut group, cardinality);
        bench_estimate::<LinearCounter>(&mut group, cardinality);
        bench_estimate::<HyperLogLogPlus>(&mut group, cardinality);
        bench_estimate::<ProbabilisticCollections>(&mut group, cardinality);
    }
    group.finish();

    let results: Vec<StatRecord> = cardinalities
        .iter()
        .map(|&cardinality| StatRecord {
            cardinality,
            hyperloglog: measure_allocations::<HyperLogLog>(cardinality),
            loglog: measure_allocations::<LogLog>(cardinality),
            linear_counter: measure_allocations::<LinearCounter>(cardinality),
            hyperloglogplus: measure_allocations::<HyperLogLogPlus>(cardinality),
            probabilistic_collections: measure_allocations::<ProbabilisticCollections>(
                cardinality,
            ),
        })
        .collect();
    write_table(&bench_results_path, "memory_usage.md", results);

    let results: Vec<StatRecord> = cardinalities
        .iter()
        .map(|&cardinality| StatRecord {
            cardinality,
            hyperloglog: measure_error::<HyperLogLog>(cardinality),
            loglog: measure_error::<LogLog>(cardinality),
            linear_counter: measure_error::<LinearCounter>(cardinality),
            hyperloglogplus: measure_error::<HyperLogLogPlus>(cardinality),
            probabilistic_collections: measure_error::<ProbabilisticCollections>(cardinality),
        })
        .collect();
    write_table(&bench_results_path, "relative_error.md", results);
}

fn write_table(dir: &str, name: &str, records: Vec<StatRecord>) {
    let table_config = Settings::default().with(Style::markdown());
    std::fs::write(
        format!("{}/{}", dir, name),
        Table::new(records).with(table_config).to_string(),
    )
    .unwrap();
}

/// Estimator operations shared by the benchmarked implementations.
trait BenchEstimator {
    fn new() -> Self;
    fn offer(&mut self, item: &usize);
    fn estimate(&mut self) -> usize;
    fn name() -> String;
}

fn bench_offer<E: BenchEstimator>(group: &mut BenchmarkGroup<WallTime>, cardinality: usize) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), cardinality),
        &cardinality,
        |b, &cardinality| {
            b.iter(|| {
                let mut estimator = E::new();
                for i in 0..black_box(cardinality) {
                    estimator.offer(black_box(&i));
                }
            });
        },
    );
}

fn bench_estimate<E: BenchEstimator>(group: &mut BenchmarkGroup<WallTime>, cardinality: usize) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), cardinality),
        &cardinality,
        |b, &cardinality| {
            let mut estimator = E::new();
            for i in 0..black_box(cardinality) {
                estimator.offer(black_box(&i));
            }
            b.iter(|| estimator.estimate());
        },
    );
}

fn measure_allocations<E: BenchEstimator>(cardinality: usize) -> String {
    let _profiler = dhat::Profiler::builder().testing().build();
    let mut estimator = E::new();
    for i in 0..cardinality {
        estimator.offer(&i);
    }
    let stats = dhat::HeapStats::get();
    format!("{} / {}", stats.total_bytes, stats.total_blocks)
}

fn measure_error<E: BenchEstimator>(cardinality: usize) -> String {
    let n = 100;
    let mut total_relative_error: f64 = 0.0;
    let mut rng = StdRng::seed_from_u64(12345);
    for _ in 0..n {
        let mut estimator = E::new();
        for _ in 0..cardinality {
            estimator.offer(&rng.gen());
        }
        let relative_error = if cardinality == 0 {
            0.0
        } else {
            (estimator.estimate() as f64 - cardinality as f64).abs() / cardinality as f64
        };
        total_relative_error += relative_error;
    }
    let avg_relative_error = total_relative_error / (n as f64);

    if avg_relative_error < 1.0 {
        format!("{:.4}", avg_relative_error)
    } else {
        format!("{:.2e}", avg_relative_error)
    }
}

#[derive(Tabled)]
struct StatRecord {
    cardinality: usize,
    hyperloglog: String,
    loglog: String,
    linear_counter: String,
    hyperloglogplus: String,
    probabilistic_collections: String,
}

struct HyperLogLog(loglog_estimators::HyperLogLog);

impl BenchEstimator for HyperLogLog {
    fn new() -> Self {
        Self(loglog_estimators::HyperLogLog::new(PRECISION).unwrap())
    }

    fn offer(&mut self, item: &usize) {
        self.0.offer(item);
    }

    fn estimate(&mut self) -> usize {
        self.0.cardinality() as usize
    }

    fn name() -> String {
        "hyperloglog".to_string()
    }
}

struct LogLog(loglog_estimators::LogLog);

impl BenchEstimator for LogLog {
    fn new() -> Self {
        Self(loglog_estimators::LogLog::new(PRECISION).unwrap())
    }

    fn offer(&mut self, item: &usize) {
        self.0.offer(item);
    }

    fn estimate(&mut self) -> usize {
        self.0.cardinality() as usize
    }

    fn name() -> String {
        "loglog".to_string()
    }
}

struct LinearCounter(loglog_estimators::LinearCounter);

impl BenchEstimator for LinearCounter {
    fn new() -> Self {
        let builder = LinearCounterBuilder::one_percent_error(LINEAR_TARGET).unwrap();
        Self(builder.build().unwrap())
    }

    fn offer(&mut self, item: &usize) {
        self.0.offer(item);
    }

    fn estimate(&mut self) -> usize {
        self.0.cardinality() as usize
    }

    fn name() -> String {
        "linear-counter".to_string()
    }
}

struct HyperLogLogPlus(hyperloglogplus::HyperLogLogPlus<usize, BuildHasherDefault<WyHash>>);

impl BenchEstimator for HyperLogLogPlus {
    fn new() -> Self {
        Self(
            hyperloglogplus::HyperLogLogPlus::new(
                PRECISION as u8,
                BuildHasherDefault::<WyHash>::default(),
            )
            .unwrap(),
        )
    }

    fn offer(&mut self, item: &usize) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> usize {
        self.0.count() as usize
    }

    fn name() -> String {
        "hyperloglogplus".to_string()
    }
}

struct ProbabilisticCollections(probabilistic_collections::hyperloglog::HyperLogLog<usize>);

impl BenchEstimator for ProbabilisticCollections {
    fn new() -> Self {
        // same theoretical error as `PRECISION` registers
        Self(probabilistic_collections::hyperloglog::HyperLogLog::new(
            0.01625,
        ))
    }

    fn offer(&mut self, item: &usize) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> usize {
        self.0.len() as usize
    }

    fn name() -> String {
        "probabilistic-collections".to_string()
    }
}
