use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use long_hash::LongMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;

trait Value: Clone {
    fn new(key: u64) -> Self;
}

#[derive(Clone)]
struct SmallValue {
    _value: u64,
}

impl Value for SmallValue {
    fn new(key: u64) -> Self {
        black_box(Self { _value: key })
    }
}

#[derive(Clone)]
struct LargeValue {
    _value: [u8; 256],
}

impl Value for LargeValue {
    fn new(key: u64) -> Self {
        let mut value = [0u8; 256];
        for (i, byte) in value.iter_mut().enumerate() {
            *byte = ((key >> ((i % 8) * 8)) & 0xFF) as u8;
        }
        black_box(Self { _value: value })
    }
}

/// The operations every contender has to provide.
trait Map<V> {
    const NAME: &'static str;

    fn with_capacity(capacity: usize) -> Self;
    fn insert(&mut self, key: u64, value: V) -> Option<V>;
    fn get(&self, key: u64) -> Option<&V>;
    fn remove(&mut self, key: u64) -> Option<V>;
    fn len(&self) -> usize;
    fn for_each(&self, f: impl FnMut(u64, &V));
    fn retain(&mut self, f: impl FnMut(u64) -> bool);
}

impl<V> Map<V> for LongMap<V> {
    const NAME: &'static str = "long_hash";

    fn with_capacity(capacity: usize) -> Self {
        LongMap::with_capacity(capacity)
    }

    fn insert(&mut self, key: u64, value: V) -> Option<V> {
        LongMap::insert(self, key, value)
    }

    fn get(&self, key: u64) -> Option<&V> {
        LongMap::get(self, key)
    }

    fn remove(&mut self, key: u64) -> Option<V> {
        LongMap::remove(self, key)
    }

    fn len(&self) -> usize {
        LongMap::len(self)
    }

    fn for_each(&self, mut f: impl FnMut(u64, &V)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    fn retain(&mut self, mut f: impl FnMut(u64) -> bool) {
        LongMap::retain(self, |k, _| f(k))
    }
}

impl<V> Map<V> for HashbrownMap<u64, V> {
    const NAME: &'static str = "hashbrown";

    fn with_capacity(capacity: usize) -> Self {
        HashbrownMap::with_capacity(capacity)
    }

    fn insert(&mut self, key: u64, value: V) -> Option<V> {
        HashbrownMap::insert(self, key, value)
    }

    fn get(&self, key: u64) -> Option<&V> {
        HashbrownMap::get(self, &key)
    }

    fn remove(&mut self, key: u64) -> Option<V> {
        HashbrownMap::remove(self, &key)
    }

    fn len(&self) -> usize {
        HashbrownMap::len(self)
    }

    fn for_each(&self, mut f: impl FnMut(u64, &V)) {
        for (k, v) in self.iter() {
            f(*k, v);
        }
    }

    fn retain(&mut self, mut f: impl FnMut(u64) -> bool) {
        HashbrownMap::retain(self, |k, _| f(*k))
    }
}

impl<V> Map<V> for StdHashMap<u64, V> {
    const NAME: &'static str = "std";

    fn with_capacity(capacity: usize) -> Self {
        StdHashMap::with_capacity(capacity)
    }

    fn insert(&mut self, key: u64, value: V) -> Option<V> {
        StdHashMap::insert(self, key, value)
    }

    fn get(&self, key: u64) -> Option<&V> {
        StdHashMap::get(self, &key)
    }

    fn remove(&mut self, key: u64) -> Option<V> {
        StdHashMap::remove(self, &key)
    }

    fn len(&self) -> usize {
        StdHashMap::len(self)
    }

    fn for_each(&self, mut f: impl FnMut(u64, &V)) {
        for (k, v) in self.iter() {
            f(*k, v);
        }
    }

    fn retain(&mut self, mut f: impl FnMut(u64) -> bool) {
        StdHashMap::retain(self, |k, _| f(*k))
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn random_keys(count: usize) -> Vec<u64> {
    let mut rng = OsRng;
    (0..count).map(|_| rng.try_next_u64().unwrap()).collect()
}

fn sequential_keys(count: usize) -> Vec<u64> {
    (1..=count as u64).collect()
}

fn shuffled(keys: &[u64]) -> Vec<u64> {
    let mut keys = keys.to_vec();
    keys.shuffle(&mut SmallRng::from_os_rng());
    keys
}

fn filled<V: Value, M: Map<V>>(keys: &[u64]) -> M {
    let mut map = M::with_capacity(0);
    for &key in keys {
        map.insert(key, V::new(key));
    }
    map
}

fn bench_insert<V: Value, M: Map<V>>(
    c: &mut Criterion,
    label: &str,
    make_keys: fn(usize) -> Vec<u64>,
) {
    let mut group = c.benchmark_group(format!("insert_{}_{}", label, core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = make_keys(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = M::with_capacity(0);
                    for key in keys {
                        black_box(map.insert(key, V::new(key)));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<V: Value, M: Map<V>>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size * 2);
        let (present, _) = keys.split_at(size);
        let map = filled::<V, M>(present);

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut hits = 0usize;
                    for key in keys {
                        if black_box(map.get(key)).is_some() {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_remove<V: Value, M: Map<V>>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = sequential_keys(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter_batched(
                || (filled::<V, M>(&keys), shuffled(&keys)),
                |(mut map, keys)| {
                    for key in keys {
                        black_box(map.remove(key));
                    }
                    assert_eq!(map.len(), 0);
                    black_box(map)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<V: Value, M: Map<V>>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let map = filled::<V, M>(&random_keys(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                map.for_each(|k, v| {
                    sum = sum.wrapping_add(k);
                    black_box(v);
                });
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_retain_half<V: Value, M: Map<V>>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("retain_half_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = sequential_keys(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter_batched(
                || filled::<V, M>(&keys),
                |mut map| {
                    map.retain(|k| k % 2 == 0);
                    black_box(map)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_churn<V: Value, M: Map<V>>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<V>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        // Every key is inserted once and removed once, in random order.
        let keys = sequential_keys(size)
            .into_iter()
            .flat_map(|key| [key, key])
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(format!("{}/{}", M::NAME, size), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut map = M::with_capacity(0);
                    for key in keys {
                        if map.remove(key).is_none() {
                            map.insert(key, V::new(key));
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_probabilistic_zipf<V: Value, M: Map<V>>(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "mixed_probabilistic_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<V>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        const KEY_SPACE_MULTIPLIER: f64 = 2.0;

        for &size in SIZES {
            let mut rng = SmallRng::from_os_rng();
            let op_distr = Zipf::new(3.0, exponent).unwrap();
            let operations = (0..size * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(op_distr);
                    if op_choice <= 1.0 {
                        Operation::Find
                    } else if op_choice <= 2.0 {
                        Operation::Insert
                    } else {
                        Operation::Remove
                    }
                })
                .collect::<Vec<Operation>>();

            let insert_distr = Zipf::new(size as f64, 1.0).unwrap();
            let find_remove_distr = Zipf::new(size as f64 * KEY_SPACE_MULTIPLIER, 1.0).unwrap();

            group.throughput(Throughput::Elements(operations.len() as u64));
            group.bench_function(format!("{}/{}", M::NAME, size), |b| {
                b.iter_batched(
                    || {
                        let mut operations = operations.clone();
                        operations.shuffle(&mut SmallRng::from_os_rng());
                        (operations, SmallRng::from_os_rng())
                    },
                    |(operations, mut rng)| {
                        let mut map = M::with_capacity(0);
                        for operation in operations {
                            match operation {
                                Operation::Insert => {
                                    let key = rng.sample(insert_distr) as u64;
                                    black_box(map.insert(key, V::new(key)));
                                }
                                Operation::Remove => {
                                    let key = rng.sample(find_remove_distr) as u64;
                                    black_box(map.remove(key));
                                }
                                Operation::Find => {
                                    let key = rng.sample(find_remove_distr) as u64;
                                    black_box(map.get(key));
                                }
                            }
                        }
                        black_box(map)
                    },
                    BatchSize::SmallInput,
                )
            });
        }

        group.finish();
    }
}

fn bench_all<V: Value>(c: &mut Criterion) {
    bench_insert::<V, LongMap<V>>(c, "random", random_keys);
    bench_insert::<V, HashbrownMap<u64, V>>(c, "random", random_keys);
    bench_insert::<V, StdHashMap<u64, V>>(c, "random", random_keys);

    bench_insert::<V, LongMap<V>>(c, "sequential", sequential_keys);
    bench_insert::<V, HashbrownMap<u64, V>>(c, "sequential", sequential_keys);
    bench_insert::<V, StdHashMap<u64, V>>(c, "sequential", sequential_keys);

    bench_find_hit_miss::<V, LongMap<V>>(c);
    bench_find_hit_miss::<V, HashbrownMap<u64, V>>(c);
    bench_find_hit_miss::<V, StdHashMap<u64, V>>(c);

    bench_remove::<V, LongMap<V>>(c);
    bench_remove::<V, HashbrownMap<u64, V>>(c);
    bench_remove::<V, StdHashMap<u64, V>>(c);

    bench_iteration::<V, LongMap<V>>(c);
    bench_iteration::<V, HashbrownMap<u64, V>>(c);
    bench_iteration::<V, StdHashMap<u64, V>>(c);

    bench_retain_half::<V, LongMap<V>>(c);
    bench_retain_half::<V, HashbrownMap<u64, V>>(c);
    bench_retain_half::<V, StdHashMap<u64, V>>(c);

    bench_churn::<V, LongMap<V>>(c);
    bench_churn::<V, HashbrownMap<u64, V>>(c);
    bench_churn::<V, StdHashMap<u64, V>>(c);

    bench_mixed_probabilistic_zipf::<V, LongMap<V>>(c);
    bench_mixed_probabilistic_zipf::<V, HashbrownMap<u64, V>>(c);
    bench_mixed_probabilistic_zipf::<V, StdHashMap<u64, V>>(c);
}

criterion_group!(
    benches,
    bench_all::<SmallValue>,
    bench_all::<LargeValue>,
);

criterion_main!(benches);
