use core::hint::black_box;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownHashMap;
use quad_hash::HashMap as QuadHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

const SIZES: &[usize] = &[1_000, 100_000];

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(OsRng.try_next_u64().expect("OsRng failure"))
}

fn keys(rng: &mut SmallRng, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.random()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("quad_hash/{size}"), |b| {
            let mut rng = rng();
            b.iter_batched(
                || keys(&mut rng, size),
                |keys| {
                    let mut map = QuadHashMap::new();
                    for key in keys {
                        map.insert(key, key);
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            let mut rng = rng();
            b.iter_batched(
                || keys(&mut rng, size),
                |keys| {
                    let mut map = HashbrownHashMap::new();
                    for key in keys {
                        map.insert(key, key);
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let mut rng = rng();
        let keys = keys(&mut rng, size);

        let mut quad = QuadHashMap::new();
        let mut brown = HashbrownHashMap::new();
        for &key in &keys {
            quad.insert(key, key);
            brown.insert(key, key);
        }
        let mut probes = keys.clone();
        probes.shuffle(&mut rng);

        group.bench_function(format!("quad_hash/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &probes {
                    if quad.get(black_box(key)).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &probes {
                    if brown.get(black_box(key)).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("quad_hash/{size}"), |b| {
            let mut rng = rng();
            b.iter_batched(
                || keys(&mut rng, size),
                |keys| {
                    let mut map = QuadHashMap::new();
                    for &key in &keys {
                        map.insert(key, key);
                    }
                    for &key in &keys {
                        black_box(map.remove(&key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            let mut rng = rng();
            b.iter_batched(
                || keys(&mut rng, size),
                |keys| {
                    let mut map = HashbrownHashMap::new();
                    for &key in &keys {
                        map.insert(key, key);
                    }
                    for &key in &keys {
                        black_box(map.remove(&key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_churn);
criterion_main!(benches);
