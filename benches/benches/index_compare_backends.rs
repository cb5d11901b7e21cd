// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_index::{Aabb2D, Index, Key};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Aabb2D::<f64>::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn bench_insert_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_query");
    let window = Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0);
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{n}"), |b| {
            b.iter_batched(
                Index::<f64, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.query_rect(window).count());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("rtree_n{n}"), |b| {
            b.iter_batched(
                Index::<f64, u32>::with_rtree,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.query_rect(window).count());
                },
                BatchSize::SmallInput,
            );
        });
        let entries: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| (r, i as u32))
            .collect();
        group.bench_function(format!("rtree_bulk_n{n}"), |b| {
            b.iter(|| {
                let idx = Index::<f64, u32>::with_rtree_bulk(&entries);
                black_box(idx.query_rect(window).count());
            });
        });
    }
    group.finish();
}

fn bench_query_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_heavy_clustered");
    let rects = gen_clustered_rects(40, 250, 120.0);
    let mut queries = Vec::with_capacity(256);
    let mut rng = Rng::new(0xDEAD_BEEF_0BAD_F00D);
    for _ in 0..256 {
        queries.push(Aabb2D::<f64>::from_xywh(
            rng.next_f64() * 2000.0,
            rng.next_f64() * 2000.0,
            80.0,
            80.0,
        ));
    }
    let mut flat = Index::<f64, u32>::new();
    let mut tree = Index::<f64, u32>::with_rtree();
    for (i, r) in rects.iter().copied().enumerate() {
        let _ = flat.insert(r, i as u32);
        let _ = tree.insert(r, i as u32);
    }
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("flatvec", |b| {
        b.iter(|| {
            let hits: usize = queries.iter().map(|q| flat.query_rect(*q).count()).sum();
            black_box(hits);
        });
    });
    group.bench_function("rtree", |b| {
        b.iter(|| {
            let hits: usize = queries.iter().map(|q| tree.query_rect(*q).count()).sum();
            black_box(hits);
        });
    });
    group.finish();
}

fn bench_remove_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_by_key");
    let rects = gen_grid_rects(64, 10.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("rtree", |b| {
        b.iter_batched(
            || {
                let mut idx = Index::<f64, u32>::with_rtree();
                let keys: Vec<Key> = rects
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| idx.insert(r, i as u32))
                    .collect();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for k in keys {
                    black_box(idx.remove(k));
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_query,
    bench_query_heavy,
    bench_remove_by_key
);
criterion_main!(benches);
