// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_hierarchy::{Hierarchy, ObjectId, ObjectKind, ObjectTree, PathObject};
use understory_roi::{ImageRegion, Roi};
use understory_tile_cache::{IndexBackend, TileCache, TileCacheConfig};

/// `n * n` annotations on a grid, each with `cells` cells inside.
fn build_slide(
    n: usize,
    cells: usize,
    config: TileCacheConfig,
) -> (Hierarchy, Arc<TileCache>, Vec<ObjectId>) {
    let mut h = Hierarchy::new();
    let cache = TileCache::attach(&mut h, config);
    let mut annotations = Vec::with_capacity(n * n);
    for gy in 0..n {
        for gx in 0..n {
            let (x, y) = (gx as f64 * 200.0, gy as f64 * 200.0);
            let a = PathObject::annotation(Roi::rectangle(x, y, 180.0, 180.0));
            let Ok(a) = h.add_object_without_event(h.root(), a) else {
                continue;
            };
            annotations.push(a);
            for i in 0..cells {
                let cx = x + 5.0 + (i % 16) as f64 * 10.0;
                let cy = y + 5.0 + (i / 16) as f64 * 10.0;
                let cell = PathObject::cell(
                    Roi::ellipse(cx, cy, 8.0, 8.0),
                    Some(Roi::ellipse(cx + 2.0, cy + 2.0, 4.0, 4.0)),
                );
                let _ = h.add_object_without_event(a, cell);
            }
        }
    }
    (h, cache, annotations)
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_cache_rebuild");
    for backend in [IndexBackend::RTree, IndexBackend::FlatVec] {
        let config = TileCacheConfig::default().with_index_backend(backend);
        let (h, cache, _) = build_slide(8, 64, config);
        group.throughput(Throughput::Elements(h.len() as u64));
        group.bench_function(format!("{backend:?}"), |b| {
            b.iter(|| {
                cache.reset_cache();
                cache.refresh(&h);
                black_box(cache.len());
            });
        });
    }
    group.finish();
}

fn bench_region_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_cache_query");
    let windows: Vec<_> = (0..64)
        .map(|i| ImageRegion::new((i % 8) as f64 * 190.0, (i / 8) as f64 * 190.0, 150.0, 150.0))
        .collect();
    for backend in [IndexBackend::RTree, IndexBackend::FlatVec] {
        let config = TileCacheConfig::default().with_index_backend(backend);
        let (h, cache, _) = build_slide(8, 64, config);
        cache.refresh(&h);
        group.throughput(Throughput::Elements(windows.len() as u64));
        group.bench_function(format!("cells_{backend:?}"), |b| {
            b.iter(|| {
                let hits: usize = windows
                    .iter()
                    .map(|w| {
                        cache
                            .objects_for_region(&h, Some(ObjectKind::Detection), Some(w), true)
                            .len()
                    })
                    .sum();
                black_box(hits);
            });
        });
        group.bench_function(format!("exists_{backend:?}"), |b| {
            b.iter(|| {
                let hits = windows
                    .iter()
                    .filter(|w| cache.has_objects_for_region(&h, None, Some(*w), true))
                    .count();
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_incremental_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_cache_edits");
    group.bench_function("add_remove_single", |b| {
        b.iter_batched(
            || {
                let (h, cache, annotations) = build_slide(4, 64, TileCacheConfig::default());
                cache.refresh(&h);
                (h, cache, annotations)
            },
            |(mut h, cache, annotations)| {
                for &a in &annotations {
                    let d = PathObject::detection(Roi::rectangle(50.0, 50.0, 4.0, 4.0));
                    if let Ok(id) = h.add_object(a, d) {
                        let _ = h.remove_object(id);
                    }
                }
                black_box(cache.is_active());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_centroid_tests(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_centroid");
    let (h, cache, annotations) = build_slide(2, 256, TileCacheConfig::default());
    let a = annotations[0];
    let children: Vec<_> = h
        .children(a)
        .iter()
        .filter_map(|&id| h.object(id))
        .collect();
    let Some(parent) = h.object(a) else {
        return;
    };
    // Same shapes as the cells, but a kind that goes through the locator.
    let others: Vec<_> = children
        .iter()
        .map(|c| PathObject::new(ObjectKind::Other, c.roi().cloned()))
        .collect();
    group.throughput(Throughput::Elements(children.len() as u64));
    group.bench_function("one_shot_detections", |b| {
        b.iter(|| {
            let inside = children
                .iter()
                .filter(|c| cache.contains_centroid(parent, c).unwrap_or(false))
                .count();
            black_box(inside);
        });
    });
    group.bench_function("cached_locator", |b| {
        b.iter(|| {
            let inside = others
                .iter()
                .filter(|c| cache.contains_centroid(parent, c).unwrap_or(false))
                .count();
            black_box(inside);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rebuild,
    bench_region_queries,
    bench_incremental_edits,
    bench_centroid_tests
);
criterion_main!(benches);
