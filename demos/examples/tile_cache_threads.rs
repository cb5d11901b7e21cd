// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrent readers and an editor sharing one hierarchy and cache.
//!
//! The hierarchy sits behind its own lock. Readers take it shared, then query
//! the cache; the editor takes it exclusively, and its events update the
//! cache. The hierarchy lock is always taken before the cache's.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p understory_demos --example tile_cache_threads`

use std::thread;

use parking_lot::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_hierarchy::{Hierarchy, ObjectKind, ObjectTree, PathObject};
use understory_roi::{ImageRegion, Roi};
use understory_tile_cache::{TileCache, TileCacheConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let mut h = Hierarchy::new();
    let cache = TileCache::attach(&mut h, TileCacheConfig::default());
    for i in 0..16 {
        let x = f64::from(i) * 100.0;
        let a = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(x, 0.0, 90.0, 90.0)))
            .unwrap();
        let cells: Vec<_> = (0..32)
            .map(|j| {
                let cx = x + 2.0 + f64::from(j % 8) * 11.0;
                let cy = 2.0 + f64::from(j / 8) * 11.0;
                PathObject::cell(Roi::ellipse(cx, cy, 9.0, 9.0), None)
            })
            .collect();
        let _ = h.add_objects(a, cells).unwrap();
    }
    let h = RwLock::new(h);

    thread::scope(|s| {
        for r in 0..4 {
            let (h, cache) = (&h, &cache);
            s.spawn(move || {
                let mut seen = 0;
                for i in 0..200 {
                    let x = f64::from((i * 7 + r * 13) % 16) * 100.0;
                    let window = ImageRegion::new(x, 0.0, 90.0, 90.0);
                    let tree = h.read();
                    seen += cache
                        .objects_for_region(&*tree, Some(ObjectKind::Cell), Some(&window), false)
                        .len();
                }
                info!(reader = r, seen, "reader done");
            });
        }
        s.spawn(|| {
            for i in 0..50 {
                let mut tree = h.write();
                let root = tree.root();
                let x = f64::from(i % 16) * 100.0 + 40.0;
                let added = tree
                    .add_object(root, PathObject::detection(Roi::rectangle(x, 40.0, 5.0, 5.0)))
                    .unwrap();
                tree.remove_object(added).unwrap();
                if i % 10 == 9 {
                    // Multi-object edits force a rebuild on the next read.
                    let batch = (0..3)
                        .map(|k| PathObject::detection(Roi::rectangle(x + f64::from(k), 10.0, 1.0, 1.0)));
                    let ids = tree.add_objects(root, batch).unwrap();
                    tree.remove_objects(ids).unwrap();
                }
            }
            info!("editor done");
        });
    });

    let tree = h.read();
    println!(
        "final: {} objects indexed, active = {}",
        cache.objects_for_region(&*tree, None, None, true).len(),
        cache.is_active()
    );
}
