// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile cache basics.
//!
//! Build a small hierarchy, query it by region, edit it, and watch the cache
//! apply simple edits in place and rebuild after complex ones.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example tile_cache_basics`

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use understory_hierarchy::{Hierarchy, ObjectKind, ObjectTree, PathObject};
use understory_roi::{ImageRegion, Roi};
use understory_tile_cache::{TileCache, TileCacheConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut h = Hierarchy::new();
    let cache = TileCache::attach(&mut h, TileCacheConfig::default());

    // root -> annotation A -> detection D centred on (5, 5)
    let a = h
        .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    let d = h
        .add_object(a, PathObject::detection(Roi::ellipse(4.0, 4.0, 2.0, 2.0)))
        .unwrap();

    let near = ImageRegion::new(0.0, 0.0, 20.0, 20.0);
    let far = ImageRegion::new(20.0, 20.0, 10.0, 10.0);
    println!("active before first query: {}", cache.is_active());
    println!("near: {:?}", cache.objects_for_region(&h, None, Some(&near), true));
    println!("far:  {:?}", cache.objects_for_region(&h, None, Some(&far), true));
    println!(
        "detections only: {:?}",
        cache.objects_for_region(&h, Some(ObjectKind::Detection), Some(&near), true)
    );

    let (pa, pd) = (h.object(a).unwrap(), h.object(d).unwrap());
    println!("A contains D's centroid: {:?}", cache.contains_centroid(pa, pd));
    println!("A covers D: {:?}", cache.covers(pa, pd));

    // A single-object change is applied in place.
    h.set_roi(d, Some(Arc::new(Roi::rectangle(40.0, 40.0, 2.0, 2.0))))
        .unwrap();
    println!(
        "after moving D, active = {}, far: {:?}",
        cache.is_active(),
        cache.objects_for_region(&h, None, Some(&far), true)
    );

    // Clearing the hierarchy is too broad to patch; the cache goes stale.
    h.clear();
    println!("after clear, active = {}", cache.is_active());
    println!("everything: {:?}", cache.objects_for_region(&h, None, None, true));
    println!("active again: {}", cache.is_active());
}
