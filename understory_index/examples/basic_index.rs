// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Index: insert, query, and remove by key.

use understory_index::{Aabb2D, Index};

fn main() {
    let mut idx = Index::<f64, u32>::with_rtree();
    let k1 = idx.insert(Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0), 1);
    let _k2 = idx.insert(Aabb2D::from_xywh(5.0, 5.0, 10.0, 10.0), 2);

    let hits: Vec<_> = idx.query_rect(Aabb2D::from_xywh(6.0, 6.0, 1.0, 1.0)).collect();
    println!("hits around (6,6): {hits:?}");

    // Removal goes through the key, not the box.
    let removed = idx.remove(k1);
    println!("removed payload {removed:?}; {} entries left", idx.len());
}
