// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache configuration.

use understory_hierarchy::KindSet;

/// Range structure used for each per-kind index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexBackend {
    /// `rstar` R-tree; logarithmic queries.
    #[default]
    RTree,
    /// Flat vector with linear scans; fine for small hierarchies.
    FlatVec,
}

/// Configuration for a [`TileCache`](crate::TileCache).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCacheConfig {
    /// Kinds whose precise geometry, centroid and locator are retained.
    ///
    /// Keep high-cardinality kinds (detections) out of this set so memory
    /// stays bounded.
    pub stable_kinds: KindSet,
    /// Range structure for the per-kind indices.
    pub index_backend: IndexBackend,
    /// Sweep envelope and derived entries for dropped shapes on every full
    /// rebuild.
    pub purge_on_rebuild: bool,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self {
            stable_kinds: KindSet::ANNOTATION | KindSet::TMA_CORE,
            index_backend: IndexBackend::RTree,
            purge_on_rebuild: true,
        }
    }
}

impl TileCacheConfig {
    /// Set [`stable_kinds`](Self::stable_kinds).
    pub fn with_stable_kinds(mut self, kinds: KindSet) -> Self {
        self.stable_kinds = kinds;
        self
    }

    /// Set [`index_backend`](Self::index_backend).
    pub fn with_index_backend(mut self, backend: IndexBackend) -> Self {
        self.index_backend = backend;
        self
    }

    /// Set [`purge_on_rebuild`](Self::purge_on_rebuild).
    pub fn with_purge_on_rebuild(mut self, purge: bool) -> Self {
        self.purge_on_rebuild = purge;
        self
    }
}
