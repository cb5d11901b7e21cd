// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translating hierarchy events into registry edits.

use tracing::debug;
use understory_hierarchy::{
    HierarchyEvent, HierarchyEventKind, HierarchyListener, ObjectId, ObjectTree,
};

use crate::cache::TileCache;

/// What the cache does in response to one event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventAction {
    /// Remove the object, then insert it again.
    Reinsert {
        /// Changed object.
        object: ObjectId,
        /// Whether the object's subtree is removed and inserted as well.
        with_children: bool,
    },
    /// Remove the object and its subtree.
    Remove {
        /// Removed object.
        object: ObjectId,
    },
    /// Mark the cache stale.
    Reset,
}

impl EventAction {
    /// Decide how to apply `event`.
    ///
    /// | Event | Action |
    /// |---|---|
    /// | `Added`, one object | reinsert with children |
    /// | `Removed`, one object | remove with children |
    /// | `StructureChanged` / `ObjectChanged`, one non-root object | reinsert without children |
    /// | anything else | reset |
    pub fn plan(event: &HierarchyEvent, root: ObjectId) -> Self {
        use HierarchyEventKind as K;
        match (event.kind, event.single()) {
            (K::Added, Some(object)) => Self::Reinsert {
                object,
                with_children: true,
            },
            (K::Removed, Some(object)) => Self::Remove { object },
            (K::StructureChanged | K::ObjectChanged, Some(object)) if object != root => {
                Self::Reinsert {
                    object,
                    with_children: false,
                }
            }
            _ => Self::Reset,
        }
    }
}

impl HierarchyListener for TileCache {
    fn hierarchy_changed(&self, tree: &dyn ObjectTree, event: &HierarchyEvent) {
        let mut state = self.state.write();
        if !state.active {
            // The next query rebuilds from scratch anyway.
            return;
        }
        match EventAction::plan(event, tree.root()) {
            EventAction::Reinsert {
                object,
                with_children,
            } => {
                state.registry.remove(tree, object, with_children);
                state
                    .registry
                    .insert(tree, object, with_children, &self.envelopes);
            }
            EventAction::Remove { object } => state.registry.remove(tree, object, true),
            EventAction::Reset => {
                debug!(
                    kind = ?event.kind,
                    changed = event.changed.len(),
                    "event too complex to apply incrementally, resetting tile cache"
                );
                state.active = false;
            }
        }
    }
}
