// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot-based object storage, structural edits and event dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;
use understory_roi::Roi;

use crate::error::{HierarchyError, Result};
use crate::event::{
    HierarchyEvent, HierarchyEventKind, HierarchyId, HierarchyListener, ListenerId, ObjectTree,
};
use crate::object::PathObject;
use crate::types::{ObjectId, ObjectKind};

static NEXT_HIERARCHY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    object: PathObject,
}

/// A mutable tree of objects rooted at a single [`ObjectKind::Root`] object.
///
/// Every edit notifies subscribed [`HierarchyListener`]s synchronously once
/// the edit has been applied. Edits that should be batched can be made with
/// the `*_without_event` methods followed by one explicit
/// [`fire_event`](Self::fire_event).
pub struct Hierarchy {
    id: HierarchyId,
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: ObjectId,
    len: usize,
    listeners: Vec<(ListenerId, Arc<dyn HierarchyListener>)>,
    next_listener: u64,
}

impl core::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hierarchy")
            .field("id", &self.id)
            .field("objects", &self.len)
            .field("slots", &self.nodes.len())
            .field("free_list", &self.free_list.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Create a hierarchy holding only its root.
    pub fn new() -> Self {
        let mut h = Self {
            id: HierarchyId(NEXT_HIERARCHY_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: ObjectId::new(0, 1),
            len: 0,
            listeners: Vec::new(),
            next_listener: 1,
        };
        h.root = h.alloc(None, PathObject::new(ObjectKind::Root, None));
        h
    }

    /// Number of objects, not counting the root.
    pub fn len(&self) -> usize {
        self.len - 1
    }

    /// True if only the root is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` refers to a live object.
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.node(id).is_some()
    }

    /// Live objects in slot order, root included.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &PathObject)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            let n = n.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ObjectId uses 32-bit indices by design."
            )]
            let id = ObjectId::new(i as u32, n.generation);
            Some((id, &n.object))
        })
    }

    /// Register a listener; it receives every later event.
    pub fn subscribe(&mut self, listener: Arc<dyn HierarchyListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Drop a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Add `object` below `parent` and fire a single-object `Added` event.
    pub fn add_object(&mut self, parent: ObjectId, object: PathObject) -> Result<ObjectId> {
        let id = self.add_object_without_event(parent, object)?;
        self.fire_event(&HierarchyEvent::added(id));
        Ok(id)
    }

    /// Add `object` below `parent` without notifying listeners.
    pub fn add_object_without_event(
        &mut self,
        parent: ObjectId,
        object: PathObject,
    ) -> Result<ObjectId> {
        self.check_alive(parent)?;
        if object.kind().is_root() {
            return Err(HierarchyError::SecondRoot);
        }
        Ok(self.alloc(Some(parent), object))
    }

    /// Add several objects below `parent` and fire one `Added` event listing
    /// all of them. Nothing is added if any object is rejected.
    pub fn add_objects(
        &mut self,
        parent: ObjectId,
        objects: impl IntoIterator<Item = PathObject>,
    ) -> Result<Vec<ObjectId>> {
        self.check_alive(parent)?;
        let objects: Vec<_> = objects.into_iter().collect();
        if objects.iter().any(|o| o.kind().is_root()) {
            return Err(HierarchyError::SecondRoot);
        }
        let ids: Vec<_> = objects
            .into_iter()
            .map(|o| self.alloc(Some(parent), o))
            .collect();
        if !ids.is_empty() {
            self.fire_event(&HierarchyEvent::new(
                HierarchyEventKind::Added,
                ids.iter().copied(),
            ));
        }
        Ok(ids)
    }

    /// Remove an object together with its subtree.
    ///
    /// The `Removed` event is delivered while the subtree is detached but not
    /// yet freed, so listeners can still read it.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        self.remove_objects([id])
    }

    /// Remove an object, moving its children up to its parent first.
    pub fn remove_object_keep_children(&mut self, id: ObjectId) -> Result<()> {
        self.check_removable(id)?;
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return Err(HierarchyError::RootImmutable);
        };
        let children = self
            .node_mut(id)
            .map(|n| core::mem::take(&mut n.children))
            .unwrap_or_default();
        for &c in &children {
            if let Some(n) = self.node_mut(c) {
                n.parent = Some(parent);
            }
        }
        if let Some(p) = self.node_mut(parent) {
            p.children.extend(children);
        }
        self.remove_objects([id])
    }

    /// Remove several objects with their subtrees; one `Removed` event lists
    /// them all. Nothing is removed if any id is stale or the root.
    pub fn remove_objects(&mut self, ids: impl IntoIterator<Item = ObjectId>) -> Result<()> {
        let ids: Vec<_> = ids.into_iter().collect();
        for &id in &ids {
            self.check_removable(id)?;
        }
        for &id in &ids {
            self.detach(id);
        }
        if !ids.is_empty() {
            self.fire_event(&HierarchyEvent::new(
                HierarchyEventKind::Removed,
                ids.iter().copied(),
            ));
        }
        for id in ids {
            self.free_subtree(id);
        }
        Ok(())
    }

    /// Replace an object's region and fire `ObjectChanged`.
    pub fn set_roi(&mut self, id: ObjectId, roi: Option<Arc<Roi>>) -> Result<()> {
        self.set_roi_without_event(id, roi)?;
        self.fire_event(&HierarchyEvent::new(HierarchyEventKind::ObjectChanged, [id]));
        Ok(())
    }

    /// Replace an object's region without notifying listeners.
    pub fn set_roi_without_event(&mut self, id: ObjectId, roi: Option<Arc<Roi>>) -> Result<()> {
        let node = self.node_mut(id).ok_or(HierarchyError::StaleObject(id))?;
        node.object.set_roi(roi);
        Ok(())
    }

    /// Move `id` below `new_parent` and fire `StructureChanged` for `id`.
    pub fn reparent(&mut self, id: ObjectId, new_parent: ObjectId) -> Result<()> {
        self.check_removable(id)?;
        self.check_alive(new_parent)?;
        let mut cur = Some(new_parent);
        while let Some(c) = cur {
            if c == id {
                return Err(HierarchyError::Cycle {
                    moved: id,
                    target: new_parent,
                });
            }
            cur = self.parent(c);
        }
        self.detach(id);
        self.link_parent(id, new_parent);
        self.fire_event(&HierarchyEvent::new(
            HierarchyEventKind::StructureChanged,
            [id],
        ));
        Ok(())
    }

    /// Remove everything but the root and fire `StructureChanged` for the root.
    pub fn clear(&mut self) {
        let root = self.root;
        let children = self
            .node_mut(root)
            .map(|n| core::mem::take(&mut n.children))
            .unwrap_or_default();
        for c in children {
            if let Some(n) = self.node_mut(c) {
                n.parent = None;
            }
            self.free_subtree(c);
        }
        self.fire_event(&HierarchyEvent::new(
            HierarchyEventKind::StructureChanged,
            [root],
        ));
    }

    /// Deliver `event` to every listener.
    pub fn fire_event(&self, event: &HierarchyEvent) {
        trace!(
            kind = ?event.kind,
            changed = event.changed.len(),
            listeners = self.listeners.len(),
            "firing hierarchy event"
        );
        for (_, listener) in &self.listeners {
            listener.hierarchy_changed(self, event);
        }
    }

    fn alloc(&mut self, parent: Option<ObjectId>, object: PathObject) -> ObjectId {
        let node = |generation| Node {
            generation,
            parent,
            children: Vec::new(),
            object,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node(generation)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ObjectId uses 32-bit indices by design."
        )]
        let id = ObjectId::new(idx as u32, generation);
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.push(id);
        }
        self.len += 1;
        id
    }

    fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: ObjectId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn check_alive(&self, id: ObjectId) -> Result<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(HierarchyError::StaleObject(id))
        }
    }

    fn check_removable(&self, id: ObjectId) -> Result<()> {
        self.check_alive(id)?;
        if id == self.root {
            return Err(HierarchyError::RootImmutable);
        }
        Ok(())
    }

    fn link_parent(&mut self, id: ObjectId, parent: ObjectId) {
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
    }

    fn detach(&mut self, id: ObjectId) {
        let Some(parent) = self.node_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != id);
        }
    }

    fn free_subtree(&mut self, id: ObjectId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self
                .nodes
                .get_mut(cur.idx())
                .and_then(|slot| slot.take_if(|n| n.generation == cur.1))
            else {
                continue;
            };
            stack.extend(node.children);
            self.free_list.push(cur.idx());
            self.len -= 1;
        }
    }
}

impl ObjectTree for Hierarchy {
    fn hierarchy_id(&self) -> HierarchyId {
        self.id
    }

    fn root(&self) -> ObjectId {
        self.root
    }

    fn object(&self, id: ObjectId) -> Option<&PathObject> {
        self.node(id).map(|n| &n.object)
    }

    fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.node(id)?.parent
    }
}
