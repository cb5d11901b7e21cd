// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation events, the read-only tree view and the listener interface.

use crate::object::PathObject;
use crate::types::ObjectId;

/// What kind of change an event reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HierarchyEventKind {
    /// Objects (and their subtrees) were added.
    Added,
    /// Objects (and their subtrees) were removed.
    Removed,
    /// Parent/child structure changed below the listed objects.
    StructureChanged,
    /// Something about the listed objects changed, e.g. their region.
    ObjectChanged,
    /// Classifications of the listed objects changed.
    ClassificationChanged,
    /// Measurements of the listed objects changed.
    MeasurementsChanged,
}

/// A single mutation notification: a kind plus the ordered changed objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyEvent {
    /// Kind of change.
    pub kind: HierarchyEventKind,
    /// Objects the change applies to, in the order they were touched.
    pub changed: Vec<ObjectId>,
}

impl HierarchyEvent {
    /// Event with an explicit kind and object list.
    pub fn new(kind: HierarchyEventKind, changed: impl IntoIterator<Item = ObjectId>) -> Self {
        Self {
            kind,
            changed: changed.into_iter().collect(),
        }
    }

    /// Single-object [`Added`](HierarchyEventKind::Added) event.
    pub fn added(id: ObjectId) -> Self {
        Self::new(HierarchyEventKind::Added, [id])
    }

    /// Single-object [`Removed`](HierarchyEventKind::Removed) event.
    pub fn removed(id: ObjectId) -> Self {
        Self::new(HierarchyEventKind::Removed, [id])
    }

    /// The only changed object, if there is exactly one.
    pub fn single(&self) -> Option<ObjectId> {
        match self.changed.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }
}

/// Identity of a hierarchy instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyId(pub(crate) u64);

/// Read-only view of an object tree.
///
/// Listeners receive this view with every event. For
/// [`Removed`](HierarchyEventKind::Removed) events the removed subtree is
/// already detached from its parent but still readable, so listeners can walk
/// what was removed.
pub trait ObjectTree {
    /// Identity of the underlying hierarchy.
    fn hierarchy_id(&self) -> HierarchyId;

    /// The root object.
    fn root(&self) -> ObjectId;

    /// Payload of a live object.
    fn object(&self, id: ObjectId) -> Option<&PathObject>;

    /// Children in insertion order; empty for unknown ids.
    fn children(&self, id: ObjectId) -> &[ObjectId];

    /// Parent, or `None` for the root, detached objects and unknown ids.
    fn parent(&self, id: ObjectId) -> Option<ObjectId>;

    /// Whether the object has any children.
    fn has_children(&self, id: ObjectId) -> bool {
        !self.children(id).is_empty()
    }
}

/// Receives mutation events.
///
/// Called synchronously from the mutating call, on the mutating thread, after
/// the change has been applied.
pub trait HierarchyListener: Send + Sync {
    /// Handle one event.
    fn hierarchy_changed(&self, tree: &dyn ObjectTree, event: &HierarchyEvent);
}

/// Handle returned by [`Hierarchy::subscribe`](crate::Hierarchy::subscribe).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
