// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for structural edits.

use thiserror::Error;

use crate::types::ObjectId;

/// Rejected hierarchy edit. The hierarchy is unchanged when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    /// The id does not refer to a live object.
    #[error("object {0:?} is not alive in this hierarchy")]
    StaleObject(ObjectId),

    /// The root cannot be removed or moved.
    #[error("the hierarchy root cannot be removed or reparented")]
    RootImmutable,

    /// Only the hierarchy itself creates its root.
    #[error("a hierarchy has exactly one root object")]
    SecondRoot,

    /// Reparenting would make an object its own ancestor.
    #[error("cannot move {moved:?} below its own descendant {target:?}")]
    Cycle {
        /// Object being moved.
        moved: ObjectId,
        /// Requested new parent.
        target: ObjectId,
    },
}

/// Result type for hierarchy edits.
pub type Result<T> = core::result::Result<T, HierarchyError>;
