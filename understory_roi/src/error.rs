// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while producing precise geometry from a region shape.

use thiserror::Error;

/// Malformed shape data detected by [`Roi::to_geometry`](crate::Roi::to_geometry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoiError {
    /// The shape has fewer vertices than its kind requires.
    #[error("{shape} needs at least {required} vertices, found {found}")]
    TooFewVertices {
        /// Shape kind, e.g. `"polygon"`.
        shape: &'static str,
        /// Minimum vertex count for the shape kind.
        required: usize,
        /// Vertex count actually present.
        found: usize,
    },

    /// At least one coordinate is NaN or infinite.
    #[error("{shape} has non-finite coordinates")]
    NonFinite {
        /// Shape kind, e.g. `"ellipse"`.
        shape: &'static str,
    },
}

/// Result type for ROI operations.
pub type Result<T> = core::result::Result<T, RoiError>;
