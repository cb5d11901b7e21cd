// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `rtree`: R-tree over `f64` boxes built on `rstar`; good general-purpose
//!   choice when distributions are irregular and edits are frequent.

pub mod flatvec;
pub mod rtree;

pub use flatvec::FlatVec;
pub use rtree::RTreeF64;
