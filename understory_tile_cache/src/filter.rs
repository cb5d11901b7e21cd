// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kind filters for region queries.

use understory_hierarchy::{KindSet, ObjectKind};

/// Which per-kind indices a query consults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Every kind.
    #[default]
    Any,
    /// Exactly this kind.
    Exact(ObjectKind),
    /// This kind and all of its subkinds.
    WithSubkinds(ObjectKind),
    /// An explicit set of kinds.
    Set(KindSet),
}

impl KindFilter {
    /// Filter from an optional kind: `None` matches every kind, otherwise the
    /// kind alone or, with `include_subkinds`, the kind and its subkinds.
    pub fn from_parts(kind: Option<ObjectKind>, include_subkinds: bool) -> Self {
        match kind {
            None => Self::Any,
            Some(k) if include_subkinds => Self::WithSubkinds(k),
            Some(k) => Self::Exact(k),
        }
    }

    /// The kinds this filter matches.
    pub fn kinds(self) -> KindSet {
        match self {
            Self::Any => KindSet::all(),
            Self::Exact(k) => k.as_set(),
            Self::WithSubkinds(k) => k.with_subkinds(),
            Self::Set(s) => s,
        }
    }

    /// Whether `kind` passes the filter.
    pub fn matches(self, kind: ObjectKind) -> bool {
        self.kinds().contains_kind(kind)
    }
}

impl From<ObjectKind> for KindFilter {
    fn from(kind: ObjectKind) -> Self {
        Self::Exact(kind)
    }
}

impl From<KindSet> for KindFilter {
    fn from(kinds: KindSet) -> Self {
        Self::Set(kinds)
    }
}
