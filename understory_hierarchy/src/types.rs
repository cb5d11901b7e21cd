// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object identifiers and the closed set of object kinds.

/// Identifier for an object in a [`Hierarchy`](crate::Hierarchy).
///
/// A slot index plus a generation counter. The handle is copyable and stays
/// stable while the object is alive; once the object is removed its slot may
/// be reused, but the reused slot carries a higher generation, so a stale
/// `ObjectId` never aliases a different live object.
///
/// Identity is by handle, not by content: two objects with equal shapes are
/// still distinct objects.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32, pub(crate) u32);

impl ObjectId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this id was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Category of an object.
///
/// Kinds form a shallow hierarchy: [`Cell`](Self::Cell) and
/// [`Tile`](Self::Tile) are detections, and [`Temporary`](Self::Temporary)
/// (tiles created during parallel processing) is a kind of tile.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// The unique root of a hierarchy.
    Root,
    /// Hand-drawn or imported annotation.
    Annotation,
    /// Generic detection.
    Detection,
    /// Cell detection, optionally with a nucleus.
    Cell,
    /// Tile produced by tiling a larger region.
    Tile,
    /// Ephemeral processing tile; its own region is indexed, its subtree is not.
    Temporary,
    /// Tissue microarray core.
    TmaCore,
    /// Anything else, including region-less grouping objects.
    Other,
}

impl ObjectKind {
    /// Number of kinds.
    pub const COUNT: usize = 8;

    /// Every kind, in [`index`](Self::index) order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Root,
        Self::Annotation,
        Self::Detection,
        Self::Cell,
        Self::Tile,
        Self::Temporary,
        Self::TmaCore,
        Self::Other,
    ];

    /// Dense index in `0..COUNT`, suitable for per-kind arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Root => 0,
            Self::Annotation => 1,
            Self::Detection => 2,
            Self::Cell => 3,
            Self::Tile => 4,
            Self::Temporary => 5,
            Self::TmaCore => 6,
            Self::Other => 7,
        }
    }

    /// Immediate supertype, if any.
    pub const fn supertype(self) -> Option<Self> {
        match self {
            Self::Cell | Self::Tile => Some(Self::Detection),
            Self::Temporary => Some(Self::Tile),
            _ => None,
        }
    }

    /// True if `self` is `other` or one of its subkinds.
    pub fn is_a(self, other: Self) -> bool {
        let mut k = Some(self);
        while let Some(kind) = k {
            if kind == other {
                return true;
            }
            k = kind.supertype();
        }
        false
    }

    /// The single-kind set.
    pub const fn as_set(self) -> KindSet {
        match self {
            Self::Root => KindSet::ROOT,
            Self::Annotation => KindSet::ANNOTATION,
            Self::Detection => KindSet::DETECTION,
            Self::Cell => KindSet::CELL,
            Self::Tile => KindSet::TILE,
            Self::Temporary => KindSet::TEMPORARY,
            Self::TmaCore => KindSet::TMA_CORE,
            Self::Other => KindSet::OTHER,
        }
    }

    /// This kind together with every kind that [`is_a`](Self::is_a) it.
    pub fn with_subkinds(self) -> KindSet {
        Self::ALL
            .into_iter()
            .filter(|k| k.is_a(self))
            .fold(KindSet::empty(), |set, k| set | k.as_set())
    }

    /// True for the hierarchy root.
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }

    /// True for annotations.
    pub const fn is_annotation(self) -> bool {
        matches!(self, Self::Annotation)
    }

    /// True for detections and all of their subkinds.
    pub const fn is_detection(self) -> bool {
        matches!(
            self,
            Self::Detection | Self::Cell | Self::Tile | Self::Temporary
        )
    }

    /// True for TMA cores.
    pub const fn is_tma_core(self) -> bool {
        matches!(self, Self::TmaCore)
    }

    /// True for ephemeral processing tiles.
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary)
    }
}

bitflags::bitflags! {
    /// A set of [`ObjectKind`]s.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        /// [`ObjectKind::Root`].
        const ROOT       = 1 << 0;
        /// [`ObjectKind::Annotation`].
        const ANNOTATION = 1 << 1;
        /// [`ObjectKind::Detection`].
        const DETECTION  = 1 << 2;
        /// [`ObjectKind::Cell`].
        const CELL       = 1 << 3;
        /// [`ObjectKind::Tile`].
        const TILE       = 1 << 4;
        /// [`ObjectKind::Temporary`].
        const TEMPORARY  = 1 << 5;
        /// [`ObjectKind::TmaCore`].
        const TMA_CORE   = 1 << 6;
        /// [`ObjectKind::Other`].
        const OTHER      = 1 << 7;
    }
}

impl KindSet {
    /// Whether `kind` is a member.
    pub const fn contains_kind(self, kind: ObjectKind) -> bool {
        self.contains(kind.as_set())
    }

    /// Member kinds in index order.
    pub fn kinds(self) -> impl Iterator<Item = ObjectKind> {
        ObjectKind::ALL
            .into_iter()
            .filter(move |k| self.contains_kind(*k))
    }
}

impl From<ObjectKind> for KindSet {
    fn from(kind: ObjectKind) -> Self {
        kind.as_set()
    }
}

impl FromIterator<ObjectKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = ObjectKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, k| set | k.as_set())
    }
}
