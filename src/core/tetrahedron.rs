//! The tetrahedron record stored by a [`Triangulation`](crate::core::triangulation::Triangulation).
//!
//! A tetrahedron holds nothing but its four facet slots. Slot `i` is either
//! empty (facet `i` lies on the boundary) or an [`Adjacency`]: the key of the
//! tetrahedron glued onto facet `i` and the permutation carrying this
//! tetrahedron's corners onto the neighbour's corners across that facet.
//!
//! Neighbours are referenced by key only. Records never own each other, so
//! removing a tetrahedron cannot leave a dangling pointer behind; the store
//! keeps both sides of every gluing in sync.

use serde::{Deserialize, Serialize};

use crate::core::collections::FacetIndex;
use crate::core::perm::Perm4;
use crate::core::triangulation::TetrahedronKey;

/// One side of a facet gluing.
///
/// If facet `i` of `A` carries `Adjacency { tetrahedron: B, gluing: p }`, then
/// facet `p(i)` of `B` carries `Adjacency { tetrahedron: A, gluing: p⁻¹ }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Adjacency {
    /// The neighbouring tetrahedron (possibly the same one).
    pub tetrahedron: TetrahedronKey,
    /// Corner map from this tetrahedron to the neighbour.
    pub gluing: Perm4,
}

/// A 3-simplex with four facet slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tetrahedron {
    /// `adjacent[i]` is the gluing across the facet opposite corner `i`.
    pub(crate) adjacent: [Option<Adjacency>; 4],
}

impl Tetrahedron {
    /// Creates an isolated tetrahedron (all facets on the boundary).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            adjacent: [None; 4],
        }
    }

    /// The gluing across facet `facet`, or `None` on the boundary or for an
    /// out-of-range facet.
    #[inline]
    #[must_use]
    pub fn adjacency(&self, facet: FacetIndex) -> Option<Adjacency> {
        self.adjacent.get(usize::from(facet)).copied().flatten()
    }

    /// The neighbour across facet `facet`.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, facet: FacetIndex) -> Option<TetrahedronKey> {
        self.adjacency(facet).map(|adj| adj.tetrahedron)
    }

    /// The gluing permutation across facet `facet`.
    #[inline]
    #[must_use]
    pub fn gluing(&self, facet: FacetIndex) -> Option<Perm4> {
        self.adjacency(facet).map(|adj| adj.gluing)
    }

    /// Returns `true` if facet `facet` is unglued.
    #[inline]
    #[must_use]
    pub fn is_boundary(&self, facet: FacetIndex) -> bool {
        self.adjacency(facet).is_none()
    }

    /// Iterates over `(facet, adjacency)` for every glued facet.
    pub fn adjacencies(&self) -> impl Iterator<Item = (FacetIndex, Adjacency)> + '_ {
        self.adjacent
            .iter()
            .enumerate()
            .filter_map(|(facet, slot)| slot.map(|adj| (facet as FacetIndex, adj)))
    }
}
