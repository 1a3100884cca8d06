//! Local sub-simplices of a tetrahedron and the handles that name them.
//!
//! Every tetrahedron numbers its own corners `0..4`. From that the other local
//! faces are derived:
//!
//! - facet `i` is the triangle opposite corner `i`
//! - edge `e` joins the two corners `EDGE_VERTICES[e]`, in the order
//!   `01, 02, 03, 12, 13, 23`
//!
//! [`FacetHandle`], [`EdgeHandle`] and [`CornerHandle`] pair a tetrahedron key
//! with one of these local numbers. They are the loci at which Pachner moves
//! are applied and the embeddings reported by the skeleton.

use crate::core::collections::FacetIndex;
use crate::core::triangulation::TetrahedronKey;

/// Corners of each local edge, in increasing order.
pub const EDGE_VERTICES: [[u8; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// For each local edge, the edge joining the two remaining corners.
pub const OPPOSITE_EDGE: [u8; 6] = [5, 4, 3, 2, 1, 0];

/// Number of the local edge joining corners `a` and `b`, in either order.
///
/// Returns `None` when `a == b` or either corner is out of range.
///
/// # Examples
///
/// ```rust
/// use pachner::core::facet::edge_number;
///
/// assert_eq!(edge_number(2, 0), Some(1));
/// assert_eq!(edge_number(2, 3), Some(5));
/// assert_eq!(edge_number(1, 1), None);
/// ```
#[must_use]
pub const fn edge_number(a: u8, b: u8) -> Option<u8> {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    match (lo, hi) {
        (0, 1) => Some(0),
        (0, 2) => Some(1),
        (0, 3) => Some(2),
        (1, 2) => Some(3),
        (1, 3) => Some(4),
        (2, 3) => Some(5),
        _ => None,
    }
}

/// Corners of facet `facet` (the three corners other than `facet`), ascending.
///
/// # Panics
///
/// Panics if `facet` is not in `0..4`.
#[must_use]
pub const fn facet_vertices(facet: u8) -> [u8; 3] {
    match facet {
        0 => [1, 2, 3],
        1 => [0, 2, 3],
        2 => [0, 1, 3],
        3 => [0, 1, 2],
        _ => panic!("facet index out of range"),
    }
}

/// The two corners of the tetrahedron that are not on local edge `edge`.
///
/// # Panics
///
/// Panics if `edge` is not in `0..6`.
#[must_use]
pub const fn edge_complement(edge: u8) -> [u8; 2] {
    EDGE_VERTICES[OPPOSITE_EDGE[edge as usize] as usize]
}

/// A facet of a specific tetrahedron.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
///
/// let mut tri = Triangulation::new();
/// let t = tri.add_tetrahedron();
/// let facet = FacetHandle::new(t, 2);
/// assert_eq!(facet.tetrahedron(), t);
/// assert_eq!(facet.facet(), 2);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetHandle {
    tetrahedron: TetrahedronKey,
    facet: FacetIndex,
}

impl FacetHandle {
    /// Creates a handle to facet `facet` of `tetrahedron`.
    ///
    /// The facet index is validated when the handle is used.
    #[inline]
    #[must_use]
    pub const fn new(tetrahedron: TetrahedronKey, facet: FacetIndex) -> Self {
        Self { tetrahedron, facet }
    }

    /// The tetrahedron owning the facet.
    #[inline]
    #[must_use]
    pub const fn tetrahedron(self) -> TetrahedronKey {
        self.tetrahedron
    }

    /// The local facet number.
    #[inline]
    #[must_use]
    pub const fn facet(self) -> FacetIndex {
        self.facet
    }
}

/// An edge of a specific tetrahedron, numbered as in [`EDGE_VERTICES`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeHandle {
    tetrahedron: TetrahedronKey,
    edge: u8,
}

impl EdgeHandle {
    /// Creates a handle to local edge `edge` of `tetrahedron`.
    #[inline]
    #[must_use]
    pub const fn new(tetrahedron: TetrahedronKey, edge: u8) -> Self {
        Self { tetrahedron, edge }
    }

    /// Creates a handle to the edge joining corners `a` and `b`.
    ///
    /// Returns `None` if the corners do not name an edge.
    #[must_use]
    pub const fn between(tetrahedron: TetrahedronKey, a: u8, b: u8) -> Option<Self> {
        match edge_number(a, b) {
            Some(edge) => Some(Self { tetrahedron, edge }),
            None => None,
        }
    }

    /// The tetrahedron owning the edge.
    #[inline]
    #[must_use]
    pub const fn tetrahedron(self) -> TetrahedronKey {
        self.tetrahedron
    }

    /// The local edge number.
    #[inline]
    #[must_use]
    pub const fn edge(self) -> u8 {
        self.edge
    }
}

/// A corner (vertex slot) of a specific tetrahedron.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CornerHandle {
    tetrahedron: TetrahedronKey,
    corner: u8,
}

impl CornerHandle {
    /// Creates a handle to corner `corner` of `tetrahedron`.
    #[inline]
    #[must_use]
    pub const fn new(tetrahedron: TetrahedronKey, corner: u8) -> Self {
        Self {
            tetrahedron,
            corner,
        }
    }

    /// The tetrahedron owning the corner.
    #[inline]
    #[must_use]
    pub const fn tetrahedron(self) -> TetrahedronKey {
        self.tetrahedron
    }

    /// The local corner number.
    #[inline]
    #[must_use]
    pub const fn corner(self) -> u8 {
        self.corner
    }
}
