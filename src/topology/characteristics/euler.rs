//! Euler characteristic computation for 3-dimensional triangulations.
//!
//! χ = f₀ - f₁ + f₂ - f₃, where `f_k` counts `k`-faces of the skeleton
//! (classes of local faces, not local faces).
//!
//! Beyond computing χ, this module predicts it from the boundary and the
//! vertex links. Truncating every ideal vertex yields a compact 3-manifold
//! whose Euler characteristic is half that of its boundary, and re-coning each
//! link adds `1 - χ(link)`, giving
//!
//! ```text
//! χ = χ(real boundary) / 2 + Σ_ideal (1 - χ(link) / 2)
//! ```
//!
//! for every valid triangulation. Pachner moves preserve χ, so a mismatch after
//! a sequence of moves points at a corrupted gluing table.
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//! use pachner::topology::characteristics::euler;
//!
//! let mut tri = Triangulation::new();
//! tri.add_tetrahedron();
//!
//! let counts = euler::count_simplices(&tri);
//! assert_eq!(counts.by_dim, vec![4, 6, 4, 1]);
//! assert_eq!(euler::euler_characteristic(&counts), 1);
//! ```

use crate::core::triangulation::Triangulation;
use crate::topology::skeleton::Skeleton;

/// Counts of `k`-faces for `0 ≤ k ≤ dimension`: the f-vector.
///
/// # Examples
///
/// ```rust
/// use pachner::topology::characteristics::euler::FVector;
///
/// let counts = FVector {
///     by_dim: vec![4, 6, 4, 1],
/// };
/// assert_eq!(counts.count(1), 6);
/// assert_eq!(counts.count(7), 0);
/// assert_eq!(counts.dimension(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FVector {
    /// `by_dim[k]` = `f_k` = number of `k`-faces
    pub by_dim: Vec<usize>,
}

impl FVector {
    /// Number of `k`-faces, or 0 if `k` is out of range.
    #[must_use]
    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.by_dim.get(k).copied().unwrap_or(0)
    }

    /// Dimension of the counted complex.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.by_dim.len().saturating_sub(1)
    }
}

/// Coarse topological classification of a triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyClassification {
    /// No tetrahedra.
    Empty,
    /// One tetrahedron with no gluings (a 3-ball).
    SingleTetrahedron,
    /// No boundary triangles, every vertex link a sphere.
    Closed,
    /// Real boundary, no ideal vertices.
    Bounded,
    /// At least one ideal vertex (with or without real boundary).
    Ideal,
    /// An invalid edge or a vertex link that is neither a sphere, a disc nor
    /// a closed surface.
    Invalid,
}

/// The f-vector `[V, E, F, T]`.
#[must_use]
pub fn count_simplices(tri: &Triangulation) -> FVector {
    count_skeleton_simplices(&tri.skeleton())
}

pub(crate) fn count_skeleton_simplices(skeleton: &Skeleton) -> FVector {
    FVector {
        by_dim: vec![
            skeleton.number_of_vertices(),
            skeleton.number_of_edges(),
            skeleton.number_of_triangles(),
            skeleton.number_of_tetrahedra(),
        ],
    }
}

/// The f-vector `[V, E, F]` of the real boundary, summed over components.
///
/// Returns all zeros for a triangulation without boundary triangles.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
/// use pachner::topology::characteristics::euler;
///
/// let mut tri = Triangulation::new();
/// tri.add_tetrahedron();
/// let boundary = euler::count_boundary_simplices(&tri);
/// assert_eq!(boundary.by_dim, vec![4, 6, 4]);
/// assert_eq!(euler::euler_characteristic(&boundary), 2);
/// ```
#[must_use]
pub fn count_boundary_simplices(tri: &Triangulation) -> FVector {
    let skeleton = tri.skeleton();
    let mut by_dim = vec![0; 3];
    for component in skeleton.boundary_components() {
        by_dim[0] += component.number_of_vertices();
        by_dim[1] += component.number_of_edges();
        by_dim[2] += component.number_of_triangles();
    }
    FVector { by_dim }
}

/// Alternating sum of an f-vector.
#[must_use]
#[allow(clippy::cast_possible_wrap)] // Face counts won't exceed isize::MAX in practice
pub fn euler_characteristic(counts: &FVector) -> isize {
    counts
        .by_dim
        .iter()
        .enumerate()
        .map(|(k, &f_k)| {
            let sign = if k % 2 == 0 { 1 } else { -1 };
            sign * (f_k as isize)
        })
        .sum()
}

/// Classifies a triangulation from its skeleton.
#[must_use]
pub fn classify_triangulation(tri: &Triangulation) -> TopologyClassification {
    classify_skeleton(&tri.skeleton())
}

pub(crate) fn classify_skeleton(skeleton: &Skeleton) -> TopologyClassification {
    if skeleton.number_of_tetrahedra() == 0 {
        TopologyClassification::Empty
    } else if !skeleton.is_valid() {
        TopologyClassification::Invalid
    } else if skeleton.is_ideal() {
        TopologyClassification::Ideal
    } else if skeleton.number_of_tetrahedra() == 1 && skeleton.number_of_triangles() == 4 {
        TopologyClassification::SingleTetrahedron
    } else if skeleton.has_boundary_triangles() {
        TopologyClassification::Bounded
    } else {
        TopologyClassification::Closed
    }
}

/// The Euler characteristic predicted by the boundary and ideal vertex
/// links, or `None` when no prediction is possible (invalid triangulations,
/// or an odd total such as a lone projective-plane link).
#[must_use]
#[allow(clippy::cast_possible_truncation)] // χ of realistic inputs fits in isize
pub fn expected_chi_for(
    skeleton: &Skeleton,
    classification: &TopologyClassification,
) -> Option<isize> {
    let boundary_chi = || -> i64 {
        skeleton
            .boundary_components()
            .iter()
            .map(crate::topology::skeleton::BoundaryComponent::euler_characteristic)
            .sum()
    };
    let doubled = match classification {
        TopologyClassification::Empty | TopologyClassification::Closed => 0,
        TopologyClassification::SingleTetrahedron => 2,
        TopologyClassification::Bounded => boundary_chi(),
        TopologyClassification::Ideal => {
            boundary_chi()
                + skeleton
                    .vertices()
                    .filter(|(_, v)| v.is_ideal())
                    .map(|(_, v)| 2 - v.link().euler_characteristic)
                    .sum::<i64>()
        }
        TopologyClassification::Invalid => return None,
    };
    (doubled % 2 == 0).then_some((doubled / 2) as isize)
}
