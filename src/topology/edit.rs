//! Topology editing operations (Pachner moves).
//!
//! This module exposes the move engine of
//! [`pachner`](crate::core::algorithms::pachner) as methods on
//! [`Triangulation`]. Every method is atomic: on error nothing changes, not
//! even the generation counter.

pub use crate::core::algorithms::pachner::{
    IllegalMoveReason, InsertedFace, MoveInfo, PachnerError, PachnerMove, PachnerMoveKind,
};
pub use crate::core::facet::{CornerHandle, EdgeHandle, FacetHandle};
pub use crate::core::triangulation::TetrahedronKey;

use crate::core::algorithms::pachner;
use crate::core::triangulation::Triangulation;

/// High-level topology editing via Pachner moves.
///
/// # Example
///
/// ```rust
/// use pachner::prelude::*;
///
/// let mut tri = Triangulation::new();
/// let t = tri.add_tetrahedron();
///
/// // Split the tetrahedron at a new vertex, then merge it back.
/// let info = tri.move_1_4(t).unwrap();
/// let InsertedFace::Vertex(corner) = info.inserted else {
///     unreachable!()
/// };
/// tri.move_4_1(corner).unwrap();
/// assert_eq!(tri.number_of_tetrahedra(), 1);
/// ```
pub trait TopologyEdit {
    /// Apply a 1-4 move, splitting a tetrahedron at a new interior vertex.
    ///
    /// # Errors
    ///
    /// Returns [`PachnerError::Triangulation`] if the tetrahedron is missing.
    fn move_1_4(&mut self, tetrahedron: TetrahedronKey) -> Result<MoveInfo, PachnerError>;

    /// Apply a 2-3 move across an internal facet.
    ///
    /// # Errors
    ///
    /// Returns [`PachnerError`] if the facet is on the boundary or glued to
    /// its own tetrahedron.
    fn move_2_3(&mut self, facet: FacetHandle) -> Result<MoveInfo, PachnerError>;

    /// Apply a 3-2 move around an edge of degree three.
    ///
    /// # Errors
    ///
    /// Returns [`PachnerError`] if the edge is on the boundary, invalid, of
    /// another degree, or its three tetrahedra are not distinct.
    fn move_3_2(&mut self, edge: EdgeHandle) -> Result<MoveInfo, PachnerError>;

    /// Apply a 4-1 move removing an internal vertex of degree four.
    ///
    /// # Errors
    ///
    /// Returns [`PachnerError`] if the vertex is on the boundary or its star
    /// is not four distinct tetrahedra arranged as a subdivided tetrahedron.
    fn move_4_1(&mut self, corner: CornerHandle) -> Result<MoveInfo, PachnerError>;

    /// Apply any move.
    ///
    /// # Errors
    ///
    /// See the individual move methods.
    fn apply_move(&mut self, mv: PachnerMove) -> Result<MoveInfo, PachnerError>;

    /// Check a move for legality without applying it.
    ///
    /// # Errors
    ///
    /// Returns the error [`apply_move`](Self::apply_move) would return.
    fn can_apply(&self, mv: PachnerMove) -> Result<(), PachnerError>;
}

impl TopologyEdit for Triangulation {
    fn move_1_4(&mut self, tetrahedron: TetrahedronKey) -> Result<MoveInfo, PachnerError> {
        pachner::apply_move(self, PachnerMove::OneFour(tetrahedron))
    }

    fn move_2_3(&mut self, facet: FacetHandle) -> Result<MoveInfo, PachnerError> {
        pachner::apply_move(self, PachnerMove::TwoThree(facet))
    }

    fn move_3_2(&mut self, edge: EdgeHandle) -> Result<MoveInfo, PachnerError> {
        pachner::apply_move(self, PachnerMove::ThreeTwo(edge))
    }

    fn move_4_1(&mut self, corner: CornerHandle) -> Result<MoveInfo, PachnerError> {
        pachner::apply_move(self, PachnerMove::FourOne(corner))
    }

    fn apply_move(&mut self, mv: PachnerMove) -> Result<MoveInfo, PachnerError> {
        pachner::apply_move(self, mv)
    }

    fn can_apply(&self, mv: PachnerMove) -> Result<(), PachnerError> {
        pachner::can_apply(self, mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_dispatches_each_move() {
        let mut tri = Triangulation::new();
        let t = tri.add_tetrahedron();

        let split = tri.move_1_4(t).unwrap();
        assert_eq!(split.kind, PachnerMoveKind::OneFour);
        let created = split.tetrahedra[0];
        // Two of the four new tetrahedra share an internal facet.
        let facet = FacetHandle::new(created, 1);
        assert!(tri.can_apply(PachnerMove::TwoThree(facet)).is_ok());

        let flip = tri.move_2_3(facet).unwrap();
        assert_eq!(tri.number_of_tetrahedra(), 5);
        let InsertedFace::Edge(edge) = flip.inserted else {
            panic!("2-3 inserts an edge");
        };
        tri.move_3_2(edge).unwrap();
        assert_eq!(tri.number_of_tetrahedra(), 4);
        assert!(tri.validate().is_ok());
        assert_eq!(tri.euler_characteristic(), 1);
    }

    #[test]
    fn test_can_apply_does_not_mutate() {
        let mut tri = Triangulation::new();
        let t = tri.add_tetrahedron();
        let generation = tri.generation();
        assert!(tri.can_apply(PachnerMove::OneFour(t)).is_ok());
        assert!(tri.can_apply(PachnerMove::TwoThree(FacetHandle::new(t, 2))).is_err());
        assert_eq!(tri.generation(), generation);
        assert_eq!(tri.number_of_tetrahedra(), 1);
    }
}
