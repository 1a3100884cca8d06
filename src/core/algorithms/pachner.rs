//! Pachner (bistellar) moves on 3-dimensional triangulations.
//!
//! A `k`-`(5-k)` move replaces `k` tetrahedra sharing a `(4-k)`-face with
//! `5-k` tetrahedra sharing the complementary `(k-2)`-face:
//!
//! | move | removes | inserts | locus            | inserted face |
//! |------|---------|---------|------------------|---------------|
//! | 1-4  | 1       | 4       | tetrahedron      | vertex        |
//! | 2-3  | 2       | 3       | internal facet   | edge          |
//! | 3-2  | 3       | 2       | degree-3 edge    | triangle      |
//! | 4-1  | 4       | 1       | degree-4 vertex  | tetrahedron   |
//!
//! Every move is planned before anything is written: the planner checks
//! legality, reads every gluing it will need and expresses the rewrite as a
//! small plan. Only a legal plan is committed, so a rejected move
//! leaves the triangulation and its generation untouched.
//!
//! Facets on the outside of the rewritten region keep their gluings. Each
//! outer facet of an old tetrahedron is matched with a facet of a new one by
//! a corner map, and the old gluing is conjugated through that map. Outer
//! facets that are glued to each other (self-gluings of the region) are
//! rewired among the new tetrahedra the same way.
//!
//! # Key reuse
//!
//! Moves recycle keys where they can: 1-4 keeps the original tetrahedron as
//! the fourth new one, 2-3 keeps both old keys, 3-2 keeps the first two of the
//! three, 4-1 keeps the tetrahedron whose corner was given. [`MoveInfo`]
//! reports exactly which keys died and which were created.
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let mut tri = Triangulation::new();
//! let t = tri.add_tetrahedron();
//! let before = tri.clone();
//!
//! let info = tri.move_1_4(t).unwrap();
//! assert_eq!(tri.number_of_tetrahedra(), 4);
//! assert_eq!(tri.euler_characteristic(), 1);
//!
//! tri.apply_move(info.inverse()).unwrap();
//! assert_eq!(tri, before);
//! ```

use std::fmt;

use thiserror::Error;

use crate::core::collections::{
    FacetIndex, FastHashMap, MOVE_NEIGHBOURHOOD_SIZE, SmallBuffer, fast_hash_map_with_capacity,
};
use crate::core::facet::{
    CornerHandle, EDGE_VERTICES, EdgeHandle, FacetHandle, edge_complement, facet_vertices,
};
use crate::core::perm::Perm4;
use crate::core::tetrahedron::Adjacency;
use crate::core::triangulation::{
    TetrahedronKey, Triangulation, TriangulationError, check_facet,
};

// =============================================================================
// MOVE DESCRIPTORS
// =============================================================================

/// The four Pachner moves in dimension 3.
///
/// # Examples
///
/// ```rust
/// use pachner::core::algorithms::pachner::PachnerMoveKind;
///
/// let kind = PachnerMoveKind::TwoThree;
/// assert_eq!(kind.tetrahedra_removed(), 2);
/// assert_eq!(kind.tetrahedra_created(), 3);
/// assert_eq!(kind.inverse(), PachnerMoveKind::ThreeTwo);
/// assert_eq!(kind.to_string(), "2-3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PachnerMoveKind {
    /// Split a tetrahedron at a new interior vertex.
    OneFour,
    /// Replace two tetrahedra sharing a facet by three around a new edge.
    TwoThree,
    /// Replace three tetrahedra around an edge by two sharing a new facet.
    ThreeTwo,
    /// Merge the four tetrahedra around a vertex.
    FourOne,
}

impl PachnerMoveKind {
    /// Number of tetrahedra the move replaces.
    #[must_use]
    pub const fn tetrahedra_removed(self) -> usize {
        match self {
            Self::OneFour => 1,
            Self::TwoThree => 2,
            Self::ThreeTwo => 3,
            Self::FourOne => 4,
        }
    }

    /// Number of tetrahedra the move inserts.
    #[must_use]
    pub const fn tetrahedra_created(self) -> usize {
        5 - self.tetrahedra_removed()
    }

    /// The move undoing this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::OneFour => Self::FourOne,
            Self::TwoThree => Self::ThreeTwo,
            Self::ThreeTwo => Self::TwoThree,
            Self::FourOne => Self::OneFour,
        }
    }
}

impl fmt::Display for PachnerMoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tetrahedra_removed(), self.tetrahedra_created())
    }
}

/// A Pachner move together with the locus it is applied at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PachnerMove {
    /// 1-4 move on a tetrahedron.
    OneFour(TetrahedronKey),
    /// 2-3 move across an internal facet.
    TwoThree(FacetHandle),
    /// 3-2 move around an edge of degree three.
    ThreeTwo(EdgeHandle),
    /// 4-1 move removing a vertex of degree four.
    FourOne(CornerHandle),
}

impl PachnerMove {
    /// The kind of move.
    #[must_use]
    pub const fn kind(self) -> PachnerMoveKind {
        match self {
            Self::OneFour(_) => PachnerMoveKind::OneFour,
            Self::TwoThree(_) => PachnerMoveKind::TwoThree,
            Self::ThreeTwo(_) => PachnerMoveKind::ThreeTwo,
            Self::FourOne(_) => PachnerMoveKind::FourOne,
        }
    }
}

/// The face a move inserted, addressed in the resulting triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertedFace {
    /// The new vertex of a 1-4 move.
    Vertex(CornerHandle),
    /// The new edge of a 2-3 move.
    Edge(EdgeHandle),
    /// The new internal triangle of a 3-2 move.
    Triangle(FacetHandle),
    /// The merged tetrahedron of a 4-1 move.
    Tetrahedron(TetrahedronKey),
}

/// Outcome of a successful move.
#[derive(Debug, Clone)]
pub struct MoveInfo {
    /// The move that was applied.
    pub kind: PachnerMoveKind,
    /// Keys that no longer exist.
    pub removed: SmallBuffer<TetrahedronKey, MOVE_NEIGHBOURHOOD_SIZE>,
    /// Keys that did not exist before the move.
    pub created: SmallBuffer<TetrahedronKey, MOVE_NEIGHBOURHOOD_SIZE>,
    /// All tetrahedra produced by the move, reused keys included.
    pub tetrahedra: SmallBuffer<TetrahedronKey, MOVE_NEIGHBOURHOOD_SIZE>,
    /// The face the move inserted.
    pub inserted: InsertedFace,
}

impl MoveInfo {
    /// The move that undoes this one, located at the inserted face.
    ///
    /// Applying it immediately afterwards restores a triangulation isomorphic
    /// to the one before; for 1-4 followed by 4-1 the result is identical,
    /// keys included.
    #[must_use]
    pub const fn inverse(&self) -> PachnerMove {
        match self.inserted {
            InsertedFace::Vertex(corner) => PachnerMove::FourOne(corner),
            InsertedFace::Edge(edge) => PachnerMove::ThreeTwo(edge),
            InsertedFace::Triangle(facet) => PachnerMove::TwoThree(facet),
            InsertedFace::Tetrahedron(key) => PachnerMove::OneFour(key),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Why a move is not legal at the requested locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveReason {
    /// 2-3: the facet is on the boundary.
    #[error("facet is on the boundary")]
    BoundaryFacet,
    /// 2-3: the facet is glued to another facet of the same tetrahedron.
    #[error("facet is glued to its own tetrahedron")]
    SameTetrahedron,
    /// 3-2: the edge touches a boundary facet.
    #[error("edge lies on the boundary")]
    BoundaryEdge,
    /// 3-2: the edge is identified with itself in reverse.
    #[error("edge is invalid")]
    InvalidEdge,
    /// 3-2 and 4-1: the edge or vertex has the wrong degree.
    #[error("degree is {found}, expected {expected}")]
    WrongDegree {
        /// Observed degree.
        found: usize,
        /// Degree the move needs.
        expected: usize,
    },
    /// 3-2 and 4-1: the tetrahedra around the locus are not distinct.
    #[error("tetrahedra around the locus are not distinct")]
    RepeatedTetrahedron,
    /// 4-1: a facet containing the vertex is on the boundary.
    #[error("vertex lies on the boundary")]
    BoundaryVertex,
    /// 4-1: the four tetrahedra do not form the star of a degree-four vertex.
    #[error("vertex star is not four tetrahedra around a single vertex")]
    NotTetrahedralStar,
}

/// Errors raised by the move engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PachnerError {
    /// The move is not legal at the requested locus.
    #[error("Illegal {kind} move: {reason}")]
    IllegalMove {
        /// The attempted move.
        kind: PachnerMoveKind,
        /// Why it was rejected.
        reason: IllegalMoveReason,
    },
    /// The locus does not name a valid tetrahedron or local face.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

const fn illegal(kind: PachnerMoveKind, reason: IllegalMoveReason) -> PachnerError {
    PachnerError::IllegalMove { kind, reason }
}

// =============================================================================
// MOVE PLAN
// =============================================================================

/// A facet on the outside of the rewritten region.
#[derive(Debug, Clone, Copy)]
struct OuterFacet {
    old_tetrahedron: TetrahedronKey,
    old_facet: FacetIndex,
    old_adjacency: Option<Adjacency>,
    new_tetrahedron: usize,
    new_facet: FacetIndex,
    /// Corners of the new tetrahedron onto corners of the old one;
    /// sends `new_facet` to `old_facet`.
    corner_map: Perm4,
}

/// A gluing between two new tetrahedra.
#[derive(Debug, Clone, Copy)]
struct InnerGluing {
    a: usize,
    facet: FacetIndex,
    b: usize,
    gluing: Perm4,
}

#[derive(Debug, Clone, Copy)]
enum LocalFace {
    Vertex(usize, u8),
    Edge(usize, u8),
    Triangle(usize, FacetIndex),
    Tetrahedron(usize),
}

/// A validated rewrite, ready to commit.
#[derive(Debug, Clone)]
struct MovePlan {
    kind: PachnerMoveKind,
    region: SmallBuffer<TetrahedronKey, MOVE_NEIGHBOURHOOD_SIZE>,
    /// One slot per new tetrahedron: a region key to recycle, or `None`.
    reuse: SmallBuffer<Option<TetrahedronKey>, MOVE_NEIGHBOURHOOD_SIZE>,
    inner: SmallBuffer<InnerGluing, 6>,
    outer: SmallBuffer<OuterFacet, 12>,
    inserted: LocalFace,
}

fn perm(images: [u8; 4]) -> Result<Perm4, PachnerError> {
    Perm4::from_images(images).ok_or_else(|| {
        TriangulationError::Inconsistent {
            message: format!("corner map {images:?} is not a permutation"),
        }
        .into()
    })
}

fn outer_facet(
    tri: &Triangulation,
    old_tetrahedron: TetrahedronKey,
    old_facet: FacetIndex,
    new_tetrahedron: usize,
    new_facet: FacetIndex,
    corner_map: Perm4,
) -> Result<OuterFacet, PachnerError> {
    Ok(OuterFacet {
        old_tetrahedron,
        old_facet,
        old_adjacency: tri.get(old_tetrahedron)?.adjacency(old_facet),
        new_tetrahedron,
        new_facet,
        corner_map,
    })
}

// =============================================================================
// PLANNERS
// =============================================================================

fn plan_1_4(tri: &Triangulation, key: TetrahedronKey) -> Result<MovePlan, PachnerError> {
    tri.get(key)?;

    // New tetrahedron i keeps the original corners except corner i, which
    // becomes the new vertex.
    let mut outer = SmallBuffer::new();
    for i in 0..4u8 {
        outer.push(outer_facet(tri, key, i, usize::from(i), i, Perm4::IDENTITY)?);
    }
    let mut inner = SmallBuffer::new();
    for i in 0..4u8 {
        for j in (i + 1)..4 {
            inner.push(InnerGluing {
                a: usize::from(i),
                facet: j,
                b: usize::from(j),
                gluing: Perm4::transposition(i, j),
            });
        }
    }

    Ok(MovePlan {
        kind: PachnerMoveKind::OneFour,
        region: std::iter::once(key).collect(),
        reuse: [None, None, None, Some(key)].into_iter().collect(),
        inner,
        outer,
        inserted: LocalFace::Vertex(3, 3),
    })
}

fn plan_2_3(tri: &Triangulation, facet: FacetHandle) -> Result<MovePlan, PachnerError> {
    const KIND: PachnerMoveKind = PachnerMoveKind::TwoThree;
    let (a_key, f) = (facet.tetrahedron(), facet.facet());
    check_facet(f)?;
    let adj = tri
        .get(a_key)?
        .adjacency(f)
        .ok_or(illegal(KIND, IllegalMoveReason::BoundaryFacet))?;
    let b_key = adj.tetrahedron;
    if b_key == a_key {
        return Err(illegal(KIND, IllegalMoveReason::SameTetrahedron));
    }
    tri.get(b_key)?;
    let p = adj.gluing;

    // New tetrahedron i has corners (apex of A, apex of B, t[i+1], t[i+2]),
    // where t lists the corners of the shared triangle in A.
    let t = facet_vertices(f);
    let mut outer = SmallBuffer::new();
    let mut inner = SmallBuffer::new();
    for i in 0..3 {
        let (ti, tj, tk) = (t[i], t[(i + 1) % 3], t[(i + 2) % 3]);
        let from_a = perm([f, ti, tj, tk])?;
        outer.push(outer_facet(tri, a_key, ti, i, 1, from_a)?);
        let from_b = p.compose(perm([ti, f, tj, tk])?);
        outer.push(outer_facet(tri, b_key, p.apply(ti), i, 0, from_b)?);
        inner.push(InnerGluing {
            a: i,
            facet: 2,
            b: (i + 1) % 3,
            gluing: Perm4::transposition(2, 3),
        });
    }

    Ok(MovePlan {
        kind: KIND,
        region: [a_key, b_key].into_iter().collect(),
        reuse: [Some(a_key), Some(b_key), None].into_iter().collect(),
        inner,
        outer,
        inserted: LocalFace::Edge(0, 0),
    })
}

/// One tetrahedron of the walk around an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeStep {
    key: TetrahedronKey,
    u: u8,
    w: u8,
    /// Corner leading the walk: the next tetrahedron is across its facet.
    p: u8,
    /// Remaining corner; becomes the next tetrahedron's opposite corner.
    q: u8,
}

fn plan_3_2(tri: &Triangulation, edge: EdgeHandle) -> Result<MovePlan, PachnerError> {
    const KIND: PachnerMoveKind = PachnerMoveKind::ThreeTwo;
    let key = edge.tetrahedron();
    if edge.edge() >= 6 {
        return Err(TriangulationError::InvalidEdge { edge: edge.edge() }.into());
    }
    tri.get(key)?;

    let [u, w] = EDGE_VERTICES[usize::from(edge.edge())];
    let [p, q] = edge_complement(edge.edge());
    let start = EdgeStep { key, u, w, p, q };

    let limit = 6 * tri.number_of_tetrahedra();
    let mut ring: SmallBuffer<EdgeStep, MOVE_NEIGHBOURHOOD_SIZE> = SmallBuffer::new();
    ring.push(start);
    let mut current = start;
    loop {
        let adj = tri
            .get(current.key)?
            .adjacency(current.p)
            .ok_or(illegal(KIND, IllegalMoveReason::BoundaryEdge))?;
        let g = adj.gluing;
        let next = EdgeStep {
            key: adj.tetrahedron,
            u: g.apply(current.u),
            w: g.apply(current.w),
            p: g.apply(current.q),
            q: g.apply(current.p),
        };
        if next.key == start.key && (next.u, next.w) == (start.u, start.w) {
            break;
        }
        if next.key == start.key && (next.u, next.w) == (start.w, start.u) {
            return Err(illegal(KIND, IllegalMoveReason::InvalidEdge));
        }
        if ring.len() >= limit {
            return Err(TriangulationError::Inconsistent {
                message: "walk around edge does not close".to_string(),
            }
            .into());
        }
        ring.push(next);
        current = next;
    }

    if ring.len() != 3 {
        return Err(illegal(
            KIND,
            IllegalMoveReason::WrongDegree {
                found: ring.len(),
                expected: 3,
            },
        ));
    }
    if ring[0].key == ring[1].key || ring[1].key == ring[2].key || ring[0].key == ring[2].key {
        return Err(illegal(KIND, IllegalMoveReason::RepeatedTetrahedron));
    }

    // Both new tetrahedra have corners (p0, p1, p2, ·) where p_k is the
    // leading corner of step k; the last corner is u in the first and w in
    // the second.
    let mut outer = SmallBuffer::new();
    for (k, step) in ring.iter().enumerate() {
        let omit = (k + 2) % 3;
        let mut images = [0u8; 4];
        images[k] = step.p;
        images[(k + 1) % 3] = step.q;

        images[3] = step.u;
        images[omit] = step.w;
        outer.push(outer_facet(tri, step.key, step.w, 0, omit as u8, perm(images)?)?);

        images[3] = step.w;
        images[omit] = step.u;
        outer.push(outer_facet(tri, step.key, step.u, 1, omit as u8, perm(images)?)?);
    }
    let inner = std::iter::once(InnerGluing {
        a: 0,
        facet: 3,
        b: 1,
        gluing: Perm4::IDENTITY,
    })
    .collect();

    Ok(MovePlan {
        kind: KIND,
        region: ring.iter().map(|step| step.key).collect(),
        reuse: [Some(ring[0].key), Some(ring[1].key)].into_iter().collect(),
        inner,
        outer,
        inserted: LocalFace::Triangle(0, 3),
    })
}

/// One tetrahedron of the star of the vertex being removed.
#[derive(Debug, Clone, Copy)]
struct StarMember {
    key: TetrahedronKey,
    /// Corner at the removed vertex.
    v: u8,
    /// Corners onto corners of the merged tetrahedron; `v` goes to `slot`.
    to_merged: Perm4,
    /// Corner of the merged tetrahedron this member does not touch.
    slot: u8,
}

fn plan_4_1(tri: &Triangulation, corner: CornerHandle) -> Result<MovePlan, PachnerError> {
    const KIND: PachnerMoveKind = PachnerMoveKind::FourOne;
    let (a_key, c) = (corner.tetrahedron(), corner.corner());
    if c >= 4 {
        return Err(TriangulationError::InvalidCorner { corner: c }.into());
    }
    let a = tri.get(a_key)?;

    let mut star: SmallBuffer<StarMember, MOVE_NEIGHBOURHOOD_SIZE> = SmallBuffer::new();
    star.push(StarMember {
        key: a_key,
        v: c,
        to_merged: Perm4::IDENTITY,
        slot: c,
    });
    for f in (0..4u8).filter(|&f| f != c) {
        let adj = a
            .adjacency(f)
            .ok_or(illegal(KIND, IllegalMoveReason::BoundaryVertex))?;
        let p = adj.gluing;
        star.push(StarMember {
            key: adj.tetrahedron,
            v: p.apply(c),
            to_merged: p.compose(Perm4::transposition(c, f)).inverse(),
            slot: f,
        });
    }
    for (i, x) in star.iter().enumerate() {
        if star[i + 1..].iter().any(|y| y.key == x.key) {
            return Err(illegal(KIND, IllegalMoveReason::RepeatedTetrahedron));
        }
    }

    // Every facet through the vertex must be glued to another member, with
    // corners agreeing on the merged labelling.
    for x in &star {
        let tet = tri.get(x.key)?;
        for j in (0..4u8).filter(|&j| j != x.v) {
            let adj = tet
                .adjacency(j)
                .ok_or(illegal(KIND, IllegalMoveReason::BoundaryVertex))?;
            let y = star
                .iter()
                .find(|y| y.key == adj.tetrahedron)
                .ok_or(illegal(KIND, IllegalMoveReason::NotTetrahedralStar))?;
            let g = adj.gluing;
            let agrees = g.apply(x.v) == y.v
                && (0..4u8)
                    .filter(|&k| k != j && k != x.v)
                    .all(|k| y.to_merged.apply(g.apply(k)) == x.to_merged.apply(k));
            if !agrees {
                return Err(illegal(KIND, IllegalMoveReason::NotTetrahedralStar));
            }
        }
    }

    let mut outer = SmallBuffer::new();
    for x in &star {
        outer.push(outer_facet(
            tri,
            x.key,
            x.v,
            0,
            x.slot,
            x.to_merged.inverse(),
        )?);
    }

    Ok(MovePlan {
        kind: KIND,
        region: star.iter().map(|x| x.key).collect(),
        reuse: std::iter::once(Some(a_key)).collect(),
        inner: SmallBuffer::new(),
        outer,
        inserted: LocalFace::Tetrahedron(0),
    })
}

fn plan(tri: &Triangulation, mv: PachnerMove) -> Result<MovePlan, PachnerError> {
    match mv {
        PachnerMove::OneFour(key) => plan_1_4(tri, key),
        PachnerMove::TwoThree(facet) => plan_2_3(tri, facet),
        PachnerMove::ThreeTwo(edge) => plan_3_2(tri, edge),
        PachnerMove::FourOne(corner) => plan_4_1(tri, corner),
    }
}

// =============================================================================
// COMMIT
// =============================================================================

/// Target of a staged gluing: a new tetrahedron (by position) or an
/// untouched one outside the region.
#[derive(Debug, Clone, Copy)]
enum Target {
    New(usize),
    Outside(TetrahedronKey),
}

fn commit(tri: &mut Triangulation, plan: &MovePlan) -> MoveInfo {
    // Resolve every outer gluing against the new tetrahedra before touching
    // the store.
    let mut by_old: FastHashMap<(TetrahedronKey, FacetIndex), usize> =
        fast_hash_map_with_capacity(plan.outer.len());
    by_old.extend(
        plan.outer
            .iter()
            .enumerate()
            .map(|(i, o)| ((o.old_tetrahedron, o.old_facet), i)),
    );

    let mut staged: SmallBuffer<(usize, FacetIndex, Target, Perm4), 12> = SmallBuffer::new();
    for o in &plan.outer {
        let Some(adj) = o.old_adjacency else { continue };
        let partner_facet = adj.gluing.apply(o.old_facet);
        match by_old.get(&(adj.tetrahedron, partner_facet)) {
            Some(&m) => {
                let other = &plan.outer[m];
                let gluing = other
                    .corner_map
                    .inverse()
                    .compose(adj.gluing)
                    .compose(o.corner_map);
                staged.push((
                    o.new_tetrahedron,
                    o.new_facet,
                    Target::New(other.new_tetrahedron),
                    gluing,
                ));
            }
            None => {
                staged.push((
                    o.new_tetrahedron,
                    o.new_facet,
                    Target::Outside(adj.tetrahedron),
                    adj.gluing.compose(o.corner_map),
                ));
            }
        }
    }

    let mut removed = SmallBuffer::new();
    for &key in &plan.region {
        if plan.reuse.contains(&Some(key)) {
            tri.reset(key);
        } else {
            tri.discard(key);
            removed.push(key);
        }
    }
    let mut created = SmallBuffer::new();
    let mut keys: SmallBuffer<TetrahedronKey, MOVE_NEIGHBOURHOOD_SIZE> = SmallBuffer::new();
    for slot in &plan.reuse {
        let key = slot.unwrap_or_else(|| {
            let key = tri.insert_blank();
            created.push(key);
            key
        });
        keys.push(key);
    }

    for g in &plan.inner {
        tri.set_adjacency(
            keys[g.a],
            g.facet,
            Some(Adjacency {
                tetrahedron: keys[g.b],
                gluing: g.gluing,
            }),
        );
        tri.set_adjacency(
            keys[g.b],
            g.gluing.apply(g.facet),
            Some(Adjacency {
                tetrahedron: keys[g.a],
                gluing: g.gluing.inverse(),
            }),
        );
    }
    for &(local, facet, target, gluing) in &staged {
        let here = keys[local];
        match target {
            Target::New(other) => {
                tri.set_adjacency(
                    here,
                    facet,
                    Some(Adjacency {
                        tetrahedron: keys[other],
                        gluing,
                    }),
                );
            }
            Target::Outside(outside) => {
                tri.set_adjacency(
                    here,
                    facet,
                    Some(Adjacency {
                        tetrahedron: outside,
                        gluing,
                    }),
                );
                tri.set_adjacency(
                    outside,
                    gluing.apply(facet),
                    Some(Adjacency {
                        tetrahedron: here,
                        gluing: gluing.inverse(),
                    }),
                );
            }
        }
    }
    tri.bump_generation();

    let inserted = match plan.inserted {
        LocalFace::Vertex(t, c) => InsertedFace::Vertex(CornerHandle::new(keys[t], c)),
        LocalFace::Edge(t, e) => InsertedFace::Edge(EdgeHandle::new(keys[t], e)),
        LocalFace::Triangle(t, f) => InsertedFace::Triangle(FacetHandle::new(keys[t], f)),
        LocalFace::Tetrahedron(t) => InsertedFace::Tetrahedron(keys[t]),
    };

    tracing::debug!(
        kind = %plan.kind,
        ?removed,
        ?created,
        generation = tri.generation(),
        "applied Pachner move"
    );

    MoveInfo {
        kind: plan.kind,
        removed,
        created,
        tetrahedra: keys,
        inserted,
    }
}

// =============================================================================
// PUBLIC ENTRY POINTS
// =============================================================================

/// Checks whether `mv` is legal without modifying anything.
///
/// # Errors
///
/// Returns the same error [`apply_move`] would.
pub fn can_apply(tri: &Triangulation, mv: PachnerMove) -> Result<(), PachnerError> {
    plan(tri, mv).map(|_| ())
}

/// Applies `mv` atomically.
///
/// # Errors
///
/// - [`PachnerError::Triangulation`] if the locus names a missing tetrahedron
///   or an out-of-range local face
/// - [`PachnerError::IllegalMove`] if the move is not legal there
///
/// On error the triangulation and its generation are unchanged.
pub fn apply_move(tri: &mut Triangulation, mv: PachnerMove) -> Result<MoveInfo, PachnerError> {
    match plan(tri, mv) {
        Ok(plan) => Ok(commit(tri, &plan)),
        Err(err) => {
            tracing::debug!(?mv, %err, "rejected Pachner move");
            Err(err)
        }
    }
}

/// Every move legal in `tri`, in storage order of the loci.
///
/// Each internal facet appears once for 2-3 moves, each degree-three edge
/// once for 3-2 moves and each degree-four vertex once for 4-1 moves.
#[must_use]
pub fn legal_moves(tri: &Triangulation) -> Vec<PachnerMove> {
    let skeleton = tri.skeleton();
    let mut moves: Vec<PachnerMove> = tri.tetrahedron_keys().map(PachnerMove::OneFour).collect();

    for (_, triangle) in skeleton.triangles() {
        if let Some(&facet) = triangle.embeddings().first() {
            let mv = PachnerMove::TwoThree(facet);
            if can_apply(tri, mv).is_ok() {
                moves.push(mv);
            }
        }
    }
    for (_, edge) in skeleton.edges() {
        if edge.degree() == 3
            && let Some(&handle) = edge.embeddings().first()
        {
            let mv = PachnerMove::ThreeTwo(handle);
            if can_apply(tri, mv).is_ok() {
                moves.push(mv);
            }
        }
    }
    for (_, vertex) in skeleton.vertices() {
        if vertex.degree() == 4
            && let Some(&corner) = vertex.embeddings().first()
        {
            let mv = PachnerMove::FourOne(corner);
            if can_apply(tri, mv).is_ok() {
                moves.push(mv);
            }
        }
    }
    moves
}
