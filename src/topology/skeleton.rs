//! Skeleton of a triangulation: vertex, edge and triangle classes.
//!
//! Facet gluings identify the local corners, edges and facets of individual
//! tetrahedra with one another. The [`Skeleton`] is the quotient: every
//! equivalence class of local faces becomes one vertex, edge or triangle of the
//! triangulation. Classes are found with a [`UnionFind`] over local faces;
//! edges are tracked with orientation parity so an edge identified with itself
//! in reverse is recognised as invalid.
//!
//! On top of the classes the builder derives:
//!
//! - connected components and orientability, by a walk over the dual graph
//! - real boundary components, by joining boundary triangles across shared edges
//! - the Euler characteristic of every vertex link, which classifies vertices
//!   as internal (sphere link), boundary (disc link) or ideal (closed link of
//!   any other kind)
//!
//! A skeleton is an immutable snapshot tagged with the generation of the
//! triangulation it was built from. Handles it issues carry the same tag;
//! relating a snapshot back to a triangulation that has since been modified
//! fails with [`SkeletonError::StaleSkeleton`].
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let mut tri = Triangulation::new();
//! let t = tri.add_tetrahedron();
//! let skeleton = tri.skeleton();
//!
//! assert_eq!(skeleton.number_of_vertices(), 4);
//! assert_eq!(skeleton.number_of_edges(), 6);
//! assert_eq!(skeleton.number_of_triangles(), 4);
//! assert_eq!(skeleton.euler_characteristic(), 1);
//!
//! let v = skeleton.vertex_of(&tri, CornerHandle::new(t, 0)).unwrap();
//! assert_eq!(skeleton.vertex(v).unwrap().link_type(), VertexLinkType::Disc);
//!
//! tri.add_tetrahedron();
//! assert!(matches!(
//!     skeleton.vertex_of(&tri, CornerHandle::new(t, 0)),
//!     Err(SkeletonError::StaleSkeleton { .. })
//! ));
//! ```

use std::collections::VecDeque;
use std::sync::Weak;

use thiserror::Error;

use crate::core::collections::{SmallBuffer, TetrahedronSecondaryMap, fast_hash_set_with_capacity};
use crate::core::facet::{
    CornerHandle, EDGE_VERTICES, EdgeHandle, FacetHandle, edge_number, facet_vertices,
};
use crate::core::triangulation::{
    DenseGluing, TetrahedronKey, Triangulation, TriangulationError, check_facet,
};
use crate::core::util::UnionFind;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised when querying a skeleton snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkeletonError {
    /// The snapshot (or a handle it issued) belongs to an older generation,
    /// or to a different triangulation.
    #[error("Skeleton snapshot is stale: built at generation {snapshot}, current is {current}")]
    StaleSkeleton {
        /// Generation the snapshot or handle was built at.
        snapshot: u64,
        /// Generation it was checked against.
        current: u64,
    },
    /// A skeleton handle whose index is out of range.
    #[error("No {kind} with index {index} in this skeleton")]
    InvalidHandle {
        /// The kind of face ("vertex", "edge", ...).
        kind: &'static str,
        /// The offending index.
        index: usize,
    },
    /// The tetrahedron-level locus was invalid.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

// =============================================================================
// HANDLES
// =============================================================================

macro_rules! skeleton_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: usize,
            generation: u64,
        }

        impl $name {
            pub(crate) const fn new(index: usize, generation: u64) -> Self {
                Self { index, generation }
            }

            /// Position of the class in the issuing skeleton.
            #[must_use]
            pub const fn index(self) -> usize {
                self.index
            }

            /// Generation of the issuing skeleton.
            #[must_use]
            pub const fn generation(self) -> u64 {
                self.generation
            }
        }
    };
}

skeleton_id!(
    /// Handle to a vertex class.
    VertexId
);
skeleton_id!(
    /// Handle to an edge class.
    EdgeId
);
skeleton_id!(
    /// Handle to a triangle class.
    TriangleId
);
skeleton_id!(
    /// Handle to a real boundary component.
    BoundaryComponentId
);

// =============================================================================
// FACES
// =============================================================================

/// Combinatorial summary of a vertex link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLink {
    /// Link vertices (edge ends at the vertex).
    pub vertices: usize,
    /// Link edges (triangle corners at the vertex).
    pub edges: usize,
    /// Link triangles (tetrahedron corners at the vertex).
    pub triangles: usize,
    /// `true` if no boundary triangle touches the vertex.
    pub closed: bool,
    /// `V - E + F` of the link.
    pub euler_characteristic: i64,
}

/// Topological type of a vertex link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexLinkType {
    /// Closed link with Euler characteristic 2: an internal vertex.
    Sphere,
    /// Bounded link with Euler characteristic 1: a real boundary vertex.
    Disc,
    /// Closed link other than a sphere: an ideal vertex.
    Ideal,
    /// Bounded link other than a disc.
    Invalid,
}

impl VertexLink {
    /// Classifies the link from its Euler characteristic and closedness.
    #[must_use]
    pub const fn link_type(&self) -> VertexLinkType {
        match (self.closed, self.euler_characteristic) {
            (true, 2) => VertexLinkType::Sphere,
            (true, _) => VertexLinkType::Ideal,
            (false, 1) => VertexLinkType::Disc,
            (false, _) => VertexLinkType::Invalid,
        }
    }
}

/// A vertex class.
#[derive(Clone, Debug)]
pub struct Vertex {
    embeddings: Vec<CornerHandle>,
    link: VertexLink,
    boundary: bool,
}

impl Vertex {
    /// Every tetrahedron corner in this class.
    #[must_use]
    pub fn embeddings(&self) -> &[CornerHandle] {
        &self.embeddings
    }

    /// Number of tetrahedron corners in this class.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// Summary of the vertex link.
    #[must_use]
    pub const fn link(&self) -> &VertexLink {
        &self.link
    }

    /// Type of the vertex link.
    #[must_use]
    pub const fn link_type(&self) -> VertexLinkType {
        self.link.link_type()
    }

    /// Returns `true` if the vertex lies on a boundary triangle.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.boundary
    }

    /// Returns `true` for ideal vertices.
    #[must_use]
    pub const fn is_ideal(&self) -> bool {
        matches!(self.link_type(), VertexLinkType::Ideal)
    }
}

/// An edge class.
#[derive(Clone, Debug)]
pub struct Edge {
    embeddings: Vec<EdgeHandle>,
    vertices: [VertexId; 2],
    valid: bool,
    boundary: bool,
}

impl Edge {
    /// Every tetrahedron edge in this class.
    #[must_use]
    pub fn embeddings(&self) -> &[EdgeHandle] {
        &self.embeddings
    }

    /// Number of tetrahedron edges in this class.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// End points, in the direction of the first embedding.
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 2] {
        self.vertices
    }

    /// Returns `false` if the edge is identified with itself in reverse.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns `true` if the edge lies on a boundary triangle.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.boundary
    }
}

/// A triangle class (one or two tetrahedron facets).
#[derive(Clone, Debug)]
pub struct Triangle {
    embeddings: SmallBuffer<FacetHandle, 2>,
    vertices: [VertexId; 3],
    edges: [EdgeId; 3],
    boundary_component: Option<BoundaryComponentId>,
}

impl Triangle {
    /// The facets in this class.
    #[must_use]
    pub fn embeddings(&self) -> &[FacetHandle] {
        &self.embeddings
    }

    /// Vertices at the corners of the first embedding, ascending local order.
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Edges of the first embedding: `c0c1`, `c0c2`, `c1c2`.
    #[must_use]
    pub const fn edges(&self) -> [EdgeId; 3] {
        self.edges
    }

    /// Returns `true` for boundary triangles.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.embeddings.len() == 1
    }

    /// The boundary component this triangle belongs to, if any.
    #[must_use]
    pub const fn boundary_component(&self) -> Option<BoundaryComponentId> {
        self.boundary_component
    }
}

/// A connected component of the real boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryComponent {
    triangles: Vec<TriangleId>,
    edges: Vec<EdgeId>,
    vertices: Vec<VertexId>,
    orientable: bool,
}

impl BoundaryComponent {
    /// Boundary triangles in this component.
    #[must_use]
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }

    /// Edges of those triangles.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Vertices of those triangles.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of triangles.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// `V - E + F` of the boundary surface.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        to_i64(self.vertices.len()) - to_i64(self.edges.len()) + to_i64(self.triangles.len())
    }

    /// Returns `true` if the boundary surface is orientable.
    #[must_use]
    pub const fn is_orientable(&self) -> bool {
        self.orientable
    }

    /// Returns `true` if the boundary surface is a 2-sphere.
    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.orientable && self.euler_characteristic() == 2
    }
}

// =============================================================================
// SKELETON
// =============================================================================

/// Immutable skeleton snapshot of one triangulation generation.
#[derive(Debug)]
pub struct Skeleton {
    generation: u64,
    owner: Weak<()>,
    index_of: TetrahedronSecondaryMap<usize>,

    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    boundary_components: Vec<BoundaryComponent>,

    /// Class of each local corner (`4 * tet + corner`).
    corner_class: Vec<usize>,
    /// Class of each local edge (`6 * tet + edge`).
    edge_class: Vec<usize>,
    /// Class of each local facet (`4 * tet + facet`).
    facet_class: Vec<usize>,

    orientation: Vec<i8>,
    component: Vec<usize>,
    number_of_components: usize,
    orientable: bool,
}

impl Skeleton {
    /// Computes the skeleton of `tri` at its current generation.
    pub(crate) fn build(tri: &Triangulation) -> Self {
        let generation = tri.generation();
        let (keys, index_of) = tri.dense_index();
        let table = tri.dense_gluings();
        let n = keys.len();

        // --- identify local faces along every gluing -----------------------
        let mut corners = UnionFind::new(4 * n);
        let mut edges = UnionFind::new(6 * n);
        let mut facets = UnionFind::new(4 * n);

        for (i, slots) in table.iter().enumerate() {
            for (f, slot) in (0u8..).zip(slots) {
                let Some((j, p)) = *slot else { continue };
                facets.union(4 * i + usize::from(f), 4 * j + usize::from(p.apply(f)), false);
                for c in facet_vertices(f) {
                    corners.union(4 * i + usize::from(c), 4 * j + usize::from(p.apply(c)), false);
                }
                for (e, [a, b]) in (0u8..).zip(EDGE_VERTICES) {
                    if a == f || b == f {
                        continue;
                    }
                    let (pa, pb) = (p.apply(a), p.apply(b));
                    let Some(image) = edge_number(pa, pb) else {
                        continue;
                    };
                    edges.union(6 * i + usize::from(e), 6 * j + usize::from(image), pa > pb);
                }
            }
        }

        let (corner_class, vertex_count) = label_classes(&mut corners);
        let (edge_class, edge_count) = label_classes(&mut edges);
        let (facet_class, triangle_count) = label_classes(&mut facets);

        // --- embeddings -----------------------------------------------------
        let mut vertex_embeddings = vec![Vec::new(); vertex_count];
        let mut edge_embeddings = vec![Vec::new(); edge_count];
        let mut facet_embeddings: Vec<SmallBuffer<FacetHandle, 2>> =
            vec![SmallBuffer::new(); triangle_count];
        let mut edge_parity = vec![false; 6 * n];
        let mut edge_valid = vec![true; edge_count];

        for (i, &key) in keys.iter().enumerate() {
            for c in 0..4u8 {
                vertex_embeddings[corner_class[4 * i + usize::from(c)]]
                    .push(CornerHandle::new(key, c));
                facet_embeddings[facet_class[4 * i + usize::from(c)]]
                    .push(FacetHandle::new(key, c));
            }
            for e in 0..6u8 {
                let local = 6 * i + usize::from(e);
                edge_embeddings[edge_class[local]].push(EdgeHandle::new(key, e));
                edge_parity[local] = edges.find(local).1;
                if edges.is_conflicted(local) {
                    edge_valid[edge_class[local]] = false;
                }
            }
        }

        let vertex_of_corner =
            |i: usize, c: u8| VertexId::new(corner_class[4 * i + usize::from(c)], generation);
        let edge_of_local = |i: usize, e: usize| EdgeId::new(edge_class[6 * i + e], generation);

        // --- boundary flags -------------------------------------------------
        let mut vertex_boundary = vec![false; vertex_count];
        let mut edge_boundary = vec![false; edge_count];
        for embeddings in &facet_embeddings {
            if let [only] = embeddings.as_slice() {
                let i = index_of[only.tetrahedron()];
                let [c0, c1, c2] = facet_vertices(only.facet());
                for c in [c0, c1, c2] {
                    vertex_boundary[corner_class[4 * i + usize::from(c)]] = true;
                }
                for e in facet_edges(only.facet()) {
                    edge_boundary[edge_class[6 * i + e]] = true;
                }
            }
        }

        // --- edges ----------------------------------------------------------
        let edges_out: Vec<Edge> = edge_embeddings
            .into_iter()
            .enumerate()
            .map(|(class, embeddings)| {
                let rep = embeddings[0];
                let i = index_of[rep.tetrahedron()];
                let [a, b] = EDGE_VERTICES[usize::from(rep.edge())];
                Edge {
                    vertices: [vertex_of_corner(i, a), vertex_of_corner(i, b)],
                    embeddings,
                    valid: edge_valid[class],
                    boundary: edge_boundary[class],
                }
            })
            .collect();

        // --- triangles ------------------------------------------------------
        let mut triangles_out: Vec<Triangle> = facet_embeddings
            .into_iter()
            .map(|embeddings| {
                let rep = embeddings[0];
                let i = index_of[rep.tetrahedron()];
                let [c0, c1, c2] = facet_vertices(rep.facet());
                let [e0, e1, e2] = facet_edges(rep.facet());
                Triangle {
                    vertices: [
                        vertex_of_corner(i, c0),
                        vertex_of_corner(i, c1),
                        vertex_of_corner(i, c2),
                    ],
                    edges: [edge_of_local(i, e0), edge_of_local(i, e1), edge_of_local(i, e2)],
                    embeddings,
                    boundary_component: None,
                }
            })
            .collect();

        // --- vertex links ---------------------------------------------------
        let mut link_vertices = vec![0usize; vertex_count];
        let mut link_edges = vec![0usize; vertex_count];
        for edge in &edges_out {
            for v in edge.vertices {
                link_vertices[v.index()] += 1;
            }
        }
        for triangle in &triangles_out {
            for v in triangle.vertices {
                link_edges[v.index()] += 1;
            }
        }
        let vertices_out: Vec<Vertex> = vertex_embeddings
            .into_iter()
            .enumerate()
            .map(|(class, embeddings)| {
                let closed = !vertex_boundary[class];
                let link = VertexLink {
                    vertices: link_vertices[class],
                    edges: link_edges[class],
                    triangles: embeddings.len(),
                    closed,
                    euler_characteristic: to_i64(link_vertices[class]) - to_i64(link_edges[class])
                        + to_i64(embeddings.len()),
                };
                Vertex {
                    embeddings,
                    link,
                    boundary: !closed,
                }
            })
            .collect();

        // --- components and orientability -----------------------------------
        let (orientation, component, number_of_components, orientable) = orient(&table);

        // --- boundary components --------------------------------------------
        let boundary_components = boundary_components(
            &mut triangles_out,
            &index_of,
            &edge_class,
            &edge_parity,
            generation,
        );

        let skeleton = Self {
            generation,
            owner: tri.identity_token(),
            index_of,
            vertices: vertices_out,
            edges: edges_out,
            triangles: triangles_out,
            boundary_components,
            corner_class,
            edge_class,
            facet_class,
            orientation,
            component,
            number_of_components,
            orientable,
        };

        tracing::debug!(
            generation,
            tetrahedra = n,
            vertices = skeleton.vertices.len(),
            edges = skeleton.edges.len(),
            triangles = skeleton.triangles.len(),
            boundary_components = skeleton.boundary_components.len(),
            orientable,
            "built skeleton"
        );
        skeleton
    }

    // =========================================================================
    // STALENESS
    // =========================================================================

    /// Generation of the triangulation this snapshot was built from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if this snapshot describes `tri` as it is now.
    #[must_use]
    pub fn is_current(&self, tri: &Triangulation) -> bool {
        tri.owns_token(&self.owner) && tri.generation() == self.generation
    }

    /// Fails with [`SkeletonError::StaleSkeleton`] unless the snapshot is current.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn ensure_current(&self, tri: &Triangulation) -> Result<(), SkeletonError> {
        if self.is_current(tri) {
            Ok(())
        } else {
            Err(SkeletonError::StaleSkeleton {
                snapshot: self.generation,
                current: tri.generation(),
            })
        }
    }

    const fn check_handle(&self, generation: u64) -> Result<(), SkeletonError> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(SkeletonError::StaleSkeleton {
                snapshot: generation,
                current: self.generation,
            })
        }
    }

    fn position(&self, tri: &Triangulation, key: TetrahedronKey) -> Result<usize, SkeletonError> {
        self.ensure_current(tri)?;
        self.index_of
            .get(key)
            .copied()
            .ok_or(SkeletonError::Triangulation(TriangulationError::InvalidHandle { key }))
    }

    // =========================================================================
    // COUNTS AND PREDICATES
    // =========================================================================

    /// Number of tetrahedra at the snapshot generation.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.orientation.len()
    }

    /// Number of vertex classes.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edge classes.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of triangle classes.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of real boundary components.
    #[must_use]
    pub fn number_of_boundary_components(&self) -> usize {
        self.boundary_components.len()
    }

    /// Number of connected components.
    #[must_use]
    pub const fn number_of_components(&self) -> usize {
        self.number_of_components
    }

    /// `V - E + F - T`.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        to_i64(self.vertices.len()) - to_i64(self.edges.len()) + to_i64(self.triangles.len())
            - to_i64(self.orientation.len())
    }

    /// Returns `true` if every component admits a consistent orientation.
    #[must_use]
    pub const fn is_orientable(&self) -> bool {
        self.orientable
    }

    /// Returns `true` for at most one component.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.number_of_components <= 1
    }

    /// Returns `true` if some triangle is a boundary triangle.
    #[must_use]
    pub fn has_boundary_triangles(&self) -> bool {
        !self.boundary_components.is_empty()
    }

    /// Returns `true` if some vertex is ideal.
    #[must_use]
    pub fn is_ideal(&self) -> bool {
        self.vertices.iter().any(Vertex::is_ideal)
    }

    /// No boundary triangles and no ideal vertices.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.has_boundary_triangles() && !self.is_ideal()
    }

    /// Every edge valid, no vertex with an invalid link.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.edges.iter().all(Edge::is_valid)
            && self
                .vertices
                .iter()
                .all(|v| v.link_type() != VertexLinkType::Invalid)
    }

    // =========================================================================
    // ITERATION AND LOOKUP
    // =========================================================================

    /// Iterates over the vertex classes.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        let generation = self.generation;
        self.vertices
            .iter()
            .enumerate()
            .map(move |(i, v)| (VertexId::new(i, generation), v))
    }

    /// Iterates over the edge classes.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        let generation = self.generation;
        self.edges
            .iter()
            .enumerate()
            .map(move |(i, e)| (EdgeId::new(i, generation), e))
    }

    /// Iterates over the triangle classes.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        let generation = self.generation;
        self.triangles
            .iter()
            .enumerate()
            .map(move |(i, t)| (TriangleId::new(i, generation), t))
    }

    /// The real boundary components.
    #[must_use]
    pub fn boundary_components(&self) -> &[BoundaryComponent] {
        &self.boundary_components
    }

    /// Looks up a vertex class.
    ///
    /// # Errors
    ///
    /// [`SkeletonError::StaleSkeleton`] if `id` came from another snapshot,
    /// [`SkeletonError::InvalidHandle`] if it is out of range.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, SkeletonError> {
        self.check_handle(id.generation())?;
        self.vertices
            .get(id.index())
            .ok_or(SkeletonError::InvalidHandle {
                kind: "vertex",
                index: id.index(),
            })
    }

    /// Looks up an edge class.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex`].
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, SkeletonError> {
        self.check_handle(id.generation())?;
        self.edges.get(id.index()).ok_or(SkeletonError::InvalidHandle {
            kind: "edge",
            index: id.index(),
        })
    }

    /// Looks up a triangle class.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex`].
    pub fn triangle(&self, id: TriangleId) -> Result<&Triangle, SkeletonError> {
        self.check_handle(id.generation())?;
        self.triangles
            .get(id.index())
            .ok_or(SkeletonError::InvalidHandle {
                kind: "triangle",
                index: id.index(),
            })
    }

    /// Looks up a boundary component.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex`].
    pub fn boundary_component(
        &self,
        id: BoundaryComponentId,
    ) -> Result<&BoundaryComponent, SkeletonError> {
        self.check_handle(id.generation())?;
        self.boundary_components
            .get(id.index())
            .ok_or(SkeletonError::InvalidHandle {
                kind: "boundary component",
                index: id.index(),
            })
    }

    /// The vertex class containing a tetrahedron corner.
    ///
    /// # Errors
    ///
    /// [`SkeletonError::StaleSkeleton`] unless the snapshot is current for
    /// `tri`; [`SkeletonError::Triangulation`] for an unknown key or a corner
    /// outside `0..4`.
    pub fn vertex_of(
        &self,
        tri: &Triangulation,
        corner: CornerHandle,
    ) -> Result<VertexId, SkeletonError> {
        let i = self.position(tri, corner.tetrahedron())?;
        if corner.corner() >= 4 {
            return Err(TriangulationError::InvalidCorner {
                corner: corner.corner(),
            }
            .into());
        }
        Ok(VertexId::new(
            self.corner_class[4 * i + usize::from(corner.corner())],
            self.generation,
        ))
    }

    /// The edge class containing a tetrahedron edge.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex_of`].
    pub fn edge_of(&self, tri: &Triangulation, edge: EdgeHandle) -> Result<EdgeId, SkeletonError> {
        let i = self.position(tri, edge.tetrahedron())?;
        if edge.edge() >= 6 {
            return Err(TriangulationError::InvalidEdge { edge: edge.edge() }.into());
        }
        Ok(EdgeId::new(
            self.edge_class[6 * i + usize::from(edge.edge())],
            self.generation,
        ))
    }

    /// The triangle class containing a tetrahedron facet.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex_of`].
    pub fn triangle_of(
        &self,
        tri: &Triangulation,
        facet: FacetHandle,
    ) -> Result<TriangleId, SkeletonError> {
        let i = self.position(tri, facet.tetrahedron())?;
        check_facet(facet.facet())?;
        Ok(TriangleId::new(
            self.facet_class[4 * i + usize::from(facet.facet())],
            self.generation,
        ))
    }

    /// Orientation sign (`+1` or `-1`) assigned to a tetrahedron. Only
    /// meaningful when the triangulation is orientable.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex_of`].
    pub fn tetrahedron_orientation(
        &self,
        tri: &Triangulation,
        key: TetrahedronKey,
    ) -> Result<i8, SkeletonError> {
        let i = self.position(tri, key)?;
        Ok(self.orientation[i])
    }

    /// Index of the connected component containing a tetrahedron.
    ///
    /// # Errors
    ///
    /// As for [`Skeleton::vertex_of`].
    pub fn component_of(
        &self,
        tri: &Triangulation,
        key: TetrahedronKey,
    ) -> Result<usize, SkeletonError> {
        let i = self.position(tri, key)?;
        Ok(self.component[i])
    }
}

// =============================================================================
// BUILD HELPERS
// =============================================================================

fn to_i64(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Local edges of facet `f`: `c0c1`, `c0c2`, `c1c2` for its corners `c0 < c1 < c2`.
fn facet_edges(f: u8) -> [usize; 3] {
    let [c0, c1, c2] = facet_vertices(f);
    [(c0, c1), (c0, c2), (c1, c2)].map(|(a, b)| edge_number(a, b).map_or(0, usize::from))
}

/// Numbers the classes of `uf` in order of first appearance.
fn label_classes(uf: &mut UnionFind) -> (Vec<usize>, usize) {
    let mut root_to_class = vec![usize::MAX; uf.len()];
    let mut class_of = Vec::with_capacity(uf.len());
    let mut count = 0;
    for x in 0..uf.len() {
        let (root, _) = uf.find(x);
        if root_to_class[root] == usize::MAX {
            root_to_class[root] = count;
            count += 1;
        }
        class_of.push(root_to_class[root]);
    }
    (class_of, count)
}

/// Walks the dual graph, assigning orientation signs and component indices.
///
/// A gluing by `p` is orientation-compatible when the neighbour's sign is
/// `-sign(p)` times this one's.
fn orient(table: &[[DenseGluing; 4]]) -> (Vec<i8>, Vec<usize>, usize, bool) {
    let n = table.len();
    let mut orientation = vec![0i8; n];
    let mut component = vec![usize::MAX; n];
    let mut components = 0;
    let mut orientable = true;
    let mut queue = VecDeque::new();

    for start in 0..n {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = components;
        orientation[start] = 1;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            for (j, p) in table[i].iter().flatten().copied() {
                let expected = -p.sign() * orientation[i];
                if component[j] == usize::MAX {
                    component[j] = components;
                    orientation[j] = expected;
                    queue.push_back(j);
                } else if orientation[j] != expected {
                    orientable = false;
                }
            }
        }
        components += 1;
    }

    (orientation, component, components, orientable)
}

/// Groups boundary triangles into components joined along shared edges and
/// decides the orientability of each component surface.
fn boundary_components(
    triangles: &mut [Triangle],
    index_of: &TetrahedronSecondaryMap<usize>,
    edge_class: &[usize],
    edge_parity: &[bool],
    generation: u64,
) -> Vec<BoundaryComponent> {
    let boundary: Vec<usize> = triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_boundary())
        .map(|(i, _)| i)
        .collect();
    if boundary.is_empty() {
        return Vec::new();
    }

    // Every boundary triangle's edges, with the direction in which the
    // triangle's boundary cycle traverses the edge class.
    let edge_count = edge_class.iter().max().map_or(0, |m| m + 1);
    let mut uses: Vec<Vec<(usize, i8)>> = vec![Vec::new(); edge_count];
    for (local, &t) in boundary.iter().enumerate() {
        let rep = triangles[t].embeddings[0];
        let i = index_of[rep.tetrahedron()];
        let [e01, e02, e12] = facet_edges(rep.facet());
        for (e, cycle) in [(e01, 1i8), (e12, 1), (e02, -1)] {
            let flip = if edge_parity[6 * i + e] { -1 } else { 1 };
            uses[edge_class[6 * i + e]].push((local, cycle * flip));
        }
    }

    let mut components = UnionFind::new(boundary.len());
    let mut links: Vec<Vec<(usize, i8)>> = vec![Vec::new(); boundary.len()];
    for edge_uses in &uses {
        for (a, &(ta, da)) in edge_uses.iter().enumerate() {
            for &(tb, db) in &edge_uses[a + 1..] {
                components.union(ta, tb, false);
                let factor = -da * db;
                links[ta].push((tb, factor));
                links[tb].push((ta, factor));
            }
        }
    }

    let (component_of, count) = label_classes(&mut components);

    // Sign each triangle so that neighbours traverse shared edges oppositely.
    let mut sign = vec![0i8; boundary.len()];
    let mut orientable = vec![true; count];
    let mut queue = VecDeque::new();
    for start in 0..boundary.len() {
        if sign[start] != 0 {
            continue;
        }
        sign[start] = 1;
        queue.push_back(start);
        while let Some(t) = queue.pop_front() {
            for &(other, factor) in &links[t] {
                let expected = factor * sign[t];
                if sign[other] == 0 {
                    sign[other] = expected;
                    queue.push_back(other);
                } else if sign[other] != expected {
                    orientable[component_of[t]] = false;
                }
            }
        }
    }

    let mut out: Vec<BoundaryComponent> = (0..count)
        .map(|c| BoundaryComponent {
            triangles: Vec::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
            orientable: orientable[c],
        })
        .collect();
    // Each boundary triangle contributes at most three new edges and vertices.
    let mut seen_edges = fast_hash_set_with_capacity(3 * boundary.len());
    let mut seen_vertices = fast_hash_set_with_capacity(3 * boundary.len());
    for (local, &t) in boundary.iter().enumerate() {
        let c = component_of[local];
        triangles[t].boundary_component = Some(BoundaryComponentId::new(c, generation));
        let component = &mut out[c];
        component.triangles.push(TriangleId::new(t, generation));
        for edge in triangles[t].edges {
            if seen_edges.insert((c, edge.index())) {
                component.edges.push(edge);
            }
        }
        for vertex in triangles[t].vertices {
            if seen_vertices.insert((c, vertex.index())) {
                component.vertices.push(vertex);
            }
        }
    }
    out
}
