//! # pachner
//!
//! This is a library for combinatorial 3-manifold triangulations: tetrahedra
//! glued facet to facet by vertex permutations, with no coordinates attached.
//!
//! # Features
//!
//! - Arena-backed simplex store with stable, generation-tagged tetrahedron keys
//! - Skeleton analysis: vertex, edge and triangle classes, boundary components,
//!   vertex links, orientability, connectedness and the Euler characteristic
//! - The four Pachner moves (1-4, 2-3, 3-2, 4-1), each atomic
//! - Isomorphism signatures: canonical text encodings with exact
//!   reconstruction
//! - Serialization/Deserialization with [serde](https://serde.rs) through the
//!   signature format
//!
//! # Basic Usage
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! // Two tetrahedra glued along all four facets by the identity: a 3-sphere.
//! let gluings: Vec<_> = (0..4)
//!     .map(|f| FacetGluing::new(0, f, 1, Perm4::IDENTITY))
//!     .collect();
//! let mut tri = Triangulation::from_gluings(2, &gluings).unwrap();
//!
//! assert!(tri.is_closed());
//! assert!(tri.is_orientable());
//! assert_eq!(tri.number_of_vertices(), 4);
//! assert_eq!(tri.euler_characteristic(), 0);
//!
//! // Pachner moves change the triangulation but not the manifold.
//! let signature = tri.isomorphism_signature().unwrap();
//! let a = tri.key_at(0).unwrap();
//! let info = tri.move_2_3(FacetHandle::new(a, 0)).unwrap();
//! assert_eq!(tri.number_of_tetrahedra(), 3);
//! assert_eq!(tri.euler_characteristic(), 0);
//!
//! tri.apply_move(info.inverse()).unwrap();
//! assert_eq!(tri.isomorphism_signature().unwrap(), signature);
//! ```
//!
//! # Conventions
//!
//! Facet `i` of a tetrahedron is the triangle opposite corner `i`. A gluing of
//! facet `i` of `A` to `B` is a [`Perm4`](core::perm::Perm4) `p` sending the
//! corners of `A` to the corners of `B`; it glues facet `i` of `A` onto facet
//! `p(i)` of `B`, and `B` records `p⁻¹` in the other direction.
//!
//! # Validation
//!
//! | Check | Method | Description |
//! |-------|--------|-------------|
//! | Gluing symmetry | [`Triangulation::validate`](core::triangulation::Triangulation::validate) | Every gluing is recorded on both sides with inverse permutations. |
//! | Full report | [`Triangulation::validation_report`](core::triangulation::Triangulation::validation_report) | Collects symmetry, edge, vertex-link and orientability violations. |
//! | Euler check | [`validate_triangulation_euler`](topology::characteristics::validation::validate_triangulation_euler) | Compares χ with the value predicted by the boundary and vertex links. |
//!
//! # Concurrency
//!
//! A [`Triangulation`](core::triangulation::Triangulation) is `Send + Sync`.
//! Mutation needs `&mut self`; every read-only query, including building the
//! cached [`Skeleton`](topology::skeleton::Skeleton) and computing signatures,
//! works through `&self`. Snapshots handed out by
//! [`Triangulation::skeleton`](core::triangulation::Triangulation::skeleton)
//! report [`SkeletonError::StaleSkeleton`](topology::skeleton::SkeletonError::StaleSkeleton)
//! once the triangulation has changed.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

/// The `core` module contains the simplex store and the algorithms acting on
/// it.
pub mod core {
    /// Algorithms on triangulations: moves, isomorphisms and signatures.
    pub mod algorithms {
        /// Combinatorial isomorphisms between triangulations
        pub mod isomorphism;
        /// Pachner moves in dimension 3
        pub mod pachner;
        /// Isomorphism signatures
        pub mod signature;
    }
    /// Collection aliases used throughout the crate
    pub mod collections;
    pub mod facet;
    pub mod perm;
    pub mod tetrahedron;
    pub mod triangulation;
    pub mod util;
    // Re-export the `core` modules.
    pub use facet::*;
    pub use perm::*;
    pub use tetrahedron::*;
    pub use triangulation::*;
    // Note: collections module not re-exported here to avoid namespace pollution
    // Import specific types via prelude or use crate::core::collections::
}

/// Topological analysis and editing of triangulations.
pub mod topology {
    /// Topological invariants and their validation
    pub mod characteristics {
        pub mod euler;
        pub mod validation;
    }
    /// High-level move API
    pub mod edit;
    pub mod skeleton;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        facet::*,
        perm::{ALL_PERM4, Perm4},
        tetrahedron::{Adjacency, Tetrahedron},
        triangulation::{
            FacetGluing, InvariantKind, InvariantViolation, TetrahedronKey, Triangulation,
            TriangulationError, TriangulationValidationReport, ValidationOptions,
        },
    };

    pub use crate::core::algorithms::{
        isomorphism::{Isomorphism, IsomorphismError},
        pachner::{
            IllegalMoveReason, InsertedFace, MoveInfo, PachnerError, PachnerMove,
            PachnerMoveKind,
        },
        signature::{SignatureError, SignatureProgress},
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    pub use crate::topology::{
        characteristics::{euler::TopologyClassification, validation::TopologyCheckResult},
        edit::TopologyEdit,
        skeleton::{
            BoundaryComponent, BoundaryComponentId, Edge, EdgeId, Skeleton, SkeletonError,
            Triangle, TriangleId, Vertex, VertexId, VertexLink, VertexLinkType,
        },
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
