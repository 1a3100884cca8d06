//! The simplex store: tetrahedra and their facet gluings.
//!
//! [`Triangulation`] owns a set of [`Tetrahedron`] records in a slotmap arena
//! and maintains the only structural invariant the rest of the crate relies on:
//!
//! - **Gluing symmetry**: if facet `i` of `A` is glued to `B` by `p`, then facet
//!   `p(i)` of `B` is glued to `A` by `p⁻¹`.
//!
//! Self-gluings are legal as long as a facet is never glued to itself.
//!
//! Every successful mutation advances a generation counter. The lazily built
//! [`Skeleton`] snapshot is tagged with the generation it was computed from,
//! so a snapshot taken before a mutation is never mistaken for a current one.
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let mut tri = Triangulation::new();
//! let a = tri.add_tetrahedron();
//! let b = tri.add_tetrahedron();
//! tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();
//!
//! assert_eq!(tri.neighbor(a, 0).unwrap(), Some(b));
//! assert_eq!(tri.neighbor(b, 0).unwrap(), Some(a));
//! assert_eq!(tri.number_of_vertices(), 5);
//! assert_eq!(tri.number_of_boundary_components(), 1);
//! ```

use std::fmt;
use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use arc_swap::ArcSwapOption;
use slotmap::new_key_type;
use thiserror::Error;

use crate::core::collections::{FacetIndex, StorageMap, TetrahedronSecondaryMap};
use crate::core::facet::FacetHandle;
use crate::core::perm::Perm4;
use crate::core::tetrahedron::{Adjacency, Tetrahedron};
use crate::topology::skeleton::{BoundaryComponent, Skeleton, VertexLinkType};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the simplex store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TriangulationError {
    /// The key does not name a tetrahedron of this triangulation.
    #[error("Tetrahedron {key:?} does not exist in this triangulation")]
    InvalidHandle {
        /// The offending key.
        key: TetrahedronKey,
    },
    /// A positional tetrahedron index is out of range.
    #[error("Tetrahedron index {index} out of range for {len} tetrahedra")]
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// Number of tetrahedra.
        len: usize,
    },
    /// A facet number outside `0..4`.
    #[error("Facet index {facet} out of range (expected 0..4)")]
    InvalidFacet {
        /// The offending facet number.
        facet: FacetIndex,
    },
    /// An edge number outside `0..6`.
    #[error("Edge index {edge} out of range (expected 0..6)")]
    InvalidEdge {
        /// The offending edge number.
        edge: u8,
    },
    /// A corner number outside `0..4`.
    #[error("Corner index {corner} out of range (expected 0..4)")]
    InvalidCorner {
        /// The offending corner number.
        corner: u8,
    },
    /// Gluing onto a facet that is already glued.
    #[error("Facet {facet:?} is already glued")]
    FacetOccupied {
        /// The occupied facet.
        facet: FacetHandle,
    },
    /// The requested gluing is not a valid facet identification.
    #[error("Invalid gluing: {reason}")]
    InvalidGluing {
        /// Description of the problem.
        reason: String,
    },
    /// The stored gluings violate a structural invariant.
    #[error("Internal data structure inconsistency: {message}")]
    Inconsistent {
        /// Description of the inconsistency.
        message: String,
    },
}

/// Classifies the kind of invariant that failed during validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantKind {
    /// Gluing symmetry and liveness of neighbour keys.
    GluingSymmetry,
    /// Every edge is identified with itself only in its own orientation.
    EdgeValidity,
    /// Every vertex link is a sphere, a disc, or a closed surface (ideal).
    VertexLinks,
    /// Orientability (only checked on request).
    Orientability,
}

/// A single invariant violation recorded during validation.
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// The kind of invariant that failed.
    pub kind: InvariantKind,
    /// The detailed error.
    pub error: TriangulationError,
}

/// Aggregate report of all failed invariants.
#[derive(Clone, Debug)]
pub struct TriangulationValidationReport {
    /// The ordered list of violations.
    pub violations: Vec<InvariantViolation>,
}

impl TriangulationValidationReport {
    /// Returns `true` if no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Configuration for [`Triangulation::validation_report`].
#[derive(Clone, Copy, Debug)]
pub struct ValidationOptions {
    /// Check edge validity and vertex links (requires a skeleton build).
    pub check_manifold: bool,
    /// Require the triangulation to be orientable.
    pub check_orientability: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_manifold: true,
            check_orientability: false,
        }
    }
}

// =============================================================================
// KEYS AND INGESTION RECORDS
// =============================================================================

new_key_type! {
    /// Generation-tagged handle to a tetrahedron.
    ///
    /// Keys stay valid for as long as the tetrahedron is present, across any
    /// number of unrelated insertions and removals. A key to a removed
    /// tetrahedron is rejected with [`TriangulationError::InvalidHandle`].
    pub struct TetrahedronKey;
}

/// A facet gluing between tetrahedra named by position (`0..n`).
///
/// This is the ingestion format for [`Triangulation::from_gluings`] and the
/// export format of [`Triangulation::gluings`]. The partner facet is implied:
/// it is `gluing(facet)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FacetGluing {
    /// Position of the first tetrahedron.
    pub tetrahedron: usize,
    /// Facet of the first tetrahedron.
    pub facet: FacetIndex,
    /// Position of the partner tetrahedron.
    pub partner: usize,
    /// Corner map from the first tetrahedron to the partner.
    pub gluing: Perm4,
}

impl FacetGluing {
    /// Creates a gluing record.
    #[must_use]
    pub const fn new(tetrahedron: usize, facet: FacetIndex, partner: usize, gluing: Perm4) -> Self {
        Self {
            tetrahedron,
            facet,
            partner,
            gluing,
        }
    }

    /// The partner facet, `gluing(facet)`.
    ///
    /// # Panics
    ///
    /// Panics if `facet` is not in `0..4`.
    #[must_use]
    pub const fn partner_facet(&self) -> FacetIndex {
        self.gluing.apply(self.facet)
    }
}

/// One facet slot of the positional gluing table.
pub(crate) type DenseGluing = Option<(usize, Perm4)>;

// =============================================================================
// TRIANGULATION
// =============================================================================

/// A 3-dimensional triangulation: tetrahedra glued along their facets.
///
/// Mutation requires `&mut self`, so a single writer is enforced by the
/// borrow checker. Read-only queries (skeleton, signature) take `&self` and may
/// run concurrently; share across threads behind a `RwLock` when mutation is
/// also needed.
pub struct Triangulation {
    /// Arena of tetrahedra.
    tetrahedra: StorageMap<TetrahedronKey, Tetrahedron>,

    /// Incremented on every successful structural modification.
    generation: AtomicU64,

    /// Identity token; skeleton snapshots hold a weak reference to it so a
    /// snapshot is never accepted by another triangulation.
    identity: Arc<()>,

    /// Lazily built skeleton, tagged with the generation it was built from.
    skeleton_cache: ArcSwapOption<Skeleton>,
}

impl Default for Triangulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Triangulation {
    fn clone(&self) -> Self {
        Self {
            tetrahedra: self.tetrahedra.clone(),
            generation: AtomicU64::new(self.generation()),
            identity: Arc::new(()),
            skeleton_cache: ArcSwapOption::empty(),
        }
    }
}

impl fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("generation", &self.generation())
            .field("tetrahedra", &self.tetrahedra)
            .finish_non_exhaustive()
    }
}

/// Two triangulations are equal when they hold the same keys with identical
/// gluing tables. This is snapshot equality, not isomorphism; see
/// [`Triangulation::is_isomorphic_to`] for the latter.
impl PartialEq for Triangulation {
    fn eq(&self, other: &Self) -> bool {
        self.tetrahedra.len() == other.tetrahedra.len()
            && self
                .tetrahedra
                .iter()
                .all(|(key, tet)| other.tetrahedra.get(key) == Some(tet))
    }
}

impl Eq for Triangulation {}

impl Triangulation {
    /// Creates an empty triangulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tetrahedra: StorageMap::with_key(),
            generation: AtomicU64::new(0),
            identity: Arc::new(()),
            skeleton_cache: ArcSwapOption::empty(),
        }
    }

    /// Builds a triangulation from `tetrahedra` isolated tetrahedra and a list
    /// of gluings between them, addressed by position.
    ///
    /// This is the ingestion path for external formats. A gluing may be listed
    /// from either side; listing both sides is accepted as long as they agree.
    ///
    /// # Errors
    ///
    /// - [`TriangulationError::InvalidIndex`] for a position `>= tetrahedra`
    /// - [`TriangulationError::InvalidFacet`] / [`TriangulationError::InvalidGluing`]
    ///   for malformed gluings
    /// - [`TriangulationError::FacetOccupied`] when two different gluings claim
    ///   the same facet
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pachner::prelude::*;
    ///
    /// // Two tetrahedra glued along all four facets: a 3-sphere.
    /// let gluings: Vec<_> = (0..4)
    ///     .map(|f| FacetGluing::new(0, f, 1, Perm4::IDENTITY))
    ///     .collect();
    /// let tri = Triangulation::from_gluings(2, &gluings).unwrap();
    /// assert!(tri.is_closed());
    /// assert_eq!(tri.euler_characteristic(), 0);
    /// ```
    pub fn from_gluings(
        tetrahedra: usize,
        gluings: &[FacetGluing],
    ) -> Result<Self, TriangulationError> {
        let mut tri = Self::new();
        let keys = tri.add_tetrahedra(tetrahedra);
        let key_at = |index: usize| {
            keys.get(index)
                .copied()
                .ok_or(TriangulationError::InvalidIndex {
                    index,
                    len: tetrahedra,
                })
        };

        for gluing in gluings {
            let a = key_at(gluing.tetrahedron)?;
            let b = key_at(gluing.partner)?;
            check_facet(gluing.facet)?;
            let existing = tri.tetrahedra[a].adjacency(gluing.facet);
            if existing
                == Some(Adjacency {
                    tetrahedron: b,
                    gluing: gluing.gluing,
                })
            {
                continue;
            }
            tri.glue(a, gluing.facet, b, gluing.partner_facet(), gluing.gluing)?;
        }

        tracing::debug!(
            tetrahedra,
            gluings = gluings.len(),
            "built triangulation from gluing list"
        );
        Ok(tri)
    }

    // =========================================================================
    // BASIC ACCESS
    // =========================================================================

    /// Number of tetrahedra.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Returns `true` if there are no tetrahedra.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tetrahedra.is_empty()
    }

    /// Iterates over `(key, tetrahedron)` pairs in storage order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = (TetrahedronKey, &Tetrahedron)> {
        self.tetrahedra.iter()
    }

    /// Iterates over tetrahedron keys in storage order.
    ///
    /// Storage order defines the positional index used by
    /// [`Triangulation::gluings`] and [`Triangulation::tetrahedron_index`].
    pub fn tetrahedron_keys(&self) -> impl Iterator<Item = TetrahedronKey> + '_ {
        self.tetrahedra.keys()
    }

    /// Looks up a tetrahedron record.
    #[must_use]
    pub fn tetrahedron(&self, key: TetrahedronKey) -> Option<&Tetrahedron> {
        self.tetrahedra.get(key)
    }

    /// Returns `true` if `key` names a tetrahedron of this triangulation.
    #[must_use]
    pub fn contains_tetrahedron(&self, key: TetrahedronKey) -> bool {
        self.tetrahedra.contains_key(key)
    }

    /// Position of `key` in storage order.
    #[must_use]
    pub fn tetrahedron_index(&self, key: TetrahedronKey) -> Option<usize> {
        self.tetrahedra.keys().position(|k| k == key)
    }

    /// Key at position `index` in storage order.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<TetrahedronKey> {
        self.tetrahedra.keys().nth(index)
    }

    /// Builds the position lookup for all keys at once.
    pub(crate) fn dense_index(&self) -> (Vec<TetrahedronKey>, TetrahedronSecondaryMap<usize>) {
        let keys: Vec<_> = self.tetrahedra.keys().collect();
        let mut index_of = TetrahedronSecondaryMap::with_capacity(keys.len());
        for (index, &key) in keys.iter().enumerate() {
            index_of.insert(key, index);
        }
        (keys, index_of)
    }

    /// The gluing table addressed by position: `table[i][f]` is the position
    /// and permutation glued onto facet `f` of the `i`-th tetrahedron.
    pub(crate) fn dense_gluings(&self) -> Vec<[DenseGluing; 4]> {
        let (_, index_of) = self.dense_index();
        self.tetrahedra
            .values()
            .map(|tet| {
                std::array::from_fn(|facet| {
                    tet.adjacent[facet].and_then(|adj| {
                        index_of
                            .get(adj.tetrahedron)
                            .map(|&partner| (partner, adj.gluing))
                    })
                })
            })
            .collect()
    }

    pub(crate) fn get(&self, key: TetrahedronKey) -> Result<&Tetrahedron, TriangulationError> {
        self.tetrahedra
            .get(key)
            .ok_or(TriangulationError::InvalidHandle { key })
    }

    /// The gluing across `facet` of `key`, or `None` on the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::InvalidHandle`] for an unknown key and
    /// [`TriangulationError::InvalidFacet`] for a facet outside `0..4`.
    pub fn adjacency(
        &self,
        key: TetrahedronKey,
        facet: FacetIndex,
    ) -> Result<Option<Adjacency>, TriangulationError> {
        check_facet(facet)?;
        Ok(self.get(key)?.adjacency(facet))
    }

    /// The tetrahedron glued onto `facet` of `key`.
    ///
    /// # Errors
    ///
    /// As for [`Triangulation::adjacency`].
    pub fn neighbor(
        &self,
        key: TetrahedronKey,
        facet: FacetIndex,
    ) -> Result<Option<TetrahedronKey>, TriangulationError> {
        Ok(self.adjacency(key, facet)?.map(|adj| adj.tetrahedron))
    }

    /// The permutation gluing `facet` of `key` to its neighbour.
    ///
    /// # Errors
    ///
    /// As for [`Triangulation::adjacency`].
    pub fn gluing_permutation(
        &self,
        key: TetrahedronKey,
        facet: FacetIndex,
    ) -> Result<Option<Perm4>, TriangulationError> {
        Ok(self.adjacency(key, facet)?.map(|adj| adj.gluing))
    }

    /// Exports every gluing exactly once, by position, from the endpoint with
    /// the smaller `(position, facet)`.
    #[must_use]
    pub fn gluings(&self) -> Vec<FacetGluing> {
        let (keys, index_of) = self.dense_index();
        let mut out = Vec::new();
        for (index, &key) in keys.iter().enumerate() {
            for (facet, adj) in self.tetrahedra[key].adjacencies() {
                let Some(&partner) = index_of.get(adj.tetrahedron) else {
                    continue;
                };
                let partner_facet = adj.gluing.apply(facet);
                if (index, facet) < (partner, partner_facet) {
                    out.push(FacetGluing::new(index, facet, partner, adj.gluing));
                }
            }
        }
        out
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Adds an isolated tetrahedron.
    pub fn add_tetrahedron(&mut self) -> TetrahedronKey {
        let key = self.tetrahedra.insert(Tetrahedron::new());
        self.bump_generation();
        key
    }

    /// Adds `count` isolated tetrahedra, returning their keys in order.
    pub fn add_tetrahedra(&mut self, count: usize) -> Vec<TetrahedronKey> {
        let keys: Vec<_> = (0..count)
            .map(|_| self.tetrahedra.insert(Tetrahedron::new()))
            .collect();
        if count > 0 {
            self.bump_generation();
        }
        keys
    }

    /// Removes a tetrahedron, ungluing all of its facets first.
    ///
    /// Neighbours keep their records; the facets that faced the removed
    /// tetrahedron become boundary facets.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::InvalidHandle`] if `key` is not present.
    pub fn remove_tetrahedron(&mut self, key: TetrahedronKey) -> Result<(), TriangulationError> {
        let tet = self.get(key)?.clone();
        for (facet, adj) in tet.adjacencies() {
            if adj.tetrahedron != key {
                self.set_adjacency(adj.tetrahedron, adj.gluing.apply(facet), None);
            }
        }
        self.tetrahedra.remove(key);
        self.bump_generation();
        Ok(())
    }

    /// Glues `facet_a` of `a` to `facet_b` of `b`.
    ///
    /// `gluing` maps the corners of `a` onto the corners of `b` and must send
    /// `facet_a` to `facet_b`, i.e. carry the triangle opposite `facet_a` onto
    /// the triangle opposite `facet_b`. The reverse slot receives `gluing⁻¹`.
    /// A tetrahedron may be glued to itself along two different facets.
    ///
    /// Nothing is modified when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`TriangulationError::InvalidHandle`] for unknown keys
    /// - [`TriangulationError::InvalidFacet`] for facets outside `0..4`
    /// - [`TriangulationError::InvalidGluing`] if `gluing(facet_a) != facet_b`
    ///   or a facet would be glued to itself
    /// - [`TriangulationError::FacetOccupied`] if either facet is already glued
    pub fn glue(
        &mut self,
        a: TetrahedronKey,
        facet_a: FacetIndex,
        b: TetrahedronKey,
        facet_b: FacetIndex,
        gluing: Perm4,
    ) -> Result<(), TriangulationError> {
        check_facet(facet_a)?;
        check_facet(facet_b)?;
        let tet_a = self.get(a)?;
        let tet_b = self.get(b)?;

        if gluing.apply(facet_a) != facet_b {
            return Err(TriangulationError::InvalidGluing {
                reason: format!(
                    "permutation {gluing} sends facet {facet_a} to {}, not {facet_b}",
                    gluing.apply(facet_a)
                ),
            });
        }
        if a == b && facet_a == facet_b {
            return Err(TriangulationError::InvalidGluing {
                reason: format!("facet {facet_a} cannot be glued to itself"),
            });
        }
        if !tet_a.is_boundary(facet_a) {
            return Err(TriangulationError::FacetOccupied {
                facet: FacetHandle::new(a, facet_a),
            });
        }
        if !tet_b.is_boundary(facet_b) {
            return Err(TriangulationError::FacetOccupied {
                facet: FacetHandle::new(b, facet_b),
            });
        }

        self.set_adjacency(
            a,
            facet_a,
            Some(Adjacency {
                tetrahedron: b,
                gluing,
            }),
        );
        self.set_adjacency(
            b,
            facet_b,
            Some(Adjacency {
                tetrahedron: a,
                gluing: gluing.inverse(),
            }),
        );
        self.bump_generation();
        Ok(())
    }

    /// Unglues `facet` of `key` and the matching facet of its partner.
    ///
    /// Returns the removed gluing, or `None` (without touching the generation)
    /// if the facet was already on the boundary.
    ///
    /// # Errors
    ///
    /// As for [`Triangulation::adjacency`].
    pub fn unglue(
        &mut self,
        key: TetrahedronKey,
        facet: FacetIndex,
    ) -> Result<Option<Adjacency>, TriangulationError> {
        let Some(adj) = self.adjacency(key, facet)? else {
            return Ok(None);
        };
        self.set_adjacency(key, facet, None);
        self.set_adjacency(adj.tetrahedron, adj.gluing.apply(facet), None);
        self.bump_generation();
        Ok(Some(adj))
    }

    /// Writes one side of a gluing without any checks or generation bump.
    ///
    /// Used by the move engine, which validates a whole rewrite before
    /// committing it and bumps the generation once.
    pub(crate) fn set_adjacency(
        &mut self,
        key: TetrahedronKey,
        facet: FacetIndex,
        adjacency: Option<Adjacency>,
    ) {
        if let Some(slot) = self
            .tetrahedra
            .get_mut(key)
            .and_then(|tet| tet.adjacent.get_mut(usize::from(facet)))
        {
            *slot = adjacency;
        }
    }

    /// Inserts a blank record without a generation bump (move engine only).
    pub(crate) fn insert_blank(&mut self) -> TetrahedronKey {
        self.tetrahedra.insert(Tetrahedron::new())
    }

    /// Drops a record without ungluing partners (move engine only).
    pub(crate) fn discard(&mut self, key: TetrahedronKey) {
        self.tetrahedra.remove(key);
    }

    /// Resets a record to an isolated tetrahedron (move engine only).
    pub(crate) fn reset(&mut self, key: TetrahedronKey) {
        if let Some(tet) = self.tetrahedra.get_mut(key) {
            *tet = Tetrahedron::new();
        }
    }

    // =========================================================================
    // GENERATION AND SKELETON CACHE
    // =========================================================================

    /// Advances the generation counter, invalidating the skeleton snapshot.
    pub(crate) fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::Release);
        self.skeleton_cache.store(None);
    }

    /// The current generation. Strictly increases on every successful
    /// mutation; failed operations leave it untouched.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn identity_token(&self) -> Weak<()> {
        Arc::downgrade(&self.identity)
    }

    pub(crate) fn owns_token(&self, token: &Weak<()>) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.identity), token.as_ptr())
    }

    /// The skeleton of the current generation, built on first access.
    ///
    /// The returned snapshot stays readable after later mutations, but every
    /// method that relates it back to the triangulation reports
    /// [`SkeletonError::StaleSkeleton`](crate::topology::skeleton::SkeletonError::StaleSkeleton)
    /// once the generation has moved on.
    #[must_use]
    pub fn skeleton(&self) -> Arc<Skeleton> {
        let generation = self.generation();
        if let Some(cached) = self.skeleton_cache.load_full()
            && cached.generation() == generation
        {
            return cached;
        }

        // Build outside the RCU closure so retries do not recompute.
        let mut built: Option<Arc<Skeleton>> = None;
        self.skeleton_cache.rcu(|old| match old {
            Some(existing) if existing.generation() == generation => Some(Arc::clone(existing)),
            _ => Some(Arc::clone(
                built.get_or_insert_with(|| Arc::new(Skeleton::build(self))),
            )),
        });

        match self.skeleton_cache.load_full() {
            Some(current) if current.generation() == generation => current,
            _ => built.unwrap_or_else(|| Arc::new(Skeleton::build(self))),
        }
    }

    // =========================================================================
    // SKELETAL QUERIES
    // =========================================================================

    /// Number of vertex classes.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.skeleton().number_of_vertices()
    }

    /// Number of edge classes.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.skeleton().number_of_edges()
    }

    /// Number of triangle classes.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.skeleton().number_of_triangles()
    }

    /// Number of real boundary components.
    #[must_use]
    pub fn number_of_boundary_components(&self) -> usize {
        self.skeleton().number_of_boundary_components()
    }

    /// The real boundary components.
    #[must_use]
    pub fn boundary_components(&self) -> Vec<BoundaryComponent> {
        self.skeleton().boundary_components().to_vec()
    }

    /// `V - E + F - T`.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        self.skeleton().euler_characteristic()
    }

    /// Returns `true` if the tetrahedra can be oriented consistently.
    #[must_use]
    pub fn is_orientable(&self) -> bool {
        self.skeleton().is_orientable()
    }

    /// Returns `true` if the dual graph is connected (the empty triangulation
    /// counts as connected).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.skeleton().is_connected()
    }

    /// Number of connected components.
    #[must_use]
    pub fn number_of_components(&self) -> usize {
        self.skeleton().number_of_components()
    }

    /// Returns `true` if there are no boundary triangles and no ideal vertices.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.skeleton().is_closed()
    }

    /// Returns `true` if some vertex link is a closed surface other than a sphere.
    #[must_use]
    pub fn is_ideal(&self) -> bool {
        self.skeleton().is_ideal()
    }

    /// Returns `true` if every edge is valid and every vertex link is a
    /// sphere, a disc or a closed surface.
    #[must_use]
    pub fn is_valid_manifold(&self) -> bool {
        self.skeleton().is_valid()
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks gluing symmetry for every glued facet.
    ///
    /// # Errors
    ///
    /// Returns the first [`TriangulationError::Inconsistent`] found.
    pub fn validate(&self) -> Result<(), TriangulationError> {
        for (key, tet) in &self.tetrahedra {
            for (facet, adj) in tet.adjacencies() {
                let partner_facet = adj.gluing.apply(facet);
                if adj.tetrahedron == key && partner_facet == facet {
                    return Err(TriangulationError::Inconsistent {
                        message: format!("facet {facet} of {key:?} is glued to itself"),
                    });
                }
                let back = self
                    .tetrahedra
                    .get(adj.tetrahedron)
                    .ok_or_else(|| TriangulationError::Inconsistent {
                        message: format!(
                            "facet {facet} of {key:?} references missing tetrahedron {:?}",
                            adj.tetrahedron
                        ),
                    })?
                    .adjacency(partner_facet);
                let expected = Adjacency {
                    tetrahedron: key,
                    gluing: adj.gluing.inverse(),
                };
                if back != Some(expected) {
                    return Err(TriangulationError::Inconsistent {
                        message: format!(
                            "facet {facet} of {key:?} is glued to facet {partner_facet} of {:?}, \
                             which holds {back:?} instead of the inverse gluing",
                            adj.tetrahedron
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Runs every requested check and reports all failures at once.
    ///
    /// # Errors
    ///
    /// Returns a [`TriangulationValidationReport`] listing each violated invariant.
    pub fn validation_report(
        &self,
        options: ValidationOptions,
    ) -> Result<(), TriangulationValidationReport> {
        let mut violations = Vec::new();

        if let Err(error) = self.validate() {
            violations.push(InvariantViolation {
                kind: InvariantKind::GluingSymmetry,
                error,
            });
            // The skeleton of an asymmetric store is meaningless.
            return Err(TriangulationValidationReport { violations });
        }

        if options.check_manifold || options.check_orientability {
            let skeleton = self.skeleton();
            if options.check_manifold {
                for (id, edge) in skeleton.edges() {
                    if !edge.is_valid() {
                        violations.push(InvariantViolation {
                            kind: InvariantKind::EdgeValidity,
                            error: TriangulationError::Inconsistent {
                                message: format!(
                                    "edge {} is identified with itself in reverse",
                                    id.index()
                                ),
                            },
                        });
                    }
                }
                for (id, vertex) in skeleton.vertices() {
                    if vertex.link_type() == VertexLinkType::Invalid {
                        violations.push(InvariantViolation {
                            kind: InvariantKind::VertexLinks,
                            error: TriangulationError::Inconsistent {
                                message: format!(
                                    "vertex {} has link with Euler characteristic {} ({})",
                                    id.index(),
                                    vertex.link().euler_characteristic,
                                    if vertex.link().closed {
                                        "closed"
                                    } else {
                                        "bounded"
                                    }
                                ),
                            },
                        });
                    }
                }
            }
            if options.check_orientability && !skeleton.is_orientable() {
                violations.push(InvariantViolation {
                    kind: InvariantKind::Orientability,
                    error: TriangulationError::Inconsistent {
                        message: "triangulation is not orientable".to_string(),
                    },
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(TriangulationValidationReport { violations })
        }
    }
}

pub(crate) const fn check_facet(facet: FacetIndex) -> Result<(), TriangulationError> {
    if facet < 4 {
        Ok(())
    } else {
        Err(TriangulationError::InvalidFacet { facet })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tri: &Triangulation) -> Vec<(TetrahedronKey, Tetrahedron)> {
        tri.tetrahedra().map(|(k, t)| (k, t.clone())).collect()
    }

    #[test]
    fn test_glue_is_symmetric() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        let p = Perm4::from_images([1, 0, 3, 2]).unwrap();
        tri.glue(a, 0, b, 1, p).unwrap();

        assert_eq!(tri.neighbor(a, 0).unwrap(), Some(b));
        assert_eq!(tri.gluing_permutation(a, 0).unwrap(), Some(p));
        assert_eq!(tri.neighbor(b, 1).unwrap(), Some(a));
        assert_eq!(tri.gluing_permutation(b, 1).unwrap(), Some(p.inverse()));
        assert!(tri.validate().is_ok());
    }

    #[test]
    fn test_glue_rejects_mismatched_facet() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        let before = tri.generation();

        let err = tri.glue(a, 0, b, 1, Perm4::IDENTITY).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidGluing { .. }));
        assert_eq!(tri.generation(), before);
        assert!(tri.tetrahedron(a).unwrap().is_boundary(0));
    }

    #[test]
    fn test_self_gluing_rules() {
        let mut tri = Triangulation::new();
        let t = tri.add_tetrahedron();

        let err = tri.glue(t, 2, t, 2, Perm4::IDENTITY).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidGluing { .. }));

        tri.glue(t, 2, t, 3, Perm4::transposition(2, 3)).unwrap();
        assert_eq!(tri.neighbor(t, 3).unwrap(), Some(t));
        assert!(tri.validate().is_ok());
    }

    #[test]
    fn test_facet_occupied_leaves_state_untouched() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        let c = tri.add_tetrahedron();
        tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();

        let before = snapshot(&tri);
        let generation = tri.generation();
        let err = tri.glue(c, 0, a, 0, Perm4::IDENTITY).unwrap_err();
        assert_eq!(
            err,
            TriangulationError::FacetOccupied {
                facet: FacetHandle::new(a, 0)
            }
        );
        assert_eq!(snapshot(&tri), before);
        assert_eq!(tri.generation(), generation);
    }

    #[test]
    fn test_unglue_and_boundary_noop() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        tri.glue(a, 3, b, 3, Perm4::IDENTITY).unwrap();

        let removed = tri.unglue(b, 3).unwrap();
        assert_eq!(removed.map(|adj| adj.tetrahedron), Some(a));
        assert_eq!(tri.neighbor(a, 3).unwrap(), None);

        let generation = tri.generation();
        assert_eq!(tri.unglue(a, 3).unwrap(), None);
        assert_eq!(tri.generation(), generation);
    }

    #[test]
    fn test_remove_ungluing_side_effect() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        tri.glue(a, 1, b, 2, Perm4::transposition(1, 2)).unwrap();
        tri.glue(a, 2, a, 3, Perm4::transposition(2, 3)).unwrap();

        tri.remove_tetrahedron(a).unwrap();
        assert!(!tri.contains_tetrahedron(a));
        assert!(tri.tetrahedron(b).unwrap().is_boundary(2));
        assert!(tri.validate().is_ok());

        assert_eq!(
            tri.remove_tetrahedron(a),
            Err(TriangulationError::InvalidHandle { key: a })
        );
        assert_eq!(
            tri.neighbor(a, 0),
            Err(TriangulationError::InvalidHandle { key: a })
        );
    }

    #[test]
    fn test_invalid_facet_index() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        assert_eq!(
            tri.neighbor(a, 4),
            Err(TriangulationError::InvalidFacet { facet: 4 })
        );
    }

    #[test]
    fn test_generation_strictly_increases() {
        let mut tri = Triangulation::new();
        let g0 = tri.generation();
        let a = tri.add_tetrahedron();
        let g1 = tri.generation();
        let b = tri.add_tetrahedron();
        tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();
        let g2 = tri.generation();
        tri.unglue(a, 0).unwrap();
        let g3 = tri.generation();
        assert!(g0 < g1 && g1 < g2 && g2 < g3);
    }

    #[test]
    fn test_from_gluings_and_export() {
        let gluings = vec![
            FacetGluing::new(0, 0, 1, Perm4::IDENTITY),
            FacetGluing::new(1, 2, 2, Perm4::transposition(2, 3)),
        ];
        let tri = Triangulation::from_gluings(3, &gluings).unwrap();
        assert_eq!(tri.number_of_tetrahedra(), 3);
        assert_eq!(tri.gluings(), gluings);

        // Listing the reverse side as well is accepted.
        let mut both = gluings.clone();
        both.push(FacetGluing::new(1, 0, 0, Perm4::IDENTITY));
        let again = Triangulation::from_gluings(3, &both).unwrap();
        assert_eq!(again.gluings(), gluings);

        let err = Triangulation::from_gluings(1, &[FacetGluing::new(0, 0, 1, Perm4::IDENTITY)])
            .unwrap_err();
        assert_eq!(err, TriangulationError::InvalidIndex { index: 1, len: 1 });
    }

    #[test]
    fn test_skeleton_cache_tracks_generation() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let first = tri.skeleton();
        assert!(Arc::ptr_eq(&first, &tri.skeleton()));

        let b = tri.add_tetrahedron();
        tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();
        let second = tri.skeleton();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.generation(), tri.generation());
    }

    #[test]
    fn test_clone_equality_and_independence() {
        let mut tri = Triangulation::new();
        let a = tri.add_tetrahedron();
        let b = tri.add_tetrahedron();
        tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();

        let mut copy = tri.clone();
        assert_eq!(copy, tri);
        copy.unglue(a, 0).unwrap();
        assert_ne!(copy, tri);
        assert_eq!(tri.neighbor(a, 0).unwrap(), Some(b));
    }
}
