//! Combinatorial isomorphisms between triangulations.
//!
//! An [`Isomorphism`] relabels a triangulation: tetrahedron `i` (by storage
//! position) becomes tetrahedron `σ(i)`, and its corners are renamed by
//! `π_i`. A gluing of facet `f` of `i` to tetrahedron `j` by `g` becomes a
//! gluing of facet `π_i(f)` of `σ(i)` to `σ(j)` by `π_j ∘ g ∘ π_i⁻¹`.
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let tri = Triangulation::from_gluings(
//!     2,
//!     &[FacetGluing::new(0, 0, 1, Perm4::IDENTITY)],
//! )
//! .unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let iso = Isomorphism::random(tri.number_of_tetrahedra(), &mut rng);
//! let relabelled = iso.apply(&tri).unwrap();
//!
//! assert!(tri.is_isomorphic_to(&relabelled));
//! assert_eq!(iso.inverse().apply(&relabelled).unwrap().gluings(), tri.gluings());
//! ```

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::core::algorithms::signature::canonical_labelling;
use crate::core::perm::{ALL_PERM4, PERM4_COUNT, Perm4};
use crate::core::triangulation::{FacetGluing, Triangulation, TriangulationError};

/// Errors raised when building or applying an [`Isomorphism`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsomorphismError {
    /// The two component vectors have different lengths.
    #[error("Isomorphism has {images} tetrahedron images but {perms} vertex permutations")]
    LengthMismatch {
        /// Length of the tetrahedron map.
        images: usize,
        /// Number of vertex permutations.
        perms: usize,
    },
    /// The tetrahedron map is not a permutation of `0..n`.
    #[error("Tetrahedron map is not a bijection of 0..{size}")]
    NotABijection {
        /// Size of the map.
        size: usize,
    },
    /// The isomorphism was applied to a triangulation of another size.
    #[error("Isomorphism acts on {expected} tetrahedra, triangulation has {found}")]
    SizeMismatch {
        /// Size of the isomorphism.
        expected: usize,
        /// Size of the triangulation.
        found: usize,
    },
    /// Rebuilding the relabelled triangulation failed.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

/// A relabelling of tetrahedra and their corners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Isomorphism {
    tetrahedron_image: Vec<usize>,
    vertex_perms: Vec<Perm4>,
}

impl Isomorphism {
    /// Builds an isomorphism from its components.
    ///
    /// # Errors
    ///
    /// Returns [`IsomorphismError::LengthMismatch`] or
    /// [`IsomorphismError::NotABijection`] for malformed input.
    pub fn new(
        tetrahedron_image: Vec<usize>,
        vertex_perms: Vec<Perm4>,
    ) -> Result<Self, IsomorphismError> {
        let size = tetrahedron_image.len();
        if size != vertex_perms.len() {
            return Err(IsomorphismError::LengthMismatch {
                images: size,
                perms: vertex_perms.len(),
            });
        }
        let mut hit = vec![false; size];
        for &image in &tetrahedron_image {
            match hit.get_mut(image) {
                Some(seen) if !*seen => *seen = true,
                _ => return Err(IsomorphismError::NotABijection { size }),
            }
        }
        Ok(Self {
            tetrahedron_image,
            vertex_perms,
        })
    }

    /// Builds an isomorphism the caller knows to be well formed.
    pub(crate) const fn from_parts(tetrahedron_image: Vec<usize>, vertex_perms: Vec<Perm4>) -> Self {
        Self {
            tetrahedron_image,
            vertex_perms,
        }
    }

    /// The identity on `n` tetrahedra.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            tetrahedron_image: (0..n).collect(),
            vertex_perms: vec![Perm4::IDENTITY; n],
        }
    }

    /// A uniformly random isomorphism on `n` tetrahedra.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut tetrahedron_image: Vec<usize> = (0..n).collect();
        tetrahedron_image.shuffle(rng);
        let vertex_perms = (0..n)
            .map(|_| ALL_PERM4[rng.random_range(0..PERM4_COUNT)])
            .collect();
        Self {
            tetrahedron_image,
            vertex_perms,
        }
    }

    /// Number of tetrahedra acted on.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tetrahedron_image.len()
    }

    /// Image of tetrahedron position `index`.
    #[must_use]
    pub fn tetrahedron_image(&self, index: usize) -> Option<usize> {
        self.tetrahedron_image.get(index).copied()
    }

    /// Corner relabelling applied to tetrahedron position `index`.
    #[must_use]
    pub fn vertex_perm(&self, index: usize) -> Option<Perm4> {
        self.vertex_perms.get(index).copied()
    }

    /// The isomorphism undoing this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let n = self.size();
        let mut tetrahedron_image = vec![0; n];
        let mut vertex_perms = vec![Perm4::IDENTITY; n];
        for (i, (&image, perm)) in self
            .tetrahedron_image
            .iter()
            .zip(&self.vertex_perms)
            .enumerate()
        {
            tetrahedron_image[image] = i;
            vertex_perms[image] = perm.inverse();
        }
        Self {
            tetrahedron_image,
            vertex_perms,
        }
    }

    /// `self ∘ other`: `other` is applied first.
    ///
    /// # Errors
    ///
    /// Returns [`IsomorphismError::SizeMismatch`] if the sizes differ.
    pub fn compose(&self, other: &Self) -> Result<Self, IsomorphismError> {
        if self.size() != other.size() {
            return Err(IsomorphismError::SizeMismatch {
                expected: self.size(),
                found: other.size(),
            });
        }
        let (tetrahedron_image, vertex_perms) = other
            .tetrahedron_image
            .iter()
            .zip(&other.vertex_perms)
            .map(|(&mid, &first)| {
                (
                    self.tetrahedron_image[mid],
                    self.vertex_perms[mid].compose(first),
                )
            })
            .unzip();
        Ok(Self {
            tetrahedron_image,
            vertex_perms,
        })
    }

    /// Relabels `tri`, returning a new triangulation.
    ///
    /// # Errors
    ///
    /// Returns [`IsomorphismError::SizeMismatch`] if `tri` has a different
    /// number of tetrahedra.
    pub fn apply(&self, tri: &Triangulation) -> Result<Triangulation, IsomorphismError> {
        let n = tri.number_of_tetrahedra();
        if n != self.size() {
            return Err(IsomorphismError::SizeMismatch {
                expected: self.size(),
                found: n,
            });
        }
        let gluings: Vec<FacetGluing> = tri
            .gluings()
            .into_iter()
            .map(|g| {
                let (from, to) = (g.tetrahedron, g.partner);
                let (pi_from, pi_to) = (self.vertex_perms[from], self.vertex_perms[to]);
                FacetGluing::new(
                    self.tetrahedron_image[from],
                    pi_from.apply(g.facet),
                    self.tetrahedron_image[to],
                    pi_to.compose(g.gluing).compose(pi_from.inverse()),
                )
            })
            .collect();
        Ok(Triangulation::from_gluings(n, &gluings)?)
    }
}

impl Triangulation {
    /// Returns `true` if `other` is combinatorially isomorphic to `self`.
    ///
    /// Decided by comparing isomorphism signatures.
    #[must_use]
    pub fn is_isomorphic_to(&self, other: &Self) -> bool {
        self.number_of_tetrahedra() == other.number_of_tetrahedra()
            && matches!(
                (canonical_labelling(self), canonical_labelling(other)),
                (Ok((a, _)), Ok((b, _))) if a == b
            )
    }

    /// An isomorphism carrying `self` onto `other`, if one exists.
    ///
    /// Tetrahedra are addressed by storage position.
    #[must_use]
    pub fn find_isomorphism(&self, other: &Self) -> Option<Isomorphism> {
        if self.number_of_tetrahedra() != other.number_of_tetrahedra() {
            return None;
        }
        let (sig_self, to_canonical) = canonical_labelling(self).ok()?;
        let (sig_other, other_to_canonical) = canonical_labelling(other).ok()?;
        if sig_self != sig_other {
            return None;
        }
        other_to_canonical.inverse().compose(&to_canonical).ok()
    }
}
