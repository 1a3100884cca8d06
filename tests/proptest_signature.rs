//! Property-based tests for isomorphism signatures.
//!
//! Triangulations are built from random gluing attempts (attempts onto
//! occupied facets are skipped), so the generated inputs cover boundaries,
//! self-gluings, several components and non-orientable gluings.
//!
//! ## Test Properties
//!
//! 1. **Relabelling invariance**: a random isomorphism never changes the
//!    signature
//! 2. **Decoding round trip**: `reconstruct(sig)` has signature `sig` and is
//!    deterministic
//! 3. **Canonical labelling**: the returned isomorphism carries the input onto
//!    the reconstruction exactly
//! 4. **Serde round trip**: JSON encoding preserves the isomorphism class
//! 5. **Skeleton invariance**: relabelled triangulations have equal face counts

use pachner::core::algorithms::signature::{canonical_labelling, reconstruct};
use pachner::prelude::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// =============================================================================
// STRATEGIES
// =============================================================================

/// A gluing attempt: source index, source facet, target index, permutation.
type Attempt = (usize, u8, usize, usize);

fn build(n: usize, attempts: &[Attempt]) -> Triangulation {
    let mut tri = Triangulation::new();
    let keys = tri.add_tetrahedra(n);
    for &(a, facet, b, perm) in attempts {
        let perm = ALL_PERM4[perm];
        // Occupied or self-matching facets are rejected; skip them.
        let _ = tri.glue(keys[a % n], facet, keys[b % n], perm.apply(facet), perm);
    }
    tri
}

fn triangulation_strategy(max_tetrahedra: usize) -> impl Strategy<Value = Triangulation> {
    (1..=max_tetrahedra).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..4u8, 0..n, 0..24usize), 0..=2 * n)
            .prop_map(move |attempts| build(n, &attempts))
    })
}

fn counts(tri: &Triangulation) -> [usize; 4] {
    [
        tri.number_of_vertices(),
        tri.number_of_edges(),
        tri.number_of_triangles(),
        tri.number_of_tetrahedra(),
    ]
}

// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: relabelling tetrahedra and corners leaves the signature fixed
    #[test]
    fn prop_signature_is_relabelling_invariant(
        tri in triangulation_strategy(5),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let iso = Isomorphism::random(tri.number_of_tetrahedra(), &mut rng);
        let relabelled = iso.apply(&tri).unwrap();

        prop_assert_eq!(
            relabelled.isomorphism_signature().unwrap(),
            tri.isomorphism_signature().unwrap()
        );
        prop_assert!(relabelled.is_isomorphic_to(&tri));
        prop_assert_eq!(counts(&relabelled), counts(&tri));
        prop_assert_eq!(relabelled.is_orientable(), tri.is_orientable());
        prop_assert_eq!(relabelled.euler_characteristic(), tri.euler_characteristic());
    }

    /// Property: decoding a signature gives back the same signature
    #[test]
    fn prop_reconstruct_round_trip(tri in triangulation_strategy(5)) {
        let sig = tri.isomorphism_signature().unwrap();
        let rebuilt = reconstruct(&sig).unwrap();
        prop_assert!(rebuilt.validate().is_ok());
        prop_assert_eq!(rebuilt.isomorphism_signature().unwrap(), sig.clone());
        prop_assert_eq!(counts(&rebuilt), counts(&tri));
        prop_assert_eq!(reconstruct(&sig).unwrap(), rebuilt);
    }

    /// Property: the canonical labelling is an exact isomorphism
    #[test]
    fn prop_canonical_labelling_maps_onto_reconstruction(tri in triangulation_strategy(4)) {
        let (sig, iso) = canonical_labelling(&tri).unwrap();
        let rebuilt = reconstruct(&sig).unwrap();
        prop_assert_eq!(iso.apply(&tri).unwrap(), rebuilt);

        let found = tri.find_isomorphism(&iso.apply(&tri).unwrap());
        prop_assert!(found.is_some());
    }

    /// Property: JSON serialization preserves the isomorphism class
    #[test]
    fn prop_json_round_trip(tri in triangulation_strategy(4)) {
        let json = serde_json::to_string(&tri).unwrap();
        let back: Triangulation = serde_json::from_str(&json).unwrap();
        prop_assert!(back.is_isomorphic_to(&tri));
        prop_assert_eq!(back.number_of_boundary_components(), tri.number_of_boundary_components());
    }

    /// Property: the format width and length follow the tetrahedron count
    #[test]
    fn prop_signature_length(tri in triangulation_strategy(5)) {
        let sig = tri.isomorphism_signature().unwrap();
        let n = tri.number_of_tetrahedra();
        prop_assert!(sig.starts_with('b'));
        prop_assert_eq!(sig.len(), 2 + 4 * n * 2);
    }
}

// =============================================================================
// DISTINGUISHING TESTS
// =============================================================================

#[test]
fn test_distinct_classes_have_distinct_signatures() {
    let sphere: Vec<_> = (0..4)
        .map(|f| FacetGluing::new(0, f, 1, Perm4::IDENTITY))
        .collect();
    let twisted: Vec<_> = (0..4)
        .map(|f| FacetGluing::new(0, f, 1, Perm4::transposition(0, 1)))
        .take(2)
        .collect();
    let candidates = [
        Triangulation::new(),
        Triangulation::from_gluings(1, &[]).unwrap(),
        Triangulation::from_gluings(2, &[]).unwrap(),
        Triangulation::from_gluings(2, &[FacetGluing::new(0, 0, 1, Perm4::IDENTITY)]).unwrap(),
        Triangulation::from_gluings(2, &sphere).unwrap(),
        Triangulation::from_gluings(2, &twisted).unwrap(),
    ];
    let signatures: Vec<_> = candidates
        .iter()
        .map(|tri| tri.isomorphism_signature().unwrap())
        .collect();
    for (i, a) in signatures.iter().enumerate() {
        for b in &signatures[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert!(!candidates[4].is_isomorphic_to(&candidates[3]));
    assert!(candidates[4].find_isomorphism(&candidates[3]).is_none());
}

#[test]
fn test_from_str_matches_reconstruct() {
    let tri: Triangulation = "bcbabababaaaaaaaaa".parse().unwrap();
    assert!(tri.is_closed());
    assert_eq!(tri.number_of_vertices(), 4);
    assert_eq!(tri, reconstruct("bcbabababaaaaaaaaa").unwrap());
    assert!(matches!(
        "bcbabababaaaaaaaa".parse::<Triangulation>(),
        Err(SignatureError::MalformedSignature { .. })
    ));
}

#[test]
fn test_moves_preserve_class_but_change_signature() {
    let sphere: Vec<_> = (0..4)
        .map(|f| FacetGluing::new(0, f, 1, Perm4::IDENTITY))
        .collect();
    let mut tri = Triangulation::from_gluings(2, &sphere).unwrap();
    let before = tri.isomorphism_signature().unwrap();
    let a = tri.key_at(0).unwrap();
    tri.move_1_4(a).unwrap();
    let after = tri.isomorphism_signature().unwrap();
    assert_ne!(before, after);
    assert_eq!(after.len(), 2 + 4 * 5 * 2);
}
