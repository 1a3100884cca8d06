//! Property-based tests for Pachner moves.
//!
//! Random walks through the space of triangulations reachable by Pachner
//! moves from a handful of seeds.
//!
//! ## Test Properties
//!
//! 1. **Topology is preserved**: χ, closedness, orientability and the number
//!    of boundary components never change along a walk
//! 2. **Gluings stay consistent**: every intermediate triangulation passes
//!    `validate` and the Euler prediction check
//! 3. **Moves are reversible**: a move followed by its inverse restores the
//!    isomorphism class (and, for 1-4, the exact triangulation)
//! 4. **Rejections are atomic**: an illegal move changes nothing

use pachner::core::algorithms::pachner::legal_moves;
use pachner::prelude::*;
use pachner::topology::characteristics::validation;
use proptest::prelude::*;

// =============================================================================
// SEEDS
// =============================================================================

fn single_tetrahedron() -> Triangulation {
    Triangulation::from_gluings(1, &[]).unwrap()
}

fn double_tetrahedron() -> Triangulation {
    let gluings: Vec<_> = (0..4)
        .map(|f| FacetGluing::new(0, f, 1, Perm4::IDENTITY))
        .collect();
    Triangulation::from_gluings(2, &gluings).unwrap()
}

fn folded_tetrahedron() -> Triangulation {
    Triangulation::from_gluings(
        1,
        &[
            FacetGluing::new(0, 3, 0, Perm4::transposition(2, 3)),
            FacetGluing::new(0, 1, 0, Perm4::transposition(0, 1)),
        ],
    )
    .unwrap()
}

/// Two tetrahedra glued along two facets: a 3-ball with an internal edge.
fn pillow() -> Triangulation {
    Triangulation::from_gluings(
        2,
        &[
            FacetGluing::new(0, 0, 1, Perm4::IDENTITY),
            FacetGluing::new(0, 1, 1, Perm4::IDENTITY),
        ],
    )
    .unwrap()
}

/// Upper bound on walk size; past it only shrinking moves are taken.
const MAX_TETRAHEDRA: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invariants {
    chi: i64,
    closed: bool,
    orientable: bool,
    boundary_components: usize,
}

fn invariants(tri: &Triangulation) -> Invariants {
    Invariants {
        chi: tri.euler_characteristic(),
        closed: tri.is_closed(),
        orientable: tri.is_orientable(),
        boundary_components: tri.number_of_boundary_components(),
    }
}

fn pick_move(tri: &Triangulation, choice: u16) -> Option<PachnerMove> {
    let mut moves = legal_moves(tri);
    if tri.number_of_tetrahedra() >= MAX_TETRAHEDRA {
        moves.retain(|mv| {
            mv.kind().tetrahedra_removed() > mv.kind().tetrahedra_created()
        });
    }
    if moves.is_empty() {
        return None;
    }
    Some(moves[usize::from(choice) % moves.len()])
}

fn check_random_walk(mut tri: Triangulation, choices: &[u16]) -> Result<(), TestCaseError> {
    let expected = invariants(&tri);
    for &choice in choices {
        let Some(mv) = pick_move(&tri, choice) else {
            break;
        };
        let before = tri.number_of_tetrahedra();
        let info = tri.apply_move(mv).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(
            tri.number_of_tetrahedra() + info.kind.tetrahedra_removed(),
            before + info.kind.tetrahedra_created()
        );
        prop_assert!(tri.validate().is_ok(), "{mv:?} broke gluing symmetry");
        prop_assert_eq!(invariants(&tri), expected.clone(), "{:?} changed topology", mv);

        let check = validation::validate_triangulation_euler(&tri);
        prop_assert!(check.is_valid(), "Euler check failed: {:?}", check.notes);
    }
    Ok(())
}

fn check_move_and_inverse(mut tri: Triangulation, choices: &[u16]) -> Result<(), TestCaseError> {
    for &choice in choices {
        let Some(mv) = pick_move(&tri, choice) else {
            break;
        };
        let snapshot = tri.clone();
        let signature = tri.isomorphism_signature().map_err(|e| TestCaseError::fail(e.to_string()))?;

        let info = tri.apply_move(mv).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut undone = tri.clone();
        undone
            .apply_move(info.inverse())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        if mv.kind() == PachnerMoveKind::OneFour {
            prop_assert_eq!(&undone, &snapshot);
        }
        prop_assert_eq!(
            undone.isomorphism_signature().map_err(|e| TestCaseError::fail(e.to_string()))?,
            signature
        );
    }
    Ok(())
}

fn check_illegal_moves_are_atomic(
    tri: Triangulation,
    probes: &[(u8, u8, u8)],
) -> Result<(), TestCaseError> {
    let keys: Vec<_> = tri.tetrahedron_keys().collect();
    let mut probe = tri.clone();
    for &(which, kind, local) in probes {
        let key = keys[usize::from(which) % keys.len()];
        let mv = match kind % 3 {
            0 => PachnerMove::TwoThree(FacetHandle::new(key, local % 4)),
            1 => PachnerMove::ThreeTwo(EdgeHandle::new(key, local % 6)),
            _ => PachnerMove::FourOne(CornerHandle::new(key, local % 4)),
        };
        if probe.can_apply(mv).is_err() {
            let generation = probe.generation();
            prop_assert!(probe.apply_move(mv).is_err());
            prop_assert_eq!(&probe, &tri);
            prop_assert_eq!(probe.generation(), generation);
        }
    }
    Ok(())
}

// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================

/// Generates the move properties for one seed triangulation.
macro_rules! test_move_properties {
    ($name:ident, $seed:expr) => {
        pastey::paste! {
            proptest! {
                #![proptest_config(ProptestConfig::with_cases(24))]

                /// Property: random walks preserve every topological invariant
                #[test]
                fn [<prop_random_walk_preserves_topology_ $name>](
                    choices in prop::collection::vec(any::<u16>(), 1..30)
                ) {
                    check_random_walk($seed, &choices)?;
                }

                /// Property: each move is undone by its inverse
                #[test]
                fn [<prop_move_then_inverse_ $name>](
                    choices in prop::collection::vec(any::<u16>(), 1..12)
                ) {
                    check_move_and_inverse($seed, &choices)?;
                }

                /// Property: rejected moves leave no trace
                #[test]
                fn [<prop_illegal_moves_are_atomic_ $name>](
                    probes in prop::collection::vec(any::<(u8, u8, u8)>(), 1..40)
                ) {
                    check_illegal_moves_are_atomic($seed, &probes)?;
                }
            }
        }
    };
}

test_move_properties!(ball, single_tetrahedron());
test_move_properties!(sphere, double_tetrahedron());
test_move_properties!(folded, folded_tetrahedron());
test_move_properties!(pillow, pillow());
