//! Integration tests for the skeleton builder.
//!
//! ## Test Coverage
//!
//! - Face counts on known configurations
//! - Boundary components, orientability and connectedness
//! - Edge validity and vertex links
//! - Stale snapshot detection after every kind of mutation and across clones
//! - Concurrent readers of the cached skeleton and signature

use pachner::prelude::*;

fn glued(n: usize, gluings: &[(usize, u8, usize, [u8; 4])]) -> Triangulation {
    let gluings: Vec<_> = gluings
        .iter()
        .map(|&(a, f, b, images)| FacetGluing::new(a, f, b, Perm4::from_images(images).unwrap()))
        .collect();
    Triangulation::from_gluings(n, &gluings).unwrap()
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
// KNOWN CONFIGURATIONS
// =============================================================================

#[test]
fn test_single_tetrahedron() {
    let tri = glued(1, &[]);
    assert_eq!(counts(&tri), [4, 6, 4, 1]);
    assert!(tri.is_orientable());
    assert!(tri.is_connected());
    assert!(!tri.is_closed());

    let boundary = tri.boundary_components();
    assert_eq!(boundary.len(), 1);
    assert_eq!(boundary[0].number_of_triangles(), 4);
    assert_eq!(boundary[0].number_of_edges(), 6);
    assert_eq!(boundary[0].number_of_vertices(), 4);
    assert!(boundary[0].is_sphere());
    assert!(boundary[0].is_orientable());

    let skeleton = tri.skeleton();
    for (_, vertex) in skeleton.vertices() {
        assert_eq!(vertex.link_type(), VertexLinkType::Disc);
        assert!(vertex.is_boundary());
        assert_eq!(vertex.degree(), 1);
    }
}

#[test]
fn test_two_tetrahedra_glued_on_one_facet() {
    let tri = glued(2, &[(0, 0, 1, [0, 1, 2, 3])]);
    assert_eq!(counts(&tri), [5, 9, 7, 2]);
    assert_eq!(tri.euler_characteristic(), 1);
    assert_eq!(tri.number_of_boundary_components(), 1);
    let boundary = &tri.boundary_components()[0];
    assert_eq!(boundary.number_of_triangles(), 6);
    // Edges and vertices shared by several boundary triangles appear once.
    assert_eq!(boundary.number_of_edges(), 9);
    assert_eq!(boundary.number_of_vertices(), 5);
    assert!(boundary.is_sphere());

    let skeleton = tri.skeleton();
    let internal = skeleton
        .triangles()
        .filter(|(_, triangle)| !triangle.is_boundary())
        .count();
    assert_eq!(internal, 1);
}

#[test]
fn test_double_tetrahedron_sphere() {
    let gluings: Vec<_> = (0..4).map(|f| (0, f, 1, [0, 1, 2, 3])).collect();
    let tri = glued(2, &gluings);
    assert_eq!(counts(&tri), [4, 6, 4, 2]);
    assert!(tri.is_closed());
    assert!(tri.is_orientable());
    assert!(tri.is_valid_manifold());
    assert_eq!(tri.euler_characteristic(), 0);
    assert_eq!(tri.number_of_boundary_components(), 0);

    let skeleton = tri.skeleton();
    for (_, edge) in skeleton.edges() {
        assert_eq!(edge.degree(), 2);
        assert!(edge.is_valid());
    }
    for (_, vertex) in skeleton.vertices() {
        assert_eq!(vertex.link_type(), VertexLinkType::Sphere);
    }
}

#[test]
fn test_folded_tetrahedron() {
    let tri = glued(1, &[(0, 3, 0, [0, 1, 3, 2]), (0, 1, 0, [1, 0, 2, 3])]);
    assert_eq!(counts(&tri), [2, 3, 2, 1]);
    assert!(tri.is_closed());
    assert_eq!(tri.euler_characteristic(), 0);
}

#[test]
fn test_non_orientable_self_gluing() {
    // An even permutation between two facets of one tetrahedron reverses
    // orientation.
    let tri = glued(1, &[(0, 1, 0, [1, 0, 3, 2])]);
    assert!(!tri.is_orientable());
}

#[test]
fn test_invalid_edge() {
    // Facet 3 onto facet 2 with corners 0 and 1 swapped: edge 01 meets itself
    // reversed.
    let tri = glued(1, &[(0, 3, 0, [1, 0, 3, 2])]);
    assert!(!tri.is_valid_manifold());
    let skeleton = tri.skeleton();
    assert!(skeleton.edges().any(|(_, edge)| !edge.is_valid()));
}

#[test]
fn test_components() {
    let tri = glued(4, &[(0, 0, 1, [0, 1, 2, 3]), (2, 1, 3, [0, 1, 2, 3])]);
    assert!(!tri.is_connected());
    assert_eq!(tri.number_of_components(), 2);
    assert_eq!(tri.number_of_boundary_components(), 2);

    let empty = Triangulation::new();
    assert!(empty.is_connected());
    assert_eq!(empty.number_of_components(), 0);
    assert_eq!(counts(&empty), [0, 0, 0, 0]);
}

// =============================================================================
// HANDLES AND STALENESS
// =============================================================================

#[test]
fn test_handles_resolve_against_current_triangulation() {
    let mut tri = Triangulation::new();
    let a = tri.add_tetrahedron();
    let b = tri.add_tetrahedron();
    tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();

    let skeleton = tri.skeleton();
    let va = skeleton.vertex_of(&tri, CornerHandle::new(a, 1)).unwrap();
    let vb = skeleton.vertex_of(&tri, CornerHandle::new(b, 1)).unwrap();
    assert_eq!(va, vb);
    assert_eq!(skeleton.vertex(va).unwrap().degree(), 2);

    let ea = skeleton
        .edge_of(&tri, EdgeHandle::between(a, 1, 2).unwrap())
        .unwrap();
    assert_eq!(skeleton.edge(ea).unwrap().degree(), 2);

    let shared = skeleton.triangle_of(&tri, FacetHandle::new(a, 0)).unwrap();
    assert_eq!(skeleton.triangle(shared).unwrap().embeddings().len(), 2);
}

#[test]
fn test_stale_skeleton_is_reported() {
    let mut tri = Triangulation::new();
    let a = tri.add_tetrahedron();
    let skeleton = tri.skeleton();
    let vertex = skeleton.vertex_of(&tri, CornerHandle::new(a, 0)).unwrap();

    tri.add_tetrahedron();
    assert!(!skeleton.is_current(&tri));
    assert!(matches!(
        skeleton.vertex_of(&tri, CornerHandle::new(a, 0)),
        Err(SkeletonError::StaleSkeleton { .. })
    ));

    let fresh = tri.skeleton();
    assert!(matches!(
        fresh.vertex(vertex),
        Err(SkeletonError::StaleSkeleton { .. })
    ));
    assert_eq!(fresh.number_of_vertices(), 8);
}

/// Asserts that every lookup through `skeleton` reports a stale snapshot.
fn assert_stale(skeleton: &Skeleton, tri: &Triangulation, key: TetrahedronKey) {
    assert!(!skeleton.is_current(tri));
    assert!(matches!(
        skeleton.vertex_of(tri, CornerHandle::new(key, 0)),
        Err(SkeletonError::StaleSkeleton { .. })
    ));
    assert!(matches!(
        skeleton.edge_of(tri, EdgeHandle::new(key, 0)),
        Err(SkeletonError::StaleSkeleton { .. })
    ));
    assert!(matches!(
        skeleton.triangle_of(tri, FacetHandle::new(key, 0)),
        Err(SkeletonError::StaleSkeleton { .. })
    ));
}

#[test]
fn test_every_mutation_makes_the_snapshot_stale() {
    // glue
    let mut tri = glued(2, &[]);
    let a = tri.key_at(0).unwrap();
    let b = tri.key_at(1).unwrap();
    let skeleton = tri.skeleton();
    tri.glue(a, 0, b, 0, Perm4::IDENTITY).unwrap();
    assert_stale(&skeleton, &tri, a);

    // unglue
    let skeleton = tri.skeleton();
    assert!(skeleton.is_current(&tri));
    assert!(tri.unglue(a, 0).unwrap().is_some());
    assert_stale(&skeleton, &tri, a);

    // remove_tetrahedron
    let skeleton = tri.skeleton();
    tri.remove_tetrahedron(b).unwrap();
    assert_stale(&skeleton, &tri, a);

    // 2-3, which keeps both original keys
    let identity = [0, 1, 2, 3];
    let mut tri = glued(
        2,
        &[
            (0, 0, 1, identity),
            (0, 1, 1, identity),
            (0, 2, 1, identity),
            (0, 3, 1, identity),
        ],
    );
    let a = tri.key_at(0).unwrap();
    let skeleton = tri.skeleton();
    tri.apply_move(PachnerMove::TwoThree(FacetHandle::new(a, 0))).unwrap();
    assert_stale(&skeleton, &tri, a);

    // 1-4 then 4-1, which hands the original key back
    let skeleton = tri.skeleton();
    let info = tri.apply_move(PachnerMove::OneFour(a)).unwrap();
    assert_stale(&skeleton, &tri, a);
    let skeleton = tri.skeleton();
    tri.apply_move(info.inverse()).unwrap();
    assert_eq!(tri.number_of_tetrahedra(), 3);
    assert_stale(&skeleton, &tri, a);
    assert!(tri.skeleton().is_current(&tri));
}

#[test]
fn test_snapshot_is_not_current_for_a_clone() {
    let tri = glued(1, &[]);
    let copy = tri.clone();
    let skeleton = tri.skeleton();
    assert!(skeleton.is_current(&tri));
    assert!(!skeleton.is_current(&copy));
}

#[test]
fn test_cached_snapshot_is_shared() {
    let tri = glued(2, &[(0, 0, 1, [0, 1, 2, 3])]);
    let first = tri.skeleton();
    let second = tri.skeleton();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

// =============================================================================
// CONCURRENT READERS
// =============================================================================

#[test]
fn test_concurrent_readers_share_one_skeleton() {
    let identity = [0, 1, 2, 3];
    let mut tri = glued(
        2,
        &[
            (0, 0, 1, identity),
            (0, 1, 1, identity),
            (0, 2, 1, identity),
            (0, 3, 1, identity),
        ],
    );
    let a = tri.key_at(0).unwrap();
    tri.move_1_4(a).unwrap();
    let tri = tri;

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let skeleton = tri.skeleton();
                    let signature = tri.isomorphism_signature().unwrap();
                    (skeleton, signature)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected = tri.isomorphism_signature().unwrap();
    for (skeleton, signature) in &results {
        assert!(skeleton.is_current(&tri));
        assert_eq!(skeleton.number_of_vertices(), 5);
        assert_eq!(skeleton.number_of_edges(), results[0].0.number_of_edges());
        assert_eq!(signature, &expected);
    }
}
