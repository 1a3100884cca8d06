use crate::core::triangulation::TetrahedronKey;
use slotmap::SecondaryMap;

/// Secondary map for associating per-tetrahedron data with [`TetrahedronKey`]s.
///
/// Used by traversals that need a dense "visited"/"assigned index" table
/// keyed by the primary storage keys, without hashing.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
/// use pachner::core::collections::TetrahedronSecondaryMap;
///
/// let mut tri = Triangulation::new();
/// let t = tri.add_tetrahedron();
///
/// let mut visited: TetrahedronSecondaryMap<bool> = TetrahedronSecondaryMap::new();
/// visited.insert(t, true);
/// assert_eq!(visited.get(t), Some(&true));
/// ```
pub type TetrahedronSecondaryMap<V> = SecondaryMap<TetrahedronKey, V>;
