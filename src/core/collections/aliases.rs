use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

/// Compact index type for facet and corner positions within a tetrahedron.
///
/// A tetrahedron has four facets and four corners, so every local position
/// fits in `0..4`.
///
/// # Examples
///
/// ```rust
/// use pachner::core::collections::FacetIndex;
///
/// let facet: FacetIndex = 2;
/// assert_eq!(usize::from(facet), 2);
/// ```
pub type FacetIndex = u8;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for tetrahedra.
///
/// Abstracts over `DenseSlotMap` (**default**, via the `dense-slotmap` feature)
/// and `SlotMap` (with `--no-default-features`). Both hand out generation-tagged
/// keys, so a key to a removed tetrahedron is detected instead of silently
/// aliasing a newer one.
///
/// This type should not appear in public signatures; public methods return
/// keys and iterators instead.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// `HashMap` keyed with the non-cryptographic `FxHasher`.
///
/// # Security Warning
///
/// Not DoS-resistant. Only use it with internal keys such as tetrahedron keys
/// and dense indices.
///
/// # Examples
///
/// ```rust
/// use pachner::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Build hasher behind [`FastHashMap`] and [`FastHashSet`].
pub type FastBuildHasher = FxBuildHasher;

/// `HashSet` keyed with the non-cryptographic `FxHasher`.
///
/// # Examples
///
/// ```rust
/// use pachner::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<u32> = FastHashSet::default();
/// set.insert(7);
/// assert!(set.contains(&7));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec: inline storage for up to `N` elements, heap afterwards.
///
/// # Size Guidelines
///
/// - **N=4**: per-tetrahedron data (facets, corners)
/// - **N=6**: per-tetrahedron edges
/// - **N=8**: typical edge degrees and move neighbourhoods
///
/// # Examples
///
/// ```rust
/// use pachner::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// buffer.push(1);
/// assert_eq!(buffer.len(), 1);
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Inline capacity used for the tetrahedra touched by a single Pachner move.
///
/// The largest move (4→1) reads four tetrahedra and rewires at most four
/// outer facets each.
pub const MOVE_NEIGHBOURHOOD_SIZE: usize = 4;
