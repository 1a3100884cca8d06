//! Collection types tuned for combinatorial triangulation work.
//!
//! - [`FastHashMap`]/[`FastHashSet`]: `rustc-hash` backed maps for internal keys
//! - [`SmallBuffer`]: `smallvec` buffers for per-tetrahedron scratch data
//! - [`StorageMap`]: the slotmap arena that owns tetrahedra
//! - [`TetrahedronSecondaryMap`]: dense per-tetrahedron side tables

mod aliases;
mod helpers;
mod secondary_maps;

pub use aliases::*;
pub use helpers::*;
pub use secondary_maps::*;
