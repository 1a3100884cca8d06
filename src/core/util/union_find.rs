//! Disjoint-set forest with optional orientation parity.
//!
//! The skeleton builder identifies local faces (corners, edges, facets) into
//! global classes by merging them along facet gluings. Edges additionally carry
//! a direction: gluing may identify edge `ab` with edge `cd` either as `a→c`
//! or as `a→d`. [`UnionFind`] stores the parity of every element relative to
//! its root, so an edge that ends up identified with itself in reverse is
//! detected as a parity conflict.

/// Union-find with path compression, union by rank and per-element parity.
///
/// # Examples
///
/// ```rust
/// use pachner::core::util::UnionFind;
///
/// let mut uf = UnionFind::new(4);
/// uf.union(0, 1, false);
/// uf.union(1, 2, true);
/// assert!(uf.same(0, 2));
/// assert_eq!(uf.find(2).1, !uf.find(0).1);
///
/// // Closing the cycle with the wrong parity marks the class as conflicted.
/// uf.union(2, 0, false);
/// assert!(uf.is_conflicted(0));
/// assert!(!uf.is_conflicted(3));
/// ```
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    /// Parity of each element relative to its parent.
    parity: Vec<bool>,
    /// Only meaningful on roots.
    conflicted: Vec<bool>,
}

impl UnionFind {
    /// Creates `len` singleton classes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
            parity: vec![false; len],
            conflicted: vec![false; len],
        }
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the root of `x` and the parity of `x` relative to it.
    ///
    /// # Panics
    ///
    /// Panics if `x >= self.len()`.
    pub fn find(&mut self, x: usize) -> (usize, bool) {
        // First pass: locate the root and accumulate parity.
        let mut root = x;
        let mut total = false;
        while self.parent[root] != root {
            total ^= self.parity[root];
            root = self.parent[root];
        }

        // Second pass: point everything on the path straight at the root.
        let mut node = x;
        let mut remaining = total;
        while self.parent[node] != root && node != root {
            let next = self.parent[node];
            let next_parity = remaining ^ self.parity[node];
            self.parent[node] = root;
            self.parity[node] = remaining;
            remaining = next_parity;
            node = next;
        }

        (root, total)
    }

    /// Merges the classes of `x` and `y`, recording that the parity of `y`
    /// relative to `x` is `relative`.
    ///
    /// Returns `false` if the two were already in one class with the opposite
    /// parity; the class is then marked as conflicted.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range.
    pub fn union(&mut self, x: usize, y: usize, relative: bool) -> bool {
        let (rx, px) = self.find(x);
        let (ry, py) = self.find(y);

        if rx == ry {
            if px ^ py != relative {
                self.conflicted[rx] = true;
                return false;
            }
            return true;
        }

        let link = px ^ py ^ relative;
        let conflicted = self.conflicted[rx] || self.conflicted[ry];
        let root = match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => {
                self.parent[rx] = ry;
                self.parity[rx] = link;
                ry
            }
            std::cmp::Ordering::Greater => {
                self.parent[ry] = rx;
                self.parity[ry] = link;
                rx
            }
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.parity[ry] = link;
                self.rank[rx] = self.rank[rx].saturating_add(1);
                rx
            }
        };
        self.conflicted[root] = conflicted;
        true
    }

    /// Returns `true` if `x` and `y` are in the same class.
    pub fn same(&mut self, x: usize, y: usize) -> bool {
        self.find(x).0 == self.find(y).0
    }

    /// Returns `true` if the class of `x` has seen a parity conflict.
    pub fn is_conflicted(&mut self, x: usize) -> bool {
        let (root, _) = self.find(x);
        self.conflicted[root]
    }
}
