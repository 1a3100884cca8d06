//! Permutations of the four vertices of a tetrahedron.
//!
//! A facet gluing identifies the vertices of one tetrahedron with those of its
//! neighbour through an element of S₄. [`Perm4`] stores the image array and
//! numbers the 24 permutations by their rank in lexicographic order of images,
//! so code `0` is the identity `0123` and code `23` is `3210`. That code is the
//! permutation token written into isomorphism signatures.
//!
//! # Examples
//!
//! ```rust
//! use pachner::core::perm::Perm4;
//!
//! let p = Perm4::from_images([1, 0, 2, 3]).unwrap();
//! assert_eq!(p.apply(0), 1);
//! assert_eq!(p.sign(), -1);
//! assert_eq!(p.compose(p), Perm4::IDENTITY);
//! assert_eq!(Perm4::from_code(p.code()), Some(p));
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Number of permutations of four elements.
pub const PERM4_COUNT: usize = 24;

const FACTORIALS: [u8; 4] = [6, 2, 1, 1];

const fn all_permutations() -> [Perm4; PERM4_COUNT] {
    let mut out = [Perm4::IDENTITY; PERM4_COUNT];
    let mut next = 0;
    let mut a = 0;
    while a < 4 {
        let mut b = 0;
        while b < 4 {
            let mut c = 0;
            while c < 4 {
                if a != b && a != c && b != c {
                    // a, b, c distinct, so the fourth image is the remaining value.
                    let d: u8 = 6 - a - b - c;
                    out[next] = Perm4 {
                        images: [a, b, c, d],
                    };
                    next += 1;
                }
                c += 1;
            }
            b += 1;
        }
        a += 1;
    }
    out
}

/// All 24 permutations, indexed by [`Perm4::code`].
pub const ALL_PERM4: [Perm4; PERM4_COUNT] = all_permutations();

/// A permutation of `{0, 1, 2, 3}`.
///
/// `Ord` follows the lexicographic order of the image arrays, which is also the
/// order of [`Perm4::code`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Perm4 {
    images: [u8; 4],
}

impl Perm4 {
    /// The identity permutation.
    pub const IDENTITY: Self = Self {
        images: [0, 1, 2, 3],
    };

    /// Builds a permutation from its image array, returning `None` unless the
    /// array is a bijection of `{0, 1, 2, 3}`.
    #[must_use]
    pub const fn from_images(images: [u8; 4]) -> Option<Self> {
        let mut seen = [false; 4];
        let mut i = 0;
        while i < 4 {
            let image = images[i];
            if image > 3 || seen[image as usize] {
                return None;
            }
            seen[image as usize] = true;
            i += 1;
        }
        Some(Self { images })
    }

    /// Looks up the permutation with the given code (`0..24`).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        if (code as usize) < PERM4_COUNT {
            Some(ALL_PERM4[code as usize])
        } else {
            None
        }
    }

    /// The transposition swapping `a` and `b` (the identity when `a == b`).
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` is not in `0..4`.
    #[must_use]
    pub const fn transposition(a: u8, b: u8) -> Self {
        let mut images = [0, 1, 2, 3];
        images[a as usize] = b;
        images[b as usize] = a;
        Self { images }
    }

    /// Rank of this permutation in lexicographic order (`0..24`).
    #[must_use]
    pub const fn code(self) -> u8 {
        let mut code = 0;
        let mut i = 0;
        while i < 4 {
            let mut smaller_after = 0;
            let mut j = i + 1;
            while j < 4 {
                if self.images[j] < self.images[i] {
                    smaller_after += 1;
                }
                j += 1;
            }
            code += smaller_after * FACTORIALS[i];
            i += 1;
        }
        code
    }

    /// The image array `[p(0), p(1), p(2), p(3)]`.
    #[inline]
    #[must_use]
    pub const fn images(self) -> [u8; 4] {
        self.images
    }

    /// Image of `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not in `0..4`.
    #[inline]
    #[must_use]
    pub const fn apply(self, i: u8) -> u8 {
        self.images[i as usize]
    }

    /// The unique `j` with `p(j) == i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not in `0..4`.
    #[inline]
    #[must_use]
    pub const fn pre_image_of(self, i: u8) -> u8 {
        self.inverse().images[i as usize]
    }

    /// The inverse permutation.
    #[must_use]
    pub const fn inverse(self) -> Self {
        let mut images = [0; 4];
        let mut i = 0;
        while i < 4 {
            images[self.images[i] as usize] = i as u8;
            i += 1;
        }
        Self { images }
    }

    /// Composition `self ∘ other`, i.e. `other` is applied first.
    #[must_use]
    pub const fn compose(self, other: Self) -> Self {
        let mut images = [0; 4];
        let mut i = 0;
        while i < 4 {
            images[i] = self.images[other.images[i] as usize];
            i += 1;
        }
        Self { images }
    }

    /// `+1` for even permutations, `-1` for odd ones.
    #[must_use]
    pub const fn sign(self) -> i8 {
        let mut inversions = 0;
        let mut i = 0;
        while i < 4 {
            let mut j = i + 1;
            while j < 4 {
                if self.images[j] < self.images[i] {
                    inversions += 1;
                }
                j += 1;
            }
            i += 1;
        }
        if inversions % 2 == 0 { 1 } else { -1 }
    }

    /// Iterates over all 24 permutations in code order.
    pub fn all() -> impl Iterator<Item = Self> {
        ALL_PERM4.into_iter()
    }
}

impl Default for Perm4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Perm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.images;
        write!(f, "{a}{b}{c}{d}")
    }
}

impl fmt::Debug for Perm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perm4({self})")
    }
}

impl Serialize for Perm4 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Perm4 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Unsigned(code.into()), &"a code in 0..24")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_lexicographic_order() {
        assert_eq!(Perm4::IDENTITY.code(), 0);
        assert_eq!(ALL_PERM4[23].images(), [3, 2, 1, 0]);
        for (code, perm) in ALL_PERM4.iter().enumerate() {
            assert_eq!(usize::from(perm.code()), code);
            assert_eq!(Perm4::from_code(perm.code()), Some(*perm));
        }
        assert!(ALL_PERM4.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Perm4::from_code(24), None);
    }

    #[test]
    fn test_from_images_rejects_non_bijections() {
        assert!(Perm4::from_images([0, 0, 1, 2]).is_none());
        assert!(Perm4::from_images([0, 1, 2, 4]).is_none());
        assert!(Perm4::from_images([3, 1, 2, 0]).is_some());
    }

    #[test]
    fn test_group_laws() {
        for p in Perm4::all() {
            assert_eq!(p.compose(p.inverse()), Perm4::IDENTITY);
            assert_eq!(p.inverse().compose(p), Perm4::IDENTITY);
            for q in Perm4::all() {
                assert_eq!(p.compose(q).sign(), p.sign() * q.sign());
                for i in 0..4 {
                    assert_eq!(p.compose(q).apply(i), p.apply(q.apply(i)));
                }
            }
            for i in 0..4 {
                assert_eq!(p.apply(p.pre_image_of(i)), i);
            }
        }
    }

    #[test]
    fn test_transpositions_are_odd() {
        for a in 0..4 {
            for b in 0..4 {
                let t = Perm4::transposition(a, b);
                assert_eq!(t.apply(a), b);
                assert_eq!(t.apply(b), a);
                assert_eq!(t.sign() == 1, a == b);
            }
        }
        assert_eq!(Perm4::all().filter(|p| p.sign() == 1).count(), 12);
    }

    #[test]
    fn test_display_and_serde() {
        let p = Perm4::from_images([2, 0, 3, 1]).unwrap();
        assert_eq!(p.to_string(), "2031");
        assert_eq!(format!("{p:?}"), "Perm4(2031)");

        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, p.code().to_string());
        let back: Perm4 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Perm4>("24").is_err());
    }
}
