//! Isomorphism signatures: canonical text encodings of triangulations.
//!
//! Two triangulations have the same signature exactly when they are
//! combinatorially isomorphic, and [`reconstruct`] turns a signature back into
//! a triangulation of that isomorphism class.
//!
//! # Canonical labelling
//!
//! For a connected triangulation every choice of root tetrahedron and root
//! corner relabelling (`24·T` choices) determines a breadth-first numbering:
//! the facets of each numbered tetrahedron are visited in canonical order and
//! unseen neighbours are numbered on first contact, with their corners
//! relabelled so the discovering gluing becomes the identity. Each numbering
//! yields a token stream
//!
//! ```text
//! for each tetrahedron k, for each facet j:  neighbour(k, j), perm_code(k, j)
//! ```
//!
//! where a boundary facet reads `(T, 0)`. The smallest stream in full
//! lexicographic order wins. Candidates are abandoned as soon as they exceed
//! the best stream so far.
//!
//! Disconnected triangulations are handled one component at a time;
//! components are ordered by size, then by stream.
//!
//! # Text format
//!
//! Digits come from the alphabet `a–z A–Z 0–9 + -` (values 0–63). A signature
//! is a width digit `w`, then `T` in `w` digits, then for every tetrahedron and
//! facet the neighbour index in `w` digits followed by one digit for the
//! permutation code. `w` is the least width with `64^w > T`, so the boundary
//! marker `T` always fits.
//!
//! # Examples
//!
//! ```rust
//! use pachner::prelude::*;
//!
//! let mut tri = Triangulation::new();
//! tri.add_tetrahedron();
//! assert_eq!(tri.isomorphism_signature().unwrap(), "bbbabababa");
//!
//! let rebuilt = Triangulation::from_signature("bbbabababa").unwrap();
//! assert_eq!(rebuilt.number_of_tetrahedra(), 1);
//! assert_eq!(rebuilt.number_of_boundary_components(), 1);
//! ```

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::algorithms::isomorphism::Isomorphism;
use crate::core::perm::{ALL_PERM4, PERM4_COUNT, Perm4};
use crate::core::triangulation::{DenseGluing, FacetGluing, Triangulation};

/// Digit alphabet, in value order.
pub const ALPHABET: &[u8; 64] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+-";

/// Widest index field the format allows.
pub const MAX_WIDTH: usize = 5;

/// Errors from computing or decoding signatures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The text is not a valid signature.
    #[error("Malformed signature: {reason}")]
    MalformedSignature {
        /// What was wrong.
        reason: String,
    },
    /// The triangulation has too many tetrahedra for the index width.
    #[error("Cannot encode {tetrahedra} tetrahedra in {MAX_WIDTH} digits")]
    TooLarge {
        /// Number of tetrahedra.
        tetrahedra: usize,
    },
    /// The progress callback asked to stop.
    #[error("Signature computation was cancelled")]
    Cancelled,
}

fn malformed(reason: impl Into<String>) -> SignatureError {
    SignatureError::MalformedSignature {
        reason: reason.into(),
    }
}

/// Progress of a signature search, reported after each root tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureProgress {
    /// Root choices examined so far.
    pub roots_done: usize,
    /// Total root choices, `24·T`.
    pub roots_total: usize,
}

// =============================================================================
// CANONICAL LABELLING
// =============================================================================

/// A breadth-first numbering of one component.
#[derive(Debug, Clone)]
struct Labelling {
    /// `order[k]` is the position of canonical tetrahedron `k`.
    order: Vec<usize>,
    /// `perms[k]` maps corners of `order[k]` to canonical corners.
    perms: Vec<Perm4>,
}

/// Connected components of the dual graph, each in discovery order.
fn components(table: &[[DenseGluing; 4]]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; table.len()];
    let mut out = Vec::new();
    for start in 0..table.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(x) = queue.pop_front() {
            for &(y, _) in table[x].iter().flatten() {
                if !seen[y] {
                    seen[y] = true;
                    members.push(y);
                    queue.push_back(y);
                }
            }
        }
        out.push(members);
    }
    out
}

/// Runs one candidate numbering. Returns `None` as soon as its stream
/// exceeds `best`.
fn run_candidate(
    table: &[[DenseGluing; 4]],
    size: usize,
    root: usize,
    root_perm: Perm4,
    best: Option<&[usize]>,
    label: &mut [Option<usize>],
) -> Option<(Vec<usize>, Labelling)> {
    let mut order = vec![root];
    let mut perms = vec![root_perm];
    label[root] = Some(0);

    let mut stream = Vec::with_capacity(size * 8);
    let mut tied = best.is_some();
    let mut outcome = true;

    let mut k = 0;
    'walk: while k < order.len() {
        let x = order[k];
        let rho_x = perms[k];
        for j in 0..4u8 {
            let facet = rho_x.pre_image_of(j);
            let tokens = match table[x][usize::from(facet)] {
                None => [size, 0],
                Some((y, g)) => {
                    let ly = if let Some(ly) = label[y] {
                        ly
                    } else {
                        let ly = order.len();
                        label[y] = Some(ly);
                        order.push(y);
                        perms.push(rho_x.compose(g.inverse()));
                        ly
                    };
                    let code = perms[ly].compose(g).compose(rho_x.inverse()).code();
                    [ly, usize::from(code)]
                }
            };
            for token in tokens {
                if tied && let Some(best) = best {
                    let other = best[stream.len()];
                    if token > other {
                        outcome = false;
                        break 'walk;
                    }
                    tied = token == other;
                }
                stream.push(token);
            }
        }
        k += 1;
    }

    for &x in &order {
        label[x] = None;
    }
    outcome.then_some((stream, Labelling { order, perms }))
}

/// The minimal stream of one component and a numbering achieving it.
fn canonical_component<F>(
    table: &[[DenseGluing; 4]],
    members: &[usize],
    label: &mut [Option<usize>],
    progress: &mut F,
    roots_done: &mut usize,
    roots_total: usize,
) -> Result<(Vec<usize>, Labelling), SignatureError>
where
    F: FnMut(SignatureProgress) -> ControlFlow<()>,
{
    let size = members.len();
    let mut best: Option<(Vec<usize>, Labelling)> = None;
    for &root in members {
        for perm in ALL_PERM4 {
            let bound = best.as_ref().map(|(stream, _)| stream.as_slice());
            if let Some(found) = run_candidate(table, size, root, perm, bound, label) {
                tracing::trace!(root, root_perm = %perm, "new minimal candidate");
                best = Some(found);
            }
        }
        *roots_done += PERM4_COUNT;
        if progress(SignatureProgress {
            roots_done: *roots_done,
            roots_total,
        })
        .is_break()
        {
            return Err(SignatureError::Cancelled);
        }
    }
    // Every component has at least one member, so some candidate was kept.
    best.ok_or_else(|| malformed("empty component"))
}

fn width_for(tetrahedra: usize) -> Result<usize, SignatureError> {
    let mut width = 1;
    let mut capacity: u64 = 64;
    while capacity <= tetrahedra as u64 {
        width += 1;
        capacity = capacity.saturating_mul(64);
    }
    if width > MAX_WIDTH {
        return Err(SignatureError::TooLarge { tetrahedra });
    }
    Ok(width)
}

fn push_digits(out: &mut String, value: usize, width: usize) {
    for place in (0..width).rev() {
        out.push(char::from(ALPHABET[(value >> (6 * place)) & 63]));
    }
}

fn search<F>(tri: &Triangulation, mut progress: F) -> Result<(String, Isomorphism), SignatureError>
where
    F: FnMut(SignatureProgress) -> ControlFlow<()>,
{
    let table = tri.dense_gluings();
    let n = table.len();
    let width = width_for(n)?;

    let mut label = vec![None; n];
    let mut roots_done = 0;
    let roots_total = n * PERM4_COUNT;
    let mut canonical = Vec::new();
    for members in components(&table) {
        let (stream, labelling) = canonical_component(
            &table,
            &members,
            &mut label,
            &mut progress,
            &mut roots_done,
            roots_total,
        )?;
        canonical.push((members.len(), stream, labelling));
    }
    canonical.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    let mut out = String::with_capacity(1 + width + n * 4 * (width + 1));
    out.push(char::from(ALPHABET[width]));
    push_digits(&mut out, n, width);

    let mut tetrahedron_image = vec![0; n];
    let mut vertex_perms = vec![Perm4::IDENTITY; n];
    let mut offset = 0;
    for (size, stream, labelling) in &canonical {
        for (k, (&x, &perm)) in labelling.order.iter().zip(&labelling.perms).enumerate() {
            tetrahedron_image[x] = offset + k;
            vertex_perms[x] = perm;
        }
        for pair in stream.chunks_exact(2) {
            let neighbour = if pair[0] == *size { n } else { pair[0] + offset };
            push_digits(&mut out, neighbour, width);
            out.push(char::from(ALPHABET[pair[1]]));
        }
        offset += size;
    }

    tracing::debug!(
        tetrahedra = n,
        components = canonical.len(),
        signature = %out,
        "computed isomorphism signature"
    );
    Ok((out, Isomorphism::from_parts(tetrahedron_image, vertex_perms)))
}

/// The isomorphism signature of `tri`.
///
/// # Errors
///
/// Returns [`SignatureError::TooLarge`] if `tri` has `64^5` or more
/// tetrahedra.
pub fn isomorphism_signature(tri: &Triangulation) -> Result<String, SignatureError> {
    search(tri, |_| ControlFlow::Continue(())).map(|(signature, _)| signature)
}

/// Like [`isomorphism_signature`], reporting progress after every root
/// tetrahedron. Returning [`ControlFlow::Break`] from `progress` stops the
/// search.
///
/// # Errors
///
/// Returns [`SignatureError::Cancelled`] if `progress` breaks, or
/// [`SignatureError::TooLarge`] as [`isomorphism_signature`] does.
///
/// # Examples
///
/// ```rust
/// use std::ops::ControlFlow;
/// use pachner::prelude::*;
/// use pachner::core::algorithms::signature::isomorphism_signature_with_progress;
///
/// let mut tri = Triangulation::new();
/// tri.add_tetrahedra(3);
///
/// let result = isomorphism_signature_with_progress(&tri, |p| {
///     if p.roots_done >= 24 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
/// });
/// assert_eq!(result, Err(SignatureError::Cancelled));
/// ```
pub fn isomorphism_signature_with_progress<F>(
    tri: &Triangulation,
    progress: F,
) -> Result<String, SignatureError>
where
    F: FnMut(SignatureProgress) -> ControlFlow<()>,
{
    search(tri, progress).map(|(signature, _)| signature)
}

/// The signature together with an isomorphism carrying `tri` onto
/// `reconstruct(signature)`.
///
/// # Errors
///
/// As [`isomorphism_signature`].
pub fn canonical_labelling(tri: &Triangulation) -> Result<(String, Isomorphism), SignatureError> {
    search(tri, |_| ControlFlow::Continue(()))
}

// =============================================================================
// DECODING
// =============================================================================

fn digit_value(byte: u8) -> Option<usize> {
    match byte {
        b'a'..=b'z' => Some(usize::from(byte - b'a')),
        b'A'..=b'Z' => Some(usize::from(byte - b'A') + 26),
        b'0'..=b'9' => Some(usize::from(byte - b'0') + 52),
        b'+' => Some(62),
        b'-' => Some(63),
        _ => None,
    }
}

struct Digits<'a> {
    values: &'a [usize],
    at: usize,
}

impl Digits<'_> {
    fn read(&mut self, width: usize) -> Result<usize, SignatureError> {
        let digits = self
            .values
            .get(self.at..self.at + width)
            .ok_or_else(|| malformed("signature ends early"))?;
        self.at += width;
        Ok(digits.iter().fold(0, |acc, &d| acc * 64 + d))
    }
}

/// Rebuilds a triangulation from its signature.
///
/// The result is deterministic: decoding the same signature twice gives equal
/// triangulations, and tetrahedron `k` of the result sits at position `k`.
///
/// # Errors
///
/// Returns [`SignatureError::MalformedSignature`] on unknown characters, a
/// bad width, a wrong length, out-of-range indices or permutation codes, a
/// boundary facet with a non-zero code, a facet glued to itself, or a gluing
/// that is not listed symmetrically.
pub fn reconstruct(signature: &str) -> Result<Triangulation, SignatureError> {
    let values: Vec<usize> = signature
        .bytes()
        .enumerate()
        .map(|(at, byte)| {
            digit_value(byte)
                .ok_or_else(|| malformed(format!("unexpected character at offset {at}")))
        })
        .collect::<Result<_, _>>()?;

    let (&width, _) = values
        .split_first()
        .ok_or_else(|| malformed("empty signature"))?;
    if width == 0 || width > MAX_WIDTH {
        return Err(malformed(format!("index width {width} out of range")));
    }
    let mut digits = Digits {
        values: &values,
        at: 1,
    };
    let n = digits.read(width)?;

    let expected = n
        .checked_mul(4 * (width + 1))
        .and_then(|body| body.checked_add(1 + width))
        .ok_or_else(|| malformed("tetrahedron count overflows"))?;
    if values.len() != expected {
        return Err(malformed(format!(
            "expected {expected} characters for {n} tetrahedra, found {}",
            values.len()
        )));
    }

    let mut table: Vec<[DenseGluing; 4]> = Vec::with_capacity(n);
    for t in 0..n {
        let mut row = [None; 4];
        for (facet, slot) in row.iter_mut().enumerate() {
            let neighbour = digits.read(width)?;
            let code = digits.read(1)?;
            if neighbour > n {
                return Err(malformed(format!(
                    "tetrahedron {t} facet {facet}: neighbour {neighbour} out of range"
                )));
            }
            if neighbour == n {
                if code != 0 {
                    return Err(malformed(format!(
                        "tetrahedron {t} facet {facet}: boundary facet with code {code}"
                    )));
                }
                continue;
            }
            let gluing = u8::try_from(code)
                .ok()
                .and_then(Perm4::from_code)
                .ok_or_else(|| {
                    malformed(format!(
                        "tetrahedron {t} facet {facet}: permutation code {code} out of range"
                    ))
                })?;
            *slot = Some((neighbour, gluing));
        }
        table.push(row);
    }

    let mut gluings = Vec::new();
    for (t, row) in table.iter().enumerate() {
        for (facet, slot) in (0..4u8).zip(row) {
            let Some((partner, gluing)) = *slot else {
                continue;
            };
            let partner_facet = gluing.apply(facet);
            if (partner, partner_facet) == (t, facet) {
                return Err(malformed(format!(
                    "tetrahedron {t} facet {facet} is glued to itself"
                )));
            }
            if table[partner][usize::from(partner_facet)] != Some((t, gluing.inverse())) {
                return Err(malformed(format!(
                    "gluing of tetrahedron {t} facet {facet} is not symmetric"
                )));
            }
            if (t, facet) < (partner, partner_facet) {
                gluings.push(FacetGluing::new(t, facet, partner, gluing));
            }
        }
    }

    Triangulation::from_gluings(n, &gluings).map_err(|err| malformed(err.to_string()))
}

// =============================================================================
// TRIANGULATION INTEGRATION
// =============================================================================

impl Triangulation {
    /// The isomorphism signature; see [`isomorphism_signature`].
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::TooLarge`] for triangulations beyond the
    /// format's index width.
    pub fn isomorphism_signature(&self) -> Result<String, SignatureError> {
        isomorphism_signature(self)
    }

    /// Decodes a signature; see [`reconstruct`].
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::MalformedSignature`] for invalid input.
    pub fn from_signature(signature: &str) -> Result<Self, SignatureError> {
        reconstruct(signature)
    }
}

impl FromStr for Triangulation {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        reconstruct(s)
    }
}

/// Serializes as the isomorphism signature string.
impl Serialize for Triangulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let signature = isomorphism_signature(self).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&signature)
    }
}

impl<'de> Deserialize<'de> for Triangulation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let signature = String::deserialize(deserializer)?;
        reconstruct(&signature).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::Perm4;

    fn glued(n: usize, gluings: &[(usize, u8, usize, Perm4)]) -> Triangulation {
        let gluings: Vec<_> = gluings
            .iter()
            .map(|&(a, f, b, p)| FacetGluing::new(a, f, b, p))
            .collect();
        Triangulation::from_gluings(n, &gluings).unwrap()
    }

    #[test]
    fn test_known_signatures() {
        assert_eq!(isomorphism_signature(&Triangulation::new()).unwrap(), "ba");
        assert_eq!(isomorphism_signature(&glued(1, &[])).unwrap(), "bbbabababa");
        assert_eq!(
            isomorphism_signature(&glued(2, &[(0, 0, 1, Perm4::IDENTITY)])).unwrap(),
            "bcbacacacaaacacaca"
        );
        let sphere: Vec<_> = (0..4).map(|f| (0, f, 1, Perm4::IDENTITY)).collect();
        assert_eq!(
            isomorphism_signature(&glued(2, &sphere)).unwrap(),
            "bcbabababaaaaaaaaa"
        );
    }

    #[test]
    fn test_gluing_position_does_not_matter() {
        let a = glued(2, &[(0, 0, 1, Perm4::IDENTITY)]);
        let b = glued(2, &[(1, 3, 0, Perm4::from_images([2, 0, 3, 1]).unwrap())]);
        assert_eq!(
            isomorphism_signature(&a).unwrap(),
            isomorphism_signature(&b).unwrap()
        );
    }

    #[test]
    fn test_components_are_ordered_by_size() {
        let a = glued(3, &[(1, 0, 2, Perm4::IDENTITY)]);
        let b = glued(3, &[(0, 2, 1, Perm4::transposition(1, 2))]);
        let sig = isomorphism_signature(&a).unwrap();
        assert_eq!(sig, isomorphism_signature(&b).unwrap());
        // The lone tetrahedron comes first: four boundary facets.
        assert_eq!(&sig[2..10], "dadadada");
    }

    #[test]
    fn test_width_for() {
        assert_eq!(width_for(0), Ok(1));
        assert_eq!(width_for(63), Ok(1));
        assert_eq!(width_for(64), Ok(2));
        assert_eq!(width_for(4095), Ok(2));
        assert_eq!(width_for(4096), Ok(3));
        assert_eq!(
            width_for(1 << 30),
            Err(SignatureError::TooLarge { tetrahedra: 1 << 30 })
        );
    }

    #[test]
    fn test_push_digits_is_big_endian() {
        let mut out = String::new();
        push_digits(&mut out, 64 + 2, 2);
        assert_eq!(out, "bc");
    }

    #[test]
    fn test_reconstruct_round_trip() {
        let tri = glued(
            3,
            &[
                (0, 0, 1, Perm4::IDENTITY),
                (1, 2, 2, Perm4::transposition(2, 3)),
                (0, 1, 2, Perm4::from_images([2, 0, 1, 3]).unwrap()),
            ],
        );
        let (sig, iso) = canonical_labelling(&tri).unwrap();
        let rebuilt = reconstruct(&sig).unwrap();
        assert_eq!(iso.apply(&tri).unwrap(), rebuilt);
        assert_eq!(isomorphism_signature(&rebuilt).unwrap(), sig);
        assert_eq!(reconstruct(&sig).unwrap(), rebuilt);
    }

    #[test]
    fn test_reconstruct_rejects_garbage() {
        for bad in [
            "",
            "a",
            "b",
            "bb",
            "bbbabababa!",
            "bb*abababa",
            "gbbabababa",
            "bbbababab",
            "bbbbbababa",
            "bbcabababa",
            "bbaaabababa",
            "bcbacacacaabcacaca",
            "bbabbababa",
            "bbaYbababa",
        ] {
            assert!(
                matches!(reconstruct(bad), Err(SignatureError::MalformedSignature { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_cancellation() {
        let tri = glued(2, &[(0, 0, 1, Perm4::IDENTITY)]);
        let mut calls = 0;
        let result = isomorphism_signature_with_progress(&tri, |p| {
            calls += 1;
            assert_eq!(p.roots_total, 48);
            ControlFlow::Break(())
        });
        assert_eq!(result, Err(SignatureError::Cancelled));
        assert_eq!(calls, 1);

        let mut last = None;
        isomorphism_signature_with_progress(&tri, |p| {
            last = Some(p);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(
            last,
            Some(SignatureProgress {
                roots_done: 48,
                roots_total: 48
            })
        );
    }

    #[test]
    fn test_serde_uses_signature() {
        let tri = glued(2, &[(0, 0, 1, Perm4::IDENTITY)]);
        let json = serde_json::to_string(&tri).unwrap();
        assert_eq!(json, "\"bcbacacacaaacacaca\"");
        let back: Triangulation = serde_json::from_str(&json).unwrap();
        assert!(back.is_isomorphic_to(&tri));
        assert!(serde_json::from_str::<Triangulation>("\"zz\"").is_err());
    }
}
