//! Topology validation for triangulations.
//!
//! Combines face counting, classification and the Euler characteristic
//! prediction of [`euler`](crate::topology::characteristics::euler) into a
//! single report.

use crate::core::triangulation::Triangulation;
use crate::topology::characteristics::euler::{
    FVector, TopologyClassification, classify_skeleton, count_skeleton_simplices,
    euler_characteristic, expected_chi_for,
};

/// Result of Euler characteristic validation.
///
/// # Examples
///
/// ```rust
/// use pachner::prelude::*;
/// use pachner::topology::characteristics::validation;
///
/// let mut tri = Triangulation::new();
/// tri.add_tetrahedron();
///
/// let result = validation::validate_triangulation_euler(&tri);
/// assert_eq!(result.chi, 1);
/// assert!(result.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyCheckResult {
    /// Computed Euler characteristic.
    pub chi: isize,

    /// Predicted χ (None if no prediction is possible).
    pub expected: Option<isize>,

    /// Topological classification.
    pub classification: TopologyClassification,

    /// Full face counts (f-vector).
    pub counts: FVector,

    /// Diagnostic notes or warnings.
    pub notes: Vec<String>,
}

impl TopologyCheckResult {
    /// Returns `true` if χ matches the prediction, or if there is none.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expected.is_none_or(|exp| self.chi == exp)
    }
}

/// Counts faces, classifies, and checks χ against its prediction.
#[must_use]
pub fn validate_triangulation_euler(tri: &Triangulation) -> TopologyCheckResult {
    let skeleton = tri.skeleton();
    let counts = count_skeleton_simplices(&skeleton);
    let chi = euler_characteristic(&counts);
    let classification = classify_skeleton(&skeleton);
    let expected = expected_chi_for(&skeleton, &classification);

    let mut notes = Vec::new();
    if let Some(exp) = expected.filter(|&exp| chi != exp) {
        notes.push(format!(
            "Euler characteristic mismatch: computed {chi}, expected {exp}"
        ));
    }
    if classification == TopologyClassification::Invalid {
        notes.push("Triangulation has invalid edges or vertex links".to_string());
    }
    if !skeleton.is_orientable() {
        notes.push("Triangulation is non-orientable".to_string());
    }

    if !notes.is_empty() {
        tracing::debug!(chi, ?expected, ?classification, ?notes, "topology check");
    }

    TopologyCheckResult {
        chi,
        expected,
        classification,
        counts,
        notes,
    }
}
