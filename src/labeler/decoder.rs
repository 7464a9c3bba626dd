//! Solver output decoding.

use super::builder::LabelingProblem;
use crate::algebra::{RelationType, RELATION_COUNT};
use crate::error::{Error, Result};
use crate::graph::{ArcKey, IntervalId};

/// One output row: an arc and the relation chosen for it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledArc {
    pub source: IntervalId,
    pub target: IntervalId,
    pub relation: RelationType,
    /// Solved value of each of the arc's eight variables.
    pub values: [f64; RELATION_COUNT],
    /// Input confidence vector, when kept for audit.
    pub confidence: Option<[f64; RELATION_COUNT]>,
}

impl LabeledArc {
    pub fn key(&self) -> ArcKey {
        ArcKey::new(self.source.clone(), self.target.clone())
    }
}

/// Decoded labels in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub labels: Vec<LabeledArc>,
    /// Arcs whose values did not contain exactly one selected relation and
    /// were resolved by taking the largest value.
    pub repaired: Vec<ArcKey>,
}

/// Maps solved variable values back to one relation per arc.
///
/// A value within `tolerance` of 1 counts as selected. When an arc has no
/// selected relation, or several, the largest value wins and the arc is
/// reported as repaired; if the largest value is shared (within
/// `tolerance`) decoding fails with [`Error::DecodeAmbiguous`].
#[derive(Debug, Clone)]
pub struct Decoder {
    tolerance: f64,
    keep_confidences: bool,
}

impl Decoder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            keep_confidences: true,
        }
    }

    /// Keeps or drops input confidences in the output.
    pub fn with_confidences(mut self, keep: bool) -> Self {
        self.keep_confidences = keep;
        self
    }

    /// Decodes a full assignment (indexed by variable) for `problem`.
    pub fn decode(&self, problem: &LabelingProblem<'_>, values: &[f64]) -> Result<Decoded> {
        let expected = problem.model().var_count();
        if values.len() != expected {
            return Err(Error::AssignmentLength {
                expected,
                got: values.len(),
            });
        }

        let catalog = problem.catalog();
        let mut labels = Vec::with_capacity(catalog.len());
        let mut repaired = Vec::new();
        for (idx, arc) in catalog.iter() {
            let mut arc_values = [0.0; RELATION_COUNT];
            for r in RelationType::ALL {
                arc_values[r.index()] = values[problem.var(idx, r).0];
            }
            let (relation, was_repaired) = self.decode_arc(&arc.key, &arc_values)?;
            if was_repaired {
                repaired.push(arc.key.clone());
            }
            labels.push(LabeledArc {
                source: arc.key.source.clone(),
                target: arc.key.target.clone(),
                relation,
                values: arc_values,
                confidence: self.keep_confidences.then_some(arc.confidence),
            });
        }

        if !repaired.is_empty() {
            tracing::warn!(
                arcs = repaired.len(),
                "solver output violated uniqueness; resolved by largest value"
            );
        }
        Ok(Decoded { labels, repaired })
    }

    /// Chooses the relation for one arc. The flag is set when the choice
    /// needed repair.
    pub fn decode_arc(
        &self,
        key: &ArcKey,
        values: &[f64; RELATION_COUNT],
    ) -> Result<(RelationType, bool)> {
        let selected: Vec<RelationType> = RelationType::ALL
            .into_iter()
            .filter(|r| (values[r.index()] - 1.0).abs() <= self.tolerance)
            .collect();
        if let [only] = selected[..] {
            return Ok((only, false));
        }

        let max = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        let at_max: Vec<RelationType> = RelationType::ALL
            .into_iter()
            .filter(|r| (max - values[r.index()]).abs() <= self.tolerance)
            .collect();
        match at_max[..] {
            [chosen] => {
                tracing::warn!(
                    arc = %key,
                    relation = %chosen,
                    value = max,
                    selected = selected.len(),
                    "no unique selected relation; taking largest value"
                );
                Ok((chosen, true))
            }
            _ => Err(Error::DecodeAmbiguous {
                arc: key.clone(),
                candidates: at_max,
                value: max,
            }),
        }
    }
}
