//! Interval identifiers, arc keys and input records.

use crate::algebra::{RelationType, RELATION_COUNT};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a temporal interval (event, time expression, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IntervalId(String);

impl IntervalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntervalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IntervalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for IntervalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordered `(source, target)` pair identifying an arc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcKey {
    pub source: IntervalId,
    pub target: IntervalId,
}

impl ArcKey {
    pub fn new(source: impl Into<IntervalId>, target: impl Into<IntervalId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for ArcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.source, self.target)
    }
}

/// One input row: an arc and its per-relation confidence estimates.
///
/// `confidence[r]` is the estimate for relation index `r`. Values need not
/// sum to 1; the length is checked when the record enters a catalog.
///
/// A record may be pinned to a known relation (e.g. a gold annotation);
/// the model then fixes the arc's variables instead of optimizing them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcRecord {
    pub source: IntervalId,
    pub target: IntervalId,
    pub confidence: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pinned: Option<RelationType>,
}

impl ArcRecord {
    pub fn new(
        source: impl Into<IntervalId>,
        target: impl Into<IntervalId>,
        confidence: impl Into<Vec<f64>>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            confidence: confidence.into(),
            pinned: None,
        }
    }

    /// Record whose whole confidence mass sits on `relation`.
    pub fn certain(
        source: impl Into<IntervalId>,
        target: impl Into<IntervalId>,
        relation: RelationType,
    ) -> Self {
        let mut confidence = vec![0.0; RELATION_COUNT];
        confidence[relation.index()] = 1.0;
        Self::new(source, target, confidence)
    }

    /// Record fixed to `relation`, with matching one-hot confidence.
    pub fn pinned(
        source: impl Into<IntervalId>,
        target: impl Into<IntervalId>,
        relation: RelationType,
    ) -> Self {
        Self::certain(source, target, relation).with_pinned(relation)
    }

    /// Pins this record to `relation`, keeping its confidence vector.
    pub fn with_pinned(mut self, relation: RelationType) -> Self {
        self.pinned = Some(relation);
        self
    }

    pub fn key(&self) -> ArcKey {
        ArcKey::new(self.source.clone(), self.target.clone())
    }
}

/// A validated arc stored in an [`ArcCatalog`](super::ArcCatalog).
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub key: ArcKey,
    pub confidence: [f64; RELATION_COUNT],
    pub pinned: Option<RelationType>,
}

impl Arc {
    /// Relation with the highest confidence; the lowest index wins ties.
    pub fn argmax(&self) -> RelationType {
        let mut best = RelationType::Before;
        for r in RelationType::ALL {
            if self.confidence[r.index()] > self.confidence[best.index()] {
                best = r;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_key_display() {
        let key = ArcKey::new("e1", "t3");
        assert_eq!(key.to_string(), "(e1 -> t3)");
    }

    #[test]
    fn test_certain_record() {
        let rec = ArcRecord::certain("a", "b", RelationType::Overlap);
        assert_eq!(rec.confidence.len(), RELATION_COUNT);
        assert_eq!(rec.confidence[4], 1.0);
        assert_eq!(rec.confidence.iter().sum::<f64>(), 1.0);
        assert_eq!(rec.key(), ArcKey::new("a", "b"));
        assert_eq!(rec.pinned, None);
    }

    #[test]
    fn test_pinned_record() {
        let rec = ArcRecord::pinned("a", "b", RelationType::EndsOn);
        assert_eq!(rec.pinned, Some(RelationType::EndsOn));
        assert_eq!(rec.confidence[6], 1.0);
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_tie() {
        let arc = Arc {
            key: ArcKey::new("a", "b"),
            confidence: [0.1, 0.4, 0.0, 0.4, 0.0, 0.0, 0.0, 0.1],
            pinned: None,
        };
        assert_eq!(arc.argmax(), RelationType::After);
    }
}
