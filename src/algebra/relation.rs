//! Temporal relation types and compact relation sets.

use std::fmt;
use std::str::FromStr;

/// Number of relation types in the algebra.
pub const RELATION_COUNT: usize = 8;

/// A symbolic temporal relation between two intervals.
///
/// Each variant is bound to a stable index in `0..8`. Confidence vectors,
/// decision variables and solved values are all aligned to this ordering.
///
/// # Examples
///
/// ```
/// use u_tlink::algebra::RelationType;
///
/// let r: RelationType = "ci".parse().unwrap();
/// assert_eq!(r, RelationType::ContainsInv);
/// assert_eq!(r.index(), 3);
/// assert_eq!(r.to_string(), "CONTAINS_INV");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationType {
    Before,
    After,
    Contains,
    ContainsInv,
    Overlap,
    BeginsOn,
    EndsOn,
    None,
}

impl RelationType {
    /// All relation types in index order.
    pub const ALL: [RelationType; RELATION_COUNT] = [
        RelationType::Before,
        RelationType::After,
        RelationType::Contains,
        RelationType::ContainsInv,
        RelationType::Overlap,
        RelationType::BeginsOn,
        RelationType::EndsOn,
        RelationType::None,
    ];

    /// Stable index of this relation (0..8).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Relation bound to `index`, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short code used by relation-algebra data files.
    pub fn code(self) -> &'static str {
        match self {
            RelationType::Before => "p",
            RelationType::After => "pi",
            RelationType::Contains => "c",
            RelationType::ContainsInv => "ci",
            RelationType::Overlap => "o",
            RelationType::BeginsOn => "b",
            RelationType::EndsOn => "bi",
            RelationType::None => "n",
        }
    }

    /// Upper-case label, as written in output records.
    pub fn name(self) -> &'static str {
        match self {
            RelationType::Before => "BEFORE",
            RelationType::After => "AFTER",
            RelationType::Contains => "CONTAINS",
            RelationType::ContainsInv => "CONTAINS_INV",
            RelationType::Overlap => "OVERLAP",
            RelationType::BeginsOn => "BEGINS_ON",
            RelationType::EndsOn => "ENDS_ON",
            RelationType::None => "NONE",
        }
    }

    /// Looks up a relation by its short code only.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelationType {
    type Err = String;

    /// Accepts either the short code (`"pi"`) or the name (`"AFTER"`,
    /// case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(r) = Self::from_code(s) {
            return Ok(r);
        }
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown relation type: {s:?}"))
    }
}

/// A set of relation types, stored as an 8-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RelationSet(u8);

impl RelationSet {
    /// The empty set.
    pub const EMPTY: RelationSet = RelationSet(0);

    /// Builds a set from a slice of relations (duplicates collapse).
    pub fn from_slice(relations: &[RelationType]) -> Self {
        relations.iter().copied().collect()
    }

    /// Set containing only `r`.
    pub fn single(r: RelationType) -> Self {
        RelationSet(1 << r.index())
    }

    pub fn insert(&mut self, r: RelationType) {
        self.0 |= 1 << r.index();
    }

    pub fn contains(self, r: RelationType) -> bool {
        self.0 & (1 << r.index()) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in index order.
    pub fn iter(self) -> impl Iterator<Item = RelationType> {
        RelationType::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<RelationType> for RelationSet {
    fn from_iter<I: IntoIterator<Item = RelationType>>(iter: I) -> Self {
        let mut set = RelationSet::EMPTY;
        for r in iter {
            set.insert(r);
        }
        set
    }
}

impl fmt::Display for RelationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, r) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{r}")?;
        }
        f.write_str("}")
    }
}
