//! Relation composition table.

use super::relation::{RelationSet, RelationType, RELATION_COUNT};
use crate::error::{Error, Result};
use std::fmt;

/// Code that marks an unconstrained composition in symbolic tables.
pub const UNCONSTRAINED_CODE: &str = ".";

/// Result of composing two relations.
///
/// `iR1j ∧ jR2k ⇒ iR3k` for some `R3` in the permitted set, or the chain
/// tells nothing about `(i, k)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// The closing arc must take one of these relations. Never empty.
    Permitted(RelationSet),
    /// The chain imposes no restriction on the closing arc.
    Unconstrained,
}

impl Composite {
    /// Permitted set, or `None` when unconstrained.
    pub fn permitted(self) -> Option<RelationSet> {
        match self {
            Composite::Permitted(set) => Some(set),
            Composite::Unconstrained => None,
        }
    }

    pub fn is_unconstrained(self) -> bool {
        matches!(self, Composite::Unconstrained)
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Composite::Permitted(set) => write!(f, "{set}"),
            Composite::Unconstrained => f.write_str("<unconstrained>"),
        }
    }
}

/// Composition table of the TLINK interval algebra.
///
/// Rows are `(code1, code2, closure codes)`; `.` marks an unconstrained
/// composition.
#[rustfmt::skip]
pub const STANDARD_COMPOSITIONS: [(&str, &str, &[&str]); 64] = [
    ("p", "p", &["p"]),
    ("p", "pi", &["."]),
    ("p", "c", &["p"]),
    ("p", "ci", &["p", "ci", "o", "bi"]),
    ("p", "o", &["p", "ci", "o", "bi"]),
    ("p", "b", &["p", "ci", "o", "bi"]),
    ("p", "bi", &["p"]),
    ("p", "n", &["."]),

    ("pi", "p", &["."]),
    ("pi", "pi", &["pi"]),
    ("pi", "c", &["pi"]),
    ("pi", "ci", &["pi", "ci", "o", "b"]),
    ("pi", "o", &["pi", "ci", "o", "b"]),
    ("pi", "b", &["pi", "ci", "o", "b"]),
    ("pi", "bi", &["pi"]),
    ("pi", "n", &["."]),

    ("c", "p", &["p", "c", "o", "bi"]),
    ("c", "pi", &["pi", "c", "o", "b"]),
    ("c", "c", &["c"]),
    ("c", "ci", &["c", "ci", "o"]),
    ("c", "o", &["c", "o"]),
    ("c", "b", &["c", "o"]),
    ("c", "bi", &["c", "o"]),
    ("c", "n", &["."]),

    ("ci", "p", &["p"]),
    ("ci", "pi", &["pi"]),
    ("ci", "c", &["."]),
    ("ci", "ci", &["ci"]),
    ("ci", "o", &["p", "pi", "o", "b", "bi"]),
    ("ci", "b", &["pi"]),
    ("ci", "bi", &["p"]),
    ("ci", "n", &["."]),

    ("o", "p", &["p", "c", "o", "bi"]),
    ("o", "pi", &["pi", "c", "o", "b"]),
    ("o", "c", &["c", "o"]),
    ("o", "ci", &["ci", "o"]),
    ("o", "o", &["ci", "o", "b", "bi"]),
    ("o", "b", &["pi", "c", "o"]),
    ("o", "bi", &["p", "c", "o"]),
    ("o", "n", &["."]),

    ("b", "p", &["p", "c", "o", "bi"]),
    ("b", "pi", &["pi"]),
    ("b", "c", &["pi"]),
    ("b", "ci", &["ci", "o"]),
    ("b", "o", &["pi", "ci", "o"]),
    ("b", "b", &["pi"]),
    ("b", "bi", &["c", "o"]),
    ("b", "n", &["."]),

    ("bi", "p", &["p"]),
    ("bi", "pi", &["pi", "c", "o", "b"]),
    ("bi", "c", &["p"]),
    ("bi", "ci", &["ci", "o"]),
    ("bi", "o", &["p", "ci", "o"]),
    ("bi", "b", &["c", "o"]),
    ("bi", "bi", &["p"]),
    ("bi", "n", &["."]),

    ("n", "p", &["."]),
    ("n", "pi", &["."]),
    ("n", "c", &["."]),
    ("n", "ci", &["."]),
    ("n", "o", &["."]),
    ("n", "b", &["."]),
    ("n", "bi", &["."]),
    ("n", "n", &["."]),
];

/// Total lookup from an ordered pair of relations to their [`Composite`].
///
/// A table can only be obtained through a validating constructor, so every
/// one of the 64 ordered pairs is guaranteed to be present. Entries need
/// not be symmetric under argument swap.
///
/// # Examples
///
/// ```
/// use u_tlink::algebra::{CompositionTable, Composite, RelationSet, RelationType};
///
/// let table = CompositionTable::standard().unwrap();
/// assert_eq!(
///     table.lookup(RelationType::Before, RelationType::Before),
///     Composite::Permitted(RelationSet::single(RelationType::Before)),
/// );
/// assert!(table.lookup(RelationType::None, RelationType::Before).is_unconstrained());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionTable {
    entries: [[Composite; RELATION_COUNT]; RELATION_COUNT],
}

impl CompositionTable {
    /// The standard TLINK composition table.
    pub fn standard() -> Result<Self> {
        Self::from_symbolic(&STANDARD_COMPOSITIONS)
    }

    /// Builds a table from typed entries.
    ///
    /// Fails with [`Error::Configuration`] when a pair is missing, a pair
    /// appears twice, or a permitted set is empty.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((RelationType, RelationType), Composite)>,
    {
        let mut slots: [[Option<Composite>; RELATION_COUNT]; RELATION_COUNT] =
            [[None; RELATION_COUNT]; RELATION_COUNT];

        for ((r1, r2), composite) in entries {
            if let Composite::Permitted(set) = composite {
                if set.is_empty() {
                    return Err(Error::Configuration(format!(
                        "empty permitted set for ({r1}, {r2})"
                    )));
                }
            }
            let slot = &mut slots[r1.index()][r2.index()];
            if slot.is_some() {
                return Err(Error::Configuration(format!(
                    "duplicate entry for ({r1}, {r2})"
                )));
            }
            *slot = Some(composite);
        }

        let mut entries = [[Composite::Unconstrained; RELATION_COUNT]; RELATION_COUNT];
        let mut missing = Vec::new();
        for r1 in RelationType::ALL {
            for r2 in RelationType::ALL {
                match slots[r1.index()][r2.index()] {
                    Some(c) => entries[r1.index()][r2.index()] = c,
                    None => missing.push(format!("({r1}, {r2})")),
                }
            }
        }
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "{} of 64 pairs missing: {}",
                missing.len(),
                missing.join(", ")
            )));
        }

        Ok(Self { entries })
    }

    /// Builds a table from `(code1, code2, closure codes)` rows.
    ///
    /// Codes are relation short codes or names. A closure of exactly
    /// `["."]` is the unconstrained marker; `.` mixed with other codes is
    /// rejected.
    pub fn from_symbolic<S: AsRef<str>>(rows: &[(S, S, &[S])]) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows.len());
        for (c1, c2, closure) in rows {
            let r1 = parse_code(c1.as_ref())?;
            let r2 = parse_code(c2.as_ref())?;
            let composite = parse_closure(r1, r2, closure)?;
            entries.push(((r1, r2), composite));
        }
        Self::from_entries(entries)
    }

    /// Composite of `r1` followed by `r2`.
    pub fn lookup(&self, r1: RelationType, r2: RelationType) -> Composite {
        self.entries[r1.index()][r2.index()]
    }

    /// Number of ordered pairs that impose a restriction.
    pub fn constrained_pairs(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|c| !c.is_unconstrained())
            .count()
    }

    /// Iterates `(r1, r2, composite)` over all 64 pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (RelationType, RelationType, Composite)> + '_ {
        RelationType::ALL.into_iter().flat_map(move |r1| {
            RelationType::ALL
                .into_iter()
                .map(move |r2| (r1, r2, self.lookup(r1, r2)))
        })
    }
}

fn parse_code(code: &str) -> Result<RelationType> {
    code.parse::<RelationType>().map_err(Error::Configuration)
}

fn parse_closure<S: AsRef<str>>(
    r1: RelationType,
    r2: RelationType,
    closure: &[S],
) -> Result<Composite> {
    let has_marker = closure.iter().any(|c| c.as_ref().trim() == UNCONSTRAINED_CODE);
    if has_marker {
        if closure.len() != 1 {
            return Err(Error::Configuration(format!(
                "unconstrained marker mixed with relations for ({r1}, {r2})"
            )));
        }
        return Ok(Composite::Unconstrained);
    }
    let mut set = RelationSet::EMPTY;
    for code in closure {
        set.insert(parse_code(code.as_ref())?);
    }
    Ok(Composite::Permitted(set))
}
