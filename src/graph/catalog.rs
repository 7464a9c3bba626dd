//! Validated arc catalog.

use super::arc::{Arc, ArcKey, ArcRecord, IntervalId};
use crate::algebra::RELATION_COUNT;
use crate::error::{ArcIssue, Error, Result};
use std::collections::{HashMap, HashSet};

/// Position of an arc inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcIdx(pub usize);

/// Read-only collection of arcs, at most one per ordered node pair.
///
/// Arcs keep the order of the records they were built from. Nodes are
/// interned so that pair lookups and the source index work on integers.
///
/// # Examples
///
/// ```
/// use u_tlink::graph::{ArcCatalog, ArcRecord};
///
/// let catalog = ArcCatalog::build(vec![
///     ArcRecord::new("a", "b", vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
///     ArcRecord::new("b", "c", vec![0.8, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
/// ])
/// .unwrap();
/// assert_eq!(catalog.len(), 2);
/// assert!(catalog.find("a", "b").is_some());
/// assert!(catalog.find("a", "c").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ArcCatalog {
    arcs: Vec<Arc>,
    /// Interned `(source, target)` node numbers, parallel to `arcs`.
    endpoints: Vec<(usize, usize)>,
    nodes: HashMap<IntervalId, usize>,
    by_pair: HashMap<(usize, usize), ArcIdx>,
    by_source: Vec<Vec<ArcIdx>>,
}

impl ArcCatalog {
    /// Builds a catalog from input records.
    ///
    /// Rejects duplicate `(source, target)` keys, confidence vectors whose
    /// length is not 8, and non-finite confidence values.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ArcRecord>,
    {
        Self::build_inner(records, None)
    }

    /// Like [`build`](Self::build), but every endpoint must also appear in
    /// `nodes`.
    pub fn build_with_nodes<I, N>(nodes: N, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ArcRecord>,
        N: IntoIterator,
        N::Item: Into<IntervalId>,
    {
        let known: HashSet<IntervalId> = nodes.into_iter().map(Into::into).collect();
        Self::build_inner(records, Some(&known))
    }

    fn build_inner<I>(records: I, known: Option<&HashSet<IntervalId>>) -> Result<Self>
    where
        I: IntoIterator<Item = ArcRecord>,
    {
        let mut catalog = Self {
            arcs: Vec::new(),
            endpoints: Vec::new(),
            nodes: HashMap::new(),
            by_pair: HashMap::new(),
            by_source: Vec::new(),
        };

        for record in records {
            let key = record.key();
            if let Some(known) = known {
                for node in [&key.source, &key.target] {
                    if !known.contains(node) {
                        return Err(Error::InvalidArc {
                            arc: key.clone(),
                            issue: ArcIssue::UnknownNode { node: node.clone() },
                        });
                    }
                }
            }
            let confidence = confidence_array(&key, &record.confidence)?;

            let s = catalog.intern(&key.source);
            let t = catalog.intern(&key.target);
            let idx = ArcIdx(catalog.arcs.len());
            if catalog.by_pair.insert((s, t), idx).is_some() {
                return Err(Error::InvalidArc {
                    arc: key,
                    issue: ArcIssue::Duplicate,
                });
            }
            catalog.by_source[s].push(idx);
            catalog.endpoints.push((s, t));
            catalog.arcs.push(Arc {
                key,
                confidence,
                pinned: record.pinned,
            });
        }

        tracing::debug!(
            arcs = catalog.arcs.len(),
            nodes = catalog.nodes.len(),
            "built arc catalog"
        );
        Ok(catalog)
    }

    fn intern(&mut self, id: &IntervalId) -> usize {
        if let Some(&n) = self.nodes.get(id) {
            return n;
        }
        let n = self.nodes.len();
        self.nodes.insert(id.clone(), n);
        self.by_source.push(Vec::new());
        n
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Number of distinct nodes referenced by arcs.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arc at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` does not belong to this catalog.
    pub fn arc(&self, idx: ArcIdx) -> &Arc {
        &self.arcs[idx.0]
    }

    /// Iterates `(index, arc)` in input order.
    pub fn iter(&self) -> impl Iterator<Item = (ArcIdx, &Arc)> {
        self.arcs.iter().enumerate().map(|(i, a)| (ArcIdx(i), a))
    }

    /// Index of the arc `source -> target`, if present.
    pub fn find(&self, source: &str, target: &str) -> Option<ArcIdx> {
        let s = *self.nodes.get(source)?;
        let t = *self.nodes.get(target)?;
        self.by_pair.get(&(s, t)).copied()
    }

    pub fn contains_key(&self, key: &ArcKey) -> bool {
        self.find(key.source.as_str(), key.target.as_str()).is_some()
    }

    /// Interned `(source, target)` node numbers of an arc.
    pub(crate) fn endpoints(&self, idx: ArcIdx) -> (usize, usize) {
        self.endpoints[idx.0]
    }

    /// Arc between interned nodes, if present.
    pub(crate) fn find_interned(&self, source: usize, target: usize) -> Option<ArcIdx> {
        self.by_pair.get(&(source, target)).copied()
    }

    /// Arcs leaving an interned node, in input order.
    pub(crate) fn outgoing(&self, node: usize) -> &[ArcIdx] {
        &self.by_source[node]
    }
}

fn confidence_array(key: &ArcKey, values: &[f64]) -> Result<[f64; RELATION_COUNT]> {
    let confidence: [f64; RELATION_COUNT] =
        values.try_into().map_err(|_| Error::InvalidArc {
            arc: key.clone(),
            issue: ArcIssue::VectorLength { got: values.len() },
        })?;
    if let Some(index) = confidence.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidArc {
            arc: key.clone(),
            issue: ArcIssue::NonFiniteConfidence { index },
        });
    }
    Ok(confidence)
}
