use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::vertex::VertexId;
use crate::witness::WitnessId;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

/// A transition between two vertices, labelled with the witnesses reading
/// the source vertex directly followed by the target vertex. There is at
/// most one edge per ordered vertex pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    id: EdgeId,
    source: VertexId,
    target: VertexId,
    witnesses: BTreeSet<WitnessId>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, source: VertexId, target: VertexId) -> Self {
        Self {
            id,
            source,
            target,
            witnesses: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> EdgeId { self.id }

    #[must_use]
    pub fn source(&self) -> VertexId { self.source }

    #[must_use]
    pub fn target(&self) -> VertexId { self.target }

    #[must_use]
    pub fn witnesses(&self) -> &BTreeSet<WitnessId> { &self.witnesses }

    #[must_use]
    pub fn is_traversed_by(&self, witness: &WitnessId) -> bool { self.witnesses.contains(witness) }

    /// Returns whether the witness was newly added.
    pub(crate) fn add_witness(&mut self, witness: &WitnessId) -> bool {
        self.witnesses.insert(witness.clone())
    }
}
