use std::fmt::Display;

use thiserror::Error;

use crate::{variant_graph::VertexId, witness::WitnessId};

/// The step of `CollationDriver::add_witness` that was running when a
/// collation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AnchorSearch,
    GapAlignment,
    Merge,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::AnchorSearch => write!(f, "anchor search"),
            Stage::GapAlignment => write!(f, "gap alignment"),
            Stage::Merge => write!(f, "merge"),
        }
    }
}

/// Error type for every fallible collation operation.
///
/// None of these are transient: retrying the same call with the same input
/// fails the same way. A failed `add_witness` leaves the graph untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollationError {
    /// A witness or a sequence passed to an aligner has no tokens
    #[error("Empty input: {0} contains no tokens")]
    EmptyInput(String),

    /// The witness id has already been merged into the graph
    #[error("Duplicate witness: `{0}` is already part of the variant graph")]
    DuplicateWitness(WitnessId),

    /// A second token of the same witness was attached to one vertex
    #[error("Conflict: vertex {vertex} already holds a token of witness `{witness}`")]
    Conflict {
        /// The vertex that already carries a token of the witness
        vertex: VertexId,
        /// The witness whose token was attached twice
        witness: WitnessId,
    },

    /// Following the witness's edges from start to end does not give exactly
    /// one path
    #[error("Broken path for witness `{witness}` at vertex {vertex}: {reason}")]
    BrokenPath {
        witness: WitnessId,
        vertex: VertexId,
        reason: String,
    },

    /// The witness is already committed to the graph and its path can no
    /// longer change
    #[error("Frozen witness: `{0}` is already merged into the variant graph")]
    Frozen(WitnessId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Wraps the failure of one stage of adding a witness to a collation
    #[error("Failed to add witness `{witness}` during {stage}: {source}")]
    Failed {
        witness: WitnessId,
        stage: Stage,
        #[source]
        source: Box<CollationError>,
    },
}

impl CollationError {
    pub(crate) fn broken_path(witness: &WitnessId, vertex: VertexId, reason: &str) -> Self {
        CollationError::BrokenPath {
            witness: witness.clone(),
            vertex,
            reason: reason.to_owned(),
        }
    }

    pub(crate) fn in_stage(self, witness: &WitnessId, stage: Stage) -> Self {
        CollationError::Failed {
            witness: witness.clone(),
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping any stage information.
    #[must_use]
    pub fn root_cause(&self) -> &CollationError {
        match self {
            CollationError::Failed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
