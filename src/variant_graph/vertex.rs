use std::{collections::BTreeMap, fmt::Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Token, witness::WitnessId};

/// Index of a vertex in the arena of its `VariantGraph`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    pub const START: VertexId = VertexId(0);
    pub const END: VertexId = VertexId(1);

    #[must_use]
    pub fn index(self) -> usize { self.0 }

    #[must_use]
    pub fn is_sentinel(self) -> bool { self == Self::START || self == Self::END }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

/// A node of the variant graph holding the tokens that agreeing witnesses
/// contribute at this point. Each witness contributes at most one token.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    id: VertexId,
    tokens: BTreeMap<WitnessId, Token>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId) -> Self {
        Self {
            id,
            tokens: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> VertexId { self.id }

    #[must_use]
    pub fn is_sentinel(&self) -> bool { self.id.is_sentinel() }

    /// Tokens of this vertex keyed by the witness contributing them.
    #[must_use]
    pub fn tokens(&self) -> &BTreeMap<WitnessId, Token> { &self.tokens }

    #[must_use]
    pub fn token_of(&self, witness: &WitnessId) -> Option<&Token> { self.tokens.get(witness) }

    pub fn witnesses(&self) -> impl Iterator<Item = &WitnessId> { self.tokens.keys() }

    /// The token used when the vertex stands in for all of its tokens, e.g.
    /// while aligning a new witness against the graph.
    #[must_use]
    pub fn representative(&self) -> Option<&Token> { self.tokens.values().next() }

    /// Normalised content of the vertex, `#` for the start and end vertices.
    #[must_use]
    pub fn label(&self) -> &str { self.representative().map_or("#", Token::normalized) }

    /// Returns false without modifying the vertex if the witness already
    /// has a token here.
    pub(crate) fn attach(&mut self, witness: &WitnessId, token: Token) -> bool {
        if self.tokens.contains_key(witness) {
            return false;
        }

        self.tokens.insert(witness.clone(), token);
        true
    }
}
