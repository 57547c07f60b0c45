use std::fmt::Debug;

use crate::{
    Token,
    config::{CollationConfig, Cost},
    variant_graph::SuperpositionToken,
};

/// Anything that can stand on the base side of an alignment: a plain token
/// of another witness, or a vertex of the variant graph represented by one of
/// its tokens.
pub trait AlignmentItem: Clone + Debug + Send + Sync {
    fn token(&self) -> &Token;
}

impl AlignmentItem for Token {
    fn token(&self) -> &Token { self }
}

impl AlignmentItem for SuperpositionToken {
    fn token(&self) -> &Token { &self.token }
}

/// One step of an alignment between a base sequence (`a`) and an incoming
/// witness (`b`). Every operation consumes at most one item of each side.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentOperation<A>
where
    A: AlignmentItem,
{
    /// `a` and `b` are equal.
    Match { a: A, b: Token },

    /// `a` and `b` differ but stand at the same place.
    Replacement { a: A, b: Token },

    /// `b` has no counterpart in the base.
    Addition { b: Token },

    /// `a` has no counterpart in the witness.
    Omission { a: A },

    /// `a` and `b` stand at the same place, and `b` equals `counterpart`
    /// which appears elsewhere in the base with the tokens swapped.
    Transposition { a: A, b: Token, counterpart: A },
}

impl<A> AlignmentOperation<A>
where
    A: AlignmentItem,
{
    /// The base item consumed by this operation.
    pub fn a(&self) -> Option<&A> {
        match self {
            AlignmentOperation::Match { a, .. }
            | AlignmentOperation::Replacement { a, .. }
            | AlignmentOperation::Omission { a }
            | AlignmentOperation::Transposition { a, .. } => Some(a),
            AlignmentOperation::Addition { .. } => None,
        }
    }

    /// The witness token consumed by this operation.
    pub fn b(&self) -> Option<&Token> {
        match self {
            AlignmentOperation::Match { b, .. }
            | AlignmentOperation::Replacement { b, .. }
            | AlignmentOperation::Addition { b }
            | AlignmentOperation::Transposition { b, .. } => Some(b),
            AlignmentOperation::Omission { .. } => None,
        }
    }

    pub fn cost(&self, config: &CollationConfig) -> Cost {
        match self {
            AlignmentOperation::Match { .. } => config.match_cost,
            AlignmentOperation::Replacement { .. } => config.replace_cost,
            AlignmentOperation::Addition { .. } => config.addition_cost,
            AlignmentOperation::Omission { .. } => config.omission_cost,
            AlignmentOperation::Transposition { .. } => config.transposition_cost,
        }
    }
}

/// The ordered operations aligning two sequences and their total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<A>
where
    A: AlignmentItem,
{
    operations: Vec<AlignmentOperation<A>>,
    cost: Cost,
}

impl<A> Alignment<A>
where
    A: AlignmentItem,
{
    pub fn new(operations: Vec<AlignmentOperation<A>>, config: &CollationConfig) -> Self {
        let cost = operations
            .iter()
            .map(|operation| operation.cost(config))
            .fold(0, Cost::saturating_add);

        Self { operations, cost }
    }

    pub fn operations(&self) -> &[AlignmentOperation<A>] { &self.operations }

    pub fn into_operations(self) -> Vec<AlignmentOperation<A>> { self.operations }

    pub fn cost(&self) -> Cost { self.cost }

    /// Base items in the order the operations consume them.
    pub fn a_side(&self) -> impl Iterator<Item = &A> {
        self.operations.iter().filter_map(AlignmentOperation::a)
    }

    /// Witness tokens in the order the operations consume them.
    pub fn b_side(&self) -> impl Iterator<Item = &Token> {
        self.operations.iter().filter_map(AlignmentOperation::b)
    }
}
