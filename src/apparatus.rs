//! Tabular view of a variant graph: one column per rank, one row per witness.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use crate::{
    Token,
    variant_graph::{VariantGraph, VertexId},
    witness::WitnessId,
};

/// How the witnesses agree within one column of the apparatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Every witness reads the same token.
    Invariant,
    /// The witnesses having a token here agree, but some have none.
    SemiInvariant,
    /// At least two different readings.
    Variant,
}

/// The vertices sharing one rank and the reading each witness has there.
#[derive(Debug, Clone, PartialEq)]
pub struct ApparatusEntry {
    rank: usize,
    vertices: Vec<VertexId>,
    readings: BTreeMap<WitnessId, Token>,
    witness_count: usize,
}

impl ApparatusEntry {
    #[must_use]
    pub fn rank(&self) -> usize { self.rank }

    #[must_use]
    pub fn vertices(&self) -> &[VertexId] { &self.vertices }

    /// The token of `witness` in this column, `None` if it has no token here.
    #[must_use]
    pub fn reading_of(&self, witness: &WitnessId) -> Option<&Token> { self.readings.get(witness) }

    #[must_use]
    pub fn covers(&self, witness: &WitnessId) -> bool { self.readings.contains_key(witness) }

    /// Distinct normalised readings of the column.
    #[must_use]
    pub fn readings(&self) -> BTreeSet<&str> { self.readings.values().map(Token::normalized).collect() }

    #[must_use]
    pub fn state(&self) -> EntryState {
        if self.readings().len() > 1 {
            EntryState::Variant
        } else if self.readings.len() == self.witness_count {
            EntryState::Invariant
        } else {
            EntryState::SemiInvariant
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apparatus {
    witnesses: Vec<WitnessId>,
    entries: Vec<ApparatusEntry>,
}

impl Apparatus {
    /// Groups the vertices of `graph` by rank. The start and end vertices are
    /// left out, so an empty graph gives an empty apparatus.
    #[must_use]
    pub fn from_graph(graph: &VariantGraph) -> Self {
        let witnesses = graph.witnesses().to_vec();
        let entries = graph
            .ranking()
            .by_rank()
            .into_iter()
            .enumerate()
            .filter_map(|(rank, vertices)| {
                let vertices = vertices
                    .into_iter()
                    .filter(|vertex| !vertex.is_sentinel())
                    .collect::<Vec<_>>();
                if vertices.is_empty() {
                    return None;
                }

                let readings = vertices
                    .iter()
                    .flat_map(|vertex| graph.vertex(*vertex).tokens())
                    .map(|(witness, token)| (witness.clone(), token.clone()))
                    .collect();

                Some(ApparatusEntry {
                    rank,
                    vertices,
                    readings,
                    witness_count: witnesses.len(),
                })
            })
            .collect();

        Self { witnesses, entries }
    }

    #[must_use]
    pub fn witnesses(&self) -> &[WitnessId] { &self.witnesses }

    #[must_use]
    pub fn entries(&self) -> &[ApparatusEntry] { &self.entries }

    /// Readings of `witness` column by column, `None` where it has no token.
    pub fn row<'a>(&'a self, witness: &'a WitnessId) -> impl Iterator<Item = Option<&'a Token>> {
        self.entries.iter().map(move |entry| entry.reading_of(witness))
    }
}

/// One line per witness: its id followed by its reading in every column, `-`
/// marking a gap.
impl Display for Apparatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, witness) in self.witnesses.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }

            write!(f, "{witness}")?;
            for reading in self.row(witness) {
                write!(f, " | {}", reading.map_or("-", Token::normalized))?;
            }
        }

        Ok(())
    }
}
