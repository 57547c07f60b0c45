//! Directed acyclic graph merging the token sequences of all collated
//! witnesses.
//!
//! Vertices and edges live in arenas and refer to each other by index. Every
//! witness traces exactly one path from `VertexId::START` to `VertexId::END`
//! and reading the tokens along it reproduces the witness. The graph only ever
//! grows: vertices and edges are added or gain witnesses, but are never
//! removed. Once a witness is committed its path is frozen: the graph rejects
//! any further token or edge for it.

mod edge;
mod ranking;
mod vertex;

use std::{
    collections::{BTreeSet, HashMap},
    fmt::Display,
};

pub use edge::{Edge, EdgeId};
pub use ranking::VariantGraphRanking;
pub use vertex::{Vertex, VertexId};

use crate::{Token, errors::CollationError, witness::WitnessId};

/// One element of the flattened graph used as the base sequence when aligning
/// a new witness: a vertex and the token standing in for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperpositionToken {
    pub vertex: VertexId,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct VariantGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
    outgoing: Vec<Vec<EdgeId>>,
    successors: HashMap<(VertexId, WitnessId), Vec<VertexId>>,
    witnesses: Vec<WitnessId>,
    frozen: BTreeSet<WitnessId>,
    transpositions: Vec<(VertexId, VertexId)>,
}

impl Default for VariantGraph {
    fn default() -> Self { Self::new() }
}

impl VariantGraph {
    /// Creates a graph containing only the start and end vertices.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: vec![Vertex::new(VertexId::START), Vertex::new(VertexId::END)],
            edges: Vec::new(),
            edge_index: HashMap::new(),
            outgoing: vec![Vec::new(), Vec::new()],
            successors: HashMap::new(),
            witnesses: Vec::new(),
            frozen: BTreeSet::new(),
            transpositions: Vec::new(),
        }
    }

    /// Attaches `token` of `witness` to `existing` when given, otherwise
    /// creates a new vertex for it.
    ///
    /// Fails with `CollationError::Conflict` if `existing` already holds a
    /// token of the witness or is one of the start and end vertices, and with
    /// `CollationError::Frozen` if the witness is already committed.
    pub(crate) fn add_witness_token(
        &mut self,
        witness: &WitnessId,
        token: Token,
        existing: Option<VertexId>,
    ) -> Result<VertexId, CollationError> {
        self.ensure_not_frozen(witness)?;

        let conflict = |vertex| CollationError::Conflict {
            vertex,
            witness: witness.clone(),
        };

        if let Some(vertex) = existing {
            if vertex.is_sentinel() || vertex.index() >= self.vertices.len() {
                return Err(conflict(vertex));
            }

            if !self.vertices[vertex.index()].attach(witness, token) {
                return Err(conflict(vertex));
            }

            return Ok(vertex);
        }

        let vertex = VertexId(self.vertices.len());
        let mut created = Vertex::new(vertex);
        created.attach(witness, token);
        self.vertices.push(created);
        self.outgoing.push(Vec::new());

        Ok(vertex)
    }

    /// Records that `witness` reads `target` directly after `source`. The
    /// edge between the pair is created on first use and shared by every
    /// witness making the same transition afterwards.
    pub(crate) fn connect(
        &mut self,
        source: VertexId,
        target: VertexId,
        witness: &WitnessId,
    ) -> Result<(), CollationError> {
        self.ensure_not_frozen(witness)?;
        debug_assert!(source != target, "Self loops are not allowed");
        debug_assert!(source != VertexId::END && target != VertexId::START);

        let edge = match self.edge_index.get(&(source, target)) {
            Some(edge) => *edge,
            None => {
                let edge = EdgeId(self.edges.len());
                self.edges.push(Edge::new(edge, source, target));
                self.edge_index.insert((source, target), edge);
                self.outgoing[source.index()].push(edge);
                edge
            }
        };

        if self.edges[edge.0].add_witness(witness) {
            self.successors
                .entry((source, witness.clone()))
                .or_default()
                .push(target);
        }

        if !self.witnesses.contains(witness) {
            self.witnesses.push(witness.clone());
        }

        Ok(())
    }

    /// Links two vertices whose tokens were detected as transposed readings
    /// of each other.
    pub(crate) fn add_transposition(&mut self, first: VertexId, second: VertexId) {
        self.transpositions.push((first.min(second), first.max(second)));
    }

    /// Marks the path of `witness` as complete.
    pub(crate) fn freeze(&mut self, witness: &WitnessId) { self.frozen.insert(witness.clone()); }

    /// Whether `witness` was committed and can no longer change.
    #[must_use]
    pub fn is_frozen(&self, witness: &WitnessId) -> bool { self.frozen.contains(witness) }

    fn ensure_not_frozen(&self, witness: &WitnessId) -> Result<(), CollationError> {
        if self.is_frozen(witness) {
            return Err(CollationError::Frozen(witness.clone()));
        }

        Ok(())
    }

    /// Follows the edges of `witness` from the start to the end vertex and
    /// returns the visited vertices, excluding the two sentinels.
    ///
    /// Fails with `CollationError::BrokenPath` if a step has no successor or
    /// more than one, if a visited vertex carries no token of the witness,
    /// or if the walk does not terminate.
    pub fn path_for(&self, witness: &WitnessId) -> Result<Vec<VertexId>, CollationError> {
        let mut path = Vec::new();
        let mut current = VertexId::START;

        loop {
            let next = match self
                .successors
                .get(&(current, witness.clone()))
                .map(Vec::as_slice)
            {
                Some([next]) => *next,
                None | Some([]) => {
                    return Err(CollationError::broken_path(
                        witness,
                        current,
                        "no outgoing edge",
                    ));
                }
                Some(_) => {
                    return Err(CollationError::broken_path(
                        witness,
                        current,
                        "more than one outgoing edge",
                    ));
                }
            };

            if next == VertexId::END {
                return Ok(path);
            }

            if path.len() >= self.vertices.len() {
                return Err(CollationError::broken_path(witness, next, "path loops"));
            }

            if self.vertex(next).token_of(witness).is_none() {
                return Err(CollationError::broken_path(
                    witness,
                    next,
                    "vertex holds no token of the witness",
                ));
            }

            path.push(next);
            current = next;
        }
    }

    /// Reconstructs the tokens of `witness` by walking its path.
    pub fn witness_tokens(&self, witness: &WitnessId) -> Result<Vec<&Token>, CollationError> {
        Ok(self
            .path_for(witness)?
            .into_iter()
            .filter_map(|vertex| self.vertex(vertex).token_of(witness))
            .collect())
    }

    #[must_use]
    pub fn ranking(&self) -> VariantGraphRanking { VariantGraphRanking::of(self) }

    /// All vertices, start first and end last, in an order compatible with
    /// every edge.
    #[must_use]
    pub fn topological_order(&self) -> Vec<VertexId> { self.ranking().sorted_vertices() }

    /// The graph flattened into one sequence in topological order, each
    /// vertex represented by one of its tokens.
    #[must_use]
    pub fn superposition(&self) -> Vec<SuperpositionToken> {
        self.topological_order()
            .into_iter()
            .filter_map(|vertex| {
                self.vertex(vertex)
                    .representative()
                    .map(|token| SuperpositionToken {
                        vertex,
                        token: token.clone(),
                    })
            })
            .collect()
    }

    /// # Panics
    ///
    /// Panics if the id does not belong to this graph.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> &Vertex { &self.vertices[id.index()] }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge { &self.edges[id.0] }

    #[must_use]
    pub fn edge_between(&self, source: VertexId, target: VertexId) -> Option<&Edge> {
        self.edge_index
            .get(&(source, target))
            .map(|edge| self.edge(*edge))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> { self.vertices.iter() }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> { self.edges.iter() }

    pub fn outgoing(&self, vertex: VertexId) -> impl Iterator<Item = &Edge> {
        self.outgoing[vertex.index()]
            .iter()
            .map(|edge| self.edge(*edge))
    }

    /// Witnesses in the order they were first connected.
    #[must_use]
    pub fn witnesses(&self) -> &[WitnessId] { &self.witnesses }

    #[must_use]
    pub fn contains_witness(&self, witness: &WitnessId) -> bool { self.witnesses.contains(witness) }

    #[must_use]
    pub fn transpositions(&self) -> &[(VertexId, VertexId)] { &self.transpositions }

    /// Number of vertices including start and end.
    #[must_use]
    pub fn vertex_count(&self) -> usize { self.vertices.len() }

    #[must_use]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Whether no witness has been merged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.witnesses.is_empty() }
}

/// Lists every edge as `source -> target: witnesses`, in topological order.
impl Display for VariantGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = self.topological_order();
        let mut position = vec![0; self.vertex_count()];
        for (index, vertex) in order.iter().enumerate() {
            position[vertex.index()] = index;
        }

        let mut edges = self.edges.iter().collect::<Vec<_>>();
        edges.sort_by_key(|edge| (position[edge.source().index()], position[edge.target().index()]));

        for (index, edge) in edges.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }

            write!(
                f,
                "{} -> {}: {}",
                self.vertex(edge.source()).label(),
                self.vertex(edge.target()).label(),
                edge.witnesses()
                    .iter()
                    .map(WitnessId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    fn chain(graph: &mut VariantGraph, witness: &WitnessId, vertices: &[VertexId]) {
        let mut previous = VertexId::START;
        for vertex in vertices {
            graph.connect(previous, *vertex, witness).unwrap();
            previous = *vertex;
        }
        graph.connect(previous, VertexId::END, witness).unwrap();
    }

    #[test]
    fn test_empty_graph() {
        let graph = VariantGraph::new();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert_eq!(graph.vertex(VertexId::START).label(), "#");
        assert!(graph.superposition().is_empty());
    }

    #[test]
    fn test_single_witness_path() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");

        let vertices = ["only", "one", "witness"]
            .into_iter()
            .map(|word| graph.add_witness_token(&a, word.into(), None).unwrap())
            .collect::<Vec<_>>();
        chain(&mut graph, &a, &vertices);

        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.path_for(&a).unwrap(), vertices);
        assert_snapshot!(graph, @r"
        # -> only: A
        only -> one: A
        one -> witness: A
        witness -> #: A
        ");
    }

    #[test]
    fn test_agreeing_witnesses_share_edges() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");
        let b = WitnessId::from("B");

        let vertices = ["the", "black", "cat"]
            .into_iter()
            .map(|word| {
                let vertex = graph.add_witness_token(&a, word.into(), None).unwrap();
                graph
                    .add_witness_token(&b, word.into(), Some(vertex))
                    .unwrap()
            })
            .collect::<Vec<_>>();
        chain(&mut graph, &a, &vertices);
        chain(&mut graph, &b, &vertices);

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.witnesses(), &[a.clone(), b.clone()]);
        assert!(graph.edges().all(|edge| edge.is_traversed_by(&a) && edge.is_traversed_by(&b)));
        assert!(
            !graph
                .outgoing(VertexId::START)
                .any(|edge| edge.is_traversed_by(&WitnessId::from("C")))
        );
        assert_snapshot!(graph, @r"
        # -> the: A, B
        the -> black: A, B
        black -> cat: A, B
        cat -> #: A, B
        ");
    }

    #[test]
    fn test_second_token_of_same_witness_conflicts() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");

        let vertex = graph.add_witness_token(&a, "x".into(), None).unwrap();
        let result = graph.add_witness_token(&a, "x".into(), Some(vertex));

        assert_eq!(
            result,
            Err(CollationError::Conflict {
                vertex,
                witness: a.clone()
            })
        );
        assert!(matches!(
            graph.add_witness_token(&a, "y".into(), Some(VertexId::END)),
            Err(CollationError::Conflict { .. })
        ));
    }

    #[test]
    fn test_ambiguous_path_is_broken() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");

        let x = graph.add_witness_token(&a, "x".into(), None).unwrap();
        let y = graph.add_witness_token(&a, "y".into(), None).unwrap();
        graph.connect(VertexId::START, x, &a).unwrap();
        graph.connect(VertexId::START, y, &a).unwrap();
        graph.connect(x, VertexId::END, &a).unwrap();

        assert!(matches!(
            graph.path_for(&a),
            Err(CollationError::BrokenPath { vertex, .. }) if vertex == VertexId::START
        ));
    }

    #[test]
    fn test_unknown_witness_has_no_path() {
        let graph = VariantGraph::new();
        assert!(matches!(
            graph.path_for(&WitnessId::from("Z")),
            Err(CollationError::BrokenPath { .. })
        ));
    }

    #[test]
    fn test_path_through_foreign_vertex_is_broken() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");
        let b = WitnessId::from("B");

        let x = graph.add_witness_token(&a, "x".into(), None).unwrap();
        chain(&mut graph, &b, &[x]);

        assert!(matches!(
            graph.path_for(&b),
            Err(CollationError::BrokenPath { vertex, .. }) if vertex == x
        ));
    }

    #[test]
    fn test_witness_tokens_round_trip() {
        let mut graph = VariantGraph::new();
        let a = WitnessId::from("A");

        let vertices = ["a", "b", "c"]
            .into_iter()
            .map(|word| graph.add_witness_token(&a, word.into(), None).unwrap())
            .collect::<Vec<_>>();
        chain(&mut graph, &a, &vertices);

        let tokens = graph.witness_tokens(&a).unwrap();
        assert_eq!(
            tokens.iter().map(|token| token.normalized()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            graph
                .superposition()
                .iter()
                .map(|item| item.vertex)
                .collect::<Vec<_>>(),
            vertices
        );
    }
}
