use std::{cmp::Reverse, collections::BinaryHeap};

use super::{VariantGraph, vertex::VertexId};

/// Rank of every vertex: the length of the longest path from the start
/// vertex. Vertices of equal rank are alternative readings of the same
/// position, and sorting by rank gives a topological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGraphRanking {
    ranks: Vec<usize>,
}

impl VariantGraphRanking {
    #[must_use]
    pub fn of(graph: &VariantGraph) -> Self {
        let mut ranks = vec![0; graph.vertex_count()];

        for vertex in kahn_order(graph) {
            for edge in graph.outgoing(vertex) {
                let target = edge.target().index();
                ranks[target] = ranks[target].max(ranks[vertex.index()] + 1);
            }
        }

        Self { ranks }
    }

    #[must_use]
    pub fn rank_of(&self, vertex: VertexId) -> usize { self.ranks[vertex.index()] }

    /// Vertex ids sorted by rank, ties broken by id.
    #[must_use]
    pub fn sorted_vertices(&self) -> Vec<VertexId> {
        let mut vertices = (0..self.ranks.len()).map(VertexId).collect::<Vec<_>>();
        vertices.sort_by_key(|vertex| (self.rank_of(*vertex), *vertex));
        vertices
    }

    /// Vertices grouped by rank, each group sorted by id.
    #[must_use]
    pub fn by_rank(&self) -> Vec<Vec<VertexId>> {
        let max_rank = self.ranks.iter().copied().max().unwrap_or(0);
        let mut groups = vec![Vec::new(); max_rank + 1];
        for (index, rank) in self.ranks.iter().enumerate() {
            groups[*rank].push(VertexId(index));
        }

        groups
    }
}

/// Kahn's algorithm, always emitting the lowest available vertex id first.
fn kahn_order(graph: &VariantGraph) -> Vec<VertexId> {
    let mut in_degree = vec![0usize; graph.vertex_count()];
    for edge in graph.edges() {
        in_degree[edge.target().index()] += 1;
    }

    let mut ready = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(VertexId(index)))
        .collect::<BinaryHeap<_>>();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(Reverse(vertex)) = ready.pop() {
        order.push(vertex);
        for edge in graph.outgoing(vertex) {
            let target = edge.target().index();
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.push(Reverse(edge.target()));
            }
        }
    }

    debug_assert_eq!(
        order.len(),
        graph.vertex_count(),
        "The variant graph must be acyclic"
    );

    order
}
