//! Incremental collation: witnesses are merged into one variant graph, one at
//! a time and in the caller's order.
//!
//! Adding a witness runs `Init -> AnchorSearch -> GapAlignment -> Merge`. The
//! first witness goes straight from `Init` to `Merge`, and `AnchorSearch` is
//! skipped when anchoring is disabled or the table is below the configured
//! threshold. The final graph can differ with the merge order; every witness
//! still reads back verbatim whatever the order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use log::{debug, trace};

use crate::{
    Token, Witness,
    alignment::{
        Alignment, AlignmentItem, AlignmentOperation, EditGraphAligner,
        transpositions::detect_transpositions,
    },
    block_matching::{Block, Gap, SuffixBlockMatcher, gaps_around},
    config::{CollationConfig, Cost},
    errors::{CollationError, Stage},
    variant_graph::{SuperpositionToken, VariantGraph, VertexId},
};

/// How a witness is aligned against the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One alignment table over the whole sequences.
    Direct,
    /// Shared blocks are matched first and only the gaps between them are
    /// aligned.
    Anchored,
}

type AlignFn<A> = fn(&CollationConfig, &[A], &[Token]) -> Result<Aligned<A>, StageFailure>;

#[derive(Debug)]
struct Aligned<A>
where
    A: AlignmentItem,
{
    operations: Vec<AlignmentOperation<A>>,
    blocks: usize,
}

#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: CollationError,
}

impl Strategy {
    /// Anchors only pay off once both sides are non-trivial.
    #[must_use]
    pub fn choose(config: &CollationConfig, a_len: usize, b_len: usize) -> Self {
        if config.should_anchor(a_len, b_len) {
            Strategy::Anchored
        } else {
            Strategy::Direct
        }
    }

    fn function<A>(self) -> AlignFn<A>
    where
        A: AlignmentItem,
    {
        match self {
            Strategy::Direct => align_directly,
            Strategy::Anchored => align_anchored,
        }
    }

    /// Aligns `a` with `b` using this strategy. Transpositions are detected
    /// over the whole result.
    pub fn align<A>(
        self,
        config: &CollationConfig,
        a: &[A],
        b: &[Token],
    ) -> Result<Alignment<A>, CollationError>
    where
        A: AlignmentItem,
    {
        let aligned = (self.function())(config, a, b).map_err(|failure| failure.error)?;
        Ok(Alignment::new(aligned.operations, config))
    }
}

fn align_directly<A>(config: &CollationConfig, a: &[A], b: &[Token]) -> Result<Aligned<A>, StageFailure>
where
    A: AlignmentItem,
{
    let operations = align_gaps(config, a, b, &[]).map_err(|error| StageFailure {
        stage: Stage::GapAlignment,
        error,
    })?;

    Ok(Aligned {
        operations,
        blocks: 0,
    })
}

fn align_anchored<A>(config: &CollationConfig, a: &[A], b: &[Token]) -> Result<Aligned<A>, StageFailure>
where
    A: AlignmentItem,
{
    let blocks = SuffixBlockMatcher::from_config(config)
        .find_blocks(a, b)
        .map_err(|error| StageFailure {
            stage: Stage::AnchorSearch,
            error,
        })?;

    let operations = align_gaps(config, a, b, &blocks).map_err(|error| StageFailure {
        stage: Stage::GapAlignment,
        error,
    })?;

    Ok(Aligned {
        operations,
        blocks: blocks.len(),
    })
}

/// Aligns every gap around `blocks` on its own, then stitches the results
/// together with the blocks as runs of matches, in witness order.
fn align_gaps<A>(
    config: &CollationConfig,
    a: &[A],
    b: &[Token],
    blocks: &[Block],
) -> Result<Vec<AlignmentOperation<A>>, CollationError>
where
    A: AlignmentItem,
{
    let gaps = gaps_around(blocks, a.len(), b.len());

    #[cfg(feature = "parallel")]
    let aligned_gaps = gaps
        .par_iter()
        .map(|gap| align_gap(config, a, b, gap))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let aligned_gaps = gaps
        .iter()
        .map(|gap| align_gap(config, a, b, gap))
        .collect::<Result<Vec<_>, _>>()?;

    let mut operations = Vec::with_capacity(a.len().max(b.len()));
    for (index, gap_operations) in aligned_gaps.into_iter().enumerate() {
        operations.extend(gap_operations);

        if let Some(block) = blocks.get(index) {
            operations.extend(a[block.a_range()].iter().zip(&b[block.b_range()]).map(
                |(a_item, b_token)| AlignmentOperation::Match {
                    a: a_item.clone(),
                    b: b_token.clone(),
                },
            ));
        }
    }

    Ok(detect_transpositions(operations))
}

fn align_gap<A>(
    config: &CollationConfig,
    a: &[A],
    b: &[Token],
    gap: &Gap,
) -> Result<Vec<AlignmentOperation<A>>, CollationError>
where
    A: AlignmentItem,
{
    let (a, b) = (&a[gap.a.clone()], &b[gap.b.clone()]);

    if a.is_empty() {
        return Ok(b
            .iter()
            .map(|token| AlignmentOperation::Addition { b: token.clone() })
            .collect());
    }

    if b.is_empty() {
        return Ok(a
            .iter()
            .map(|item| AlignmentOperation::Omission { a: item.clone() })
            .collect());
    }

    trace!("Aligning gap {:?} of the base with {:?} of the witness", gap.a, gap.b);
    EditGraphAligner::new(config).align_operations(a, b)
}

/// What happened while adding one witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// `None` for the first witness, which needs no alignment.
    pub strategy: Option<Strategy>,
    /// Number of anchoring blocks found.
    pub blocks: usize,
    /// Total cost of the alignment against the graph.
    pub cost: Cost,
    pub transpositions: usize,
}

/// Owns a variant graph and merges witnesses into it.
///
/// Read access to the graph is available between merges through
/// `CollationDriver::graph`; the graph itself is only mutated from within
/// `add_witness`.
#[derive(Debug, Clone)]
pub struct CollationDriver {
    config: CollationConfig,
    graph: VariantGraph,
}

impl Default for CollationDriver {
    fn default() -> Self {
        Self {
            config: CollationConfig::default(),
            graph: VariantGraph::new(),
        }
    }
}

impl CollationDriver {
    pub fn new(config: CollationConfig) -> Result<Self, CollationError> {
        config.validate()?;

        Ok(Self {
            config,
            graph: VariantGraph::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CollationConfig { &self.config }

    #[must_use]
    pub fn graph(&self) -> &VariantGraph { &self.graph }

    #[must_use]
    pub fn into_graph(self) -> VariantGraph { self.graph }

    /// Aligns `witness` against the graph and merges it in.
    ///
    /// The merge is all-or-nothing: on any error the graph is left exactly
    /// as it was before the call, so the caller may carry on with other
    /// witnesses.
    pub fn add_witness(&mut self, witness: &Witness) -> Result<MergeSummary, CollationError> {
        let id = witness.id();
        if self.graph.contains_witness(id) {
            return Err(CollationError::DuplicateWitness(id.clone()));
        }
        witness.ensure_not_empty()?;

        let base = self.graph.superposition();
        let (strategy, aligned) = if base.is_empty() {
            let operations = witness
                .tokens()
                .iter()
                .map(|token| AlignmentOperation::Addition { b: token.clone() })
                .collect();

            (
                None,
                Aligned {
                    operations,
                    blocks: 0,
                },
            )
        } else {
            let strategy = Strategy::choose(&self.config, base.len(), witness.len());
            debug!(
                "Aligning witness `{id}` ({} tokens) against {} vertices using {strategy:?}",
                witness.len(),
                base.len()
            );

            let aligned = (strategy.function())(&self.config, base.as_slice(), witness.tokens())
                .map_err(|failure| failure.error.in_stage(id, failure.stage))?;

            (Some(strategy), aligned)
        };

        let alignment = Alignment::new(aligned.operations, &self.config);
        let summary = MergeSummary {
            strategy,
            blocks: aligned.blocks,
            cost: alignment.cost(),
            transpositions: alignment
                .operations()
                .iter()
                .filter(|operation| matches!(operation, AlignmentOperation::Transposition { .. }))
                .count(),
        };

        self.commit(witness, alignment.into_operations())?;

        debug!(
            "Merged witness `{id}`: graph now has {} vertices and {} edges",
            self.graph.vertex_count(),
            self.graph.edge_count()
        );

        Ok(summary)
    }

    /// Applies `operations` to a copy of the graph and swaps it in only once
    /// the witness reads back in full. The committed witness is frozen.
    fn commit(
        &mut self,
        witness: &Witness,
        operations: Vec<AlignmentOperation<SuperpositionToken>>,
    ) -> Result<(), CollationError> {
        let mut staged = self.graph.clone();
        merge(&mut staged, witness, operations)
            .map_err(|error| error.in_stage(witness.id(), Stage::Merge))?;
        staged.freeze(witness.id());
        self.graph = staged;

        Ok(())
    }

    /// Adds witnesses in order, stopping at the first failure. Witnesses
    /// merged before the failure stay in the graph.
    pub fn add_witnesses<'w, I>(&mut self, witnesses: I) -> Result<Vec<MergeSummary>, CollationError>
    where
        I: IntoIterator<Item = &'w Witness>,
    {
        witnesses
            .into_iter()
            .map(|witness| self.add_witness(witness))
            .collect()
    }
}

/// Applies the operations of `witness` to `graph` and checks that the
/// witness reads back in full.
fn merge(
    graph: &mut VariantGraph,
    witness: &Witness,
    operations: Vec<AlignmentOperation<SuperpositionToken>>,
) -> Result<(), CollationError> {
    let id = witness.id();
    let mut previous = VertexId::START;

    for operation in operations {
        let vertex = match operation {
            AlignmentOperation::Match { a, b } => graph.add_witness_token(id, b, Some(a.vertex))?,
            AlignmentOperation::Replacement { b, .. } | AlignmentOperation::Addition { b } => {
                graph.add_witness_token(id, b, None)?
            }
            AlignmentOperation::Transposition { b, counterpart, .. } => {
                let vertex = graph.add_witness_token(id, b, None)?;
                graph.add_transposition(vertex, counterpart.vertex);
                vertex
            }
            AlignmentOperation::Omission { .. } => continue,
        };

        graph.connect(previous, vertex, id)?;
        previous = vertex;
    }
    graph.connect(previous, VertexId::END, id)?;

    let path = graph.path_for(id)?;
    if path.len() != witness.len() {
        return Err(CollationError::broken_path(
            id,
            VertexId::END,
            "path does not visit every token of the witness",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::witness::WitnessId;

    fn read_back(graph: &VariantGraph, id: &str) -> Vec<String> {
        graph
            .witness_tokens(&WitnessId::from(id))
            .unwrap()
            .into_iter()
            .map(|token| token.normalized().to_owned())
            .collect()
    }

    #[test]
    fn test_first_witness_is_chained() {
        let mut driver = CollationDriver::default();
        let summary = driver
            .add_witness(&Witness::from_text("A", "a b c"))
            .unwrap();

        assert_eq!(summary.strategy, None);
        assert_eq!(driver.graph().vertex_count(), 5);
        assert_eq!(driver.graph().edge_count(), 4);
        assert_eq!(read_back(driver.graph(), "A"), vec!["a", "b", "c"]);
    }

    #[test_case(CollationConfig::default(); "anchored")]
    #[test_case(CollationConfig::without_anchoring(); "direct")]
    fn test_omitted_token_keeps_its_own_vertex(config: CollationConfig) {
        let mut driver = CollationDriver::new(config).unwrap();
        driver.add_witness(&Witness::from_text("A", "a b c")).unwrap();
        let summary = driver.add_witness(&Witness::from_text("B", "b c")).unwrap();

        let graph = driver.graph();
        assert_eq!(summary.cost, 1);
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(read_back(graph, "B"), vec!["b", "c"]);

        let shared = graph
            .vertices()
            .filter(|vertex| vertex.tokens().len() == 2)
            .map(|vertex| vertex.label().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(shared, vec!["b", "c"]);
    }

    #[test]
    fn test_identical_witnesses_share_every_vertex() {
        let mut driver = CollationDriver::default();
        driver.add_witness(&Witness::from_text("A", "x y z")).unwrap();
        let summary = driver.add_witness(&Witness::from_text("B", "x y z")).unwrap();

        assert_eq!(summary.cost, 0);
        assert_eq!(summary.blocks, 1);
        assert_eq!(
            driver
                .graph()
                .vertices()
                .filter(|vertex| !vertex.is_sentinel())
                .map(|vertex| vertex.tokens().len())
                .collect::<Vec<_>>(),
            vec![2, 2, 2]
        );
    }

    #[test]
    fn test_strategy_follows_config() {
        let mut driver = CollationDriver::default();
        driver.add_witness(&Witness::from_text("A", "a b c d")).unwrap();
        let anchored = driver.add_witness(&Witness::from_text("B", "x b c y")).unwrap();

        assert_eq!(anchored.strategy, Some(Strategy::Anchored));
        assert_eq!(anchored.blocks, 1);

        let mut driver = CollationDriver::new(CollationConfig {
            anchoring_threshold: 1000,
            ..CollationConfig::default()
        })
        .unwrap();
        driver.add_witness(&Witness::from_text("A", "a b c d")).unwrap();
        let direct = driver.add_witness(&Witness::from_text("B", "x b c y")).unwrap();

        assert_eq!(direct.strategy, Some(Strategy::Direct));
        assert_eq!(direct.cost, anchored.cost);
    }

    #[test]
    fn test_strategies_agree_on_gap_alignment() {
        let config = CollationConfig::default();
        let a = Witness::from_text("A", "a b c d").tokens().to_vec();
        let b = Witness::from_text("B", "x b c y").tokens().to_vec();

        let direct = Strategy::Direct.align(&config, &a, &b).unwrap();
        let anchored = Strategy::Anchored.align(&config, &a, &b).unwrap();

        assert_eq!(direct, anchored);
        assert!(matches!(
            anchored.operations()[0],
            AlignmentOperation::Replacement { .. }
        ));
    }

    #[test]
    fn test_duplicate_witness_leaves_graph_unchanged() {
        let mut driver = CollationDriver::default();
        driver.add_witness(&Witness::from_text("A", "a b")).unwrap();
        let before = (driver.graph().vertex_count(), driver.graph().edge_count());

        let result = driver.add_witness(&Witness::from_text("A", "c d"));

        assert_eq!(
            result,
            Err(CollationError::DuplicateWitness(WitnessId::from("A")))
        );
        assert_eq!(
            (driver.graph().vertex_count(), driver.graph().edge_count()),
            before
        );
    }

    #[test]
    fn test_empty_witness_is_rejected() {
        let mut driver = CollationDriver::default();
        driver.add_witness(&Witness::from_text("A", "a")).unwrap();

        assert!(matches!(
            driver.add_witness(&Witness::from_text("B", "")),
            Err(CollationError::EmptyInput(_))
        ));
        assert_eq!(driver.graph().witnesses().len(), 1);
    }

    #[test]
    fn test_transposition_gets_linked_vertices() {
        let mut driver = CollationDriver::new(CollationConfig {
            replace_cost: 3,
            ..CollationConfig::default()
        })
        .unwrap();
        driver.add_witness(&Witness::from_text("A", "p x y q")).unwrap();
        let summary = driver.add_witness(&Witness::from_text("B", "q x y p")).unwrap();

        let graph = driver.graph();
        assert_eq!(summary.transpositions, 2);
        assert_eq!(graph.transpositions().len(), 2);
        for (first, second) in graph.transpositions() {
            assert_eq!(graph.vertex(*first).label(), graph.vertex(*second).label());
        }
        assert_eq!(read_back(graph, "B"), vec!["q", "x", "y", "p"]);
    }

    #[test]
    fn test_failed_merge_leaves_graph_unchanged() {
        let mut driver = CollationDriver::default();
        driver.add_witness(&Witness::from_text("A", "a b")).unwrap();
        let before = driver.graph().clone();

        let witness = Witness::from_text("B", "a c");
        let base = driver.graph().superposition();
        let operations = vec![
            AlignmentOperation::Addition {
                b: witness.tokens()[0].clone(),
            },
            AlignmentOperation::Match {
                a: SuperpositionToken {
                    vertex: VertexId::START,
                    token: base[0].token.clone(),
                },
                b: witness.tokens()[1].clone(),
            },
        ];

        let result = driver.commit(&witness, operations);

        assert!(matches!(
            result,
            Err(CollationError::Failed {
                stage: Stage::Merge,
                ref source,
                ..
            }) if matches!(**source, CollationError::Conflict { vertex, .. } if vertex == VertexId::START)
        ));
        assert_eq!(driver.graph().vertex_count(), before.vertex_count());
        assert_eq!(driver.graph().edge_count(), before.edge_count());
        assert_eq!(driver.graph().witnesses(), before.witnesses());
        assert!(!driver.graph().contains_witness(witness.id()));
    }

    #[test]
    fn test_merged_witness_is_frozen() {
        let mut graph = crate::collate(
            &[Witness::from_text("A", "a b c"), Witness::from_text("B", "b c")],
            CollationConfig::default(),
        )
        .unwrap();
        let a = WitnessId::from("A");
        let vertices = graph.vertex_count();

        assert!(graph.is_frozen(&a));
        assert_eq!(
            graph.add_witness_token(&a, "zzz".into(), None),
            Err(CollationError::Frozen(a.clone()))
        );
        assert_eq!(
            graph.connect(VertexId::START, VertexId::END, &a),
            Err(CollationError::Frozen(a.clone()))
        );
        assert_eq!(graph.vertex_count(), vertices);
        assert_eq!(read_back(&graph, "A"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(
            CollationDriver::new(CollationConfig {
                min_block_length: 0,
                ..CollationConfig::default()
            })
            .is_err()
        );
    }
}
