//! Finds maximal runs of tokens shared by the base sequence and an incoming
//! witness, to be used as anchors so that only the stretches between them
//! need a full alignment.

mod block;
mod suffix_array;

use std::collections::BTreeMap;

pub use block::{Block, Gap, gaps_around};
use log::debug;
pub use suffix_array::{Origin, TokenIndex};

use crate::{
    Token, alignment::AlignmentItem, config::CollationConfig, errors::CollationError,
};

const BASE: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixBlockMatcher {
    min_block_length: usize,
}

impl SuffixBlockMatcher {
    /// Blocks shorter than `min_block_length` are ignored. A minimum of 0 is
    /// treated as 1.
    #[must_use]
    pub fn new(min_block_length: usize) -> Self {
        Self {
            min_block_length: min_block_length.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &CollationConfig) -> Self { Self::new(config.min_block_length) }

    /// Returns the blocks shared by `a` and `b`, ordered by their position
    /// in both sequences and overlapping in neither.
    ///
    /// Every block is maximal: extending it by one token in either direction
    /// would break the match. When candidates claim overlapping regions or
    /// would cross each other, the longest one wins, ties going to the one
    /// starting leftmost in `b`; losing candidates are dropped, not split.
    pub fn find_blocks<A>(&self, a: &[A], b: &[Token]) -> Result<Vec<Block>, CollationError>
    where
        A: AlignmentItem,
    {
        if a.is_empty() {
            return Err(CollationError::EmptyInput("base sequence".to_owned()));
        }
        if b.is_empty() {
            return Err(CollationError::EmptyInput("witness sequence".to_owned()));
        }

        let sequences = [
            a.iter().map(AlignmentItem::token).collect::<Vec<_>>(),
            b.iter().collect::<Vec<_>>(),
        ];
        let index = TokenIndex::build(&sequences);

        let candidates = self.candidates(&index, &sequences[0], &sequences[1]);
        let blocks = select_blocks(candidates);

        debug!(
            "Found {} blocks covering {} of {} witness tokens",
            blocks.len(),
            blocks.iter().map(|block| block.length).sum::<usize>(),
            b.len()
        );

        Ok(blocks)
    }

    /// For every witness suffix, the longest common prefix with a base suffix
    /// is found at the nearest base suffix above or below it in the suffix
    /// array. Both neighbours are kept so that equally long repeats compete.
    fn candidates(&self, index: &TokenIndex, a: &[&Token], b: &[&Token]) -> Vec<Block> {
        let suffix_array = index.suffix_array();
        let lcp = index.lcp();
        let mut candidates = Vec::new();

        let mut push = |a_start: usize, b_start: usize, length: usize| {
            let left_maximal = a_start == 0 || b_start == 0 || a[a_start - 1] != b[b_start - 1];
            if length >= self.min_block_length && left_maximal {
                candidates.push(Block {
                    a_start,
                    b_start,
                    length,
                });
            }
        };

        let mut nearest_base: Option<(usize, usize)> = None;
        for (rank, position) in suffix_array.iter().enumerate() {
            if let Some((_, common)) = &mut nearest_base {
                *common = (*common).min(lcp[rank]);
            }

            match index.origin(*position) {
                Some(origin) if origin.sequence == BASE => {
                    nearest_base = Some((origin.offset, usize::MAX));
                }
                Some(origin) => {
                    if let Some((a_start, common)) = nearest_base {
                        push(a_start, origin.offset, common);
                    }
                }
                None => {}
            }
        }

        nearest_base = None;
        for (rank, position) in suffix_array.iter().enumerate().rev() {
            if let Some((_, common)) = &mut nearest_base {
                *common = (*common).min(lcp[rank + 1]);
            }

            match index.origin(*position) {
                Some(origin) if origin.sequence == BASE => {
                    nearest_base = Some((origin.offset, usize::MAX));
                }
                Some(origin) => {
                    if let Some((a_start, common)) = nearest_base {
                        push(a_start, origin.offset, common);
                    }
                }
                None => {}
            }
        }

        candidates
    }
}

/// Greedily accepts candidates from longest to shortest, keeping only those
/// that fit before or after every block accepted so far in both sequences.
fn select_blocks(mut candidates: Vec<Block>) -> Vec<Block> {
    candidates.sort_by(|left, right| {
        right
            .length
            .cmp(&left.length)
            .then(left.b_start.cmp(&right.b_start))
            .then(left.a_start.cmp(&right.a_start))
    });
    candidates.dedup();

    let mut accepted: BTreeMap<usize, Block> = BTreeMap::new();
    for candidate in candidates {
        let before = accepted.range(..candidate.b_start).next_back();
        let after = accepted.range(candidate.b_start..).next();

        if before.is_none_or(|(_, block)| block.precedes(&candidate))
            && after.is_none_or(|(_, block)| candidate.precedes(block))
        {
            accepted.insert(candidate.b_start, candidate);
        }
    }

    accepted.into_values().collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::Witness;

    fn tokens(text: &str) -> Vec<Token> { Witness::from_text("T", text).tokens().to_vec() }

    fn blocks(a: &str, b: &str, min_block_length: usize) -> Vec<(usize, usize, usize)> {
        SuffixBlockMatcher::new(min_block_length)
            .find_blocks(&tokens(a), &tokens(b))
            .unwrap()
            .into_iter()
            .map(|block| (block.a_start, block.b_start, block.length))
            .collect()
    }

    #[test]
    fn test_single_shared_block() {
        assert_eq!(blocks("a b c d", "x b c y", 1), vec![(1, 1, 2)]);

        let gaps = gaps_around(
            &[Block {
                a_start: 1,
                b_start: 1,
                length: 2,
            }],
            4,
            4,
        );
        assert_eq!(gaps, vec![Gap { a: 0..1, b: 0..1 }, Gap { a: 3..4, b: 3..4 }]);
    }

    #[test_case("x y z", "x y z", 1 => vec![(0, 0, 3)]; "identical")]
    #[test_case("a b c", "d e f", 1 => Vec::<(usize, usize, usize)>::new(); "disjoint")]
    #[test_case("a b c", "b c", 1 => vec![(1, 0, 2)]; "omitted prefix")]
    #[test_case("a b x c d", "a b y c d", 1 => vec![(0, 0, 2), (3, 3, 2)]; "two anchors")]
    #[test_case("a b x c d", "a b y c d", 3 => Vec::<(usize, usize, usize)>::new(); "too short")]
    #[test_case("a b a b", "a b", 1 => vec![(0, 0, 2)]; "repeat prefers leftmost base")]
    fn test_blocks(a: &str, b: &str, min_block_length: usize) -> Vec<(usize, usize, usize)> {
        blocks(a, b, min_block_length)
    }

    #[test]
    fn test_crossing_blocks_keep_the_longest() {
        // "c d e" moved to the front: the longer run wins, the crossing
        // shorter one is dropped
        assert_eq!(blocks("a b c d e", "c d e a b", 1), vec![(2, 0, 3)]);
    }

    #[test]
    fn test_overlapping_claims_keep_leftmost_on_tie() {
        // both "p q" runs of the witness compete for the single "p q" of the
        // base
        assert_eq!(blocks("p q", "p q r p q", 1), vec![(0, 0, 2)]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let matcher = SuffixBlockMatcher::new(1);

        assert!(matches!(
            matcher.find_blocks(&tokens(""), &tokens("a")),
            Err(CollationError::EmptyInput(_))
        ));
        assert!(matches!(
            matcher.find_blocks(&tokens("a"), &tokens("")),
            Err(CollationError::EmptyInput(_))
        ));
    }
}
