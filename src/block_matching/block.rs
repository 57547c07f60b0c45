use std::ops::Range;

/// A run of `length` tokens read identically by the base sequence (from
/// `a_start`) and the incoming witness (from `b_start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub length: usize,
}

impl Block {
    #[must_use]
    pub fn a_range(&self) -> Range<usize> { self.a_start..self.a_start + self.length }

    #[must_use]
    pub fn b_range(&self) -> Range<usize> { self.b_start..self.b_start + self.length }

    /// Whether `self` lies entirely before `other` in both sequences.
    #[must_use]
    pub fn precedes(&self, other: &Block) -> bool {
        self.a_range().end <= other.a_start && self.b_range().end <= other.b_start
    }
}

/// The stretch of both sequences between two consecutive blocks. Either side
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub a: Range<usize>,
    pub b: Range<usize>,
}

impl Gap {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.a.is_empty() && self.b.is_empty() }
}

/// Splits two sequences of the given lengths around ordered, non-overlapping
/// `blocks`, returning one gap before every block and one after the last.
#[must_use]
pub fn gaps_around(blocks: &[Block], a_len: usize, b_len: usize) -> Vec<Gap> {
    let mut gaps = Vec::with_capacity(blocks.len() + 1);
    let (mut a_cursor, mut b_cursor) = (0, 0);

    for block in blocks {
        debug_assert!(
            block.a_start >= a_cursor && block.b_start >= b_cursor,
            "Blocks must be ordered and must not overlap"
        );

        gaps.push(Gap {
            a: a_cursor..block.a_start,
            b: b_cursor..block.b_start,
        });
        a_cursor = block.a_range().end;
        b_cursor = block.b_range().end;
    }

    gaps.push(Gap {
        a: a_cursor..a_len,
        b: b_cursor..b_len,
    });

    gaps
}
