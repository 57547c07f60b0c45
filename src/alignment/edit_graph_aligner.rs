//! Token level alignment of two sequences by dynamic programming over their
//! edit graph.
//!
//! * time: `O(MN)`
//! * space `O(MN)`
//!
//! The table has one row per prefix of the incoming witness `b` and one
//! column per prefix of the base sequence `a`, so `table[y][x]` is the cheapest
//! alignment of `a[..x]` with `b[..y]`. Walking back from the bottom-right
//! cell along the cheapest predecessors yields the operations in reverse.

use log::trace;

use super::{
    operation::{Alignment, AlignmentItem, AlignmentOperation},
    transpositions::detect_transpositions,
};
use crate::{
    Token,
    config::{CollationConfig, Cost},
    errors::CollationError,
};

/// The filled scoring table of one alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTable {
    rows: usize,
    columns: usize,
    cells: Vec<Cost>,
}

impl EditTable {
    /// Number of rows: `len(b) + 1`.
    #[must_use]
    pub fn rows(&self) -> usize { self.rows }

    /// Number of columns: `len(a) + 1`.
    #[must_use]
    pub fn columns(&self) -> usize { self.columns }

    /// # Panics
    ///
    /// Panics if the cell lies outside of the table.
    #[must_use]
    pub fn get(&self, y: usize, x: usize) -> Cost {
        assert!(y < self.rows && x < self.columns, "Cell ({y}, {x}) is out of bounds");
        self.cells[y * self.columns + x]
    }

    /// Cost of the optimal alignment of the whole sequences.
    #[must_use]
    pub fn total_cost(&self) -> Cost { self.get(self.rows - 1, self.columns - 1) }

    fn set(&mut self, y: usize, x: usize, cost: Cost) { self.cells[y * self.columns + x] = cost; }
}

/// Aligns two non-empty token sequences with the costs of a
/// `CollationConfig`.
#[derive(Debug, Clone, Copy)]
pub struct EditGraphAligner<'a> {
    config: &'a CollationConfig,
}

/// Predecessor chosen while walking back through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Diagonal,
    Omission,
    Addition,
}

impl<'a> EditGraphAligner<'a> {
    #[must_use]
    pub fn new(config: &'a CollationConfig) -> Self { Self { config } }

    /// Fills the scoring table for aligning `a` with `b`.
    ///
    /// Fails with `CollationError::EmptyInput` if either side is empty.
    pub fn score_table<A>(&self, a: &[A], b: &[Token]) -> Result<EditTable, CollationError>
    where
        A: AlignmentItem,
    {
        ensure_not_empty(a, b)?;

        let rows = b.len() + 1;
        let columns = a.len() + 1;
        let mut table = EditTable {
            rows,
            columns,
            cells: vec![0; rows * columns],
        };

        for x in 1..columns {
            table.set(0, x, table.get(0, x - 1).saturating_add(self.config.omission_cost));
        }

        for y in 1..rows {
            table.set(y, 0, table.get(y - 1, 0).saturating_add(self.config.addition_cost));

            for x in 1..columns {
                let diagonal = table
                    .get(y - 1, x - 1)
                    .saturating_add(self.diagonal_cost(a[x - 1].token(), &b[y - 1]));
                let addition = table.get(y - 1, x).saturating_add(self.config.addition_cost);
                let omission = table.get(y, x - 1).saturating_add(self.config.omission_cost);

                table.set(y, x, diagonal.min(addition).min(omission));
            }
        }

        Ok(table)
    }

    /// Computes the optimal alignment of `a` and `b`, including the
    /// transposition pass over the result.
    pub fn align<A>(&self, a: &[A], b: &[Token]) -> Result<Alignment<A>, CollationError>
    where
        A: AlignmentItem,
    {
        let operations = self.align_operations(a, b)?;
        Ok(Alignment::new(
            detect_transpositions(operations),
            self.config,
        ))
    }

    /// Computes the optimal alignment of `a` and `b` as it comes out of the
    /// backtrace, without looking for transpositions.
    pub fn align_operations<A>(
        &self,
        a: &[A],
        b: &[Token],
    ) -> Result<Vec<AlignmentOperation<A>>, CollationError>
    where
        A: AlignmentItem,
    {
        let table = self.score_table(a, b)?;
        trace!(
            "Aligned {} base items with {} witness tokens at cost {}",
            a.len(),
            b.len(),
            table.total_cost()
        );

        Ok(self.backtrack(&table, a, b))
    }

    fn backtrack<A>(&self, table: &EditTable, a: &[A], b: &[Token]) -> Vec<AlignmentOperation<A>>
    where
        A: AlignmentItem,
    {
        let mut operations = Vec::with_capacity(a.len().max(b.len()));
        let (mut y, mut x) = (b.len(), a.len());

        while y > 0 || x > 0 {
            match self.predecessor(table, a, b, y, x) {
                Step::Diagonal => {
                    let (a_item, b_token) = (a[x - 1].clone(), b[y - 1].clone());
                    operations.push(if a_item.token() == &b_token {
                        AlignmentOperation::Match {
                            a: a_item,
                            b: b_token,
                        }
                    } else {
                        AlignmentOperation::Replacement {
                            a: a_item,
                            b: b_token,
                        }
                    });
                    y -= 1;
                    x -= 1;
                }
                Step::Omission => {
                    operations.push(AlignmentOperation::Omission { a: a[x - 1].clone() });
                    x -= 1;
                }
                Step::Addition => {
                    operations.push(AlignmentOperation::Addition { b: b[y - 1].clone() });
                    y -= 1;
                }
            }
        }

        operations.reverse();
        operations
    }

    /// Picks the cell that produced `table[y][x]`, preferring a match or
    /// replacement over an omission, and an omission over an addition.
    fn predecessor<A>(&self, table: &EditTable, a: &[A], b: &[Token], y: usize, x: usize) -> Step
    where
        A: AlignmentItem,
    {
        let current = table.get(y, x);

        if y > 0
            && x > 0
            && table
                .get(y - 1, x - 1)
                .saturating_add(self.diagonal_cost(a[x - 1].token(), &b[y - 1]))
                == current
        {
            return Step::Diagonal;
        }

        if x > 0 && table.get(y, x - 1).saturating_add(self.config.omission_cost) == current {
            return Step::Omission;
        }

        debug_assert!(
            y > 0 && table.get(y - 1, x).saturating_add(self.config.addition_cost) == current,
            "Cell ({y}, {x}) has no predecessor producing its cost"
        );

        Step::Addition
    }

    fn diagonal_cost(&self, a: &Token, b: &Token) -> Cost {
        if a == b {
            self.config.match_cost
        } else {
            self.config.replace_cost
        }
    }
}

fn ensure_not_empty<A>(a: &[A], b: &[Token]) -> Result<(), CollationError> {
    if a.is_empty() {
        return Err(CollationError::EmptyInput("base sequence".to_owned()));
    }

    if b.is_empty() {
        return Err(CollationError::EmptyInput("witness sequence".to_owned()));
    }

    Ok(())
}
