use log::trace;

use super::operation::{AlignmentItem, AlignmentOperation};
use crate::Token;

/// A place where the base and the witness disagree on exactly one token each:
/// a replacement, or an omission directly next to an addition.
#[derive(Debug)]
struct Swap {
    /// Index of the first operation making up the swap.
    start: usize,
    /// Number of operations making up the swap, 1 or 2.
    length: usize,
    omitted: Token,
    added: Token,
}

/// Re-tags mirrored pairs of swaps as transpositions.
///
/// A swap of `t1` for `t2` followed later by a swap of `t2` for `t1` means the
/// witness reads the two tokens in the opposite order. Each swap is then
/// replaced by a single `Transposition` consuming the same base item and
/// witness token, and pointing at the base item its witness token was moved
/// from. Pairs are formed greedily from the left; a swap takes part in at
/// most one transposition.
pub fn detect_transpositions<A>(operations: Vec<AlignmentOperation<A>>) -> Vec<AlignmentOperation<A>>
where
    A: AlignmentItem,
{
    let swaps = find_swaps(&operations);
    let mut partner = vec![None; swaps.len()];

    for first in 0..swaps.len() {
        if partner[first].is_some() {
            continue;
        }

        let mirror = (first + 1..swaps.len()).find(|second| {
            partner[*second].is_none()
                && swaps[*second].added == swaps[first].omitted
                && swaps[*second].omitted == swaps[first].added
        });

        if let Some(second) = mirror {
            trace!(
                "Transposition of `{}` and `{}`",
                swaps[first].omitted, swaps[first].added
            );
            partner[first] = Some(second);
            partner[second] = Some(first);
        }
    }

    if partner.iter().all(Option::is_none) {
        return operations;
    }

    let base_items = swaps
        .iter()
        .map(|swap| omitted_item(&operations[swap.start..swap.start + swap.length]))
        .collect::<Vec<_>>();

    let mut result = Vec::with_capacity(operations.len());
    let mut swap_index = 0;
    let mut index = 0;
    while index < operations.len() {
        let current_swap = swaps
            .get(swap_index)
            .filter(|swap| swap.start == index);

        let Some(swap) = current_swap else {
            result.push(operations[index].clone());
            index += 1;
            continue;
        };

        let group = &operations[index..index + swap.length];
        match partner[swap_index] {
            Some(other) => result.push(AlignmentOperation::Transposition {
                a: base_items[swap_index].clone(),
                b: swap.added.clone(),
                counterpart: base_items[other].clone(),
            }),
            None => result.extend(group.iter().cloned()),
        }

        index += swap.length;
        swap_index += 1;
    }

    result
}

fn find_swaps<A>(operations: &[AlignmentOperation<A>]) -> Vec<Swap>
where
    A: AlignmentItem,
{
    let mut swaps = Vec::new();
    let mut index = 0;

    while index < operations.len() {
        let swap = match &operations[index..] {
            [AlignmentOperation::Replacement { a, b }, ..] => Some((1, a.token(), b)),
            [AlignmentOperation::Omission { a }, AlignmentOperation::Addition { b }, ..]
            | [AlignmentOperation::Addition { b }, AlignmentOperation::Omission { a }, ..] => {
                Some((2, a.token(), b))
            }
            _ => None,
        };

        match swap {
            Some((length, omitted, added)) if omitted != added => {
                swaps.push(Swap {
                    start: index,
                    length,
                    omitted: omitted.clone(),
                    added: added.clone(),
                });
                index += length;
            }
            _ => index += 1,
        }
    }

    swaps
}

fn omitted_item<A>(group: &[AlignmentOperation<A>]) -> A
where
    A: AlignmentItem,
{
    group
        .iter()
        .find_map(AlignmentOperation::a)
        .cloned()
        .unwrap_or_else(|| unreachable!("Every swap consumes one base item"))
}
