//! Generalised suffix array over several token sequences.
//!
//! The sequences are concatenated, each followed by its own sentinel symbol.
//! Sentinels are unique, so no common prefix of two different suffixes ever
//! spans a sequence boundary.
//!
//! * construction: `O(N log N)` by prefix doubling with counting sort
//! * LCP array: `O(N)` (Kasai et al.)

use std::collections::HashMap;

use crate::Token;

/// Where a position of the concatenated text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub sequence: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct TokenIndex {
    text: Vec<u32>,
    origins: Vec<Option<Origin>>,
    suffix_array: Vec<usize>,
    lcp: Vec<usize>,
}

impl TokenIndex {
    /// Indexes `sequences`, comparing tokens by their normalised form.
    #[must_use]
    pub fn build(sequences: &[Vec<&Token>]) -> Self {
        let sentinel_count = u32::try_from(sequences.len()).unwrap_or(u32::MAX);
        let total = sequences.iter().map(Vec::len).sum::<usize>() + sequences.len();

        let mut symbols: HashMap<&str, u32> = HashMap::new();
        let mut text = Vec::with_capacity(total);
        let mut origins = Vec::with_capacity(total);

        for (sequence, tokens) in sequences.iter().enumerate() {
            for (offset, token) in tokens.iter().enumerate() {
                let next_symbol = sentinel_count + u32::try_from(symbols.len()).unwrap_or(u32::MAX);
                text.push(*symbols.entry(token.normalized()).or_insert(next_symbol));
                origins.push(Some(Origin { sequence, offset }));
            }

            text.push(u32::try_from(sequence).unwrap_or(u32::MAX));
            origins.push(None);
        }

        let suffix_array = build_suffix_array(&text);
        let lcp = build_lcp(&text, &suffix_array);

        Self {
            text,
            origins,
            suffix_array,
            lcp,
        }
    }

    /// Length of the concatenated text, sentinels included.
    #[must_use]
    pub fn len(&self) -> usize { self.text.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }

    /// Text positions in lexicographic order of their suffixes.
    #[must_use]
    pub fn suffix_array(&self) -> &[usize] { &self.suffix_array }

    /// `lcp()[i]` is the length of the common prefix of the suffixes at
    /// `suffix_array()[i - 1]` and `suffix_array()[i]`; `lcp()[0]` is 0.
    #[must_use]
    pub fn lcp(&self) -> &[usize] { &self.lcp }

    /// The sequence and offset of a text position, `None` for sentinels.
    #[must_use]
    pub fn origin(&self, position: usize) -> Option<Origin> { self.origins[position] }
}

fn build_suffix_array(text: &[u32]) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut suffix_array = (0..n).collect::<Vec<_>>();
    suffix_array.sort_unstable_by_key(|position| text[*position]);

    let mut rank = vec![0; n];
    for i in 1..n {
        let (previous, current) = (suffix_array[i - 1], suffix_array[i]);
        rank[current] = rank[previous] + usize::from(text[previous] != text[current]);
    }

    let mut by_second_key = Vec::with_capacity(n);
    let mut next_rank = vec![0; n];
    let mut step = 1;

    while step < n && rank[suffix_array[n - 1]] < n - 1 {
        // suffixes without a second half sort first, the rest follow the
        // order of their second half
        by_second_key.clear();
        by_second_key.extend(n - step..n);
        by_second_key.extend(
            suffix_array
                .iter()
                .filter(|position| **position >= step)
                .map(|position| position - step),
        );

        let classes = rank[suffix_array[n - 1]] + 1;
        let mut bucket_starts = vec![0; classes + 1];
        for position in &by_second_key {
            bucket_starts[rank[*position] + 1] += 1;
        }
        for class in 1..=classes {
            bucket_starts[class] += bucket_starts[class - 1];
        }
        for position in &by_second_key {
            let bucket = &mut bucket_starts[rank[*position]];
            suffix_array[*bucket] = *position;
            *bucket += 1;
        }

        let key = |position: usize| (rank[position], rank.get(position + step).map(|r| r + 1));
        next_rank[suffix_array[0]] = 0;
        for i in 1..n {
            let (previous, current) = (suffix_array[i - 1], suffix_array[i]);
            next_rank[current] = next_rank[previous] + usize::from(key(previous) != key(current));
        }

        std::mem::swap(&mut rank, &mut next_rank);
        step *= 2;
    }

    suffix_array
}

fn build_lcp(text: &[u32], suffix_array: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut rank = vec![0; n];
    for (index, position) in suffix_array.iter().enumerate() {
        rank[*position] = index;
    }

    let mut lcp = vec![0; n];
    let mut common = 0;
    for position in 0..n {
        if rank[position] == 0 {
            common = 0;
            continue;
        }

        let previous = suffix_array[rank[position] - 1];
        while position + common < n
            && previous + common < n
            && text[position + common] == text[previous + common]
        {
            common += 1;
        }

        lcp[rank[position]] = common;
        common = common.saturating_sub(1);
    }

    lcp
}
