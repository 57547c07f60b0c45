pub mod alignment;
pub mod apparatus;
pub mod block_matching;
pub mod collation;
pub mod config;
pub mod errors;
mod tokenizer;
pub mod variant_graph;
mod witness;

pub use apparatus::{Apparatus, ApparatusEntry, EntryState};
pub use collation::{CollationDriver, MergeSummary, Strategy};
pub use config::{CollationConfig, Cost};
pub use errors::{CollationError, Stage};
pub use tokenizer::{token::Token, word_tokenizer::word_tokenizer};
pub use variant_graph::{VariantGraph, VertexId};
pub use witness::{Witness, WitnessId};

/// Collates `witnesses` in the given order into a new variant graph.
///
/// Fails on the first witness that cannot be merged; use `CollationDriver`
/// directly to skip failing witnesses and carry on.
pub fn collate<'w, I>(witnesses: I, config: CollationConfig) -> Result<VariantGraph, CollationError>
where
    I: IntoIterator<Item = &'w Witness>,
{
    let mut driver = CollationDriver::new(config)?;
    driver.add_witnesses(witnesses)?;

    Ok(driver.into_graph())
}
