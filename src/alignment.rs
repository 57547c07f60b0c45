pub mod edit_graph_aligner;
pub mod operation;
pub(crate) mod transpositions;

pub use edit_graph_aligner::{EditGraphAligner, EditTable};
pub use operation::{Alignment, AlignmentItem, AlignmentOperation};
