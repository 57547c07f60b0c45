use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A token is a piece of witness text that has been normalised in some way.
///
/// A token consists of the normalised form used for comparison, the original
/// surface form as it appears in the witness, and its position within the
/// witness it belongs to.
///
/// Two tokens are equal when their normalised forms are equal, regardless of
/// their surface form or position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone)]
pub struct Token {
    /// The normalised form of the token used for aligning witnesses.
    normalized: String,

    /// The original string as it occurs in the witness.
    original: String,

    /// Zero-based index of the token within its witness.
    position: usize,
}

/// Trivial implementation of Token when the normalised form is the same as the
/// original string. The position is filled in once the token is placed into a
/// `Witness`.
impl From<&str> for Token {
    fn from(text: &str) -> Self { Token::new(text.to_owned(), text.to_owned(), 0) }
}

impl Token {
    #[must_use]
    pub fn new(normalized: String, original: String, position: usize) -> Self {
        Token {
            normalized,
            original,
            position,
        }
    }

    #[must_use]
    pub fn original(&self) -> &str { &self.original }

    #[must_use]
    pub fn normalized(&self) -> &str { &self.normalized }

    #[must_use]
    pub fn position(&self) -> usize { self.position }

    pub(crate) fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool { self.normalized == other.normalized }
}

impl Eq for Token {}

impl Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:?}", self.position, self.normalized)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}
