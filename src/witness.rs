use std::{borrow::Borrow, fmt::Display, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Token, errors::CollationError, tokenizer::word_tokenizer::word_tokenizer};

/// Identifier (siglum) of a witness. Cheap to clone so that vertices and edges
/// can refer to witnesses without borrowing them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WitnessId(Arc<str>);

impl WitnessId {
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for WitnessId {
    fn from(id: &str) -> Self { WitnessId(id.into()) }
}

impl From<String> for WitnessId {
    fn from(id: String) -> Self { WitnessId(id.into()) }
}

impl Borrow<str> for WitnessId {
    fn borrow(&self) -> &str { &self.0 }
}

impl Display for WitnessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

/// One copy of the text being collated: an identifier and its tokens in
/// reading order. A witness is immutable once constructed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Witness {
    id: WitnessId,
    tokens: Vec<Token>,
}

impl Witness {
    /// Creates a witness whose tokens are compared by their exact surface
    /// form.
    pub fn new<I, S>(id: impl Into<WitnessId>, surface_forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_normalizer(id, surface_forms, str::to_owned)
    }

    /// Creates a witness whose tokens are compared by the output of
    /// `normalize` applied to each surface form.
    pub fn with_normalizer<I, S, F>(id: impl Into<WitnessId>, surface_forms: I, normalize: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> String,
    {
        let tokens = surface_forms
            .into_iter()
            .enumerate()
            .map(|(position, form)| {
                let form = form.as_ref();
                Token::new(normalize(form), form.to_owned(), position)
            })
            .collect();

        Self {
            id: id.into(),
            tokens,
        }
    }

    /// Creates a witness from already built tokens, renumbering their
    /// positions to match their order.
    pub fn from_tokens(id: impl Into<WitnessId>, tokens: Vec<Token>) -> Self {
        let tokens = tokens
            .into_iter()
            .enumerate()
            .map(|(position, token)| token.with_position(position))
            .collect();

        Self {
            id: id.into(),
            tokens,
        }
    }

    /// Splits `text` into words using `word_tokenizer`.
    pub fn from_text(id: impl Into<WitnessId>, text: &str) -> Self {
        Self {
            id: id.into(),
            tokens: word_tokenizer(text),
        }
    }

    #[must_use]
    pub fn id(&self) -> &WitnessId { &self.id }

    #[must_use]
    pub fn tokens(&self) -> &[Token] { &self.tokens }

    #[must_use]
    pub fn len(&self) -> usize { self.tokens.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub(crate) fn ensure_not_empty(&self) -> Result<(), CollationError> {
        if self.is_empty() {
            return Err(CollationError::EmptyInput(format!("witness `{}`", self.id)));
        }

        Ok(())
    }
}
