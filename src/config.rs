use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CollationError;

/// Cost of one alignment step. Costs are non-negative; the aligner minimises
/// their sum.
pub type Cost = u32;

pub const DEFAULT_MATCH_COST: Cost = 0;
pub const DEFAULT_REPLACE_COST: Cost = 2;
pub const DEFAULT_OMISSION_COST: Cost = 1;
pub const DEFAULT_ADDITION_COST: Cost = 1;
pub const DEFAULT_TRANSPOSITION_COST: Cost = 1;
pub const DEFAULT_MIN_BLOCK_LENGTH: usize = 1;
pub const DEFAULT_ENABLE_ANCHORING: bool = true;
pub const DEFAULT_ANCHORING_THRESHOLD: usize = 0;

/// Options recognised by the aligners and the collation driver.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationConfig {
    /// Cost of aligning two equal tokens.
    #[cfg_attr(feature = "serde", serde(default = "default_match_cost"))]
    pub match_cost: Cost,

    /// Cost of aligning two different tokens against each other.
    #[cfg_attr(feature = "serde", serde(default = "default_replace_cost"))]
    pub replace_cost: Cost,

    /// Cost of a token of the base sequence with no counterpart.
    #[cfg_attr(feature = "serde", serde(default = "default_omission_cost"))]
    pub omission_cost: Cost,

    /// Cost of a token of the incoming witness with no counterpart.
    #[cfg_attr(feature = "serde", serde(default = "default_addition_cost"))]
    pub addition_cost: Cost,

    /// Reported cost of one half of a transposition, replacing the omission
    /// and addition it was detected from.
    #[cfg_attr(feature = "serde", serde(default = "default_transposition_cost"))]
    pub transposition_cost: Cost,

    /// Shortest run of tokens accepted as an anchoring block.
    #[cfg_attr(feature = "serde", serde(default = "default_min_block_length"))]
    pub min_block_length: usize,

    /// Whether to search for anchoring blocks before aligning.
    #[cfg_attr(feature = "serde", serde(default = "default_enable_anchoring"))]
    pub enable_anchoring: bool,

    /// Anchoring only pays off for large tables: below this many table
    /// cells (`len(a) * len(b)`) the whole sequences are aligned directly.
    #[cfg_attr(feature = "serde", serde(default = "default_anchoring_threshold"))]
    pub anchoring_threshold: usize,
}

fn default_match_cost() -> Cost {
    debug!("Using default match cost: {DEFAULT_MATCH_COST}");
    DEFAULT_MATCH_COST
}

fn default_replace_cost() -> Cost {
    debug!("Using default replace cost: {DEFAULT_REPLACE_COST}");
    DEFAULT_REPLACE_COST
}

fn default_omission_cost() -> Cost {
    debug!("Using default omission cost: {DEFAULT_OMISSION_COST}");
    DEFAULT_OMISSION_COST
}

fn default_addition_cost() -> Cost {
    debug!("Using default addition cost: {DEFAULT_ADDITION_COST}");
    DEFAULT_ADDITION_COST
}

fn default_transposition_cost() -> Cost {
    debug!("Using default transposition cost: {DEFAULT_TRANSPOSITION_COST}");
    DEFAULT_TRANSPOSITION_COST
}

fn default_min_block_length() -> usize {
    debug!("Using default minimum block length: {DEFAULT_MIN_BLOCK_LENGTH}");
    DEFAULT_MIN_BLOCK_LENGTH
}

fn default_enable_anchoring() -> bool {
    debug!("Using default anchoring flag: {DEFAULT_ENABLE_ANCHORING}");
    DEFAULT_ENABLE_ANCHORING
}

fn default_anchoring_threshold() -> usize {
    debug!("Using default anchoring threshold: {DEFAULT_ANCHORING_THRESHOLD}");
    DEFAULT_ANCHORING_THRESHOLD
}

impl Default for CollationConfig {
    fn default() -> Self {
        Self {
            match_cost: default_match_cost(),
            replace_cost: default_replace_cost(),
            omission_cost: default_omission_cost(),
            addition_cost: default_addition_cost(),
            transposition_cost: default_transposition_cost(),
            min_block_length: default_min_block_length(),
            enable_anchoring: default_enable_anchoring(),
            anchoring_threshold: default_anchoring_threshold(),
        }
    }
}

impl CollationConfig {
    /// Configuration that never searches for anchoring blocks.
    #[must_use]
    pub fn without_anchoring() -> Self {
        Self {
            enable_anchoring: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CollationError> {
        if self.min_block_length == 0 {
            return Err(CollationError::InvalidConfig(
                "min_block_length must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }

    /// Whether anchoring should run before aligning sequences of the given
    /// lengths.
    #[must_use]
    pub fn should_anchor(&self, a_len: usize, b_len: usize) -> bool {
        self.enable_anchoring && a_len.saturating_mul(b_len) >= self.anchoring_threshold
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollationConfig::default();

        assert_eq!(config.match_cost, 0);
        assert!(config.replace_cost > 0);
        assert_eq!(config.omission_cost, config.addition_cost);
        assert_eq!(config.min_block_length, 1);
        assert!(config.enable_anchoring);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_block_length_is_rejected() {
        let config = CollationConfig {
            min_block_length: 0,
            ..CollationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(CollationError::InvalidConfig(_))
        ));
    }

    #[test_case(true, 0, 1, 1 => true)]
    #[test_case(false, 0, 100, 100 => false)]
    #[test_case(true, 100, 9, 10 => false)]
    #[test_case(true, 100, 10, 10 => true)]
    fn test_should_anchor(enabled: bool, threshold: usize, a_len: usize, b_len: usize) -> bool {
        CollationConfig {
            enable_anchoring: enabled,
            anchoring_threshold: threshold,
            ..CollationConfig::default()
        }
        .should_anchor(a_len, b_len)
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config: CollationConfig =
            serde_yaml::from_str("replace_cost: 5\nenable_anchoring: false\n").unwrap();

        assert_eq!(
            config,
            CollationConfig {
                replace_cost: 5,
                enable_anchoring: false,
                ..CollationConfig::default()
            }
        );
    }
}
