//! Mining thresholds and their validation

use crate::error::{BasketError, Result};

pub const DEFAULT_MIN_SUPPORT: f64 = 0.3;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;
/// `state_product` value marking a product as active
pub const DEFAULT_ACTIVE_STATE: i64 = 1;

/// Parameters for a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct MiningConfig {
    /// Minimum support for an itemset to be frequent, in (0, 1]
    pub min_support: f64,
    /// Minimum confidence for a rule to be kept, in (0, 1]
    pub min_confidence: f64,
    /// Only products with this `state_product` flag are mapped to a product line
    pub active_state: i64,
    /// Largest itemset size to search; `None` searches until no candidates survive
    pub max_len: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            active_state: DEFAULT_ACTIVE_STATE,
            max_len: None,
        }
    }
}

impl MiningConfig {
    pub fn validate(&self) -> Result<()> {
        check_fraction("min_support", self.min_support)?;
        check_fraction("min_confidence", self.min_confidence)?;
        if self.max_len == Some(0) {
            return Err(BasketError::invalid_input("max_len must be at least 1"));
        }
        Ok(())
    }
}

/// Thresholds are fractions in (0, 1]. Zero would make every subset frequent.
pub(crate) fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(BasketError::invalid_input(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}
