//! Null strategy - replace values with NULL.

use super::{RedactValue, Strategy, StrategyKind};

/// Strategy that replaces all values with NULL
#[derive(Debug, Clone, Default)]
pub struct NullStrategy;

impl NullStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for NullStrategy {
    fn apply(&self, _value: &RedactValue, _rng: &mut dyn rand::RngCore) -> RedactValue {
        // Always return NULL regardless of input
        RedactValue::Null
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Null
    }
}
