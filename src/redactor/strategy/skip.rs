//! Skip strategy - no redaction, passthrough.

use super::{RedactValue, Strategy, StrategyKind};

/// Strategy that passes values through unchanged
#[derive(Debug, Clone, Default)]
pub struct SkipStrategy;

impl SkipStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SkipStrategy {
    fn apply(&self, value: &RedactValue, _rng: &mut dyn rand::RngCore) -> RedactValue {
        // Return value unchanged
        value.clone()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Skip
    }
}
