//! Constant strategy - replace values with a fixed constant.

use super::{RedactValue, Strategy, StrategyKind};

/// Strategy that replaces all non-NULL values with a constant
#[derive(Debug, Clone)]
pub struct ConstantStrategy {
    value: String,
}

impl ConstantStrategy {
    pub fn new(value: String) -> Self {
        Self { value }
    }
}

impl Strategy for ConstantStrategy {
    fn apply(&self, value: &RedactValue, _rng: &mut dyn rand::RngCore) -> RedactValue {
        // Preserve NULL values, replace everything else with constant
        if value.is_null() {
            RedactValue::Null
        } else {
            RedactValue::String(self.value.clone())
        }
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Constant {
            value: self.value.clone(),
        }
    }
}
