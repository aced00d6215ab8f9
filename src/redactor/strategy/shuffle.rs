//! Shuffle strategy - redistribute values within a column.
//!
//! This strategy collects all values for a column and randomly redistributes them.
//! This preserves the statistical distribution while breaking the row correlation.
//!
//! Note: This requires collecting all values in memory, so it may not be suitable
//! for very large tables. Consider using hash strategy for large datasets.

use super::{RedactValue, Strategy, StrategyKind};
use rand::seq::SliceRandom;

/// Strategy that shuffles values within a column
#[derive(Debug, Clone, Default)]
pub struct ShuffleStrategy {
    /// Collected values for shuffling
    values: Vec<RedactValue>,
    /// Shuffled values (populated after shuffle())
    shuffled: Vec<RedactValue>,
    /// Current index into shuffled values
    index: usize,
}

impl ShuffleStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect a value for later shuffling
    pub fn collect(&mut self, value: RedactValue) {
        self.values.push(value);
    }

    /// Shuffle the collected values
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        self.shuffled = self.values.clone();
        self.shuffled.shuffle(rng);
        self.index = 0;
    }

    /// Get the next shuffled value
    pub fn next_value(&mut self) -> Option<RedactValue> {
        if self.index < self.shuffled.len() {
            let value = self.shuffled[self.index].clone();
            self.index += 1;
            Some(value)
        } else {
            None
        }
    }

    /// Get the number of collected values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the strategy is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Strategy for ShuffleStrategy {
    fn apply(&self, value: &RedactValue, _rng: &mut dyn rand::RngCore) -> RedactValue {
        // Note: For shuffle strategy, we need a two-pass approach:
        // 1. First pass: collect all values
        // 2. Shuffle
        // 3. Second pass: return shuffled values in order
        //
        // This trait-based apply() is called during the second pass.
        // The actual shuffling logic is handled by the Redactor.
        //
        // For now, we just return the value unchanged - the Redactor
        // will handle the shuffle logic specially.
        value.clone()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Shuffle
    }
}
