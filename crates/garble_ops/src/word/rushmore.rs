#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use super::{DeleteRandomWords, ReduplicateWords, SwapAdjacentWords};
use crate::traits::GlitchOp;

/// One stage of a [`RushmoreCombo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RushmoreMode {
    /// Run the delete stage
    Delete,
    /// Run the reduplicate stage
    Duplicate,
    /// Run the swap stage
    Swap,
}

/// Runs delete, duplicate and swap stages in a configured order.
///
/// All stages share the combo's random source, so the draws of a later stage
/// depend on what earlier stages consumed. A mode without a configured stage
/// is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RushmoreCombo {
    /// Stages in execution order
    pub modes: Vec<RushmoreMode>,
    /// Delete stage configuration
    pub delete: Option<DeleteRandomWords>,
    /// Duplicate stage configuration
    pub duplicate: Option<ReduplicateWords>,
    /// Swap stage configuration
    pub swap: Option<SwapAdjacentWords>,
}

impl GlitchOp for RushmoreCombo {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        for mode in &self.modes {
            let stage: Option<&dyn GlitchOp> = match mode {
                RushmoreMode::Delete => self.delete.as_ref().map(|op| op as &dyn GlitchOp),
                RushmoreMode::Duplicate => self.duplicate.as_ref().map(|op| op as &dyn GlitchOp),
                RushmoreMode::Swap => self.swap.as_ref().map(|op| op as &dyn GlitchOp),
            };
            if let Some(stage) = stage {
                stage.apply(buffer, rng)?;
            }
        }
        Ok(())
    }
}
