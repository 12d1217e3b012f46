// SPDX-License-Identifier: Apache-2.0

use crate::LegalizeError;

/// Smallest accepted cost scale. Distances are multiplied by the scale and
/// truncated to integers before the flow solve.
pub const MIN_COST_SCALE: i64 = 100;

/// Options that affect a legalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalizerOptions {
    /// Multiplier applied to Manhattan distances to obtain integral arc
    /// costs. Default: 100.
    pub cost_scale: i64,
    /// If true, log every materialized assignment at debug level.
    pub log_assignments: bool,
}

impl Default for LegalizerOptions {
    fn default() -> Self {
        LegalizerOptions {
            cost_scale: MIN_COST_SCALE,
            log_assignments: false,
        }
    }
}

impl LegalizerOptions {
    pub fn validate(&self) -> Result<(), LegalizeError> {
        if self.cost_scale < MIN_COST_SCALE {
            return Err(LegalizeError::InvalidCostScale {
                cost_scale: self.cost_scale,
                minimum: MIN_COST_SCALE,
            });
        }
        Ok(())
    }
}
