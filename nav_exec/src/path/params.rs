//! Path loading parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::AccuracyThreshold;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Values applied to segments read from a path file which doesn't provide them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDefaults {
    /// Reach test tolerance.
    pub accuracy: AccuracyThreshold,

    /// Reduce power while further than halfway to the target.
    pub ramp_up: bool,

    /// Modulate power once closer than halfway to the target.
    pub ramp_down: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SegmentDefaults {
    fn default() -> Self {
        Self {
            accuracy: AccuracyThreshold::default(),
            ramp_up: true,
            ramp_down: true,
        }
    }
}
