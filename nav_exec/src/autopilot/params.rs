//! Parameters structure for the Autopilot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Autopilot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutopilotParams {
    /// Number of cycles a segment may run for before it is abandoned along its fail edge.
    ///
    /// `None` lets segments run forever.
    #[serde(default)]
    pub segment_timeout_cycles: Option<u64>,
}
