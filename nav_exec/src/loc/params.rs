//! Localisation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the tank drive tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankParams {
    /// Encoder ticks per unit of distance travelled by a drive wheel.
    pub ticks_per_unit: f64,
}

/// Parameters for the dead reckoning pod tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodParams {
    /// Encoder ticks per unit of distance travelled by a pod wheel.
    pub ticks_per_unit: f64,

    /// Number of integration substeps per cycle.
    pub num_substeps: usize,

    /// Position of the pod relative to the robot's reference point, subtracted from the
    /// integrated pod position.
    ///
    /// Units: distance units, world frame axes.
    #[serde(default)]
    pub sensor_offset: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Selects and configures the tracker used by the executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TrackerParams {
    Tank(TankParams),
    Pod(PodParams),
}
