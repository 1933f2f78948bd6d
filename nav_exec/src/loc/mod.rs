//! # Localisation module
//!
//! This module provides localisation for the robot in the form of wheel odometry fused with an
//! absolute orientation sensor. Two trackers are provided:
//!
//! - [`TankTracker`] - a pair of parallel drive wheel encoders, integrated once per cycle.
//! - [`PodTracker`] - a pod of two perpendicular dead reckoning wheels, integrated over a number
//!   of substeps per cycle to follow the arc the robot drove rather than the chord.
//!
//! Both implement [`PoseTracker`]; the executable picks one at composition time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pod;
mod tank;

pub use params::*;
pub use pod::PodTracker;
pub use tank::TankTracker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub use eqpt_if::eqpt::odom::{Attitude, OdomSample};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position of the robot's reference point in the world frame.
///
/// The robot's heading is not part of the pose, it is the `heading` of the [`Attitude`]. The
/// third axis `z` is the out-of-plane component of the transform maths; it is zero for planar
/// driving and is reserved for the reach test.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when building a tracker.
#[derive(Debug, thiserror::Error)]
pub enum LocError {
    #[error("Ticks per unit must be positive and finite, found {0}")]
    InvalidTicksPerUnit(f64),

    #[error("The number of integration substeps must be at least 1")]
    ZeroSubsteps,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capability shared by all trackers.
pub trait PoseTracker {
    /// Integrate one cycle's odometry sample into the pose.
    ///
    /// The first sample after construction only sets the baseline for the encoder deltas.
    fn update(&mut self, sample: &OdomSample);

    /// Current position of the robot's reference point.
    fn pose(&self) -> Pose;

    /// Attitude from the most recent sample.
    fn attitude(&self) -> Attitude;

    /// Overwrite the pose, for instance after relocalising against a known landmark.
    ///
    /// Later updates continue from the given pose.
    fn set_pose(&mut self, pose: Pose);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A pose on the ground plane.
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// The planar position `[x, y]`.
    pub fn position2(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for Pose {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Convert a cumulative tick delta into distance units.
pub(crate) fn ticks_to_units(current: i64, previous: i64, ticks_per_unit: f64) -> f64 {
    (current - previous) as f64 / ticks_per_unit
}

/// Check that a ticks per unit value can be divided by.
pub(crate) fn check_ticks_per_unit(ticks_per_unit: f64) -> Result<(), LocError> {
    if ticks_per_unit.is_finite() && ticks_per_unit > 0.0 {
        Ok(())
    } else {
        Err(LocError::InvalidTicksPerUnit(ticks_per_unit))
    }
}
