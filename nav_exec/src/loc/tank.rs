//! Tank drive tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector3;

use super::{check_ticks_per_unit, ticks_to_units, LocError, PoseTracker, TankParams};
use super::{Attitude, OdomSample, Pose};
use crate::transform::compose_rotation_translation;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks a robot with two parallel drive wheels and an orientation sensor.
///
/// A tank drive cannot strafe, so each cycle moves the robot along its forward axis by the mean
/// distance of the two wheels, rotated by the freshly sampled attitude.
#[derive(Debug, Clone)]
pub struct TankTracker {
    params: TankParams,

    position: Vector3<f64>,
    attitude: Attitude,

    /// Encoder counts `[left, right]` from the previous update
    last_ticks: Option<[i64; 2]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TankTracker {
    pub fn new(params: TankParams) -> Result<Self, LocError> {
        check_ticks_per_unit(params.ticks_per_unit)?;

        Ok(Self {
            params,
            position: Vector3::zeros(),
            attitude: Attitude::default(),
            last_ticks: None,
        })
    }
}

impl PoseTracker for TankTracker {
    fn update(&mut self, sample: &OdomSample) {
        // Swap the cache before doing anything else so that it is always the previous cycle's
        // reading, otherwise integration drifts.
        let ticks = sample.ticks;
        let last = self.last_ticks.replace(ticks).unwrap_or(ticks);

        self.attitude = sample.attitude;

        let forward = (ticks_to_units(ticks[0], last[0], self.params.ticks_per_unit)
            + ticks_to_units(ticks[1], last[1], self.params.ticks_per_unit))
            / 2.0;

        self.position = compose_rotation_translation(
            &self.position,
            &Vector3::new(0.0, forward, 0.0),
            &self.attitude,
        );

        trace!(
            "TankTracker: forward {:.4}, position [{:.3}, {:.3}, {:.3}]",
            forward,
            self.position[0],
            self.position[1],
            self.position[2]
        );
    }

    fn pose(&self) -> Pose {
        Pose::from(self.position)
    }

    fn attitude(&self) -> Attitude {
        self.attitude
    }

    fn set_pose(&mut self, pose: Pose) {
        self.position = pose.to_vector();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
