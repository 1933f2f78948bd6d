//! Dead reckoning pod tracker
//!
//! The pod carries two unpowered wheels at right angles, one rolling along the robot's lateral
//! (x) axis and one along its forward (y) axis. Over one cycle the robot may both translate and
//! rotate; integrating the whole displacement at a single attitude assumes it drove a straight
//! chord, so instead the cycle is split into `num_substeps` equal pieces and the attitude is
//! interpolated linearly across them. The chord-vs-arc error then falls off with the number of
//! substeps.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector3;
use util::maths::get_ang_dist_2pi;

use super::{check_ticks_per_unit, ticks_to_units, LocError, PodParams, PoseTracker};
use super::{Attitude, OdomSample, Pose};
use crate::transform::compose_rotation_translation;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks a robot using a perpendicular dual wheel pod and an orientation sensor.
#[derive(Debug, Clone)]
pub struct PodTracker {
    params: PodParams,

    /// Integrated position of the pod itself, the reported pose is this less the sensor offset.
    sensor_position: Vector3<f64>,
    attitude: Attitude,

    /// Encoder counts `[x, y]` from the previous update
    last_ticks: Option<[i64; 2]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PodTracker {
    pub fn new(params: PodParams) -> Result<Self, LocError> {
        check_ticks_per_unit(params.ticks_per_unit)?;

        if params.num_substeps == 0 {
            return Err(LocError::ZeroSubsteps);
        }

        let sensor_position = Vector3::from(params.sensor_offset);

        Ok(Self {
            params,
            sensor_position,
            attitude: Attitude::default(),
            last_ticks: None,
        })
    }

    /// Integrate a body frame displacement over `num_substeps` substeps.
    ///
    /// Substep `i` (counting from zero) is rotated by `start + i * rotation_delta / num_substeps`,
    /// and moves by `displacement / num_substeps`.
    pub fn integrate(
        start: &Vector3<f64>,
        displacement: &Vector3<f64>,
        start_attitude: &Attitude,
        rotation_delta: &Attitude,
        num_substeps: usize,
    ) -> Vector3<f64> {
        let n = num_substeps.max(1) as f64;

        let translation_per_step = displacement / n;
        let heading_per_step = rotation_delta.heading / n;
        let pitch_per_step = rotation_delta.pitch / n;
        let roll_per_step = rotation_delta.roll / n;

        let mut position = *start;

        for i in 0..num_substeps.max(1) {
            let i = i as f64;
            let attitude_this_step = Attitude::new(
                start_attitude.heading + heading_per_step * i,
                start_attitude.pitch + pitch_per_step * i,
                start_attitude.roll + roll_per_step * i,
            );

            position =
                compose_rotation_translation(&position, &translation_per_step, &attitude_this_step);
        }

        position
    }

    fn offset(&self) -> Vector3<f64> {
        Vector3::from(self.params.sensor_offset)
    }
}

impl PoseTracker for PodTracker {
    fn update(&mut self, sample: &OdomSample) {
        let ticks = sample.ticks;

        // On the first sample there is no previous attitude either, so the baseline is this one
        let (last, old_attitude) = match self.last_ticks.replace(ticks) {
            Some(last) => (last, self.attitude),
            None => (ticks, sample.attitude),
        };

        self.attitude = sample.attitude;

        let displacement = Vector3::new(
            ticks_to_units(ticks[0], last[0], self.params.ticks_per_unit),
            ticks_to_units(ticks[1], last[1], self.params.ticks_per_unit),
            0.0,
        );

        // Shortest way round, so that crossing the +/-pi seam is a small rotation
        let rotation_delta = Attitude::new(
            get_ang_dist_2pi(old_attitude.heading, sample.attitude.heading),
            get_ang_dist_2pi(old_attitude.pitch, sample.attitude.pitch),
            get_ang_dist_2pi(old_attitude.roll, sample.attitude.roll),
        );

        self.sensor_position = Self::integrate(
            &self.sensor_position,
            &displacement,
            &old_attitude,
            &rotation_delta,
            self.params.num_substeps,
        );

        trace!(
            "PodTracker: displacement [{:.4}, {:.4}], heading delta {:.4}",
            displacement[0],
            displacement[1],
            rotation_delta.heading
        );
    }

    fn pose(&self) -> Pose {
        Pose::from(self.sensor_position - self.offset())
    }

    fn attitude(&self) -> Attitude {
        self.attitude
    }

    fn set_pose(&mut self, pose: Pose) {
        self.sensor_position = pose.to_vector() + self.offset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
