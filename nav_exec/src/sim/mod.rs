//! # Simulated robot
//!
//! A kinematic differential drive robot which stands in for the real odometry sensors and drive
//! motors. Each call to `sample` advances the simulation by one time step using the last applied
//! power demands, then reports the encoder counts and attitude in the same way the real equipment
//! would.
//!
//! There is no wheel slip, and the pod layout assumes the dead reckoning wheels sit at the
//! robot's reference point.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

pub use params::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use crate::loc::{Attitude, OdomSample, Pose};
use eqpt_if::{
    eqpt::{
        drive::{PowerSink, WheelPowerDems},
        odom::OdomSource,
    },
    EqptError,
};
use util::maths::{clamp, lin_map, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimRobot {
    params: SimParams,

    /// True position of the reference point
    position: [f64; 2],

    /// True heading in (-pi, pi]
    heading: f64,

    /// Demands applied since the last sample, already saturated to [-1, 1]
    dems: WheelPowerDems,

    /// Total distance rolled by each encoder wheel, kept unquantised so that fractions of a tick
    /// are not lost between samples
    wheel_dist: [f64; 2],

    num_samples: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimRobot {
    pub fn new(params: SimParams) -> Self {
        Self {
            position: params.start_position,
            heading: wrap_pi(params.start_heading_rad),
            dems: WheelPowerDems::zero(),
            wheel_dist: [0.0; 2],
            num_samples: 0,
            params,
        }
    }

    /// The robot's true position.
    pub fn true_pose(&self) -> Pose {
        Pose::planar(self.position[0], self.position[1])
    }

    /// The robot's true heading.
    pub fn true_heading(&self) -> f64 {
        self.heading
    }

    /// The demands currently driving the wheels.
    pub fn dems(&self) -> WheelPowerDems {
        self.dems
    }

    /// Advance the simulation by one time step.
    fn step(&mut self) {
        // The first sample only reports the starting state
        if self.num_samples == 0 {
            return;
        }

        let max = self.params.max_speed_ups;
        let dt = self.params.dt_s;

        let speed_l = lin_map((-1.0, 1.0), (-max, max), self.dems.left);
        let speed_r = lin_map((-1.0, 1.0), (-max, max), self.dems.right);

        let dist_l = speed_l * dt;
        let dist_r = speed_r * dt;

        let forward = (dist_l + dist_r) / 2.0;
        let rotation = (dist_r - dist_l) / self.params.track_width_u;

        // Move along the heading at the middle of the step, forward is body +y
        let mid_heading = self.heading + rotation / 2.0;
        self.position[0] -= forward * mid_heading.sin();
        self.position[1] += forward * mid_heading.cos();
        self.heading = wrap_pi(self.heading + rotation);

        match self.params.encoder_layout {
            EncoderLayout::Tank => {
                self.wheel_dist[0] += dist_l;
                self.wheel_dist[1] += dist_r;
            }
            EncoderLayout::Pod => {
                // No lateral motion at the reference point
                self.wheel_dist[1] += forward;
            }
        }

        trace!(
            "SimRobot at [{:.3}, {:.3}] heading {:.3}",
            self.position[0],
            self.position[1],
            self.heading
        );
    }

    fn ticks(&self) -> [i64; 2] {
        let tpu = self.params.ticks_per_unit;
        [
            (self.wheel_dist[0] * tpu).floor() as i64,
            (self.wheel_dist[1] * tpu).floor() as i64,
        ]
    }
}

impl OdomSource for SimRobot {
    fn sample(&mut self) -> Result<OdomSample, EqptError> {
        self.step();
        self.num_samples += 1;

        Ok(OdomSample {
            ticks: self.ticks(),
            attitude: Attitude::from_heading(self.heading),
        })
    }
}

impl PowerSink for SimRobot {
    fn apply(&mut self, dems: &WheelPowerDems) -> Result<(), EqptError> {
        if !dems.left.is_finite() || !dems.right.is_finite() {
            return Err(EqptError::ActuatorRejected(format!(
                "non-finite demands {:?}",
                dems
            )));
        }

        self.dems = WheelPowerDems::new(
            clamp(&dems.left, &-1.0, &1.0),
            clamp(&dems.right, &-1.0, &1.0),
        );

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn robot(layout: EncoderLayout) -> SimRobot {
        SimRobot::new(SimParams {
            track_width_u: 0.5,
            max_speed_ups: 1.0,
            dt_s: 0.1,
            ticks_per_unit: 100.0,
            encoder_layout: layout,
            start_position: [0.0, 0.0],
            start_heading_rad: 0.0,
        })
    }

    #[test]
    fn test_first_sample_does_not_move() {
        let mut r = robot(EncoderLayout::Tank);
        r.apply(&WheelPowerDems::new(1.0, 1.0)).unwrap();

        let s = r.sample().unwrap();
        assert_eq!(s.ticks, [0, 0]);
        assert_eq!(r.true_pose(), Pose::default());
    }

    #[test]
    fn test_straight_line() {
        let mut r = robot(EncoderLayout::Tank);
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(0.5, 0.5)).unwrap();

        let mut s = r.sample().unwrap();
        for _ in 0..9 {
            s = r.sample().unwrap();
        }

        // 10 steps of 0.05 units along +y
        let p = r.true_pose();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 0.5).abs() < 1e-9);
        assert!((s.ticks[0] - 50).abs() <= 1);
        assert_eq!(s.ticks[0], s.ticks[1]);
        assert_eq!(s.attitude.heading, 0.0);
    }

    #[test]
    fn test_turn_on_the_spot() {
        let mut r = robot(EncoderLayout::Tank);
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(-0.5, 0.5)).unwrap();

        // 0.2 rad per step anticlockwise
        let mut heading = 0.0;
        for _ in 0..5 {
            heading = r.sample().unwrap().attitude.heading;
        }

        assert!((heading - 1.0).abs() < 1e-9);
        assert!(r.true_pose().x.abs() < 1e-9 && r.true_pose().y.abs() < 1e-9);
    }

    #[test]
    fn test_heading_wrapped() {
        let mut r = robot(EncoderLayout::Tank);
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(-1.0, 1.0)).unwrap();

        for _ in 0..100 {
            let h = r.sample().unwrap().attitude.heading;
            assert!(h > -PI && h <= PI, "{}", h);
        }
    }

    #[test]
    fn test_demands_saturated() {
        let mut r = robot(EncoderLayout::Tank);
        r.apply(&WheelPowerDems::new(3.0, -7.0)).unwrap();
        assert_eq!(r.dems(), WheelPowerDems::new(1.0, -1.0));

        assert!(r
            .apply(&WheelPowerDems::new(std::f64::NAN, 0.0))
            .is_err());
    }

    #[test]
    fn test_fractional_ticks_accumulate() {
        let mut r = SimRobot::new(SimParams {
            ticks_per_unit: 1.0,
            dt_s: 0.1,
            max_speed_ups: 1.0,
            ..Default::default()
        });
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(0.5, 0.5)).unwrap();

        // 0.05 ticks per step, only a whole tick after twenty steps
        let mut ticks = [0; 2];
        for _ in 0..25 {
            ticks = r.sample().unwrap().ticks;
        }
        assert_eq!(ticks, [1, 1]);
    }

    #[test]
    fn test_pod_layout() {
        let mut r = robot(EncoderLayout::Pod);
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(1.0, 1.0)).unwrap();

        let s = r.sample().unwrap();
        assert_eq!(s.ticks[0], 0);
        assert_eq!(s.ticks[1], 10);
    }

    #[test]
    fn test_start_heading() {
        let mut r = SimRobot::new(SimParams {
            start_heading_rad: -FRAC_PI_2,
            start_position: [1.0, 2.0],
            dt_s: 0.1,
            ..Default::default()
        });
        r.sample().unwrap();
        r.apply(&WheelPowerDems::new(1.0, 1.0)).unwrap();
        r.sample().unwrap();

        // Facing world +x
        let p = r.true_pose();
        assert!((p.x - 1.1).abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
    }
}
