//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

// Internal
use super::{Direction, NavState};
use crate::loc::{Attitude, Pose};
use crate::path::Segment;
use eqpt_if::eqpt::drive::WheelPowerDems;
use util::maths::{norm, round_2dp};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Upper bound on each wheel's power demand.
pub const MAX_WHEEL_POWER: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state
#[derive(Debug, Clone, Default)]
pub struct NavCtrl {
    state: NavState,

    target: Option<ActiveTarget>,

    /// Pose and attitude from the last sync or tick
    pose: Pose,
    attitude: Attitude,
    synced: bool,

    report: StatusReport,
}

/// The segment being driven to and the values derived when it was installed.
#[derive(Debug, Clone)]
pub struct ActiveTarget {
    pub segment: Segment,

    /// Half the planar distance to the target when the segment was installed, the pivot of the
    /// power ramp.
    pub halfway_dist: f64,
}

/// Status report for NavCtrl processing.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct StatusReport {
    /// The target was within tolerance on every axis
    pub reached: bool,

    /// Planar distance to the target
    pub dist: f64,

    /// Power adjustment after the ramp rules
    pub power_adj: f64,

    /// Steering angle after wrapping and, when reversing, remapping to the rear
    pub angle: f64,

    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NavCtrl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the pose the controller works from.
    pub fn sync(&mut self, pose: Pose, attitude: Attitude) {
        self.pose = pose;
        self.attitude = attitude;
        self.synced = true;
    }

    /// Make a segment the active target.
    ///
    /// The halfway distance is measured from the last synced pose, so `sync` should be called
    /// first. The state is not changed.
    pub fn install_target(&mut self, segment: &Segment) {
        if !self.synced {
            warn!(
                "Installing segment \"{}\" before any pose has been synced, the halfway distance \
                will be measured from the origin",
                segment.id
            );
        }

        let halfway_dist = planar_dist(&segment.target, &self.pose) / 2.0;

        debug!(
            "NavCtrl target \"{}\" at [{:.3}, {:.3}], halfway distance {:.3}",
            segment.id, segment.target.x, segment.target.y, halfway_dist
        );

        self.target = Some(ActiveTarget {
            segment: segment.clone(),
            halfway_dist,
        });
    }

    pub fn set_state(&mut self, state: NavState) {
        self.state = state;
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn target(&self) -> Option<&ActiveTarget> {
        self.target.as_ref()
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Compute the wheel powers for this cycle.
    ///
    /// Reaching the target stops the controller whatever state it was in. Otherwise a stopped
    /// controller, or one with no target, demands zero power.
    pub fn tick(&mut self, pose: &Pose, attitude: &Attitude) -> WheelPowerDems {
        self.sync(*pose, *attitude);
        self.report = StatusReport::default();

        let target = match self.target {
            Some(ref t) => t,
            None => return WheelPowerDems::zero(),
        };
        let seg = &target.segment;

        self.report.dist = planar_dist(&seg.target, pose);

        if is_reached(&seg.target, pose, seg) {
            if self.state == NavState::Running {
                debug!("NavCtrl reached \"{}\"", seg.id);
            }
            self.state = NavState::Stopped;
            self.report.reached = true;
            return WheelPowerDems::zero();
        }

        if self.state == NavState::Stopped {
            return WheelPowerDems::zero();
        }

        let power_adj = ramp_power_adj(
            raw_power_adj(self.report.dist, target.halfway_dist, seg.nav_gain),
            seg.ramp_up,
            seg.ramp_down,
        );

        let angle = wrap_steering_angle(
            bearing(seg.target.x - pose.x, seg.target.y - pose.y) - FRAC_PI_2 - attitude.heading,
        );

        let (direction, angle, base) = if angle.abs() < FRAC_PI_2 {
            (
                Direction::Forward,
                angle,
                (seg.max_power - power_adj).max(seg.min_power),
            )
        } else {
            (
                Direction::Backward,
                rear_steering_angle(angle),
                (-seg.max_power - power_adj).max(seg.min_power),
            )
        };

        let dems = WheelPowerDems::new(
            (base - angle * seg.steering_gain).min(MAX_WHEEL_POWER),
            (base + angle * seg.steering_gain).min(MAX_WHEEL_POWER),
        );

        self.report.power_adj = power_adj;
        self.report.angle = angle;
        self.report.direction = direction;

        trace!(
            "NavCtrl {:?}: dist {:.3}, adj {:.3}, angle {:.3}, dems [{:.3}, {:.3}]",
            direction,
            self.report.dist,
            power_adj,
            angle,
            dems.left,
            dems.right
        );

        dems
    }
}

impl fmt::Display for NavCtrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t nav state:  {:?}", self.state)?;

        match self.target {
            Some(ref t) => writeln!(
                f,
                "\t target:  {} [{}, {}, {}]",
                t.segment.id,
                round_2dp(t.segment.target.x),
                round_2dp(t.segment.target.y),
                round_2dp(t.segment.target.z)
            )?,
            None => writeln!(f, "\t target:  none")?,
        }

        writeln!(
            f,
            "\t pose:  [{}, {}, {}]",
            round_2dp(self.pose.x),
            round_2dp(self.pose.y),
            round_2dp(self.pose.z)
        )?;
        write!(
            f,
            "\t attitude:  [{}, {}, {}]",
            round_2dp(self.attitude.heading),
            round_2dp(self.attitude.pitch),
            round_2dp(self.attitude.roll)
        )
    }
}

fn planar_dist(a: &Pose, b: &Pose) -> f64 {
    norm(&a.position2(), &b.position2()).unwrap_or(0.0)
}

/// True if the pose is within the segment's tolerance of the target on all three axes.
fn is_reached(target: &Pose, pose: &Pose, seg: &Segment) -> bool {
    (target.x - pose.x).abs() < seg.accuracy.x
        && (target.y - pose.y).abs() < seg.accuracy.y
        && (target.z - pose.z).abs() < seg.accuracy.z
}

/// Bearing of a displacement as `atan(dy / dx)`, folded into [-pi/2, pi/2].
///
/// Targets directly along the y axis give +/-pi/2 by the sign of `dy`, a zero displacement gives
/// zero.
pub fn bearing(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 {
        if dy > 0.0 {
            FRAC_PI_2
        } else if dy < 0.0 {
            -FRAC_PI_2
        } else {
            0.0
        }
    } else {
        (dy / dx).atan()
    }
}

/// Wrap the steering angle.
///
/// Angles above pi become `-angle - pi`, everything else is unchanged.
pub fn wrap_steering_angle(angle: f64) -> f64 {
    if angle > PI {
        -angle - PI
    } else {
        angle
    }
}

/// Remap a steering angle relative to the rear of the robot.
pub fn rear_steering_angle(angle: f64) -> f64 {
    if angle > 0.0 {
        PI - angle
    } else {
        -PI - angle
    }
}

/// Power adjustment before the ramp rules, positive while further away than halfway.
pub fn raw_power_adj(dist: f64, halfway_dist: f64, nav_gain: f64) -> f64 {
    (dist - halfway_dist) * nav_gain
}

/// Apply the ramp flags to a raw power adjustment.
///
/// With ramp down enabled a negative adjustment is flipped positive, reducing the power as the
/// robot closes on the target.
pub fn ramp_power_adj(power_adj: f64, ramp_up: bool, ramp_down: bool) -> f64 {
    if power_adj > 0.0 {
        if ramp_up {
            power_adj
        } else {
            0.0
        }
    } else if power_adj < 0.0 {
        if ramp_down {
            -power_adj
        } else {
            0.0
        }
    } else {
        power_adj
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::AccuracyThreshold;

    /// Facing world +x, the direction of the test targets.
    const FACING_X: f64 = -FRAC_PI_2;

    fn segment(x: f64, y: f64) -> Segment {
        Segment::new("a", "", "", Pose::planar(x, y))
    }

    fn running_ctrl(seg: &Segment, pose: Pose, heading: f64) -> NavCtrl {
        let mut ctrl = NavCtrl::new();
        ctrl.sync(pose, Attitude::from_heading(heading));
        ctrl.install_target(seg);
        ctrl.set_state(NavState::Running);
        ctrl
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_state() {
        let mut ctrl = NavCtrl::new();
        assert_eq!(ctrl.state(), NavState::Stopped);
        assert!(ctrl.target().is_none());

        // No target, no power, even when running
        ctrl.set_state(NavState::Running);
        let dems = ctrl.tick(&Pose::default(), &Attitude::default());
        assert!(dems.is_zero());
    }

    #[test]
    fn test_reach_idempotence() {
        let seg = segment(10.0, 0.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);
        let att = Attitude::from_heading(FACING_X);

        assert!(!ctrl.tick(&Pose::planar(5.0, 0.0), &att).is_zero());
        assert_eq!(ctrl.state(), NavState::Running);

        // Wander around inside the tolerance
        for p in &[
            Pose::planar(9.95, 0.0),
            Pose::planar(10.05, 0.05),
            Pose::planar(9.91, -0.09),
            Pose::new(10.0, 0.0, 0.09),
        ] {
            assert!(ctrl.tick(p, &att).is_zero());
            assert_eq!(ctrl.state(), NavState::Stopped);
            assert!(ctrl.report().reached);
        }

        // Setting running again still gives nothing while within tolerance
        ctrl.set_state(NavState::Running);
        assert!(ctrl.tick(&Pose::planar(9.99, 0.0), &att).is_zero());
        assert_eq!(ctrl.state(), NavState::Stopped);
    }

    #[test]
    fn test_reach_needs_every_axis() {
        let seg = segment(10.0, 0.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);
        let att = Attitude::from_heading(FACING_X);

        assert!(!ctrl.tick(&Pose::planar(10.0, 0.2), &att).is_zero());
        assert!(!ctrl.tick(&Pose::new(10.0, 0.0, 0.2), &att).is_zero());
        assert!(!ctrl.report().reached);
        assert_eq!(ctrl.state(), NavState::Running);
    }

    #[test]
    fn test_reach_while_stopped() {
        let seg = segment(1.0, 1.0);
        let mut ctrl = NavCtrl::new();
        ctrl.sync(Pose::default(), Attitude::default());
        ctrl.install_target(&seg);

        ctrl.tick(&Pose::planar(1.0, 1.0), &Attitude::default());
        assert!(ctrl.report().reached);
        assert_eq!(ctrl.state(), NavState::Stopped);
    }

    #[test]
    fn test_stopped_is_idle() {
        let seg = segment(10.0, 0.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);
        ctrl.set_state(NavState::Stopped);

        let dems = ctrl.tick(&Pose::planar(3.0, 0.0), &Attitude::from_heading(FACING_X));
        assert!(dems.is_zero());
        assert_eq!(ctrl.report().direction, Direction::Idle);
        assert!(!ctrl.report().reached);
    }

    #[test]
    fn test_halfway_symmetry() {
        let halfway = 6.0;
        let gain = 0.07;

        for k in &[0.5, 1.0, 2.5, 5.9] {
            let above = raw_power_adj(halfway + k, halfway, gain);
            let below = raw_power_adj(halfway - k, halfway, gain);
            assert!(close(above.abs(), below.abs()));
            assert!(above > 0.0 && below < 0.0);

            // With both ramps enabled the shaped adjustment is the same either side
            assert!(close(
                ramp_power_adj(above, true, true),
                ramp_power_adj(below, true, true)
            ));
        }
    }

    #[test]
    fn test_ramp_flags() {
        assert_eq!(ramp_power_adj(0.2, false, true), 0.0);
        assert_eq!(ramp_power_adj(0.2, true, false), 0.2);
        assert_eq!(ramp_power_adj(-0.2, true, false), 0.0);
        assert_eq!(ramp_power_adj(-0.2, false, true), 0.2);
        assert_eq!(ramp_power_adj(0.0, true, true), 0.0);
    }

    #[test]
    fn test_forward_backward_symmetry() {
        let att = Attitude::from_heading(FACING_X);

        for theta in &[0.3f64, 1.0, -0.7, 2.2, -2.8] {
            let r = 4.0;
            let ahead = segment(r * theta.cos(), r * theta.sin());
            let behind = segment(r * (theta + PI).cos(), r * (theta + PI).sin());

            let mut ctrl_a = running_ctrl(&ahead, Pose::default(), FACING_X);
            let mut ctrl_b = running_ctrl(&behind, Pose::default(), FACING_X);

            let a = ctrl_a.tick(&Pose::default(), &att);
            let b = ctrl_b.tick(&Pose::default(), &att);

            assert!(close(a.left, b.left), "{:?} != {:?}", a, b);
            assert!(close(a.right, b.right), "{:?} != {:?}", a, b);
            assert_eq!(ctrl_a.report().direction, ctrl_b.report().direction);
        }
    }

    #[test]
    fn test_backward_branch() {
        // Facing world -x with the target on +x
        let seg = segment(10.0, 0.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FRAC_PI_2);

        let dems = ctrl.tick(&Pose::default(), &Attitude::from_heading(FRAC_PI_2));
        assert_eq!(ctrl.report().direction, Direction::Backward);
        assert!(close(ctrl.report().angle, 0.0));

        // Negated base power is below the floor, so both wheels sit at the lowest power
        assert!(close(dems.left, seg.min_power));
        assert!(close(dems.right, seg.min_power));
    }

    #[test]
    fn test_angle_wrap() {
        let eps = 1e-6;

        let above = PI + eps;
        assert_eq!(wrap_steering_angle(above), -above - PI);

        let below = -PI - eps;
        assert_eq!(wrap_steering_angle(below), below);

        assert_eq!(wrap_steering_angle(PI), PI);
        assert_eq!(wrap_steering_angle(0.4), 0.4);
    }

    #[test]
    fn test_rear_remap() {
        assert!(close(rear_steering_angle(PI - 0.2), 0.2));
        assert!(close(rear_steering_angle(-PI + 0.2), -0.2));
    }

    #[test]
    fn test_steering_direction() {
        // Target ahead and to the left of a robot facing +x, so the right wheel works harder
        let seg = segment(10.0, 2.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);

        let dems = ctrl.tick(&Pose::default(), &Attitude::from_heading(FACING_X));
        assert_eq!(ctrl.report().direction, Direction::Forward);
        assert!(ctrl.report().angle > 0.0);
        assert!(dems.right > dems.left);
    }

    #[test]
    fn test_power_capped() {
        let mut seg = segment(10.0, 10.0);
        seg.max_power = 0.95;
        seg.steering_gain = 2.0;
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);

        let dems = ctrl.tick(&Pose::default(), &Attitude::from_heading(FACING_X));
        assert_eq!(dems.right, MAX_WHEEL_POWER);

        // No lower bound after steering
        assert!(dems.left < 0.0);
    }

    #[test]
    fn test_zero_dx_bearing() {
        assert_eq!(bearing(0.0, 3.0), FRAC_PI_2);
        assert_eq!(bearing(0.0, -3.0), -FRAC_PI_2);
        assert_eq!(bearing(0.0, 0.0), 0.0);

        // Heading 0 faces world +y, so a target straight ahead drives straight
        let seg = segment(0.0, 5.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), 0.0);
        let dems = ctrl.tick(&Pose::default(), &Attitude::default());
        assert!(dems.left.is_finite() && dems.right.is_finite());
        assert!(close(dems.left, dems.right));
        assert_eq!(ctrl.report().direction, Direction::Forward);

        // And straight behind drives with equal powers on the reverse branch
        let seg = segment(0.0, -5.0);
        let mut ctrl = running_ctrl(&seg, Pose::default(), 0.0);
        let dems = ctrl.tick(&Pose::default(), &Attitude::default());
        assert!(close(dems.left, dems.right));
        assert_eq!(ctrl.report().direction, Direction::Backward);
    }

    #[test]
    fn test_halfway_is_half_the_distance() {
        let seg = segment(10.0, 0.0);
        let ctrl = running_ctrl(&seg, Pose::default(), FACING_X);
        assert_eq!(ctrl.target().unwrap().halfway_dist, 5.0);

        // Measured from the pose synced before install
        let seg = segment(7.0, 4.0);
        let ctrl = running_ctrl(&seg, Pose::planar(1.0, -4.0), FACING_X);
        assert!(close(ctrl.target().unwrap().halfway_dist, 5.0));
    }

    #[test]
    fn test_ramp_up_before_halfway() {
        let mut seg = segment(10.0, 0.0);
        seg.ramp_up = true;
        seg.ramp_down = false;
        let att = Attitude::from_heading(FACING_X);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);

        // 7.5 from the target with a pivot of 5: (7.5 - 5) * 0.05
        let dems = ctrl.tick(&Pose::planar(2.5, 0.0), &att);
        assert!(close(ctrl.report().power_adj, 0.125));
        assert!(close(dems.left, 0.375));
        assert!(close(dems.right, 0.375));

        // Past halfway the adjustment is dropped without ramp down
        let dems = ctrl.tick(&Pose::planar(7.5, 0.0), &att);
        assert_eq!(ctrl.report().power_adj, 0.0);
        assert!(close(dems.left, seg.max_power));

        // And without ramp up the first half runs at full power
        seg.ramp_up = false;
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);
        let dems = ctrl.tick(&Pose::planar(2.5, 0.0), &att);
        assert_eq!(ctrl.report().power_adj, 0.0);
        assert!(close(dems.left, seg.max_power));
    }

    #[test]
    fn test_end_to_end_approach() {
        let mut seg = segment(10.0, 0.0);
        seg.accuracy = AccuracyThreshold::uniform(0.1);
        let att = Attitude::from_heading(FACING_X);
        let mut ctrl = running_ctrl(&seg, Pose::default(), FACING_X);

        let mut x = 0.0;
        let mut powers = vec![];
        let mut stopped_at = None;

        for i in 0..1000 {
            let dems = ctrl.tick(&Pose::planar(x, 0.0), &att);

            if ctrl.state() == NavState::Stopped {
                assert!(dems.is_zero());
                stopped_at = Some(i);
                break;
            }

            // Straight ahead, so no steering
            assert!(close(dems.left, dems.right));
            assert!(dems.left >= seg.min_power - 1e-12);
            assert!(dems.left <= seg.max_power + 1e-12);
            powers.push((x, dems.left));

            x += 0.05;
        }

        assert!(stopped_at.is_some());
        assert!((x - 10.0).abs() < 0.1);
        assert!(ctrl.report().reached);

        // Power rises to the base power at the midpoint, then falls away again
        let (first_half, second_half): (Vec<&(f64, f64)>, Vec<&(f64, f64)>) =
            powers.iter().partition(|(x, _)| *x <= 5.0);
        for w in first_half.windows(2) {
            assert!(w[1].1 >= w[0].1 - 1e-12);
        }
        for w in second_half.windows(2) {
            assert!(w[1].1 <= w[0].1 + 1e-12);
        }

        let peak = powers
            .iter()
            .map(|(_, p)| *p)
            .fold(std::f64::NEG_INFINITY, f64::max);
        assert!((peak - seg.max_power).abs() < 0.01);

        let (_, start_power) = powers[0];
        let (_, end_power) = powers[powers.len() - 1];
        assert!(start_power < peak - 0.2);
        assert!(end_power < peak - 0.2);
    }

    #[test]
    fn test_status_text() {
        let seg = segment(10.0, 0.0);
        let ctrl = running_ctrl(&seg, Pose::planar(1.234, 5.678), 0.5);

        let text = ctrl.to_string();
        assert!(text.contains("Running"));
        assert!(text.contains("target:  a [10, 0, 0]"));
        assert!(text.contains("pose:  [1.23, 5.68, 0]"));
        assert!(text.contains("attitude:  [0.5, 0, 0]"));
    }
}
