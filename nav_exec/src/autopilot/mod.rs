//! # Autopilot
//!
//! The host cycle of the navigation stack. Each cycle the odometry sample is integrated by the
//! tracker, the navigation controller computes the wheel powers from the new pose, and once the
//! active target is reached the path graph is advanced and the next segment installed.
//!
//! A segment which runs for longer than the configured timeout is abandoned along its fail edge.
//! When the graph has no segment to move to the mission is complete and every later cycle demands
//! zero power.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

pub use params::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

use crate::{
    loc::{OdomSample, Pose, PoseTracker},
    nav_ctrl::{Direction, NavCtrl, NavState},
    path::{Edge, PathGraph},
};
use eqpt_if::{
    eqpt::{
        drive::{PowerSink, WheelPowerDems},
        odom::OdomSource,
        status::StatusSink,
    },
    EqptError,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Autopilot module state
pub struct Autopilot<T: PoseTracker> {
    params: AutopilotParams,

    tracker: T,
    graph: PathGraph,
    ctrl: NavCtrl,

    started: bool,
    mission_complete: bool,

    cycle: u64,

    /// Cycles run by the active segment
    segment_cycles: u64,

    report: AutopilotReport,
    arch: Archiver,
}

/// Status report for Autopilot processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AutopilotReport {
    pub cycle: u64,

    /// Name of the active segment, `__init__` before the mission starts
    pub segment: String,

    pub nav_state: NavState,

    /// The active target was reached this cycle
    pub reached: bool,

    pub mission_complete: bool,

    pub dems: WheelPowerDems,
}

/// One row of the cycle archive.
#[derive(Serialize)]
struct CycleRecord<'a> {
    cycle: u64,
    segment: &'a str,
    x: f64,
    y: f64,
    z: f64,
    heading: f64,
    left: f64,
    right: f64,
    nav_state: NavState,
    direction: Direction,
    dist: f64,
    power_adj: f64,
    angle: f64,
    reached: bool,
    mission_complete: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AutopilotError {
    #[error("Equipment error: {0}")]
    EqptError(EqptError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: PoseTracker> Autopilot<T> {
    pub fn new(params: AutopilotParams, tracker: T, graph: PathGraph) -> Self {
        Self {
            params,
            tracker,
            graph,
            ctrl: NavCtrl::new(),
            started: false,
            mission_complete: false,
            cycle: 0,
            segment_cycles: 0,
            report: AutopilotReport::default(),
            arch: Archiver::default(),
        }
    }

    /// Start the mission by installing the `__start__` segment.
    ///
    /// Called by the first cycle if it hasn't been called already. Calling it again has no
    /// effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        self.ctrl.sync(self.tracker.pose(), self.tracker.attitude());

        info!("Starting mission\n{}", self.graph);
        self.advance(Edge::Success);
    }

    /// Run one full cycle against the equipment: sample, process, then apply the demands.
    pub fn run_cycle<E>(&mut self, eqpt: &mut E) -> Result<AutopilotReport, AutopilotError>
    where
        E: OdomSource + PowerSink,
    {
        let sample = eqpt.sample().map_err(AutopilotError::EqptError)?;

        let (dems, report) = self.proc(&sample)?;

        eqpt.apply(&dems).map_err(AutopilotError::EqptError)?;

        Ok(report)
    }

    /// Abandon the active segment and move along its fail edge.
    ///
    /// Returns true if a new segment was installed.
    pub fn fail_segment(&mut self) -> bool {
        if self.mission_complete {
            return false;
        }

        warn!("Failing segment \"{}\"", self.graph.current_id());
        self.advance(Edge::Failure)
    }

    /// Overwrite the tracker's pose, later cycles continue from it.
    pub fn relocalise(&mut self, pose: Pose) {
        info!(
            "Relocalising to [{:.3}, {:.3}, {:.3}]",
            pose.x, pose.y, pose.z
        );
        self.tracker.set_pose(pose);
        self.ctrl.sync(pose, self.tracker.attitude());
    }

    /// Push the graph and controller status text to a status sink.
    pub fn report_status(&self, sink: &mut dyn StatusSink) {
        sink.status("path", &self.graph.to_string());
        sink.status("nav", &self.ctrl.to_string());
    }

    pub fn is_mission_complete(&self) -> bool {
        self.mission_complete
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn pose(&self) -> Pose {
        self.tracker.pose()
    }

    pub fn graph(&self) -> &PathGraph {
        &self.graph
    }

    pub fn nav_ctrl(&self) -> &NavCtrl {
        &self.ctrl
    }

    /// Follow an edge of the graph and install the segment found there.
    ///
    /// If there's no segment the mission is complete.
    fn advance(&mut self, edge: Edge) -> bool {
        let ctrl = &mut self.ctrl;
        self.segment_cycles = 0;

        match self.graph.advance(edge) {
            Some(seg) => {
                info!(
                    "Segment \"{}\" installed, target [{:.3}, {:.3}]",
                    seg.id, seg.target.x, seg.target.y
                );
                ctrl.install_target(seg);
                ctrl.set_state(NavState::Running);
                true
            }
            None => {
                info!(
                    "No segment on the {:?} edge of \"{}\", mission complete",
                    edge,
                    self.graph.current_id()
                );
                ctrl.set_state(NavState::Stopped);
                self.mission_complete = true;
                false
            }
        }
    }

    fn timed_out(&self) -> bool {
        match self.params.segment_timeout_cycles {
            Some(t) => self.segment_cycles >= t,
            None => false,
        }
    }
}

impl<T: PoseTracker> State for Autopilot<T> {
    type InitData = ();
    type InitError = ArchiveError;

    type InputData = OdomSample;
    type OutputData = WheelPowerDems;
    type StatusReport = AutopilotReport;
    type ProcError = AutopilotError;

    /// Open the cycle archive and start the mission.
    fn init(&mut self, _init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.arch = Archiver::from_path(session, "autopilot/cycle.csv")?;
        self.start();

        Ok(())
    }

    /// Perform one cycle of the autopilot.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.cycle += 1;

        // Always update the tracker, even once the mission is over, so that the encoder cache
        // stays fresh
        self.tracker.update(input_data);

        if !self.started {
            self.start();
        }

        let pose = self.tracker.pose();
        let attitude = self.tracker.attitude();

        let mut dems = WheelPowerDems::zero();
        let mut reached = false;

        if !self.mission_complete {
            self.segment_cycles += 1;
            dems = self.ctrl.tick(&pose, &attitude);
            reached = self.ctrl.report().reached;

            if reached {
                info!(
                    "Reached \"{}\" after {} cycles",
                    self.graph.current_id(),
                    self.segment_cycles
                );
                self.advance(Edge::Success);
            } else if self.timed_out() {
                warn!(
                    "Segment \"{}\" timed out after {} cycles",
                    self.graph.current_id(),
                    self.segment_cycles
                );
                dems = WheelPowerDems::zero();
                self.advance(Edge::Failure);
            }
        } else {
            self.ctrl.sync(pose, attitude);
        }

        self.report = AutopilotReport {
            cycle: self.cycle,
            segment: self.graph.current_id().to_string(),
            nav_state: self.ctrl.state(),
            reached,
            mission_complete: self.mission_complete,
            dems,
        };

        Ok((dems, self.report.clone()))
    }
}

impl<T: PoseTracker> Archived for Autopilot<T> {
    /// Archive the last cycle, does nothing if the archive was never opened.
    fn write(&mut self) -> Result<(), ArchiveError> {
        if !self.arch.is_init() {
            return Ok(());
        }

        let pose = self.tracker.pose();
        let nav = self.ctrl.report();

        self.arch.serialise(CycleRecord {
            cycle: self.report.cycle,
            segment: &self.report.segment,
            x: pose.x,
            y: pose.y,
            z: pose.z,
            heading: self.tracker.attitude().heading,
            left: self.report.dems.left,
            right: self.report.dems.right,
            nav_state: self.report.nav_state,
            direction: nav.direction,
            dist: nav.dist,
            power_adj: nav.power_adj,
            angle: nav.angle,
            reached: self.report.reached,
            mission_complete: self.report.mission_complete,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::{TankParams, TankTracker};
    use crate::path::Segment;
    use crate::sim::{EncoderLayout, SimParams, SimRobot};
    use std::f64::consts::FRAC_PI_2;

    fn sim() -> SimRobot {
        SimRobot::new(SimParams {
            track_width_u: 0.5,
            max_speed_ups: 1.0,
            dt_s: 0.02,
            ticks_per_unit: 100.0,
            encoder_layout: EncoderLayout::Tank,
            start_position: [0.0, 0.0],
            start_heading_rad: -FRAC_PI_2,
        })
    }

    fn tracker() -> TankTracker {
        TankTracker::new(TankParams {
            ticks_per_unit: 100.0,
        })
        .unwrap()
    }

    /// Two segments along world +x
    fn graph() -> PathGraph {
        PathGraph::new(vec![
            Segment::new("__start__", "a", "a", Pose::planar(2.0, 0.0)),
            Segment::new("a", "", "", Pose::planar(4.0, 0.0)),
        ])
        .unwrap()
    }

    fn run_to_completion(ap: &mut Autopilot<TankTracker>, robot: &mut SimRobot) -> Vec<String> {
        let mut visited = vec![];

        for _ in 0..5000 {
            let report = ap.run_cycle(robot).unwrap();

            if visited.last() != Some(&report.segment) {
                visited.push(report.segment.clone());
            }

            if report.mission_complete {
                break;
            }
        }

        visited
    }

    #[test]
    fn test_mission() {
        let mut robot = sim();
        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph());

        let visited = run_to_completion(&mut ap, &mut robot);

        assert!(ap.is_mission_complete());
        assert_eq!(visited, vec!["__start__", "a"]);

        let p = robot.true_pose();
        assert!((p.x - 4.0).abs() < 0.15, "{:?}", p);
        assert!(p.y.abs() < 0.15, "{:?}", p);

        // Everything after completion is zero power
        for _ in 0..10 {
            let report = ap.run_cycle(&mut robot).unwrap();
            assert!(report.dems.is_zero());
            assert!(report.mission_complete);
            assert_eq!(report.nav_state, NavState::Stopped);
        }
    }

    #[test]
    fn test_start_installs_start_segment() {
        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph());
        assert_eq!(ap.graph().current_id(), "__init__");

        ap.start();
        assert_eq!(ap.graph().current_id(), "__start__");
        assert_eq!(ap.nav_ctrl().state(), NavState::Running);
        assert_eq!(ap.nav_ctrl().target().unwrap().halfway_dist, 1.0);

        // A second start doesn't advance
        ap.start();
        assert_eq!(ap.graph().current_id(), "__start__");
    }

    #[test]
    fn test_timeout_takes_fail_edge() {
        let graph = PathGraph::new(vec![
            Segment::new("__start__", "a", "b", Pose::planar(100.0, 0.0)),
            Segment::new("a", "", "", Pose::planar(0.0, 0.0)),
            Segment::new("b", "", "", Pose::planar(100.0, 0.0)),
        ])
        .unwrap();

        let params = AutopilotParams {
            segment_timeout_cycles: Some(5),
        };
        let mut robot = sim();
        let mut ap = Autopilot::new(params, tracker(), graph);

        for _ in 0..4 {
            let report = ap.run_cycle(&mut robot).unwrap();
            assert_eq!(report.segment, "__start__");
        }

        let report = ap.run_cycle(&mut robot).unwrap();
        assert_eq!(report.segment, "b");
        assert!(report.dems.is_zero());
        assert!(!report.mission_complete);

        // b times out too, with nothing on its fail edge
        for _ in 0..5 {
            ap.run_cycle(&mut robot).unwrap();
        }
        assert!(ap.is_mission_complete());
    }

    #[test]
    fn test_fail_segment() {
        let graph = PathGraph::new(vec![
            Segment::new("__start__", "a", "b", Pose::planar(100.0, 0.0)),
            Segment::new("a", "", "", Pose::planar(1.0, 0.0)),
            Segment::new("b", "", "", Pose::planar(2.0, 0.0)),
        ])
        .unwrap();

        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph);
        ap.start();

        assert!(ap.fail_segment());
        assert_eq!(ap.graph().current_id(), "b");

        assert!(!ap.fail_segment());
        assert!(ap.is_mission_complete());
        assert!(!ap.fail_segment());
    }

    #[test]
    fn test_relocalise() {
        let mut robot = sim();
        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph());

        ap.run_cycle(&mut robot).unwrap();
        ap.relocalise(Pose::planar(1.98, 0.0));

        // Already within tolerance of the start target, so the next cycle moves on to a
        let report = ap.run_cycle(&mut robot).unwrap();
        assert!(report.reached);
        assert_eq!(report.segment, "a");
    }

    #[test]
    fn test_report_status() {
        struct Collect(Vec<String>);

        impl StatusSink for Collect {
            fn status(&mut self, source: &str, text: &str) {
                self.0.push(format!("{}: {}", source, text));
            }
        }

        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph());
        ap.start();

        let mut sink = Collect(vec![]);
        ap.report_status(&mut sink);

        assert_eq!(sink.0.len(), 2);
        assert!(sink.0[0].contains("current:  __start__"));
        assert!(sink.0[1].contains("nav state:  Running"));
    }

    #[test]
    fn test_archive() {
        let dir = std::env::temp_dir().join(format!("nav_lib_autopilot_{}", std::process::id()));
        let session = Session::new_in(&dir, "autopilot_test").unwrap();

        let mut robot = sim();
        let mut ap = Autopilot::new(AutopilotParams::default(), tracker(), graph());
        ap.init((), &session).unwrap();

        for _ in 0..3 {
            ap.run_cycle(&mut robot).unwrap();
            ap.write().unwrap();
        }

        let text = std::fs::read_to_string(session.arch_root.join("autopilot/cycle.csv")).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("cycle,segment,x,y,z,heading,left,right"));
        assert!(lines[3].starts_with("3,__start__,"));
    }
}
