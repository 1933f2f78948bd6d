//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated robot around a path file:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the path graph
//!     - Build the configured tracker
//!     - Main loop:
//!         - Odometry sampling
//!         - Autopilot processing (localisation, navigation control, path advance)
//!         - Power demand output
//!         - Archiving
//!     - Save the mission summary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use eqpt_if::eqpt::{drive::WheelPowerDems, status::LogStatusSink};
use nav_lib::{
    autopilot::Autopilot,
    loc::{PodTracker, Pose, PoseTracker, TankTracker, TrackerParams},
    params::NavExecParams,
    path::{load_path_file, PathGraph},
    sim::SimRobot,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive a simulated robot around a path.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opt {
    /// Parameter file, relative to the params directory
    #[structopt(long, default_value = "nav_exec.toml")]
    params: String,

    /// Path file to follow instead of the one in the parameters
    #[structopt(long, parse(from_os_str))]
    path: Option<PathBuf>,

    /// Cycle limit, overriding the parameters
    #[structopt(long)]
    max_cycles: Option<u64>,
}

/// Summary of a mission, saved into the session at the end of the run.
#[derive(Debug, Serialize)]
struct MissionSummary {
    tracker: &'static str,
    path_file: PathBuf,
    num_cycles: u64,
    mission_complete: bool,
    final_segment: String,
    est_pose: Pose,
    true_pose: Pose,
    true_heading: f64,
    final_dems: WheelPowerDems,
    elapsed_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Autopilot Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: NavExecParams =
        util::params::load(&opt.params).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD PATH ----

    let path_file = match opt.path {
        Some(p) => p,
        None => host::get_sw_root()
            .wrap_err("Could not find the software root")?
            .join(&params.exec.path_file),
    };

    let graph = load_path_file(&path_file, &params.segment_defaults)
        .wrap_err_with(|| format!("Could not load the path file {:?}", path_file))?;

    for seg in graph.segments() {
        debug!(
            "    {} -> success: \"{}\", fail: \"{}\"",
            seg.id, seg.success, seg.fail
        );
    }

    let max_cycles = opt.max_cycles.unwrap_or(params.exec.max_cycles);

    // ---- RUN ----

    let mut summary = match params.tracker {
        TrackerParams::Tank(ref p) => {
            let tracker = TankTracker::new(p.clone()).wrap_err("Invalid tank tracker params")?;
            run_mission("tank", tracker, graph, &params, max_cycles, &session)?
        }
        TrackerParams::Pod(ref p) => {
            let tracker = PodTracker::new(p.clone()).wrap_err("Invalid pod tracker params")?;
            run_mission("pod", tracker, graph, &params, max_cycles, &session)?
        }
    };
    summary.path_file = path_file;

    session
        .save_json("mission_summary.json", &summary)
        .wrap_err("Could not save the mission summary")?;

    info!(
        "End of execution after {} cycles, mission {}",
        summary.num_cycles,
        if summary.mission_complete {
            "complete"
        } else {
            "incomplete"
        }
    );

    Ok(())
}

/// Run the autopilot against the simulated robot until the mission completes or the cycle limit
/// is hit.
fn run_mission<T: PoseTracker>(
    tracker_name: &'static str,
    tracker: T,
    graph: PathGraph,
    params: &NavExecParams,
    max_cycles: u64,
    session: &Session,
) -> Result<MissionSummary, Report> {
    let mut robot = SimRobot::new(params.sim.clone());
    let mut autopilot = Autopilot::new(params.autopilot.clone(), tracker, graph);
    let mut status_sink = LogStatusSink;

    autopilot
        .init((), session)
        .wrap_err("Failed to initialise the Autopilot")?;
    info!("Autopilot init complete, using the {} tracker", tracker_name);

    let cycle_period = Duration::from_secs_f64(params.exec.cycle_period_s.max(0.0));
    let status_period = params.exec.status_period_cycles;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut mission_complete = false;

    while autopilot.cycle() < max_cycles {
        let cycle_start_instant = Instant::now();

        let report = autopilot
            .run_cycle(&mut robot)
            .wrap_err("Autopilot cycle failed")?;

        if let Err(e) = autopilot.write() {
            warn!("Could not archive the Autopilot: {}", e);
        }

        if status_period > 0 && report.cycle % status_period == 0 {
            autopilot.report_status(&mut status_sink);
        }

        if report.mission_complete {
            mission_complete = true;
            info!("Mission complete on cycle {}", report.cycle);
            break;
        }

        // Sleep for the rest of the cycle
        if let Some(d) = cycle_period.checked_sub(cycle_start_instant.elapsed()) {
            thread::sleep(d);
        }
    }

    if !mission_complete {
        warn!(
            "Cycle limit of {} reached before the mission completed",
            max_cycles
        );
    }

    autopilot.report_status(&mut status_sink);

    Ok(MissionSummary {
        tracker: tracker_name,
        path_file: PathBuf::new(),
        num_cycles: autopilot.cycle(),
        mission_complete,
        final_segment: autopilot.graph().current_id().to_string(),
        est_pose: autopilot.pose(),
        true_pose: robot.true_pose(),
        true_heading: robot.true_heading(),
        final_dems: robot.dems(),
        elapsed_s: session::get_elapsed_seconds(),
    })
}
