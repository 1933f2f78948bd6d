//! # Path graph module
//!
//! A mission is a directed graph of named segments. Each segment is a target position plus the
//! tuning the navigation controller should use to drive to it, and two outgoing edges naming the
//! segment to move to when the target is reached (`success`) or abandoned (`fail`).
//!
//! Two names are reserved: the graph starts at the `__init__` pseudo-node, and the first advance
//! in either direction moves to the `__start__` segment, which every path must define. An edge to
//! a name with no segment ends the mission along that branch.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod graph;
mod loader;
mod params;

pub use graph::{Edge, PathGraph};
pub use loader::*;
pub use params::SegmentDefaults;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the pseudo-node the graph cursor starts on.
pub const INIT_SEGMENT_ID: &str = "__init__";

/// Name of the segment the first advance moves to.
pub const START_SEGMENT_ID: &str = "__start__";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-axis tolerance used to decide that a target has been reached.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyThreshold {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A node of the path graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique name of the segment
    pub id: String,

    /// Segment to move to once the target is reached
    pub success: String,

    /// Segment to move to if the target is abandoned
    pub fail: String,

    /// Target position, `z` is always zero for segments read from a path file.
    pub target: Pose,

    /// Target orientation in radians. Carried for information, it is not a stopping criterion.
    pub orientation_target: f64,

    /// Scales the power adjustment against the distance from the halfway point.
    pub nav_gain: f64,

    /// Scales the differential steering term against the bearing error.
    pub steering_gain: f64,

    /// Base power, the highest power the ramp will command.
    pub max_power: f64,

    /// Lowest power the ramp will reduce to, before steering is added.
    pub min_power: f64,

    /// Largest orientation correction, informational.
    pub orientation_max: f64,

    /// Enables stopping on orientation, informational.
    pub use_orientation: bool,

    /// Reduce power while further than halfway to the target.
    pub ramp_up: bool,

    /// Modulate power once closer than halfway to the target.
    pub ramp_down: bool,

    /// Reach test tolerance
    pub accuracy: AccuracyThreshold,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot read the path file: {0}")]
    Io(std::io::Error),

    #[error("Cannot parse the path file as CSV: {0}")]
    Csv(csv::Error),

    #[error("Header line \"{0}\" indicates the path file is unparseable, is it of the correct format?")]
    BadHeader(String),

    #[error("Unparseable segment on line {line}: {reason}")]
    BadRow { line: u64, reason: String },

    #[error("Segment \"{0}\" is defined more than once")]
    DuplicateSegment(String),

    #[error("The path has no \"__start__\" segment")]
    NoStartSegment,

    #[error("Segment name \"{0}\" is reserved")]
    ReservedSegmentId(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AccuracyThreshold {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.1,
            z: 0.1,
        }
    }
}

impl AccuracyThreshold {
    pub fn uniform(tolerance: f64) -> Self {
        Self {
            x: tolerance,
            y: tolerance,
            z: tolerance,
        }
    }
}

impl Segment {
    /// Create a segment with the default tuning, which can then be adjusted field by field.
    ///
    /// The defaults drive at 0.5 power ramping down to 0.1, with both ramps enabled and a 0.1
    /// reach tolerance on every axis.
    pub fn new(id: &str, success: &str, fail: &str, target: Pose) -> Self {
        let defaults = SegmentDefaults::default();

        Self {
            id: id.to_string(),
            success: success.to_string(),
            fail: fail.to_string(),
            target,
            orientation_target: 0.0,
            nav_gain: 0.05,
            steering_gain: 0.1,
            max_power: 0.5,
            min_power: 0.1,
            orientation_max: 0.0,
            use_orientation: false,
            ramp_up: defaults.ramp_up,
            ramp_down: defaults.ramp_down,
            accuracy: defaults.accuracy,
        }
    }
}
