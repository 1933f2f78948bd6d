//! # Odometry Equipment Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::EqptError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Absolute orientation of the robot as reported by the orientation sensor.
///
/// Angles are intrinsic Z-Y-X in radians. Heading is the rotation about the
/// vertical axis and is positive counter-clockwise.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Attitude {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// One reading of the odometry sensors.
///
/// Both encoder axes and the attitude must be sampled together so that a
/// single cycle never mixes readings from two different cycles.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct OdomSample {
    /// Cumulative encoder tick counts.
    ///
    /// For a tank drive this is `[left, right]`, for a dead reckoning pod it
    /// is `[x, y]` where the x wheel rolls along the robot's lateral axis and
    /// the y wheel along its forward axis.
    pub ticks: [i64; 2],

    /// Absolute orientation at the time of the tick reading.
    pub attitude: Attitude,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of odometry samples, e.g. the robot's encoders and IMU.
pub trait OdomSource {
    /// Read the current encoder counts and orientation.
    fn sample(&mut self) -> Result<OdomSample, EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Attitude {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    /// A level attitude with the given heading.
    pub fn from_heading(heading: f64) -> Self {
        Self {
            heading,
            ..Default::default()
        }
    }
}
