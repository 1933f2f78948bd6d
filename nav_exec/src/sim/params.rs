//! Parameters structure for the simulated robot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // ---- GEOMETRY ----
    /// Distance between the left and right wheels.
    ///
    /// Units: distance units
    pub track_width_u: f64,

    // ---- CAPABILITIES ----
    /// Wheel speed at a power demand of 1.0.
    ///
    /// Units: distance units/second
    pub max_speed_ups: f64,

    /// Time advanced by each sample.
    ///
    /// Units: seconds
    pub dt_s: f64,

    // ---- ENCODERS ----
    /// Encoder counts per distance unit travelled by a wheel.
    pub ticks_per_unit: f64,

    /// Which wheels the encoder counts are reported for.
    pub encoder_layout: EncoderLayout,

    // ---- INITIAL STATE ----
    /// Starting position `[x, y]`.
    ///
    /// Units: distance units
    #[serde(default)]
    pub start_position: [f64; 2],

    /// Starting heading, counter-clockwise positive, zero facing world +y.
    ///
    /// Units: radians
    #[serde(default)]
    pub start_heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Encoder arrangement of the simulated robot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderLayout {
    /// `[left, right]` drive wheel encoders
    Tank,

    /// `[x, y]` perpendicular dead reckoning wheels mounted at the reference point
    Pod,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            track_width_u: 0.5,
            max_speed_ups: 1.0,
            dt_s: 0.05,
            ticks_per_unit: 100.0,
            encoder_layout: EncoderLayout::Tank,
            start_position: [0.0, 0.0],
            start_heading_rad: 0.0,
        }
    }
}
