//! Navigation control module
//!
//! Drives the robot towards the target of the active segment with a differential power command.
//! Power is shaped against the distance to the target relative to the "halfway" distance, half the
//! distance at the moment the target was installed, so power peaks mid-segment. Steering is
//! proportional to the bearing error, and a steering error beyond a quarter turn drives in
//! reverse.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether the controller is allowed to drive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavState {
    Running,
    Stopped,
}

/// Direction the controller drove in on the last tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Idle,
}

impl Default for NavState {
    fn default() -> Self {
        NavState::Stopped
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Idle
    }
}
