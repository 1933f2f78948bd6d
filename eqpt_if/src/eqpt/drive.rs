//! # Drive Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::EqptError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Power demands for a differential drive.
///
/// Powers are nominally in [-1, 1]. Only the upper bound is enforced by the
/// navigation controller, so drivers should saturate the lower bound.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct WheelPowerDems {
    pub left: f64,
    pub right: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which accepts drive power demands, e.g. the motor controllers.
pub trait PowerSink {
    /// Apply the demands to the left and right drive actuators.
    fn apply(&mut self, dems: &WheelPowerDems) -> Result<(), EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WheelPowerDems {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Demands which stop both wheels.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}
