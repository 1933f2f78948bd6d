//! # Equipment interface crate.
//!
//! Provides the interfaces between the navigation software and the robot's
//! equipment: the odometry sensors it reads, the drive it commands, and the
//! status display it reports to.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data and traits for equipment (sensors and actuators)
pub mod eqpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by equipment implementations.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Actuator rejected the demands: {0}")]
    ActuatorRejected(String),
}
