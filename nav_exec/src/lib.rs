//! # Navigation library.
//!
//! This library allows the `nav_exec` binary, benchmarks, and other crates in the workspace to
//! access the navigation stack.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autopilot - the host cycle tying localisation, the path graph and navigation control together
pub mod autopilot;

/// Localisation module - integrates odometry into the robot's pose
pub mod loc;

/// Navigation control module - converts the active target and pose into wheel powers
pub mod nav_ctrl;

/// Executable parameters
pub mod params;

/// Path graph module - the mission as a graph of named segments
pub mod path;

/// Simulation - a kinematic differential drive robot standing in for the real equipment
pub mod sim;

/// Homogeneous transform maths used by localisation
pub mod transform;
