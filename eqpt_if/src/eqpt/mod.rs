//! # Equipment Interface
//!
//! This module defines the interface structures passed between the navigation
//! software and the robot's equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod odom;
pub mod status;
