//! # Navigation Executable Parameters
//!
//! This module provides parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    autopilot::AutopilotParams, loc::TrackerParams, path::SegmentDefaults, sim::SimParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavExecParams {
    pub exec: ExecParams,

    /// Which tracker to build and its parameters
    pub tracker: TrackerParams,

    #[serde(default)]
    pub segment_defaults: SegmentDefaults,

    #[serde(default)]
    pub autopilot: AutopilotParams,

    #[serde(default)]
    pub sim: SimParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecParams {
    /// Target period of one cycle. Zero runs cycles back to back.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Cycle limit after which the mission is abandoned
    pub max_cycles: u64,

    /// Path file, relative to the software root
    pub path_file: String,

    /// Number of cycles between status reports, zero disables them
    #[serde(default)]
    pub status_period_cycles: u64,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::EncoderLayout;

    #[test]
    fn test_deserialise() {
        let text = r#"
            [exec]
            cycle_period_s = 0.02
            max_cycles = 1000
            path_file = "paths/demo.csv"

            [tracker]
            kind = "Pod"
            ticks_per_unit = 50.0
            num_substeps = 8

            [autopilot]
            segment_timeout_cycles = 400

            [sim]
            track_width_u = 0.4
            max_speed_ups = 1.5
            dt_s = 0.02
            ticks_per_unit = 50.0
            encoder_layout = "pod"
        "#;

        let p: NavExecParams = toml::from_str(text).unwrap();

        assert_eq!(p.exec.max_cycles, 1000);
        assert_eq!(p.exec.status_period_cycles, 0);
        assert_eq!(p.autopilot.segment_timeout_cycles, Some(400));
        assert_eq!(p.sim.encoder_layout, EncoderLayout::Pod);
        assert!(p.segment_defaults.ramp_up);

        match p.tracker {
            TrackerParams::Pod(pod) => {
                assert_eq!(pod.num_substeps, 8);
                assert_eq!(pod.sensor_offset, [0.0; 3]);
            }
            TrackerParams::Tank(_) => panic!("Expected the pod tracker"),
        }
    }
}
