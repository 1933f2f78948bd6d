//! Host platform utility functions

use std::path::PathBuf;

/// Environment variable pointing at the root of the software tree.
pub const SW_ROOT_ENV_VAR: &str = "AUTOPILOT_SW_ROOT";

/// Get the root directory of the software tree.
///
/// Parameter files are stored under `<root>/params` and sessions are created
/// under `<root>/<sessions_dir>`.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
