//! Cyclic module interface
//!
//! A cyclic module is initialised once against the run's session and then processed once per
//! control cycle, taking that cycle's input and returning its output along with a status report.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// State of a cyclic module.
pub trait State {
    /// Passed to `init`, for instance a parameter file name.
    type InitData;
    type InitError;

    /// Consumed by each cycle.
    type InputData;

    /// Produced by each cycle, for the next module in the chain.
    type OutputData;

    /// Produced by each cycle for telemetry and archiving.
    type StatusReport;
    type ProcError;

    /// Prepare the module for its first cycle.
    ///
    /// Modules which archive open their archive files under the session here.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
