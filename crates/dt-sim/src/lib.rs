//! Transient drain simulation for a bin emptying through an inclined tube.
//!
//! Provides:
//! - `DrainSimulator`: owns the flow state of one run and advances it with a
//!   fixed step, resolving friction from the previous step's outlet velocity
//! - Termination on end level (`Converged`), time cap (`TimedOut`) or a
//!   step failure (`Failed`), with the recorded series in every case
//! - Optional per-step progress observer with cooperative cancellation

pub mod error;
pub mod sim;
pub mod state;

// Internal modules
mod events;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use sim::{
    DrainOptions, DrainOutcome, DrainProgress, DrainRecord, DrainSimulator, ProgressObserver,
    StepFailure, TerminalState, run_drain, run_drain_with_progress,
};
pub use state::FlowState;
