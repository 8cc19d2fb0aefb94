//! Shared application service layer for the drain-time simulator.
//!
//! Holds the canonical experiment definition and the services the CLI calls:
//! single trials, comparison against measured drain times, tube-length
//! sweeps and series queries.

pub mod error;
pub mod experiment;
pub mod metrics;
pub mod progress;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use experiment::{BIN_DRAIN_V1, ExperimentConfig, Measurement};
pub use metrics::{ComparisonRow, ComparisonSummary, comparison_row, summarize};
pub use progress::{DrainStepProgress, RunProgressEvent, RunStage};
pub use query::{RunSummary, extract_series, get_run_summary, height_series, records_to_csv};
pub use run_service::{
    RunTimingSummary, SweepPoint, TrialReport, TrialResponse, compare_measured, run_trial,
    run_trial_with_progress, sweep_average_velocity, sweep_lengths,
};
