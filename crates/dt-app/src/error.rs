//! Error types for the dt-app service layer.

/// Application error type that wraps errors from the simulation crates and
/// provides one error interface for the CLI.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("Invalid experiment configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Simulation error: {0}")]
    Simulation(#[from] dt_sim::SimError),

    #[error("Hydraulics error: {0}")]
    Hydraulics(#[from] dt_hydraulics::HydraulicsError),
}

/// Result type for dt-app operations.
pub type AppResult<T> = Result<T, AppError>;
