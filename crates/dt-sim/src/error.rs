//! Error types for simulation operations.

use dt_hydraulics::HydraulicsError;
use thiserror::Error;

/// Errors encountered while setting up or running a drain simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid geometry: {what} = {value}")]
    InvalidGeometry { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(
        "Friction solve diverged at Re = {reynolds:.1} after {iterations} iterations (residual {residual:e})"
    )]
    FrictionSolveDivergence {
        reynolds: f64,
        iterations: usize,
        residual: f64,
    },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Drainage did not reach the end level within {time_cap_s} s (level {level_m:.4} m)")]
    SafetyTimeoutExceeded { time_cap_s: f64, level_m: f64 },

    #[error("Run cancelled at t = {time_s} s")]
    Cancelled { time_s: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<HydraulicsError> for SimError {
    fn from(e: HydraulicsError) -> Self {
        match e {
            HydraulicsError::InvalidGeometry { what, value } => {
                SimError::InvalidGeometry { what, value }
            }
            HydraulicsError::InvalidArg { what, .. } => SimError::InvalidArg { what },
            HydraulicsError::NonPhysical { what } => SimError::NonPhysical { what },
            HydraulicsError::FrictionSolveDivergence {
                reynolds,
                iterations,
                residual,
            } => SimError::FrictionSolveDivergence {
                reynolds,
                iterations,
                residual,
            },
        }
    }
}
