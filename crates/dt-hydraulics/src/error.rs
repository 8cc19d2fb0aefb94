//! Error types for hydraulic calculations.

use thiserror::Error;

/// Errors that can occur while evaluating the tube hydraulics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydraulicsError {
    #[error("Invalid geometry: {what} = {value}")]
    InvalidGeometry { what: &'static str, value: f64 },

    #[error("Invalid argument: {what} = {value}")]
    InvalidArg { what: &'static str, value: f64 },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error(
        "Friction solve diverged at Re = {reynolds:.1} after {iterations} iterations (residual {residual:e})"
    )]
    FrictionSolveDivergence {
        reynolds: f64,
        iterations: usize,
        residual: f64,
    },
}

pub type HydraulicsResult<T> = Result<T, HydraulicsError>;
