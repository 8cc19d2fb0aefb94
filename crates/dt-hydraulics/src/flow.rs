//! One-step flow update from the energy balance between the reservoir surface
//! and the tube outlet.
//!
//! ```text
//! v2 = sqrt( (2·g·h + v1²) / (1 + K/g + f·L/(g·D)) )
//! ```
//!
//! `h` is the driving head above the outlet, `K` the sum of the active minor
//! loss coefficients and `f` the Darcy friction coefficient for the step.

use crate::common::check_finite;
use crate::error::{HydraulicsError, HydraulicsResult};
use crate::geometry::{FluidProperties, Geometry, LossConfig};

/// Result of advancing the flow by one time step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowUpdate {
    /// Outlet velocity (m/s)
    pub v2: f64,
    /// Volume drained during the step (m³)
    pub dv: f64,
    /// Drop in reservoir level during the step (m)
    pub dh: f64,
    /// Inlet velocity carried into the next step, `dh/dt` (m/s)
    pub v1_next: f64,
}

/// Outlet velocity from the loss-augmented Bernoulli balance.
pub fn outlet_velocity(
    v1: f64,
    driving_head: f64,
    friction: f64,
    geometry: &Geometry,
    fluid: &FluidProperties,
    losses: &LossConfig,
) -> HydraulicsResult<f64> {
    let g = fluid.gravity.value;
    let numerator = v1 * v1 + 2.0 * g * driving_head;
    let denominator = 1.0
        + losses.k_total() / g
        + friction * geometry.tube_length.value / (g * geometry.tube_diameter.value);

    if denominator <= 0.0 {
        return Err(HydraulicsError::NonPhysical {
            what: "energy balance denominator",
        });
    }
    // No head left means no flow; the balance never drives water back up.
    if numerator <= 0.0 {
        return Ok(0.0);
    }
    check_finite((numerator / denominator).sqrt(), "outlet velocity")
}

/// Advance the flow one step of `dt` seconds from the current reservoir
/// level and inlet velocity. Does not mutate anything; the caller applies the
/// returned decrements.
pub fn step_flow(
    level: f64,
    v1: f64,
    friction: f64,
    dt: f64,
    geometry: &Geometry,
    fluid: &FluidProperties,
    losses: &LossConfig,
) -> HydraulicsResult<FlowUpdate> {
    let head = geometry.driving_head(level);
    let v2 = outlet_velocity(v1, head, friction, geometry, fluid, losses)?;

    let dv = check_finite(v2 * geometry.pipe_area() * dt, "drained volume")?;
    let dh = dv / geometry.reservoir_area.value;

    Ok(FlowUpdate {
        v2,
        dv,
        dh,
        v1_next: dh / dt,
    })
}
