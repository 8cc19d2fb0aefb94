//! dt-hydraulics: tube hydraulics for the bin drain model.
//!
//! Provides:
//! - Geometry, fluid and minor-loss configuration with validation
//! - Darcy friction coefficient with laminar/turbulent switching and a
//!   bounded Colebrook-White root-find
//! - One-step outlet velocity and level update from the energy balance
//!
//! Everything here is a pure function of its inputs; the transient loop that
//! owns state lives in `dt-sim`.
//!
//! # Example
//!
//! ```
//! use dt_core::units::{kg_per_m3, m, m2, mps2, pa_s};
//! use dt_hydraulics::{
//!     DarcyFriction, FluidProperties, FrictionModel, Geometry, LossConfig, step_flow,
//! };
//!
//! let geometry = Geometry {
//!     tube_diameter: m(0.00794),
//!     tube_length: m(0.2),
//!     incline_sin: 1.0 / 150.0,
//!     roughness: m(0.75 * 0.00794),
//!     reservoir_area: m2(0.0832),
//!     start_level: m(0.10),
//!     end_level: m(0.02),
//! };
//! let fluid = FluidProperties {
//!     density: kg_per_m3(998.23),
//!     viscosity: pa_s(1.0005e-3),
//!     gravity: mps2(9.81),
//! };
//! let losses = LossConfig { k_entry: 0.5, k_t_joint: 1.0, with_t_joint: false };
//!
//! let step = step_flow(0.10, 0.0, 1.0, 0.01, &geometry, &fluid, &losses).unwrap();
//! let friction = DarcyFriction::default()
//!     .resolve(step.v2, &geometry, &fluid, 1.0)
//!     .unwrap();
//! assert!(friction.f > 0.0);
//! ```

pub mod common;
pub mod error;
pub mod flow;
pub mod friction;
pub mod geometry;

// Re-exports
pub use error::{HydraulicsError, HydraulicsResult};
pub use flow::{FlowUpdate, outlet_velocity, step_flow};
pub use friction::{
    ColebrookSolution, ColebrookSolver, ConstantFriction, DarcyFriction, FlowRegime,
    FrictionModel, FrictionResolution, LAMINAR_LIMIT_RE, colebrook_residual, laminar_friction,
    reynolds_number,
};
pub use geometry::{FluidProperties, Geometry, LossConfig};
