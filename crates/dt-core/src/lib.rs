//! dt-core: shared foundation for the drain-time workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (float guards, percent error)
//! - error (shared error type)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{DtError, DtResult};
pub use numeric::*;
pub use units::*;
