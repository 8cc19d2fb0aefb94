//! Common utilities for hydraulic calculations.

use crate::error::{HydraulicsError, HydraulicsResult};
use dt_core::numeric::{ensure_finite, ensure_non_negative, ensure_positive};

/// Ensure a value is finite, returning HydraulicsError if not.
pub fn check_finite(value: f64, what: &'static str) -> HydraulicsResult<f64> {
    ensure_finite(value, what).map_err(|_| HydraulicsError::NonPhysical { what })
}

/// Ensure a geometric dimension is finite and strictly positive.
pub fn check_dimension(value: f64, what: &'static str) -> HydraulicsResult<f64> {
    ensure_positive(value, what).map_err(|_| HydraulicsError::InvalidGeometry { what, value })
}

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> HydraulicsResult<f64> {
    ensure_positive(value, what).map_err(|_| HydraulicsError::InvalidArg { what, value })
}

/// Ensure a parameter is finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> HydraulicsResult<f64> {
    ensure_non_negative(value, what).map_err(|_| HydraulicsError::InvalidArg { what, value })
}

/// Cross-sectional area of a circular tube of diameter `d` (m²).
pub fn circle_area(d: f64) -> f64 {
    std::f64::consts::PI * d * d / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_dimension() {
        assert_eq!(check_dimension(0.2, "length").unwrap(), 0.2);
        assert_eq!(
            check_dimension(0.0, "length"),
            Err(HydraulicsError::InvalidGeometry {
                what: "length",
                value: 0.0
            })
        );
        assert!(check_dimension(f64::NAN, "length").is_err());
    }

    #[test]
    fn test_check_non_negative() {
        assert!(check_non_negative(0.0, "k").is_ok());
        assert!(matches!(
            check_non_negative(-0.5, "k"),
            Err(HydraulicsError::InvalidArg { what: "k", .. })
        ));
    }

    #[test]
    fn test_circle_area() {
        let a = circle_area(2.0);
        assert!((a - std::f64::consts::PI).abs() < 1e-15);
    }
}
