//! Termination and invariant checks evaluated between steps.

use crate::error::{SimError, SimResult};

/// Number of whole steps that fit in the time cap. A small allowance keeps
/// `500 / 0.01` from landing one step short through rounding.
pub(crate) fn max_steps(dt: f64, time_cap: f64) -> usize {
    (time_cap / dt + 1e-9).floor() as usize
}

/// The level is at or below the end level.
pub(crate) fn reached_end(level: f64, end_level: f64) -> bool {
    level <= end_level
}

/// Level drop for one step must be a finite, non-negative number.
pub(crate) fn check_drop(dh: f64) -> SimResult<f64> {
    if !dh.is_finite() {
        return Err(SimError::NonPhysical {
            what: "non-finite level change",
        });
    }
    if dh < 0.0 {
        return Err(SimError::NonPhysical {
            what: "reservoir level increased",
        });
    }
    Ok(dh)
}

/// Share of the planned level drop already drained, in [0, 1].
pub(crate) fn fraction_drained(start: f64, level: f64, end: f64) -> f64 {
    let span = start - end;
    if span <= 0.0 {
        return 1.0;
    }
    ((start - level) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_steps_covers_the_cap() {
        assert_eq!(max_steps(0.01, 500.0), 50_000);
        assert_eq!(max_steps(0.1, 0.3), 3);
        assert_eq!(max_steps(1.0, 0.5), 0);
    }

    #[test]
    fn reached_end_is_inclusive() {
        assert!(reached_end(0.02, 0.02));
        assert!(reached_end(0.019, 0.02));
        assert!(!reached_end(0.021, 0.02));
    }

    #[test]
    fn check_drop_ok() {
        assert!(check_drop(1e-4).is_ok());
        assert!(check_drop(0.0).is_ok()); // zero is allowed
    }

    #[test]
    fn check_drop_fails_on_rise() {
        assert!(matches!(
            check_drop(-1e-9),
            Err(SimError::NonPhysical {
                what: "reservoir level increased"
            })
        ));
    }

    #[test]
    fn check_drop_fails_on_nan() {
        assert!(check_drop(f64::NAN).is_err());
    }

    #[test]
    fn fraction_drained_range() {
        assert_eq!(fraction_drained(0.1, 0.1, 0.02), 0.0);
        assert!((fraction_drained(0.1, 0.06, 0.02) - 0.5).abs() < 1e-12);
        assert_eq!(fraction_drained(0.1, 0.0, 0.02), 1.0);
        assert_eq!(fraction_drained(0.02, 0.02, 0.02), 1.0);
    }
}
