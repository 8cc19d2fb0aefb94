//! Float guards shared by the validation code.

use crate::{DtError, DtResult};

pub fn ensure_finite(v: f64, what: &'static str) -> DtResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DtError::NonFinite { what, value: v })
    }
}

/// Accept only finite, strictly positive values.
pub fn ensure_positive(v: f64, what: &'static str) -> DtResult<f64> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(DtError::NonPositive { what, value: v })
    }
}

/// Accept only finite values that are zero or greater.
pub fn ensure_non_negative(v: f64, what: &'static str) -> DtResult<f64> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(DtError::NonPositive { what, value: v })
    }
}

/// Signed percent difference of `predicted` relative to `reference`.
///
/// Returns `None` when the reference is zero or either input is not finite.
pub fn percent_error(predicted: f64, reference: f64) -> Option<f64> {
    if !predicted.is_finite() || !reference.is_finite() || reference == 0.0 {
        return None;
    }
    Some((predicted - reference) / reference * 100.0)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn positive_values_pass_through(v in 1e-12_f64..1e12) {
            prop_assert_eq!(ensure_positive(v, "v").unwrap(), v);
        }
    }
}
