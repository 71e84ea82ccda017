//! Deterministic float ordering for sorting and keys.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Prefer this any time you sort floats or use them in ordered keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Wraps a longitude in degrees into `[-180, 180)`.
pub fn wrap_longitude_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64, wrap_longitude_deg};
    use core::cmp::Ordering;

    #[test]
    fn negative_zero_sorts_equal() {
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert!(canonical_f64(f64::NAN).is_nan());
    }

    #[test]
    fn wraps_longitudes() {
        assert_eq!(wrap_longitude_deg(190.0), -170.0);
        assert_eq!(wrap_longitude_deg(-190.0), 170.0);
        assert_eq!(wrap_longitude_deg(45.0), 45.0);
    }
}
