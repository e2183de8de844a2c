//! Numeric helpers shared by filters, histograms and moments.

/// Denominators with a magnitude below this are treated as zero.
pub(crate) const DIV_EPSILON: f64 = 1e-12;

/// Divides `num / den`, returning 0 when `den` is (near) zero.
#[inline]
pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if den.abs() < DIV_EPSILON {
        0.0
    } else {
        num / den
    }
}

/// Clamps a value to `[0, 1]`; NaN maps to 0.
#[inline]
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Converts a unit-range channel value to a byte with rounding.
#[inline]
pub(crate) fn unit_to_byte(value: f32) -> u8 {
    (clamp01(value as f64) * 255.0).round() as u8
}

/// Wraps an orientation in radians to degrees in `[0, 180)`.
pub(crate) fn orientation_deg(radians: f32) -> f32 {
    let mut wrapped = radians.to_degrees() % 180.0;
    if wrapped < 0.0 {
        wrapped += 180.0;
    }
    if wrapped >= 180.0 {
        wrapped -= 180.0;
    }
    wrapped
}

/// Quantizes an orientation in radians to one of four 45 degree buckets.
pub(crate) fn orientation_bucket(radians: f32) -> usize {
    let deg = orientation_deg(radians);
    ((deg / 45.0).round() as usize) % 4
}

/// Derives an odd kernel size covering three standard deviations.
pub(crate) fn odd_size_for_sigma(sigma: f64) -> usize {
    let size = (3.0 * sigma).ceil().max(1.0) as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp01, odd_size_for_sigma, orientation_bucket, orientation_deg, safe_div};
    use std::f32::consts::PI;

    #[test]
    fn safe_div_returns_zero_for_zero_denominator() {
        assert_eq!(safe_div(3.0, 0.0), 0.0);
        assert_eq!(safe_div(3.0, 1e-15), 0.0);
        assert!((safe_div(3.0, 2.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn clamp01_handles_nan_and_overshoot() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
    }

    #[test]
    fn orientation_wraps_into_half_turn() {
        assert!((orientation_deg(-PI / 2.0) - 90.0).abs() < 1e-4);
        assert!(orientation_deg(PI).abs() < 1e-4);
        assert!((orientation_deg(-PI / 4.0) - 135.0).abs() < 1e-4);
    }

    #[test]
    fn orientation_bucket_rounds_to_nearest_direction() {
        assert_eq!(orientation_bucket(0.0), 0);
        assert_eq!(orientation_bucket(PI / 4.0), 1);
        assert_eq!(orientation_bucket(PI / 2.0), 2);
        assert_eq!(orientation_bucket(3.0 * PI / 4.0), 3);
        // 170 degrees rounds up to 180 which folds back onto 0.
        assert_eq!(orientation_bucket(170f32.to_radians()), 0);
    }

    #[test]
    fn odd_size_rounds_up_to_odd() {
        assert_eq!(odd_size_for_sigma(1.0), 3);
        assert_eq!(odd_size_for_sigma(1.2), 5);
        assert_eq!(odd_size_for_sigma(2.0), 7);
        assert_eq!(odd_size_for_sigma(0.1), 1);
    }
}
