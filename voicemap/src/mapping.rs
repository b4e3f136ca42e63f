//! Stateless transforms from model probability to map coordinate.
//!
//! All functions take and return values in `[0, 1]` and clamp their output.
//! They compose as:
//!
//! ```text
//! probability -> calibrate(scale, bias) -> map_to_anchors(predicts) -> apply_gain -> x
//! ```

/// Clamps `x` to `[0, 1]`. NaN maps to 0.
pub fn clamp01(x: f32) -> f32 {
    if x > 0.0 {
        x.min(1.0)
    } else {
        0.0
    }
}

/// Recenters `x` around 0.5, scales the distance by `scale` and shifts by
/// `bias`.
pub fn calibrate(x: f32, scale: f32, bias: f32) -> f32 {
    clamp01(0.5 + scale * (x - 0.5) + bias)
}

/// Interpolates between the male and female anchors.
///
/// `probability` is P(`predicts`). The map runs from male (low x) to female
/// (high x), so when the model predicts "male" (case-insensitive) the
/// probability is inverted first. The anchors may be in either order; the
/// result moves from `male_x` towards `female_x` as the female likelihood
/// grows.
pub fn map_to_anchors(probability: f32, predicts: &str, male_x: f32, female_x: f32) -> f32 {
    let p = if predicts.eq_ignore_ascii_case("male") {
        1.0 - probability
    } else {
        probability
    };
    clamp01(male_x + p * (female_x - male_x))
}

/// Expands `x` symmetrically around 0.5 by `gain`.
pub fn apply_gain(x: f32, gain: f32) -> f32 {
    clamp01(0.5 + gain * (x - 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALE_X: f32 = 0.27;
    const FEMALE_X: f32 = 0.72;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(f32::NAN), 0.0);
    }

    #[test]
    fn calibrate_expands_around_mid() {
        assert!((calibrate(0.60, 2.0, 0.0) - 0.70).abs() < 1e-3);
        assert_eq!(calibrate(0.9, 30.0, 0.0), 1.0);
        assert_eq!(calibrate(0.1, 30.0, 0.0), 0.0);
    }

    #[test]
    fn calibrate_identity_and_range() {
        for &x in &[-0.3f32, 0.0, 0.2, 0.5, 0.99, 1.0, 1.7] {
            assert!((calibrate(x, 1.0, 0.0) - clamp01(x)).abs() < 1e-6);
        }
        for &scale in &[-50.0f32, -1.0, 0.0, 0.5, 3.0, 100.0] {
            for &bias in &[-2.0f32, -0.1, 0.0, 0.3, 5.0] {
                for &x in &[0.0f32, 0.1, 0.5, 0.77, 1.0] {
                    let y = calibrate(x, scale, bias);
                    assert!((0.0..=1.0).contains(&y), "calibrate({x},{scale},{bias}) = {y}");
                }
            }
        }
    }

    #[test]
    fn map_to_anchors_inverts_for_male() {
        assert!((map_to_anchors(0.35, "male", MALE_X, FEMALE_X) - 0.5625).abs() < 1e-3);
        assert!((map_to_anchors(0.35, "MALE", MALE_X, FEMALE_X) - 0.5625).abs() < 1e-3);
        assert!((map_to_anchors(0.35, "female", MALE_X, FEMALE_X) - 0.4275).abs() < 1e-3);
    }

    #[test]
    fn map_to_anchors_monotonic() {
        let mut prev = map_to_anchors(0.0, "female", MALE_X, FEMALE_X);
        for i in 1..=20 {
            let x = map_to_anchors(i as f32 / 20.0, "female", MALE_X, FEMALE_X);
            assert!(x > prev);
            prev = x;
        }
        // Reversed anchors: decreasing.
        let lo = map_to_anchors(0.2, "female", 0.8, 0.3);
        let hi = map_to_anchors(0.8, "female", 0.8, 0.3);
        assert!(hi < lo);
    }

    #[test]
    fn map_to_anchors_stays_between_anchors() {
        let x = map_to_anchors(0.35, "male", MALE_X, FEMALE_X);
        assert!(x >= MALE_X && x <= FEMALE_X);
        assert!((x - FEMALE_X).abs() < (x - MALE_X).abs());
    }

    #[test]
    fn apply_gain_expands_and_clamps() {
        assert!((apply_gain(0.6, 2.0) - 0.70).abs() < 1e-3);
        assert_eq!(apply_gain(0.99, 5.0), 1.0);
        assert_eq!(apply_gain(0.5, 10.0), 0.5);
    }

    #[test]
    fn end_to_end_chain() {
        let cal = calibrate(0.35, 30.0, 0.0);
        assert!(cal < 1e-6);
        let mapped = map_to_anchors(cal, "male", MALE_X, FEMALE_X);
        assert!((mapped - FEMALE_X).abs() < 1e-3);
        let gained = apply_gain(mapped, 1.95);
        assert!(gained >= mapped);
    }
}
