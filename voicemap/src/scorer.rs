use crate::coefficients::CoefficientMap;
use crate::features::{Feature, LiveFeatureWindow, LiveFeatures};
use crate::mapping::clamp01;

/// Output of [`score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    /// Weighted sum over the available features.
    pub raw: f64,
    /// Logistic of `raw`, in `[0, 1]`.
    pub probability: f32,
    /// Number of coefficients that contributed to `raw`.
    pub used: usize,
}

/// Scores a live window against the model weights.
///
/// Only coefficients whose feature has a finite live value contribute;
/// the others are skipped entirely. The result does not depend on the
/// iteration order of `coefficients` beyond floating-point rounding.
pub fn score(coefficients: &CoefficientMap, window: &LiveFeatureWindow) -> ScoreResult {
    let live = LiveFeatures::from_window(window);

    let mut raw = 0.0;
    let mut used = 0;
    for (name, weight) in coefficients.iter() {
        let Some(value) = Feature::from_name(name).and_then(|f| f.value(&live)) else {
            continue;
        };
        if value.is_finite() && weight.is_finite() {
            raw += weight * value;
            used += 1;
        }
    }

    ScoreResult {
        raw,
        probability: clamp01(logistic(raw) as f32),
        used,
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
