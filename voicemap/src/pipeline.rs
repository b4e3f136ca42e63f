//! Full mapping from a live window to a point on the voice map.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anchors::AnchorGeometry;
use crate::coefficients::CoefficientMap;
use crate::context::VoiceMapContext;
use crate::ellipse::{EllipseScheme, VoiceClass};
use crate::features::LiveFeatureWindow;
use crate::mapping::{apply_gain, calibrate, map_to_anchors};
use crate::pitch::PitchAxis;
use crate::scorer::{score, ScoreResult};
use crate::VoicemapError;

/// Tuning of the calibration chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Expansion of the probability around 0.5 (default: 1.0).
    pub scale: f32,
    /// Shift applied after scaling (default: 0.0).
    pub bias: f32,
    /// Final expansion of x around 0.5 (default: 1.0).
    pub gain: f32,
    /// Class whose probability the model outputs (default: "male").
    pub predicts: String,
    /// F0 mapped to y = 0 (default: 80 Hz).
    pub pitch_min_hz: f32,
    /// F0 mapped to y = 1 (default: 300 Hz).
    pub pitch_max_hz: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            bias: 0.0,
            gain: 1.0,
            predicts: "male".to_string(),
            pitch_min_hz: 80.0,
            pitch_max_hz: 300.0,
        }
    }
}

impl MapperConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, VoicemapError> {
        let cfg: Self =
            serde_json::from_slice(data).map_err(|e| VoicemapError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(data: &[u8]) -> Result<Self, VoicemapError> {
        let cfg: Self =
            serde_yaml::from_slice(data).map_err(|e| VoicemapError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a JSON or YAML config file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self, VoicemapError> {
        let name = path.display().to_string();
        let data = std::fs::read(path)
            .map_err(|source| VoicemapError::ResourceUnavailable { name: name.clone(), source })?;
        match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
            "json" => Self::from_json(&data),
            "yaml" | "yml" => Self::from_yaml(&data),
            ext => Err(VoicemapError::Config(format!(
                "unsupported config format {ext:?}: {name}"
            ))),
        }
    }

    /// Rejects non-finite parameters and unknown classes.
    pub fn validate(&self) -> Result<(), VoicemapError> {
        for (field, v) in [
            ("scale", self.scale),
            ("bias", self.bias),
            ("gain", self.gain),
            ("pitch_min_hz", self.pitch_min_hz),
            ("pitch_max_hz", self.pitch_max_hz),
        ] {
            if !v.is_finite() {
                return Err(VoicemapError::Config(format!("{field} must be finite")));
            }
        }
        let known = ["male", "female"];
        if !known.iter().any(|c| self.predicts.eq_ignore_ascii_case(c)) {
            return Err(VoicemapError::Config(format!(
                "predicts must be \"male\" or \"female\", got {:?}",
                self.predicts
            )));
        }
        Ok(())
    }
}

/// Result of [`VoiceMapper::map`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOutcome {
    pub score: ScoreResult,
    /// Probability after scale and bias.
    pub calibrated: f32,
    /// Horizontal position in `[0, 1]`, male side low.
    pub x: f32,
    /// Vertical position from pitch; `None` without voiced samples.
    pub y: Option<f32>,
    /// Nearest ellipse; `None` without anchors or pitch.
    pub class: Option<VoiceClass>,
}

/// Maps live windows to voice-map coordinates.
///
/// Without anchor geometry the horizontal axis runs from 0 (male) to 1
/// (female) and no class is assigned.
pub struct VoiceMapper {
    config: MapperConfig,
    coefficients: CoefficientMap,
    anchors: Option<AnchorGeometry>,
    scheme: Option<EllipseScheme>,
    pitch: PitchAxis,
}

impl VoiceMapper {
    pub fn new(config: MapperConfig, ctx: &VoiceMapContext) -> Self {
        let anchors = ctx.anchors().cloned();
        let scheme = anchors.as_ref().map(EllipseScheme::from_geometry);
        let pitch = PitchAxis::new(config.pitch_min_hz, config.pitch_max_hz);
        debug!(
            coefficients = ctx.coefficients().len(),
            anchors = anchors.is_some(),
            "voicemap: mapper ready"
        );
        Self {
            coefficients: ctx.coefficients().clone(),
            config,
            anchors,
            scheme,
            pitch,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn anchors(&self) -> Option<&AnchorGeometry> {
        self.anchors.as_ref()
    }

    pub fn map(&self, window: &LiveFeatureWindow) -> MapOutcome {
        let cfg = &self.config;
        let score = score(&self.coefficients, window);
        let calibrated = calibrate(score.probability, cfg.scale, cfg.bias);

        let (male_x, female_x) = self
            .anchors
            .as_ref()
            .map_or((0.0, 1.0), |g| (g.male.x, g.female.x));
        let x = apply_gain(
            map_to_anchors(calibrated, &cfg.predicts, male_x, female_x),
            cfg.gain,
        );

        let y = window.mean_f0().map(|f0| self.pitch.score_from_f0(f0));
        let class = match (&self.scheme, y) {
            (Some(scheme), Some(y)) => Some(scheme.classify(x, y)),
            _ => None,
        };

        MapOutcome {
            score,
            calibrated,
            x,
            y,
            class,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assets::{AssetName, MemoryAssets};

    const ANCHORS: &str = r#"{"svg": {"viewBox": {"w": 1000, "h": 1000},
        "points": {"female_avg": {"x_norm": 0.72, "y_norm": 0.7},
                   "male_avg": {"x_norm": 0.27, "y_norm": 0.3}}}}"#;

    // Spectral entropy acts as the intercept: +-2.0 at 120 / 220 Hz.
    const COEFFS: &str = r#"{"features": {"meanfun": -40.0, "sp.ent": 6.8}}"#;

    fn context(with_anchors: bool) -> VoiceMapContext {
        let mut assets = MemoryAssets::new().with(AssetName::COEFFICIENTS, COEFFS);
        if with_anchors {
            assets.insert(AssetName::ANCHORS_DATA_DRIVEN, ANCHORS);
        }
        VoiceMapContext::new(Arc::new(assets))
    }

    fn window(f0: f32) -> LiveFeatureWindow {
        LiveFeatureWindow {
            f0_valid: vec![f0; 8],
            centroid_hz: 1500.0,
            sfm: Some(0.2),
            sp_ent: Some(1.0),
        }
    }

    #[test]
    fn config_defaults() {
        let cfg = MapperConfig::default();
        assert_eq!(cfg.scale, 1.0);
        assert_eq!(cfg.gain, 1.0);
        assert_eq!(cfg.predicts, "male");
        assert_eq!(MapperConfig::from_json(b"{}").unwrap(), cfg);
    }

    #[test]
    fn config_from_json_and_yaml() {
        let cfg =
            MapperConfig::from_json(br#"{"scale": 30, "gain": 1.95, "predicts": "Female"}"#)
                .unwrap();
        assert_eq!(cfg.scale, 30.0);
        assert_eq!(cfg.gain, 1.95);
        assert_eq!(cfg.bias, 0.0);

        let cfg = MapperConfig::from_yaml(b"bias: -0.1\npitch_max_hz: 280\n").unwrap();
        assert_eq!(cfg.bias, -0.1);
        assert_eq!(cfg.pitch_max_hz, 280.0);
        assert_eq!(cfg.pitch_min_hz, 80.0);
    }

    #[test]
    fn config_rejects_unknown_class() {
        assert!(matches!(
            MapperConfig::from_json(br#"{"predicts": "other"}"#),
            Err(VoicemapError::Config(_))
        ));
        assert!(MapperConfig::from_json(br#"{"scale": "big"}"#).is_err());
    }

    #[test]
    fn low_and_high_pitch_land_on_their_side() {
        let mapper = VoiceMapper::new(MapperConfig::default(), &context(true));

        let low = mapper.map(&window(120.0));
        assert!(low.score.probability > 0.85);
        assert!(low.x < 0.4);
        assert_eq!(low.class, Some(VoiceClass::Male));

        let high = mapper.map(&window(220.0));
        assert!(high.score.probability < 0.15);
        assert!(high.x > 0.6);
        assert_eq!(high.class, Some(VoiceClass::Female));
    }

    #[test]
    fn gain_pushes_outward() {
        let base = VoiceMapper::new(MapperConfig::default(), &context(true));
        let wide = VoiceMapper::new(
            MapperConfig {
                gain: 1.95,
                ..Default::default()
            },
            &context(true),
        );
        let w = window(220.0);
        assert!(wide.map(&w).x >= base.map(&w).x);
    }

    #[test]
    fn without_anchors_x_spans_unit_range() {
        let mapper = VoiceMapper::new(MapperConfig::default(), &context(false));
        assert!(mapper.anchors().is_none());
        let out = mapper.map(&window(220.0));
        // x is the female likelihood itself.
        assert!((out.x - (1.0 - out.score.probability)).abs() < 1e-6);
        assert_eq!(out.class, None);
    }

    #[test]
    fn unvoiced_window_has_no_pitch() {
        let mapper = VoiceMapper::new(MapperConfig::default(), &context(true));
        let out = mapper.map(&LiveFeatureWindow::default());
        assert_eq!(out.y, None);
        assert_eq!(out.class, None);
        assert!(out.x.is_finite());
    }
}
