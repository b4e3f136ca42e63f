use std::fmt;

/// Acoustic measurements of one analysis frame, produced by the feature
/// extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveFeatureWindow {
    /// Voiced fundamental-frequency samples in Hz. May be empty.
    pub f0_valid: Vec<f32>,
    /// Spectral centroid in Hz.
    pub centroid_hz: f32,
    /// Spectral flatness in `[0, 1]`.
    pub sfm: Option<f32>,
    /// Normalized spectral entropy in `[0, 1]`.
    pub sp_ent: Option<f32>,
}

impl LiveFeatureWindow {
    /// Mean voiced F0 in Hz, or `None` without voiced samples.
    pub fn mean_f0(&self) -> Option<f32> {
        if self.f0_valid.is_empty() {
            return None;
        }
        let sum: f64 = self.f0_valid.iter().map(|&f| f as f64).sum();
        Some((sum / self.f0_valid.len() as f64) as f32)
    }
}

/// Named features of the trained model.
///
/// Names follow the columns of the training data set. Frequency features are
/// in kHz there, descriptors are unit-less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    MeanFun,
    MinFun,
    MaxFun,
    Median,
    Mode,
    MeanDom,
    MinDom,
    MaxDom,
    DfRange,
    Centroid,
    MeanFreq,
    Sfm,
    SpEnt,
    Q25,
    Q75,
    Iqr,
    Kurt,
    Skew,
    Sd,
    ModIndx,
}

impl Feature {
    pub const ALL: [Feature; 20] = [
        Feature::MeanFun,
        Feature::MinFun,
        Feature::MaxFun,
        Feature::Median,
        Feature::Mode,
        Feature::MeanDom,
        Feature::MinDom,
        Feature::MaxDom,
        Feature::DfRange,
        Feature::Centroid,
        Feature::MeanFreq,
        Feature::Sfm,
        Feature::SpEnt,
        Feature::Q25,
        Feature::Q75,
        Feature::Iqr,
        Feature::Kurt,
        Feature::Skew,
        Feature::Sd,
        Feature::ModIndx,
    ];

    /// Looks up a feature by its data-set column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeanFun => "meanfun",
            Self::MinFun => "minfun",
            Self::MaxFun => "maxfun",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::MeanDom => "meandom",
            Self::MinDom => "mindom",
            Self::MaxDom => "maxdom",
            Self::DfRange => "dfrange",
            Self::Centroid => "centroid",
            Self::MeanFreq => "meanfreq",
            Self::Sfm => "sfm",
            Self::SpEnt => "sp.ent",
            Self::Q25 => "Q25",
            Self::Q75 => "Q75",
            Self::Iqr => "IQR",
            Self::Kurt => "kurt",
            Self::Skew => "skew",
            Self::Sd => "sd",
            Self::ModIndx => "modindx",
        }
    }

    /// Value of this feature for a live window, or `None` when the live
    /// pipeline has no equivalent.
    pub fn value(self, live: &LiveFeatures) -> Option<f64> {
        match self {
            Self::MeanFun | Self::MeanDom => Some(live.mean_f0),
            Self::MinFun | Self::MinDom => Some(live.min_f0),
            Self::MaxFun | Self::MaxDom => Some(live.max_f0),
            Self::Median | Self::Mode => Some(live.median_f0),
            Self::DfRange => Some(live.max_f0 - live.min_f0),
            Self::Centroid | Self::MeanFreq => Some(live.centroid),
            Self::Sfm => Some(live.sfm),
            Self::SpEnt => Some(live.sp_ent),
            Self::Q25
            | Self::Q75
            | Self::Iqr
            | Self::Kurt
            | Self::Skew
            | Self::Sd
            | Self::ModIndx => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window measurements converted to training-data units.
///
/// Frequencies are in kHz. F0 statistics are 0 without voiced samples.
/// The mode is approximated by the median, and the dominant-frequency
/// features reuse the F0 statistics; the calibration constants were tuned
/// against exactly these approximations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveFeatures {
    pub mean_f0: f64,
    pub min_f0: f64,
    pub max_f0: f64,
    pub median_f0: f64,
    pub centroid: f64,
    pub sfm: f64,
    pub sp_ent: f64,
}

impl LiveFeatures {
    pub fn from_window(window: &LiveFeatureWindow) -> Self {
        let f0 = &window.f0_valid;
        let khz = |hz: f32| hz as f64 / 1000.0;

        let (mean_f0, min_f0, max_f0, median_f0) = if f0.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let mut sorted = f0.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let sum: f64 = f0.iter().map(|&f| f as f64).sum();
            (
                sum / f0.len() as f64 / 1000.0,
                khz(sorted[0]),
                khz(sorted[sorted.len() - 1]),
                khz(sorted[sorted.len() / 2]),
            )
        };

        Self {
            mean_f0,
            min_f0,
            max_f0,
            median_f0,
            centroid: khz(window.centroid_hz),
            sfm: window.sfm.unwrap_or(0.0) as f64,
            sp_ent: window.sp_ent.unwrap_or(0.0) as f64,
        }
    }
}
