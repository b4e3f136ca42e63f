use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::assets::{read_json, AssetName, AssetSource};
use crate::VoicemapError;

/// Pooled statistic of one feature across the female and male populations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStat {
    pub mean: f64,
    pub std: f64,
}

impl FeatureStat {
    /// Standardizes `value` against this statistic.
    /// Returns `None` when the standard deviation is not positive.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std > 0.0 && self.std.is_finite() {
            Some((value - self.mean) / self.std)
        } else {
            None
        }
    }
}

/// Feature name to pooled statistic. May be empty.
pub type FeatureStats = HashMap<String, FeatureStat>;

#[derive(Deserialize)]
struct StatsFile {
    #[serde(default)]
    features_summary: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct ClassSummary {
    female: Option<MeanStd>,
    male: Option<MeanStd>,
}

#[derive(Deserialize)]
struct MeanStd {
    mean: Option<f64>,
    std: Option<f64>,
}

impl ClassSummary {
    fn pooled(&self) -> Option<FeatureStat> {
        let f = self.female.as_ref()?;
        let m = self.male.as_ref()?;
        Some(FeatureStat {
            mean: 0.5 * (f.mean? + m.mean?),
            std: 0.5 * (f.std? + m.std?),
        })
    }
}

/// Resolves per-feature pooled statistics once and caches them.
///
/// Not used by the scorer; kept as a statistics facility for feature
/// normalization.
pub struct FeatureStatStore {
    source: Arc<dyn AssetSource>,
    cached: OnceCell<FeatureStats>,
}

impl FeatureStatStore {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    /// Returns the resolved statistics, loading them on first use.
    pub fn resolve(&self) -> &FeatureStats {
        self.cached.get_or_init(|| match read_stats(self.source.as_ref()) {
            Ok(stats) => {
                debug!(count = stats.len(), "voicemap: loaded feature stats");
                stats
            }
            Err(e) => {
                warn!("voicemap: feature stats unavailable: {e}");
                FeatureStats::new()
            }
        })
    }
}

fn read_stats(source: &dyn AssetSource) -> Result<FeatureStats, VoicemapError> {
    let file: StatsFile = read_json(source, AssetName::FEATURE_STATS)?;
    let mut stats = FeatureStats::new();
    for (name, entry) in file.features_summary.unwrap_or_default() {
        let pooled = serde_json::from_value::<ClassSummary>(entry)
            .ok()
            .and_then(|s| s.pooled());
        match pooled {
            Some(stat) => {
                stats.insert(name, stat);
            }
            None => debug!(feature = %name, "voicemap: skipping incomplete feature summary"),
        }
    }
    Ok(stats)
}
