use std::path::PathBuf;
use std::sync::Arc;

use crate::anchors::{AnchorConfigStore, AnchorGeometry};
use crate::assets::{AssetSource, DirAssets};
use crate::coefficients::{CoefficientMap, CoefficientStore};
use crate::features::LiveFeatureWindow;
use crate::scorer::{score, ScoreResult};
use crate::stats::{FeatureStatStore, FeatureStats};

/// Configuration resolved from one asset source.
///
/// Construct once at startup and share it (`VoiceMapContext` is
/// `Send + Sync`). Each document is read on first access and never again.
pub struct VoiceMapContext {
    coefficients: CoefficientStore,
    stats: FeatureStatStore,
    anchors: AnchorConfigStore,
}

impl VoiceMapContext {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            coefficients: CoefficientStore::new(Arc::clone(&source)),
            stats: FeatureStatStore::new(Arc::clone(&source)),
            anchors: AnchorConfigStore::new(source),
        }
    }

    /// Creates a context reading assets from a directory.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(DirAssets::new(root)))
    }

    /// Model weights; never empty.
    pub fn coefficients(&self) -> &CoefficientMap {
        self.coefficients.resolve()
    }

    /// Pooled per-feature statistics; may be empty.
    pub fn feature_stats(&self) -> &FeatureStats {
        self.stats.resolve()
    }

    /// Anchor geometry, or `None` when no anchor document is usable.
    pub fn anchors(&self) -> Option<&AnchorGeometry> {
        self.anchors.resolve()
    }

    /// Scores `window` with the resolved weights.
    pub fn score(&self, window: &LiveFeatureWindow) -> ScoreResult {
        score(self.coefficients(), window)
    }
}
