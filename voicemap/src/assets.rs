//! Read-only access to bundled configuration documents.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::VoicemapError;

/// Asset names of the configuration documents.
pub struct AssetName;

impl AssetName {
    /// Logistic-regression weights: `{"features": {name: weight}}`.
    pub const COEFFICIENTS: &str = "voice_lr_coeffs.json";

    /// Per-class feature summary: `{"features_summary": {...}}`.
    pub const FEATURE_STATS: &str = "voice.json";

    /// Anchors computed from the training data. Tried first.
    pub const ANCHORS_DATA_DRIVEN: &str = "voice_map_data_driven.json";

    /// Legacy hand-placed anchors. Tried second.
    pub const ANCHORS_STATIC: &str = "voice_map.json";

    /// Recommended centers and ellipse radii of the color scheme.
    pub const MAPPING_INFO: &str = "svg_mapping_info.json";
}

/// Opens configuration documents by name.
///
/// Implementations must be safe for concurrent use.
pub trait AssetSource: Send + Sync {
    /// Returns the full contents of the named asset.
    fn open(&self, name: &str) -> Result<Vec<u8>, VoicemapError>;
}

/// Serves assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl AssetSource for DirAssets {
    fn open(&self, name: &str) -> Result<Vec<u8>, VoicemapError> {
        std::fs::read(self.root.join(name)).map_err(|source| VoicemapError::ResourceUnavailable {
            name: name.to_string(),
            source,
        })
    }
}

/// Serves assets from memory, e.g. documents embedded with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an asset. Returns `self` for chaining.
    pub fn with(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), data.into());
    }
}

impl AssetSource for MemoryAssets {
    fn open(&self, name: &str) -> Result<Vec<u8>, VoicemapError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| VoicemapError::ResourceUnavailable {
                name: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "asset not found"),
            })
    }
}

/// Opens an asset and decodes it as JSON into `T`.
pub(crate) fn read_json<T: DeserializeOwned>(
    source: &dyn AssetSource,
    name: &str,
) -> Result<T, VoicemapError> {
    let data = source.open(name)?;
    serde_json::from_slice(&data).map_err(|e| VoicemapError::malformed(name, e))
}
