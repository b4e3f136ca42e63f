use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::assets::{read_json, AssetName, AssetSource};
use crate::VoicemapError;

/// Built-in logistic-regression weights, used whenever the coefficients
/// document cannot be loaded. Scoring stays backward compatible only if
/// these values are kept exactly as they are.
const BUILTIN_COEFFICIENTS: [(&str, f64); 20] = [
    ("meanfun", -4.927502015869142),
    ("sfm", -1.6280976137646412),
    ("IQR", 1.3425369998020633),
    ("sp.ent", 1.3423335958179192),
    ("Q25", -0.8699599284108105),
    ("Q75", 0.631356047597979),
    ("minfun", 0.5222923943531044),
    ("modindx", -0.34758880626510796),
    ("kurt", -0.33945562102351334),
    ("skew", -0.25278650840735245),
    ("sd", 0.14407405084087058),
    ("meanfreq", -0.12117718824317832),
    ("centroid", -0.12117718824317832),
    ("meandom", 0.08321484733715298),
    ("mode", 0.055914923487978205),
    ("median", -0.046055103089267954),
    ("mindom", -0.044278276019513105),
    ("dfrange", 0.027372976410010404),
    ("maxdom", 0.026568851228527552),
    ("maxfun", 0.017921251755893777),
];

/// Feature name to signed weight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoefficientMap(HashMap<String, f64>);

impl CoefficientMap {
    /// Returns the built-in weight table.
    pub fn builtin() -> Self {
        BUILTIN_COEFFICIENTS
            .iter()
            .map(|&(name, w)| (name.to_string(), w))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &w)| (k.as_str(), w))
    }
}

impl FromIterator<(String, f64)> for CoefficientMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, f64>> for CoefficientMap {
    fn from(m: HashMap<String, f64>) -> Self {
        Self(m)
    }
}

#[derive(Deserialize)]
struct CoefficientsFile {
    features: HashMap<String, Weight>,
}

/// A weight written either as a JSON number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Weight {
    Number(f64),
    Text(String),
}

impl Weight {
    fn parse(self, feature: &str) -> Result<f64, VoicemapError> {
        let w = match self {
            Weight::Number(w) => w,
            Weight::Text(s) => s.trim().parse::<f64>().map_err(|e| {
                VoicemapError::malformed(AssetName::COEFFICIENTS, format!("{feature}: {e}"))
            })?,
        };
        if !w.is_finite() {
            return Err(VoicemapError::malformed(
                AssetName::COEFFICIENTS,
                format!("{feature}: weight is not finite"),
            ));
        }
        Ok(w)
    }
}

/// Resolves the model weights once and caches them.
///
/// The coefficients document replaces the built-in table entirely; there is
/// no merge. A missing, malformed or empty document yields the built-in
/// table, so [`CoefficientStore::resolve`] never returns an empty map.
pub struct CoefficientStore {
    source: Arc<dyn AssetSource>,
    cached: OnceCell<CoefficientMap>,
}

impl CoefficientStore {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    /// Returns the resolved weights, loading them on first use.
    pub fn resolve(&self) -> &CoefficientMap {
        self.cached.get_or_init(|| load(self.source.as_ref()))
    }
}

fn load(source: &dyn AssetSource) -> CoefficientMap {
    match read_coefficients(source) {
        Ok(map) => {
            debug!(count = map.len(), "voicemap: loaded coefficients");
            map
        }
        Err(e) => {
            warn!("voicemap: using built-in coefficients: {e}");
            CoefficientMap::builtin()
        }
    }
}

fn read_coefficients(source: &dyn AssetSource) -> Result<CoefficientMap, VoicemapError> {
    let file: CoefficientsFile = read_json(source, AssetName::COEFFICIENTS)?;
    if file.features.is_empty() {
        return Err(VoicemapError::incomplete(AssetName::COEFFICIENTS, "features"));
    }
    file.features
        .into_iter()
        .map(|(name, w)| {
            let w = w.parse(&name)?;
            Ok((name, w))
        })
        .collect()
}
