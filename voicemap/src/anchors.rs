//! Anchor geometry of the 2-D voice map.
//!
//! # Resolution order
//!
//! ```text
//! voice_map_data_driven.json ─┐
//!                             ├─ first JSON object wins ─> anchors
//! voice_map.json ─────────────┘
//!                                 span < 0.2 ?
//! svg_mapping_info.json ──────────> recommended centers replace both anchors
//!                       ──────────> ellipse radii (default 0.18 x 0.18)
//! ```
//!
//! A failure while reading the anchor documents yields no geometry at all;
//! the mapping-info document is optional and its failures are ignored.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::assets::{read_json, AssetName, AssetSource};
use crate::mapping::clamp01;
use crate::VoicemapError;

/// Minimum plausible horizontal distance between the two anchors.
pub const MIN_ANCHOR_SPAN: f32 = 0.2;

/// Normalized ellipse radius used when none is configured.
pub const DEFAULT_RADIUS: f32 = 0.18;

const DEFAULT_FEMALE: AnchorPoint = AnchorPoint { x: 0.7, y: 0.5 };
const DEFAULT_MALE: AnchorPoint = AnchorPoint { x: 0.3, y: 0.5 };

/// A point in normalized `[0,1] x [0,1]` map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub x: f32,
    pub y: f32,
}

impl AnchorPoint {
    fn clamped(self) -> Self {
        Self {
            x: clamp01(self.x),
            y: clamp01(self.y),
        }
    }
}

/// Resolved anchors, view box and ellipse radii.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorGeometry {
    pub male: AnchorPoint,
    pub female: AnchorPoint,
    /// View box width in pixels; only used to normalize pixel coordinates.
    pub view_box_w: f32,
    /// View box height in pixels.
    pub view_box_h: f32,
    /// Normalized ellipse radius along x.
    pub rx: f32,
    /// Normalized ellipse radius along y.
    pub ry: f32,
}

impl AnchorGeometry {
    /// Horizontal distance between the anchors.
    pub fn span(&self) -> f32 {
        (self.female.x - self.male.x).abs()
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AnchorsFile {
    svg: SvgSection,
}

#[derive(Deserialize)]
struct SvgSection {
    #[serde(rename = "viewBox")]
    view_box: ViewBox,
    points: Points,
}

#[derive(Deserialize)]
struct ViewBox {
    w: f64,
    h: f64,
}

#[derive(Deserialize)]
struct Points {
    female_avg: RawPoint,
    male_avg: RawPoint,
}

#[derive(Deserialize)]
struct RawPoint {
    x_norm: Option<f64>,
    y_norm: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
}

impl RawPoint {
    /// Prefers normalized coordinates, then pixels over the view box,
    /// then the fallback. The view box is only checked when a pixel
    /// coordinate has to be converted.
    fn normalize(
        &self,
        name: &str,
        view_box: &ViewBox,
        fallback: AnchorPoint,
    ) -> Result<AnchorPoint, VoicemapError> {
        let x = match (self.x_norm, self.x) {
            (Some(v), _) => v as f32,
            (None, Some(px)) => (px / pixel_extent(name, "svg.viewBox.w", view_box.w)?) as f32,
            (None, None) => fallback.x,
        };
        let y = match (self.y_norm, self.y) {
            (Some(v), _) => v as f32,
            (None, Some(px)) => (px / pixel_extent(name, "svg.viewBox.h", view_box.h)?) as f32,
            (None, None) => fallback.y,
        };
        Ok(AnchorPoint { x, y })
    }
}

fn pixel_extent(name: &str, field: &str, v: f64) -> Result<f64, VoicemapError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(VoicemapError::malformed(
            name,
            format!("{field} must be positive to convert pixels, got {v}"),
        ))
    }
}

/// The color-scheme description document (`svg_mapping_info.json`).
///
/// Each section is decoded on its own when it is used, so a broken section
/// only disables what depends on it.
#[derive(Debug, Clone, Default)]
pub struct MappingInfo {
    doc: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Centers {
    female: NormHolder,
    male: NormHolder,
}

#[derive(Debug, Clone, Deserialize)]
struct NormHolder {
    norm: NormPoint,
}

#[derive(Debug, Clone, Deserialize)]
struct NormPoint {
    x: f64,
    y: Option<f64>,
}

impl NormPoint {
    /// Replaces `base`; `y` is kept from `base` only when the document has none.
    fn replace(&self, base: AnchorPoint) -> AnchorPoint {
        AnchorPoint {
            x: self.x as f32,
            y: self.y.map_or(base.y, |y| y as f32),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Radii {
    rx: f64,
    ry: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct SvgSpace {
    width: f64,
    height: f64,
}

/// Male and female centers read from [`MappingInfo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemeCenters {
    pub male: AnchorPoint,
    pub female: AnchorPoint,
}

impl MappingInfo {
    /// Loads `svg_mapping_info.json` from `source`.
    pub fn load(source: &dyn AssetSource) -> Result<Self, VoicemapError> {
        Self::from_value(read_json(source, AssetName::MAPPING_INFO)?)
    }

    /// Parses a mapping-info document.
    pub fn from_json(data: &[u8]) -> Result<Self, VoicemapError> {
        let value = serde_json::from_slice(data)
            .map_err(|e| VoicemapError::malformed(AssetName::MAPPING_INFO, e))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, VoicemapError> {
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            _ => Err(VoicemapError::malformed(
                AssetName::MAPPING_INFO,
                "expected a JSON object",
            )),
        }
    }

    /// Decodes one top-level section. A missing or malformed section is `None`.
    fn section<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.doc.get(key)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(section = key, "voicemap: ignoring malformed mapping info section: {e}");
                None
            }
        }
    }

    /// Recommended centers, replacing `male`/`female` point by point.
    fn recommended(&self, male: AnchorPoint, female: AnchorPoint) -> Option<SchemeCenters> {
        let c: Centers = self.section("recommended_centers_for_voice_csv")?;
        Some(SchemeCenters {
            male: c.male.norm.replace(male),
            female: c.female.norm.replace(female),
        })
    }

    /// Centers of the color scheme: the recommended centers, else the
    /// anchors as drawn. A center without `y` sits at 0.5.
    pub fn centers(&self) -> Option<SchemeCenters> {
        let c: Centers = self
            .section("recommended_centers_for_voice_csv")
            .or_else(|| self.section("anchors_svg_as_is"))?;
        Some(SchemeCenters {
            male: c.male.norm.replace(DEFAULT_MALE).clamped(),
            female: c.female.norm.replace(DEFAULT_FEMALE).clamped(),
        })
    }

    /// Normalized ellipse radii: given directly, derived from pixel radii
    /// over the SVG size, or [`DEFAULT_RADIUS`].
    pub fn radii(&self) -> (f32, f32) {
        let norm: Option<Radii> = self.section("ellipses_norm_radii");
        let px = || -> Option<(f64, f64)> {
            let r: Radii = self.section("ellipse_radii_px")?;
            let svg: SvgSpace = self.section("svg_space")?;
            Some((r.rx / svg.width.max(1.0), r.ry / svg.height.max(1.0)))
        };
        match norm.map(|r| (r.rx, r.ry)).or_else(px) {
            Some((rx, ry)) => (valid_radius(rx), valid_radius(ry)),
            None => (DEFAULT_RADIUS, DEFAULT_RADIUS),
        }
    }
}

fn valid_radius(r: f64) -> f32 {
    let r = r as f32;
    if r.is_finite() && r > 0.0 {
        r
    } else {
        DEFAULT_RADIUS
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Resolves the anchor geometry once and caches it.
///
/// `None` means the mapping feature is unavailable; callers must not treat
/// it as anchors at zero.
pub struct AnchorConfigStore {
    source: Arc<dyn AssetSource>,
    cached: OnceCell<Option<AnchorGeometry>>,
}

impl AnchorConfigStore {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    /// Returns the resolved geometry, loading it on first use.
    pub fn resolve(&self) -> Option<&AnchorGeometry> {
        self.cached
            .get_or_init(|| match resolve_geometry(self.source.as_ref()) {
                Ok(g) => {
                    debug!(
                        male_x = g.male.x,
                        female_x = g.female.x,
                        rx = g.rx,
                        ry = g.ry,
                        "voicemap: resolved anchor geometry"
                    );
                    Some(g)
                }
                Err(e) => {
                    warn!("voicemap: anchor geometry unavailable: {e}");
                    None
                }
            })
            .as_ref()
    }
}

/// Returns the first candidate that opens and parses as a JSON object.
fn first_document(
    source: &dyn AssetSource,
    names: &[&'static str],
) -> Result<(&'static str, Value), VoicemapError> {
    let mut last_err = None;
    for &name in names {
        match read_json::<Value>(source, name) {
            Ok(v) if v.is_object() => return Ok((name, v)),
            Ok(_) => last_err = Some(VoicemapError::malformed(name, "expected a JSON object")),
            Err(e) => {
                debug!("voicemap: skipping anchor source: {e}");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| VoicemapError::Config("no anchor sources".into())))
}

fn resolve_geometry(source: &dyn AssetSource) -> Result<AnchorGeometry, VoicemapError> {
    let (name, doc) = first_document(
        source,
        &[AssetName::ANCHORS_DATA_DRIVEN, AssetName::ANCHORS_STATIC],
    )?;
    let file: AnchorsFile =
        serde_json::from_value(doc).map_err(|e| VoicemapError::malformed(name, e))?;

    let view_box = &file.svg.view_box;
    let points = &file.svg.points;
    let mut female = points.female_avg.normalize(name, view_box, DEFAULT_FEMALE)?;
    let mut male = points.male_avg.normalize(name, view_box, DEFAULT_MALE)?;

    let info = match MappingInfo::load(source) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!("voicemap: mapping info unavailable: {e}");
            None
        }
    };

    let span = (female.x - male.x).abs();
    if span < MIN_ANCHOR_SPAN {
        match info.as_ref().and_then(|i| i.recommended(male, female)) {
            Some(c) => {
                male = c.male;
                female = c.female;
                warn!(
                    old_span = span,
                    new_span = (female.x - male.x).abs(),
                    "voicemap: anchor span too small in {name}, using recommended centers"
                );
            }
            None => warn!(
                old_span = span,
                "voicemap: anchor span too small in {name}, no recommended centers"
            ),
        }
    }

    let (rx, ry) = info
        .as_ref()
        .map_or((DEFAULT_RADIUS, DEFAULT_RADIUS), MappingInfo::radii);

    Ok(AnchorGeometry {
        male: male.clamped(),
        female: female.clamped(),
        view_box_w: view_box.w as f32,
        view_box_h: view_box.h as f32,
        rx,
        ry,
    })
}
