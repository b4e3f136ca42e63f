use std::fmt;

use crate::anchors::{AnchorGeometry, MappingInfo, DEFAULT_RADIUS};

/// Class assigned by [`EllipseScheme::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceClass {
    Male,
    Female,
}

impl fmt::Display for VoiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// An axis-aligned ellipse in normalized map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

impl Ellipse {
    /// Squared distance from the center with each axis scaled by its
    /// radius. Values below 1 lie inside the ellipse.
    pub fn normalized_distance_sq(&self, x: f32, y: f32) -> f32 {
        let dx = (x - self.cx) / self.rx;
        let dy = (y - self.cy) / self.ry;
        dx * dx + dy * dy
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.normalized_distance_sq(x, y) <= 1.0
    }
}

/// Male and female ellipses of the color scheme.
///
/// Classification is a nearest-center rule with per-axis scaling. It is a
/// display heuristic and carries no probabilistic meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseScheme {
    pub male: Ellipse,
    pub female: Ellipse,
}

impl EllipseScheme {
    pub fn from_geometry(g: &AnchorGeometry) -> Self {
        Self {
            male: Ellipse {
                cx: g.male.x,
                cy: g.male.y,
                rx: g.rx,
                ry: g.ry,
            },
            female: Ellipse {
                cx: g.female.x,
                cy: g.female.y,
                rx: g.rx,
                ry: g.ry,
            },
        }
    }

    /// Builds the scheme from the mapping-info document alone.
    /// Returns `None` when the document has no centers.
    pub fn from_mapping_info(info: &MappingInfo) -> Option<Self> {
        let c = info.centers()?;
        let (rx, ry) = info.radii();
        Some(Self {
            male: Ellipse {
                cx: c.male.x,
                cy: c.male.y,
                rx,
                ry,
            },
            female: Ellipse {
                cx: c.female.x,
                cy: c.female.y,
                rx,
                ry,
            },
        })
    }

    /// Assigns the point to the closer ellipse. Ties go to male.
    pub fn classify(&self, x: f32, y: f32) -> VoiceClass {
        let d_male = self.male.normalized_distance_sq(x, y);
        let d_female = self.female.normalized_distance_sq(x, y);
        if d_female < d_male {
            VoiceClass::Female
        } else {
            VoiceClass::Male
        }
    }
}

impl Default for EllipseScheme {
    fn default() -> Self {
        Self {
            male: Ellipse {
                cx: 0.3,
                cy: 0.5,
                rx: DEFAULT_RADIUS,
                ry: DEFAULT_RADIUS,
            },
            female: Ellipse {
                cx: 0.7,
                cy: 0.5,
                rx: DEFAULT_RADIUS,
                ry: DEFAULT_RADIUS,
            },
        }
    }
}
