//! Live voice scoring and 2-D anchor mapping.
//!
//! # Architecture
//!
//! A window of acoustic features is turned into a point on the voice map:
//!
//! 1. [`score`]: [`LiveFeatureWindow`] + [`CoefficientMap`] -> weighted sum
//!    and logistic probability ([`ScoreResult`])
//! 2. [`calibrate`]: probability recentred by scale and bias
//! 3. [`map_to_anchors`]: interpolation between the male and female anchors
//!    of the resolved [`AnchorGeometry`]
//! 4. [`apply_gain`]: symmetric expansion around the midpoint
//! 5. [`EllipseScheme::classify`]: optional nearest-ellipse class
//!
//! [`VoiceMapper`] runs the whole chain.
//!
//! # Configuration
//!
//! Weights and geometry come from read-only JSON documents served by an
//! [`AssetSource`]. Every document may be missing:
//!
//! ```text
//! voice_lr_coeffs.json        -> weights       (else built-in table)
//! voice.json                  -> feature stats (else empty)
//! voice_map_data_driven.json  -> anchors       (else voice_map.json, else none)
//! svg_mapping_info.json       -> recommended centers, ellipse radii
//! ```
//!
//! [`VoiceMapContext`] resolves each document at most once. Failures are
//! logged through `tracing` and never returned to the caller.

pub mod anchors;
pub mod assets;
mod coefficients;
mod context;
mod ellipse;
mod error;
mod features;
pub mod mapping;
mod pipeline;
mod pitch;
mod scorer;
mod stats;

pub use anchors::{AnchorConfigStore, AnchorGeometry, AnchorPoint, MappingInfo, SchemeCenters};
pub use assets::{AssetName, AssetSource, DirAssets, MemoryAssets};
pub use coefficients::{CoefficientMap, CoefficientStore};
pub use context::VoiceMapContext;
pub use ellipse::{Ellipse, EllipseScheme, VoiceClass};
pub use error::VoicemapError;
pub use features::{Feature, LiveFeatureWindow, LiveFeatures};
pub use mapping::{apply_gain, calibrate, clamp01, map_to_anchors};
pub use pipeline::{MapOutcome, MapperConfig, VoiceMapper};
pub use pitch::PitchAxis;
pub use scorer::{score, ScoreResult};
pub use stats::{FeatureStat, FeatureStatStore, FeatureStats};
