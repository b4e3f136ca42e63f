//! Resolution from asset files on disk.

use std::fs;
use std::path::Path;

use voicemap::{
    AssetName, CoefficientMap, LiveFeatureWindow, MapperConfig, VoiceClass, VoiceMapContext,
    VoiceMapper,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

const NARROW_ANCHORS: &str = r#"{
    "svg": {
        "viewBox": {"w": 600, "h": 400},
        "points": {
            "female_avg": {"x": 330, "y": 120},
            "male_avg": {"x": 290, "y": 300}
        }
    }
}"#;

const MAPPING_INFO: &str = r#"{
    "recommended_centers_for_voice_csv": {
        "female": {"norm": {"x": 0.72, "y": 0.7}},
        "male": {"norm": {"x": 0.27, "y": 0.3}}
    },
    "ellipse_radii_px": {"rx": 108, "ry": 72},
    "svg_space": {"width": 600, "height": 400}
}"#;

#[test]
fn empty_directory_degrades_silently() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let ctx = VoiceMapContext::from_dir(dir.path());

    assert_eq!(ctx.coefficients(), &CoefficientMap::builtin());
    assert!(ctx.feature_stats().is_empty());
    assert!(ctx.anchors().is_none());

    let r = ctx.score(&LiveFeatureWindow::default());
    assert!(r.raw.is_finite());
    assert!((0.0..=1.0).contains(&r.probability));
}

#[test]
fn narrow_anchors_replaced_from_mapping_info() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), AssetName::ANCHORS_STATIC, NARROW_ANCHORS);
    write(dir.path(), AssetName::MAPPING_INFO, MAPPING_INFO);

    let ctx = VoiceMapContext::from_dir(dir.path());
    let g = ctx.anchors().expect("anchors resolve");

    // 330/600 - 290/600 is below the minimum span.
    assert!((g.female.x - 0.72).abs() < 1e-6);
    assert!((g.male.x - 0.27).abs() < 1e-6);
    assert!((g.rx - 0.18).abs() < 1e-6);
    assert!((g.ry - 0.18).abs() < 1e-6);
    assert_eq!(g.view_box_w, 600.0);
}

#[test]
fn full_directory_end_to_end() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        AssetName::COEFFICIENTS,
        r#"{"features": {"meanfun": -40.0, "sp.ent": 6.8, "IQR": 12.0}}"#,
    );
    write(
        dir.path(),
        AssetName::FEATURE_STATS,
        r#"{"features_summary": {"meanfun": {
            "female": {"mean": 0.19, "std": 0.02},
            "male": {"mean": 0.11, "std": 0.02}
        }}}"#,
    );
    write(dir.path(), AssetName::ANCHORS_DATA_DRIVEN, NARROW_ANCHORS);
    write(dir.path(), AssetName::MAPPING_INFO, MAPPING_INFO);
    let cfg_path = dir.path().join("mapper.yaml");
    fs::write(&cfg_path, "gain: 1.2\npredicts: male\n").unwrap();

    let ctx = VoiceMapContext::from_dir(dir.path());
    assert_eq!(ctx.coefficients().len(), 3);
    assert!((ctx.feature_stats()["meanfun"].mean - 0.15).abs() < 1e-12);

    let cfg = MapperConfig::load(&cfg_path).unwrap();
    let mapper = VoiceMapper::new(cfg, &ctx);

    let window = |f0: f32| LiveFeatureWindow {
        f0_valid: vec![f0 - 5.0, f0, f0 + 5.0],
        centroid_hz: 1700.0,
        sfm: Some(0.25),
        sp_ent: Some(1.0),
    };

    let low = mapper.map(&window(120.0));
    let high = mapper.map(&window(220.0));
    assert_eq!(low.score.used, 2);
    assert!(low.x < high.x);
    assert_eq!(low.class, Some(VoiceClass::Male));
    assert_eq!(high.class, Some(VoiceClass::Female));
}

#[test]
fn unsupported_config_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapper.toml");
    fs::write(&path, "gain = 2").unwrap();
    assert!(MapperConfig::load(&path).is_err());
    assert!(MapperConfig::load(&dir.path().join("missing.json")).is_err());
}
