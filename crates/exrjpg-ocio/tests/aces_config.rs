//! End-to-end tests against a small ACES-style config written to disk.

use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use exrjpg_ocio::{Config, FileTransform, OcioError, Transform, TransformDirection};
use tempfile::TempDir;

const ACESCG_TO_ACES: [[f64; 3]; 3] = [
    [0.6954522414, 0.1406786965, 0.1638690622],
    [0.0447945634, 0.8596711185, 0.0955343182],
    [-0.0055258826, 0.0040252103, 1.0015006723],
];

const CONFIG: &str = r#"ocio_profile_version: 1

search_path: luts
strictparsing: true
luma: [0.2126, 0.7152, 0.0722]

roles:
  reference: ACES - ACES2065-1
  scene_linear: ACES - ACEScg
  data: Utility - Raw

displays:
  ACES:
    - !<View> {name: sRGB, colorspace: Output - sRGB}
    - !<View> {name: Rec.709, colorspace: Output - Rec.709}
    - !<View> {name: Raw, colorspace: Utility - Raw}

active_displays: [ACES]
active_views: [sRGB, Rec.709, Raw]

colorspaces:
  - !<ColorSpace>
    name: ACES - ACES2065-1
    family: ACES
    bitdepth: 32f
    isdata: false

  - !<ColorSpace>
    name: ACES - ACEScg
    family: ACES
    aliases: [ACEScg, lin_ap1]
    to_reference: !<FileTransform> {src: ACEScg_to_ACES.spimtx, interpolation: linear}

  - !<ColorSpace>
    name: Output - sRGB
    family: Output
    from_reference: !<GroupTransform>
      children:
        - !<FileTransform> {src: ACEScg_to_ACES.spimtx, direction: inverse}
        - !<ExponentWithLinearTransform> {gamma: 2.4, offset: 0.055, direction: inverse}
        - !<RangeTransform> {min_in_value: 0, max_in_value: 1, min_out_value: 0, max_out_value: 1}

  - !<ColorSpace>
    name: Output - Rec.709
    family: Output
    from_reference: !<GroupTransform>
      children:
        - !<ColorSpaceTransform> {src: ACES - ACES2065-1, dst: ACES - ACEScg}
        - !<AllocationTransform> {allocation: lg2, vars: [-8, 5, 0.00390625]}
        - !<FileTransform> {src: shaper_to_rec709.spi1d, interpolation: linear}
        - !<FileTransform> {src: identity.spi3d, interpolation: tetrahedral}

  - !<ColorSpace>
    name: Utility - Raw
    family: Utility
    isdata: true

  - !<ColorSpace>
    name: Loop
    to_reference: !<ColorSpaceTransform> {src: Loop, dst: ACES - ACES2065-1}

  - !<ColorSpace>
    name: Inverse Cube
    from_reference: !<FileTransform> {src: identity.spi3d, direction: inverse}

  - !<ColorSpace>
    name: Missing LUT
    to_reference: !<FileTransform> {src: nowhere.spi1d}
"#;

fn rec709(l: f64) -> f64 {
    if l < 0.018 { 4.5 * l } else { 1.099 * l.powf(0.45) - 0.099 }
}

fn srgb(l: f32) -> f32 {
    if l <= 0.0031308 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 }
}

fn write_luts(dir: &Path) {
    let luts = dir.join("luts");
    fs::create_dir_all(&luts).unwrap();

    let mtx: String = ACESCG_TO_ACES
        .iter()
        .map(|r| format!("{} {} {} 0\n", r[0], r[1], r[2]))
        .collect();
    fs::write(luts.join("ACEScg_to_ACES.spimtx"), mtx).unwrap();

    let n = 4096;
    let mut spi1d = format!("Version 1\nFrom 0.0 1.0\nLength {}\nComponents 1\n{{\n", n);
    for i in 0..n {
        let t = i as f64 / (n - 1) as f64;
        let lin = (2f64.powf(t * 13.0 - 8.0) - 0.00390625).max(0.0);
        spi1d += &format!("  {:.8}\n", rec709(lin).clamp(0.0, 1.0));
    }
    spi1d += "}\n";
    fs::write(luts.join("shaper_to_rec709.spi1d"), spi1d).unwrap();

    let mut spi3d = String::from("SPILUT 1.0\n3 3\n2 2 2\n");
    for r in 0..2 {
        for g in 0..2 {
            for b in 0..2 {
                spi3d += &format!("{} {} {} {} {} {}\n", r, g, b, r, g, b);
            }
        }
    }
    fs::write(luts.join("identity.spi3d"), spi3d).unwrap();
}

fn load() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    write_luts(dir.path());
    let path = dir.path().join("config.ocio");
    fs::write(&path, CONFIG).unwrap();
    let config = Config::from_file(&path).unwrap();
    (dir, config)
}

#[test]
fn loads_aces_style_config() {
    let (_dir, config) = load();
    assert_eq!(config.colorspaces().len(), 8);
    assert_eq!(config.roles().get("scene_linear"), Some("ACES - ACEScg"));
    assert_eq!(config.default_display(), Some("ACES"));
    assert_eq!(config.active_views(), ["sRGB", "Rec.709", "Raw"]);
    assert!(config.colorspace("lin_ap1").is_some());
}

#[test]
fn acescg_to_srgb_matches_curve() {
    let (_dir, config) = load();
    let proc = config.processor("ACES - ACEScg", "Output - sRGB").unwrap();

    for v in [0.0f32, 0.001, 0.05, 0.18, 0.5, 1.0] {
        let out = proc.apply([v, v, v]);
        for c in out {
            assert_abs_diff_eq!(c, srgb(v), epsilon = 2e-4);
        }
    }
    assert_eq!(proc.apply([4.0, -1.0, 0.5])[0], 1.0);
    assert_eq!(proc.apply([4.0, -1.0, 0.5])[1], 0.0);
}

#[test]
fn acescg_to_rec709_through_shaper() {
    let (_dir, config) = load();
    let proc = config.processor("ACEScg", "Output - Rec.709").unwrap();
    for v in [0.02f64, 0.18, 0.5, 1.0] {
        let out = proc.apply([v as f32; 3]);
        assert_abs_diff_eq!(out[1] as f64, rec709(v), epsilon = 5e-3);
    }
}

#[test]
fn processor_is_parallel_safe() {
    let (_dir, config) = load();
    let proc = config.processor("scene_linear", "Output - Rec.709").unwrap();
    let mut pixels: Vec<[f32; 3]> = (0..20_000).map(|i| [(i % 100) as f32 / 100.0; 3]).collect();
    let expected: Vec<_> = pixels.iter().map(|&p| proc.apply(p)).collect();
    proc.apply_rgb(&mut pixels);
    assert_eq!(pixels, expected);
}

#[test]
fn display_processor_uses_view_colorspace() {
    let (_dir, config) = load();
    let a = config.display_processor("ACES - ACEScg", "ACES", Some("sRGB")).unwrap();
    let b = config.display_processor("ACES - ACEScg", "ACES", None).unwrap();
    assert_eq!(a.apply([0.18; 3]), b.apply([0.18; 3]));

    let err = config.display_processor("ACEScg", "ACES", Some("HDR")).unwrap_err();
    assert!(matches!(err, OcioError::ViewNotFound { .. }));
}

#[test]
fn data_spaces_pass_through() {
    let (_dir, config) = load();
    assert!(config.processor("ACES - ACEScg", "Utility - Raw").unwrap().is_identity());
    assert!(config.processor("data", "Output - sRGB").unwrap().is_identity());
}

#[test]
fn circular_colorspace_reference() {
    let (_dir, config) = load();
    let err = config.processor("Loop", "Output - sRGB").unwrap_err();
    assert!(matches!(err, OcioError::CircularReference { .. }), "{err}");
}

#[test]
fn inverse_cube_rejected() {
    let (_dir, config) = load();
    let err = config.processor("ACES - ACES2065-1", "Inverse Cube").unwrap_err();
    assert!(matches!(err, OcioError::InvalidTransform { .. }), "{err}");
}

#[test]
fn missing_lut_reported() {
    let (_dir, config) = load();
    let err = config.processor("Missing LUT", "ACES - ACEScg").unwrap_err();
    assert!(matches!(err, OcioError::TransformFileNotFound { .. }), "{err}");
}

#[test]
fn inverse_1d_lut_round_trips() {
    let (_dir, config) = load();
    let curve = Transform::File(FileTransform {
        src: "shaper_to_rec709.spi1d".into(),
        interpolation: Default::default(),
        direction: TransformDirection::Forward,
    });
    let round_trip = Transform::group(vec![curve.clone(), curve.inverse()]);
    let proc = config.transform_processor(&round_trip, TransformDirection::Forward).unwrap();
    // Above ~0.62 the curve saturates at 1.0 and stops being invertible.
    for x in [0.1f32, 0.3, 0.45, 0.6] {
        assert_abs_diff_eq!(proc.apply([x; 3])[0], x, epsilon = 1e-4);
    }
}

#[test]
fn inverse_group_with_cube_rejected() {
    let (_dir, config) = load();
    let display = config
        .colorspace("Output - Rec.709")
        .and_then(|cs| cs.from_reference())
        .cloned()
        .unwrap();
    assert!(config.transform_processor(&display, TransformDirection::Forward).is_ok());
    let err = config
        .transform_processor(&display, TransformDirection::Inverse)
        .unwrap_err();
    assert!(matches!(err, OcioError::InvalidTransform { .. }));
}

#[test]
fn unknown_transform_fails_at_load() {
    let yaml = "ocio_profile_version: 2\ncolorspaces:\n  - !<ColorSpace>\n    name: Graded\n    to_reference: !<CDLTransform> {slope: [1, 1, 1]}\n";
    let err = Config::from_yaml_str(yaml, ".".into()).unwrap_err();
    assert!(matches!(err, OcioError::InvalidTransform { reason } if reason.contains("Graded")));
}

#[test]
fn unreachable_config() {
    let err = Config::from_file("/definitely/not/here/config.ocio").unwrap_err();
    assert!(matches!(err, OcioError::ConfigNotFound { .. }));
}
