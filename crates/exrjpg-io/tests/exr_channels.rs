//! EXR decoding against files written the way renderers lay them out.

use approx::assert_abs_diff_eq;
use exrjpg_io::{exr, jpeg, IoError};
use exrjpg_core::Rgb8Image;

#[test]
fn rgb_channels_come_back_in_rgb_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.exr");
    let (w, h) = (4, 2);
    let r = vec![0.25f32; w * h];
    let g = vec![0.5f32; w * h];
    let b = vec![0.75f32; w * h];
    let channels = [("B", b.as_slice()), ("R", r.as_slice()), ("G", g.as_slice())];
    exr::write_channels(&path, w, h, &channels).unwrap();

    let image = exr::read(&path).unwrap();
    assert_eq!(image.channels(), 3);
    for px in image.data().chunks(3) {
        assert_abs_diff_eq!(px[0], 0.25);
        assert_abs_diff_eq!(px[1], 0.5);
        assert_abs_diff_eq!(px[2], 0.75);
    }
}

#[test]
fn extra_channels_follow_rgba() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aovs.exr");
    let (w, h) = (3, 3);
    let plane = |v: f32| vec![v; w * h];
    let (a, b, g, r, z) = (plane(1.0), plane(0.3), plane(0.2), plane(0.1), plane(42.0));
    exr::write_channels(
        &path,
        w,
        h,
        &[
            ("A", a.as_slice()),
            ("B", b.as_slice()),
            ("G", g.as_slice()),
            ("R", r.as_slice()),
            ("Z", z.as_slice()),
        ],
    )
    .unwrap();

    let image = exr::read(&path).unwrap();
    assert_eq!(image.channels(), 5);
    let px = &image.data()[..5];
    assert_abs_diff_eq!(px[0], 0.1);
    assert_abs_diff_eq!(px[1], 0.2);
    assert_abs_diff_eq!(px[2], 0.3);
    assert_abs_diff_eq!(px[3], 1.0);
    assert_abs_diff_eq!(px[4], 42.0);
}

#[test]
fn beauty_channels_come_before_aov_layers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beauty_aov.exr");
    let (w, h) = (2, 2);
    let plane = |v: f32| vec![v; w * h];
    let planes = [
        ("R", plane(0.1)),
        ("G", plane(0.2)),
        ("B", plane(0.3)),
        ("diffuse.R", plane(0.9)),
        ("diffuse.G", plane(0.8)),
        ("diffuse.B", plane(0.7)),
    ];
    let channels: Vec<(&str, &[f32])> = planes.iter().map(|(n, p)| (*n, p.as_slice())).collect();
    exr::write_channels(&path, w, h, &channels).unwrap();

    let image = exr::read(&path).unwrap();
    assert_eq!(image.channels(), 6);
    let rgb = image.rgb_clipped().unwrap();
    assert_abs_diff_eq!(rgb[0][0], 0.1);
    assert_abs_diff_eq!(rgb[0][1], 0.2);
    assert_abs_diff_eq!(rgb[0][2], 0.3);
    let px = &image.data()[3..6];
    assert_abs_diff_eq!(px[0], 0.9);
    assert_abs_diff_eq!(px[1], 0.8);
    assert_abs_diff_eq!(px[2], 0.7);
}

#[test]
fn single_channel_reads_as_one_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luma.exr");
    exr::write_channels(&path, 2, 2, &[("Y", &[0.0f32, 0.1, 0.2, 0.3][..])]).unwrap();

    let image = exr::read(&path).unwrap();
    assert_eq!(image.channels(), 1);
    assert!(image.rgb_clipped().is_err());
}

#[test]
fn missing_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = exr::read(dir.path().join("nope.exr")).unwrap_err();
    assert!(matches!(err, IoError::DecodeError(_)));
}

#[test]
fn jpeg_keeps_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jpg");
    let image = Rgb8Image::from_raw(37, 11, vec![64; 37 * 11 * 3]).unwrap();
    jpeg::write(&path, &image).unwrap();

    let loaded = jpeg::read(&path).unwrap();
    assert_eq!((loaded.width(), loaded.height()), (37, 11));
}
