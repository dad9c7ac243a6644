//! OpenEXR format support.
//!
//! Reads the largest resolution level of the first valid layer into an
//! interleaved `f32` [`LinearImage`]. Half and `u32` samples are widened.
//!
//! Channels are ordered the way image libraries present them: grouped by
//! layer with unlayered channels first, `R`, `G`, `B`, `A` leading each
//! group, then the rest alphabetically. EXR itself stores channels sorted
//! by name, which would put blue first.
//!
//! # Example
//!
//! ```rust,ignore
//! use exrjpg_io::exr;
//!
//! let image = exr::read("render.exr")?;
//! println!("{}x{} ({} channels)", image.width(), image.height(), image.channels());
//! ```

use crate::{IoError, IoResult};
use exr::prelude::{
    AnyChannel, AnyChannels, Encoding, FlatSamples, Image, Layer, LayerAttributes, ReadChannels,
    ReadLayers, WritableImage,
};
use exrjpg_core::LinearImage;
use smallvec::SmallVec;
use std::path::Path;
use tracing::debug;

/// Reads an EXR file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<LinearImage> {
    let path = path.as_ref();
    let decode = |msg: String| IoError::DecodeError(format!("{}: {}", path.display(), msg));

    let image = exr::prelude::read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(path)
        .map_err(|e| decode(e.to_string()))?;

    let layer = image.layer_data;
    let (width, height) = (layer.size.width(), layer.size.height());
    let pixel_count = width * height;

    let mut channels: Vec<(String, Vec<f32>)> = Vec::with_capacity(layer.channel_data.list.len());
    for ch in &layer.channel_data.list {
        let name = ch.name.to_string();
        if ch.sampling.x() != 1 || ch.sampling.y() != 1 {
            return Err(decode(format!("subsampled channel '{}' is not supported", name)));
        }
        let samples: Vec<f32> = match &ch.sample_data {
            FlatSamples::F32(v) => v.clone(),
            FlatSamples::F16(v) => v.iter().map(|h| h.to_f32()).collect(),
            FlatSamples::U32(v) => v.iter().map(|&u| u as f32).collect(),
        };
        if samples.len() != pixel_count {
            return Err(decode(format!(
                "channel '{}' has {} samples, expected {}",
                name,
                samples.len(),
                pixel_count
            )));
        }
        channels.push((name, samples));
    }
    channels.sort_by(|(a, _), (b, _)| channel_order(a).cmp(&channel_order(b)));

    debug!(
        path = %path.display(),
        width,
        height,
        channels = ?channels.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        "decoded EXR"
    );

    let n = channels.len();
    let mut data = vec![0.0f32; pixel_count * n];
    for (c, (_, samples)) in channels.iter().enumerate() {
        for (i, &v) in samples.iter().enumerate() {
            data[i * n + c] = v;
        }
    }

    Ok(LinearImage::new(width as u32, height as u32, n, data)?)
}

/// Sort key: layer prefix (unlayered first), then R, G, B, A by base name,
/// then the remaining channels by name.
fn channel_order(name: &str) -> (&str, u8, &str) {
    let (layer, base) = match name.rfind('.') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => ("", name),
    };
    let rank = ["R", "G", "B", "A"]
        .iter()
        .position(|c| base.eq_ignore_ascii_case(c))
        .unwrap_or(4) as u8;
    (layer, rank, name)
}

/// Default channel names for an interleaved image with `n` channels.
pub fn default_channel_names(n: usize) -> Vec<String> {
    match n {
        1 => vec!["Y".into()],
        2 => vec!["Y".into(), "A".into()],
        _ => ["R", "G", "B", "A"]
            .iter()
            .take(n)
            .map(|s| s.to_string())
            .chain((4..n).map(|i| format!("extra{}", i - 4)))
            .collect(),
    }
}

/// Writes named planar channels as a single-part EXR with `f32` samples.
pub fn write_channels<P: AsRef<Path>>(
    path: P,
    width: usize,
    height: usize,
    channels: &[(&str, &[f32])],
) -> IoResult<()> {
    let path = path.as_ref();
    if channels.is_empty() {
        return Err(IoError::EncodeError("no channels to write".into()));
    }
    let list = channels
        .iter()
        .map(|&(name, samples)| {
            if samples.len() != width * height {
                return Err(IoError::EncodeError(format!(
                    "channel '{}' has {} samples, expected {}",
                    name,
                    samples.len(),
                    width * height
                )));
            }
            Ok(AnyChannel::new(name, FlatSamples::F32(samples.to_vec())))
        })
        .collect::<IoResult<SmallVec<[AnyChannel<FlatSamples>; 4]>>>()?;

    let layer = Layer::new(
        (width, height),
        LayerAttributes::default(),
        Encoding::SMALL_LOSSLESS,
        AnyChannels::sort(list),
    );
    Image::from_layer(layer)
        .write()
        .to_file(path)
        .map_err(|e| IoError::EncodeError(format!("{}: {}", path.display(), e)))
}

/// Writes an interleaved image, naming channels with [`default_channel_names`].
pub fn write<P: AsRef<Path>>(path: P, image: &LinearImage) -> IoResult<()> {
    let n = image.channels();
    let names = default_channel_names(n);
    let planes: Vec<Vec<f32>> = (0..n)
        .map(|c| image.data().iter().skip(c).step_by(n).copied().collect())
        .collect();
    let channels: Vec<(&str, &[f32])> = names
        .iter()
        .zip(&planes)
        .map(|(name, plane)| (name.as_str(), plane.as_slice()))
        .collect();
    write_channels(
        path,
        image.width() as usize,
        image.height() as usize,
        &channels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn channel_order_rgba_first() {
        let mut names = vec!["Z", "B", "A", "diffuse.R", "G", "R", "N.x"];
        names.sort_by(|a, b| channel_order(a).cmp(&channel_order(b)));
        assert_eq!(names, ["R", "G", "B", "A", "Z", "N.x", "diffuse.R"]);
    }

    #[test]
    fn default_names() {
        assert_eq!(default_channel_names(1), ["Y"]);
        assert_eq!(default_channel_names(3), ["R", "G", "B"]);
        assert_eq!(default_channel_names(5), ["R", "G", "B", "A", "extra0"]);
    }

    #[test]
    fn roundtrip_rgba() {
        let (w, h) = (16u32, 8u32);
        let data: Vec<f32> = (0..w * h * 4).map(|i| i as f32 / 100.0).collect();
        let image = LinearImage::new(w, h, 4, data.clone()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.exr");
        write(&path, &image).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded.width(), w);
        assert_eq!(loaded.height(), h);
        assert_eq!(loaded.channels(), 4);
        for (a, b) in loaded.data().iter().zip(&data) {
            assert_abs_diff_eq!(*a, *b);
        }
    }

    #[test]
    fn rejects_mismatched_plane() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_channels(dir.path().join("bad.exr"), 2, 2, &[("R", &[0.0f32; 3][..])]).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.exr");
        std::fs::write(&path, b"not an exr file").unwrap();
        assert!(matches!(read(&path), Err(IoError::DecodeError(_))));
    }
}
