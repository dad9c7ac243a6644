//! Single-file conversion: decode, clip, transform, quantize, encode.

use crate::{ColorTransform, ConvertError, ConvertResult};
use exrjpg_core::{InputSpace, LinearImage, OutputSpace, Rgb8Image};
use exrjpg_io::{exr, JpegWriter, JpegWriterOptions, DEFAULT_QUALITY};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Settings shared by every file of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// OCIO config path. `None` falls back to the `OCIO` environment variable.
    pub config: Option<PathBuf>,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            config: None,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ConvertOptions {
    /// JPEG writer for these options.
    pub fn writer(&self) -> JpegWriter {
        JpegWriter::with_options(JpegWriterOptions {
            quality: self.quality,
        })
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channels present in the source EXR.
    pub source_channels: usize,
    /// Wall time spent on the file.
    pub elapsed: Duration,
}

/// Converts one EXR to a JPEG, resolving the color transform on the spot.
///
/// For many files prefer [`convert_with`] with a transform resolved once.
pub fn convert(
    input: &Path,
    output: &Path,
    input_space: InputSpace,
    output_space: OutputSpace,
    options: &ConvertOptions,
) -> ConvertResult<ConvertStats> {
    let transform = ColorTransform::resolve(input_space, output_space, options.config.as_deref())?;
    convert_with(input, output, &transform, &options.writer())
}

/// Converts one EXR to a JPEG with an already resolved transform.
pub fn convert_with(
    input: &Path,
    output: &Path,
    transform: &ColorTransform,
    writer: &JpegWriter,
) -> ConvertResult<ConvertStats> {
    let start = Instant::now();

    let image = exr::read(input).map_err(|source| ConvertError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    trace!(
        input = %input.display(),
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "decoded"
    );

    let display = render(&image, transform).map_err(|e| ConvertError::Format {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;

    writer
        .write(output, &display)
        .map_err(|source| ConvertError::Encode {
            path: output.to_path_buf(),
            source,
        })?;

    let stats = ConvertStats {
        width: image.width(),
        height: image.height(),
        source_channels: image.channels(),
        elapsed: start.elapsed(),
    };
    debug!(
        input = %input.display(),
        output = %output.display(),
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "converted"
    );
    Ok(stats)
}

/// Maps decoded linear pixels to a quantized display image.
///
/// Input is clipped to `[0, 1]` and reduced to its first three channels
/// before the transform. The result is clipped again while quantizing.
pub fn render(image: &LinearImage, transform: &ColorTransform) -> exrjpg_core::Result<Rgb8Image> {
    let mut rgb = image.rgb_clipped()?;
    transform.apply(&mut rgb);
    Rgb8Image::quantize(image.width(), image.height(), &rgb)
}
