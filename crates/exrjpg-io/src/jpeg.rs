//! JPEG format support.
//!
//! Writes quantized [`Rgb8Image`]s as baseline JPEG and reads JPEG files back
//! into the same buffer type, expanding grayscale and CMYK sources to RGB.
//!
//! # Example
//!
//! ```rust,ignore
//! use exrjpg_io::jpeg::{JpegWriter, JpegWriterOptions};
//!
//! let writer = JpegWriter::with_options(JpegWriterOptions { quality: 90 });
//! writer.write("preview.jpg", &image)?;
//!
//! let loaded = exrjpg_io::jpeg::read("preview.jpg")?;
//! assert_eq!(loaded.width(), image.width());
//! ```

use crate::{IoError, IoResult};
use exrjpg_core::Rgb8Image;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 98;

/// Options for writing JPEG files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Values outside the range are clamped.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// JPEG file writer.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegWriterOptions,
}

impl JpegWriter {
    /// Creates a writer with default options (quality 98).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with custom options.
    pub fn with_options(options: JpegWriterOptions) -> Self {
        Self { options }
    }

    /// Returns the writer options.
    pub fn options(&self) -> &JpegWriterOptions {
        &self.options
    }

    /// Encodes an image to a byte vector.
    pub fn write_to_memory(&self, image: &Rgb8Image) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder};

        let width = u16::try_from(image.width()).map_err(|_| {
            IoError::EncodeError(format!("width {} exceeds JPEG limit", image.width()))
        })?;
        let height = u16::try_from(image.height()).map_err(|_| {
            IoError::EncodeError(format!("height {} exceeds JPEG limit", image.height()))
        })?;

        let mut buffer = Vec::new();
        let encoder = Encoder::new(&mut buffer, self.options.quality.clamp(1, 100));
        encoder
            .encode(image.data(), width, height, ColorType::Rgb)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

        Ok(buffer)
    }

    /// Writes a JPEG file to disk.
    ///
    /// The image is encoded in memory first. If writing the file fails the
    /// partially written file is removed.
    pub fn write<P: AsRef<Path>>(&self, path: P, image: &Rgb8Image) -> IoResult<()> {
        let path = path.as_ref();
        let bytes = self.write_to_memory(image)?;

        let encode_err = |e: std::io::Error| IoError::EncodeError(format!("{}: {}", path.display(), e));
        let file = File::create(path).map_err(encode_err)?;
        let mut out = BufWriter::new(file);
        let result = out.write_all(&bytes).and_then(|_| out.flush());
        drop(out);

        if let Err(e) = result {
            if let Err(rm) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %rm, "failed to remove partial JPEG");
            }
            return Err(encode_err(e));
        }

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            bytes = bytes.len(),
            quality = self.options.quality,
            "wrote JPEG"
        );
        Ok(())
    }
}

/// Decodes JPEG data from any reader.
fn decode<R: Read>(reader: R) -> IoResult<Rgb8Image> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(reader));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let data = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| [l16[0], l16[0], l16[0]])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let k = 1.0 - cmyk[3] as f32 / 255.0;
                let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0) as u8;
                [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
            })
            .collect(),
    };

    Ok(Rgb8Image::from_raw(info.width as u32, info.height as u32, data)?)
}

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Rgb8Image> {
    let path = path.as_ref();
    let file = File::open(path)?;
    decode(file).map_err(|e| match e {
        IoError::DecodeError(msg) => IoError::DecodeError(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Reads a JPEG from a byte slice.
pub fn read_from_memory(data: &[u8]) -> IoResult<Rgb8Image> {
    decode(Cursor::new(data))
}

/// Writes a JPEG file with default options (quality 98).
pub fn write<P: AsRef<Path>>(path: P, image: &Rgb8Image) -> IoResult<()> {
    JpegWriter::new().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Rgb8Image {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 8) as u8, (y * 8) as u8, 128]);
            }
        }
        Rgb8Image::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.jpg");
        let image = gradient(32, 24);

        write(&path, &image).expect("Write failed");
        let loaded = read(&path).expect("Read failed");

        assert_eq!(loaded.width(), 32);
        assert_eq!(loaded.height(), 24);
        assert_eq!(loaded.channels(), 3);
    }

    #[test]
    fn test_quality_options() {
        let image = gradient(32, 32);
        let low = JpegWriter::with_options(JpegWriterOptions { quality: 30 })
            .write_to_memory(&image)
            .unwrap();
        let high = JpegWriter::new().write_to_memory(&image).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_default_quality() {
        assert_eq!(JpegWriter::new().options().quality, DEFAULT_QUALITY);
    }

    #[test]
    fn test_deterministic() {
        let image = gradient(16, 16);
        let writer = JpegWriter::new();
        assert_eq!(
            writer.write_to_memory(&image).unwrap(),
            writer.write_to_memory(&image).unwrap()
        );
    }

    #[test]
    fn test_flat_color_survives() {
        let image = Rgb8Image::from_raw(16, 16, vec![200; 16 * 16 * 3]).unwrap();
        let bytes = JpegWriter::new().write_to_memory(&image).unwrap();
        let loaded = read_from_memory(&bytes).unwrap();
        assert!(loaded.data().iter().all(|&v| v.abs_diff(200) <= 2));
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.jpg");
        let err = write(&path, &gradient(8, 8)).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_oversized_rejected() {
        let image = Rgb8Image::from_raw(70_000, 1, vec![0; 70_000 * 3]).unwrap();
        assert!(matches!(
            JpegWriter::new().write_to_memory(&image),
            Err(IoError::EncodeError(_))
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            read_from_memory(b"definitely not a jpeg"),
            Err(IoError::DecodeError(_))
        ));
    }
}
