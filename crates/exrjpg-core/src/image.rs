//! Image buffer types.
//!
//! - [`LinearImage`] - decoded floating point samples, any channel count
//! - [`Rgb8Image`] - 8-bit RGB samples produced by quantization
//!
//! # Memory Layout
//!
//! Both buffers store pixels in **row-major** order, top-to-bottom, with
//! channels interleaved:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! # Usage
//!
//! ```rust
//! use exrjpg_core::{LinearImage, Rgb8Image};
//!
//! let img = LinearImage::new(2, 1, 4, vec![
//!     0.5, 2.0, -1.0, 1.0,
//!     0.0, 0.25, 1.0, 0.0,
//! ]).unwrap();
//!
//! // First three channels, clipped to [0, 1]
//! let rgb = img.rgb_clipped().unwrap();
//! assert_eq!(rgb[0], [0.5, 1.0, 0.0]);
//!
//! let out = Rgb8Image::quantize(img.width(), img.height(), &rgb).unwrap();
//! assert_eq!(out.data()[..3], [128, 255, 0]);
//! ```

use crate::{Error, Result};
use rayon::prelude::*;

/// Decoded linear image, `f32` samples with an arbitrary channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearImage {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<f32>,
}

impl LinearImage {
    /// Wraps an interleaved sample buffer.
    ///
    /// # Errors
    ///
    /// Fails when a dimension is zero or `data.len()` does not equal
    /// `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(Error::InvalidDimensions { width, height, channels });
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(Error::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Extracts the first three channels, each clipped to `[0, 1]`.
    ///
    /// Any further channels (alpha, AOVs) are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelCount`] when the image has fewer than three channels.
    pub fn rgb_clipped(&self) -> Result<Vec<[f32; 3]>> {
        if self.channels < 3 {
            return Err(Error::ChannelCount { required: 3, actual: self.channels });
        }
        Ok(self
            .data
            .par_chunks_exact(self.channels)
            .map(|px| [clip(px[0]), clip(px[1]), clip(px[2])])
            .collect())
    }
}

/// Quantized 8-bit RGB image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rgb8Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Rgb8Image {
    /// Quantizes display-referred RGB values to 8 bits.
    ///
    /// Each sample is clipped to `[0, 1]`, scaled by 255, offset by 0.5 and
    /// truncated.
    ///
    /// # Errors
    ///
    /// Fails when `pixels.len()` does not match `width * height`.
    pub fn quantize(width: u32, height: u32, pixels: &[[f32; 3]]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height, channels: 3 });
        }
        if pixels.len() != expected {
            return Err(Error::BufferSize { expected: expected * 3, actual: pixels.len() * 3 });
        }
        let data = pixels
            .par_iter()
            .flat_map_iter(|px| (*px).map(quantize_sample))
            .collect();
        Ok(Self { width, height, data })
    }

    /// Wraps an already quantized interleaved RGB buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height, channels: 3 });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Always 3.
    #[inline]
    pub fn channels(&self) -> usize {
        3
    }

    /// Interleaved RGB bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image, returning the byte buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[inline]
fn clip(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Maps a display-referred sample to 8 bits: `trunc(clip(v) * 255 + 0.5)`.
#[inline]
pub fn quantize_sample(v: f32) -> u8 {
    (clip(v) * 255.0 + 0.5) as u8
}
