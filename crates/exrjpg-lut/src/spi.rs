//! Sony Pictures Imageworks LUT formats (SPI1D, SPI3D, SPIMTX).
//!
//! Plain-text formats used throughout OCIO configs.
//!
//! ```text
//! Version 1
//! From -0.125 1.125
//! Length 4096
//! Components 1
//! {
//!   0.000000
//!   ...
//! }
//! ```
//!
//! SPI3D carries a header line, a component line, the cube size, then one
//! `ri gi bi r g b` row per grid point. SPIMTX is a 3x4 matrix whose last
//! column is an offset expressed in 16-bit code values.

use crate::{Lut1D, Lut3D, LutError, LutResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Scale applied to SPIMTX offsets.
pub const SPIMTX_OFFSET_SCALE: f32 = 65535.0;

/// Reads an SPI1D file.
pub fn read_spi1d(path: &Path) -> LutResult<Lut1D> {
    parse_spi1d(BufReader::new(File::open(path)?))
}

/// Parses SPI1D from a reader.
pub fn parse_spi1d<R: BufRead>(reader: R) -> LutResult<Lut1D> {
    let mut from = (0.0f32, 1.0f32);
    let mut length = 0usize;
    let mut components = 1usize;
    let mut in_data = false;
    let mut channels: [Vec<f32>; 3] = Default::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "{" {
            in_data = true;
            continue;
        }
        if line == "}" {
            in_data = false;
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if in_data {
            let values = parse_floats(&parts)?;
            if values.len() < components {
                return Err(LutError::ParseError(format!(
                    "expected {} components, got '{}'",
                    components, line
                )));
            }
            for (c, ch) in channels.iter_mut().enumerate().take(components) {
                ch.push(values[c]);
            }
            continue;
        }

        match parts[0].to_ascii_lowercase().as_str() {
            "version" => {}
            "from" if parts.len() >= 3 => {
                let v = parse_floats(&parts[1..3])?;
                from = (v[0], v[1]);
            }
            "length" if parts.len() >= 2 => length = parse_usize(parts[1])?,
            "components" if parts.len() >= 2 => {
                components = parse_usize(parts[1])?;
                if !matches!(components, 1..=3) {
                    return Err(LutError::ParseError(format!(
                        "unsupported component count {}",
                        components
                    )));
                }
            }
            other => {
                return Err(LutError::ParseError(format!("unexpected spi1d header '{}'", other)));
            }
        }
    }

    let [r, g, b] = channels;
    if r.is_empty() {
        return Err(LutError::ParseError("no LUT data found".into()));
    }
    if length > 0 && r.len() != length {
        return Err(LutError::ParseError(format!(
            "spi1d declares {} entries, found {}",
            length,
            r.len()
        )));
    }

    match components {
        1 => Lut1D::from_data(r, from.0, from.1),
        // Two-component files repeat the last curve for blue.
        2 => {
            let b = g.clone();
            Lut1D::from_rgb(r, g, b, [from.0; 3], [from.1; 3])
        }
        _ => Lut1D::from_rgb(r, g, b, [from.0; 3], [from.1; 3]),
    }
}

/// Reads an SPI3D file.
pub fn read_spi3d(path: &Path) -> LutResult<Lut3D> {
    parse_spi3d(BufReader::new(File::open(path)?))
}

/// Parses SPI3D from a reader.
///
/// Entries are placed by their explicit grid indices, so row order in the
/// file does not matter.
pub fn parse_spi3d<R: BufRead>(reader: R) -> LutResult<Lut3D> {
    let mut lines = reader
        .lines()
        .map(|l| l.map(|s| s.trim().to_string()))
        .filter(|l| !matches!(l, Ok(s) if s.is_empty() || s.starts_with('#')));

    let mut next = || -> LutResult<String> {
        lines
            .next()
            .transpose()?
            .ok_or_else(|| LutError::ParseError("unexpected end of spi3d header".into()))
    };

    let magic = next()?;
    if !magic.to_ascii_uppercase().starts_with("SPILUT") {
        return Err(LutError::ParseError(format!("missing SPILUT header, got '{}'", magic)));
    }
    let _components = next()?;
    let dims_line = next()?;
    let dims: Vec<usize> = dims_line
        .split_whitespace()
        .map(parse_usize)
        .collect::<LutResult<_>>()?;
    if dims.len() != 3 || dims[0] != dims[1] || dims[1] != dims[2] {
        return Err(LutError::InvalidSize(format!("spi3d needs a cubic grid, got '{}'", dims_line)));
    }
    let size = dims[0];
    if size < 2 {
        return Err(LutError::InvalidSize(format!("spi3d size must be >= 2, got {}", size)));
    }

    let mut data = vec![[0.0f32; 3]; size * size * size];
    let mut seen = 0usize;
    for line in lines {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(LutError::ParseError(format!("malformed spi3d row '{}'", line)));
        }
        let idx: Vec<usize> = parts[..3].iter().map(|s| parse_usize(s)).collect::<LutResult<_>>()?;
        if idx.iter().any(|&i| i >= size) {
            return Err(LutError::ParseError(format!("spi3d index out of range in '{}'", line)));
        }
        let v = parse_floats(&parts[3..6])?;
        data[idx[0] + size * (idx[1] + size * idx[2])] = [v[0], v[1], v[2]];
        seen += 1;
    }
    if seen != data.len() {
        return Err(LutError::ParseError(format!(
            "spi3d has {} rows, expected {}",
            seen,
            data.len()
        )));
    }

    Lut3D::from_data(data, size)
}

/// A 3x3 matrix with offset, as stored in `.spimtx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiMatrix {
    /// Row-major 3x3 matrix.
    pub matrix: [[f32; 3]; 3],
    /// Offset added after the matrix, already normalized.
    pub offset: [f32; 3],
}

impl SpiMatrix {
    /// Builds from the 12 raw file values (three rows of `m m m offset`).
    pub fn from_values(v: [f32; 12]) -> Self {
        Self {
            matrix: [[v[0], v[1], v[2]], [v[4], v[5], v[6]], [v[8], v[9], v[10]]],
            offset: [
                v[3] / SPIMTX_OFFSET_SCALE,
                v[7] / SPIMTX_OFFSET_SCALE,
                v[11] / SPIMTX_OFFSET_SCALE,
            ],
        }
    }

    /// Applies `M * rgb + offset`.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = &self.matrix;
        std::array::from_fn(|i| m[i][0] * rgb[0] + m[i][1] * rgb[1] + m[i][2] * rgb[2] + self.offset[i])
    }
}

/// Reads an SPIMTX file.
pub fn read_spimtx(path: &Path) -> LutResult<SpiMatrix> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    parse_spimtx(&text)
}

/// Parses SPIMTX text.
pub fn parse_spimtx(text: &str) -> LutResult<SpiMatrix> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != 12 {
        return Err(LutError::ParseError(format!(
            "spimtx needs 12 values, got {}",
            parts.len()
        )));
    }
    let v = parse_floats(&parts)?;
    let mut values = [0.0f32; 12];
    values.copy_from_slice(&v);
    Ok(SpiMatrix::from_values(values))
}

fn parse_floats(parts: &[&str]) -> LutResult<Vec<f32>> {
    parts
        .iter()
        .map(|s| {
            s.parse::<f32>()
                .map_err(|_| LutError::ParseError(format!("invalid number '{}'", s)))
        })
        .collect()
}

fn parse_usize(s: &str) -> LutResult<usize> {
    s.parse()
        .map_err(|_| LutError::ParseError(format!("invalid integer '{}'", s)))
}
