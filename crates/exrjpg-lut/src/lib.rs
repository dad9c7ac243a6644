//! # exrjpg-lut
//!
//! Look-up tables for the color-managed path of the converter.
//!
//! OCIO configs reference baked curves and cubes through `FileTransform`.
//! This crate holds the in-memory tables and the readers for the formats
//! those configs ship with.
//!
//! - [`Lut1D`] - per-channel curves, with exact inverse lookup
//! - [`Lut3D`] - RGB cubes, trilinear or tetrahedral
//! - [`SpiMatrix`] - `.spimtx` 3x4 matrices
//!
//! # Formats
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `.spi1d`  | [`spi::read_spi1d`] |
//! | `.spi3d`  | [`spi::read_spi3d`] |
//! | `.spimtx` | [`spi::read_spimtx`] |
//! | `.cube`   | [`cube::read_cube`] |
//!
//! [`read_lut`] picks the reader from the file extension.

#![warn(missing_docs)]

mod error;
mod interp;
mod lut1d;
mod lut3d;
pub mod cube;
pub mod spi;

pub use error::{LutError, LutResult};
pub use interp::Interpolation;
pub use lut1d::Lut1D;
pub use lut3d::Lut3D;
pub use spi::SpiMatrix;

use std::path::Path;

/// A LUT loaded from disk.
#[derive(Debug, Clone)]
pub enum LutFile {
    /// Per-channel curve.
    OneD(Lut1D),
    /// RGB cube.
    ThreeD(Lut3D),
    /// Shaper curve followed by a cube.
    Shaped {
        /// Applied first.
        shaper: Lut1D,
        /// Applied to the shaper output.
        cube: Lut3D,
    },
    /// Matrix with offset.
    Matrix(SpiMatrix),
}

impl LutFile {
    /// Applies the LUT to one RGB value.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            Self::OneD(lut) => lut.apply_rgb(rgb),
            Self::ThreeD(lut) => lut.apply(rgb),
            Self::Shaped { shaper, cube } => cube.apply(shaper.apply_rgb(rgb)),
            Self::Matrix(m) => m.apply(rgb),
        }
    }

    /// True if the file contains a 3D cube.
    pub fn has_cube(&self) -> bool {
        matches!(self, Self::ThreeD(_) | Self::Shaped { .. })
    }

    /// Overrides cube interpolation; curves and matrices are unaffected.
    pub fn with_interpolation(self, interp: Interpolation) -> Self {
        match self {
            Self::ThreeD(lut) => Self::ThreeD(lut.with_interpolation(interp)),
            Self::Shaped { shaper, cube } => Self::Shaped {
                shaper,
                cube: cube.with_interpolation(interp),
            },
            other => other,
        }
    }
}

/// Reads a LUT, choosing the format from the file extension.
pub fn read_lut(path: &Path) -> LutResult<LutFile> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    tracing::debug!(path = %path.display(), format = %ext, "reading LUT");
    match ext.as_str() {
        "spi1d" => spi::read_spi1d(path).map(LutFile::OneD),
        "spi3d" => spi::read_spi3d(path).map(LutFile::ThreeD),
        "spimtx" => spi::read_spimtx(path).map(LutFile::Matrix),
        "cube" => cube::read_cube(path),
        _ => Err(LutError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mtx = dir.path().join("scale.SPIMTX");
        std::fs::write(&mtx, "2 0 0 0\n0 2 0 0\n0 0 2 0\n").unwrap();
        let lut = read_lut(&mtx).unwrap();
        assert_eq!(lut.apply([0.5, 0.25, 1.0]), [1.0, 0.5, 2.0]);
        assert!(!lut.has_cube());
    }

    #[test]
    fn test_unknown_extension() {
        let err = read_lut(Path::new("look.3dl")).unwrap_err();
        assert!(matches!(err, LutError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_is_io() {
        let err = read_lut(Path::new("/nonexistent/curve.spi1d")).unwrap_err();
        assert!(matches!(err, LutError::Io(_)));
    }
}
